//! Platform scheduler polling live mock downstream services.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chaos_fleet::config::{ServiceConfig, ServiceKind};
use serde_json::{json, Value};

mod common;

fn counting_backend(status: u16, hits: Arc<AtomicU32>, prefix: &'static str) -> impl Fn(String) -> std::future::Ready<(u16, String)> + Send + Sync + 'static {
    move |path: String| {
        if path.starts_with(prefix) {
            hits.fetch_add(1, Ordering::SeqCst);
        }
        std::future::ready((status, "[]".to_string()))
    }
}

async fn start_platform(rental: std::net::SocketAddr, vehicles: std::net::SocketAddr, interval_ms: u64) -> common::RunningService {
    let mut config = ServiceConfig::for_service(ServiceKind::Platform);
    config.downstream.rental_url = format!("http://{}", rental);
    config.downstream.vehicles_url = format!("http://{}", vehicles);
    config.scheduler.interval_ms = Some(interval_ms);
    common::start_service(ServiceKind::Platform, config).await
}

#[tokio::test]
async fn test_scheduler_polls_both_services() {
    let rental_hits = Arc::new(AtomicU32::new(0));
    let vehicle_hits = Arc::new(AtomicU32::new(0));
    let rental = common::start_programmable_backend(counting_backend(200, rental_hits.clone(), "/history/")).await;
    let vehicles = common::start_programmable_backend(counting_backend(200, vehicle_hits.clone(), "/vehicles/")).await;

    let service = start_platform(rental, vehicles, 100).await;
    tokio::time::sleep(Duration::from_millis(550)).await;

    assert!(rental_hits.load(Ordering::SeqCst) >= 2);
    assert!(vehicle_hits.load(Ordering::SeqCst) >= 2);

    service.shutdown.trigger();
}

#[tokio::test]
async fn test_failing_rental_does_not_stop_vehicle_calls() {
    let rental_hits = Arc::new(AtomicU32::new(0));
    let vehicle_hits = Arc::new(AtomicU32::new(0));
    let rental = common::start_programmable_backend(counting_backend(500, rental_hits.clone(), "/history/")).await;
    let vehicles = common::start_programmable_backend(counting_backend(200, vehicle_hits.clone(), "/vehicles/")).await;

    let service = start_platform(rental, vehicles, 100).await;
    tokio::time::sleep(Duration::from_millis(550)).await;

    let rental_calls = rental_hits.load(Ordering::SeqCst);
    let vehicle_calls = vehicle_hits.load(Ordering::SeqCst);
    assert!(rental_calls >= 2);
    assert!(vehicle_calls >= 2);

    // Failures do not stop the schedule.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(vehicle_hits.load(Ordering::SeqCst) > vehicle_calls);

    service.shutdown.trigger();
}

#[tokio::test]
async fn test_interval_update_via_admin_endpoint() {
    let hits = Arc::new(AtomicU32::new(0));
    let rental = common::start_programmable_backend(counting_backend(200, hits.clone(), "/history/")).await;
    let vehicles = common::start_programmable_backend(counting_backend(200, Arc::new(AtomicU32::new(0)), "/vehicles/")).await;

    let service = start_platform(rental, vehicles, 60_000).await;
    let client = reqwest::Client::new();

    let status: Value = client
        .get(service.url("/config/scheduler"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status, json!({ "interval": 60000 }));

    let res = client
        .post(service.url("/config/scheduler"))
        .json(&json!({ "interval": 100 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "status": "updated", "interval": 100 }));

    tokio::time::sleep(Duration::from_millis(550)).await;
    assert!(hits.load(Ordering::SeqCst) >= 2);
    assert_eq!(
        service.scheduler.as_ref().unwrap().interval(),
        Some(Duration::from_millis(100))
    );

    service.shutdown.trigger();
}

#[tokio::test]
async fn test_invalid_interval_keeps_schedule() {
    let rental = common::start_programmable_backend(|_| async { (200, "[]".to_string()) }).await;
    let vehicles = common::start_programmable_backend(|_| async { (200, "{}".to_string()) }).await;

    let service = start_platform(rental, vehicles, 5000).await;
    let client = reqwest::Client::new();

    for body in [json!({}), json!({ "interval": "abc" }), json!({ "interval": 0 }), json!({ "interval": -10 })] {
        let res = client
            .post(service.url("/config/scheduler"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400);
        let error: Value = res.json().await.unwrap();
        assert_eq!(error, json!({ "error": "Invalid interval" }));
    }

    assert_eq!(
        service.scheduler.as_ref().unwrap().interval(),
        Some(Duration::from_millis(5000))
    );

    service.shutdown.trigger();
}
