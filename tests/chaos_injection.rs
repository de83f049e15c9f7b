//! Fault and latency injection against live rental and vehicles services.

use std::time::{Duration, Instant};

use chaos_fleet::config::{ServiceConfig, ServiceKind};
use serde_json::{json, Value};

mod common;

fn config(kind: ServiceKind, error_rate: f64, latency_max_ms: u64) -> ServiceConfig {
    let mut config = ServiceConfig::for_service(kind);
    config.chaos.error_rate = error_rate;
    config.chaos.latency_max_ms = latency_max_ms;
    config
}

#[tokio::test]
async fn test_full_error_rate_returns_chaos_fault() {
    let service = common::start_service(ServiceKind::Vehicles, config(ServiceKind::Vehicles, 1.0, 0)).await;
    let client = reqwest::Client::new();

    for _ in 0..5 {
        let res = client.get(service.url("/vehicles")).send().await.unwrap();
        assert_eq!(res.status(), 500);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Chaos Monkey struck!" }));
    }

    service.shutdown.trigger();
}

#[tokio::test]
async fn test_zero_error_rate_and_latency_serves_fast() {
    let service = common::start_service(ServiceKind::Vehicles, config(ServiceKind::Vehicles, 0.0, 0)).await;
    let client = reqwest::Client::new();

    let start = Instant::now();
    for _ in 0..20 {
        let res = client.get(service.url("/vehicles")).send().await.unwrap();
        assert_eq!(res.status(), 200);
        let fleet: Vec<Value> = res.json().await.unwrap();
        assert_eq!(fleet.len(), 100);
    }
    assert!(start.elapsed() < Duration::from_secs(5));

    service.shutdown.trigger();
}

#[tokio::test]
async fn test_runtime_update_takes_effect() {
    let service = common::start_service(ServiceKind::Rental, config(ServiceKind::Rental, 1.0, 0)).await;
    let client = reqwest::Client::new();

    let res = client.get(service.url("/history/1")).send().await.unwrap();
    assert_eq!(res.status(), 500);

    // The control endpoint itself is never faulted.
    let res = client
        .post(service.url("/config"))
        .json(&json!({ "errorRate": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["errorRate"], json!(0.0));
    assert_eq!(body["latencyMax"], json!(0));

    let res = client.get(service.url("/history/1")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    service.shutdown.trigger();
}

#[tokio::test]
async fn test_partial_update_keeps_other_field() {
    let service = common::start_service(ServiceKind::Rental, config(ServiceKind::Rental, 0.0, 5000)).await;
    let client = reqwest::Client::new();

    let res = client
        .post(service.url("/config"))
        .json(&json!({ "errorRate": 0.5 }))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "errorRate": 0.5, "latencyMax": 5000 }));

    let current = service.chaos.as_ref().unwrap().current();
    assert_eq!(current.error_rate, 0.5);
    assert_eq!(current.latency_max, 5000);

    service.shutdown.trigger();
}

#[tokio::test]
async fn test_metrics_count_injected_faults() {
    let service = common::start_service(ServiceKind::Vehicles, config(ServiceKind::Vehicles, 1.0, 0)).await;
    let client = reqwest::Client::new();

    let res = client.get(service.url("/vehicles/1")).send().await.unwrap();
    assert_eq!(res.status(), 500);

    let res = client.get(service.url("/metrics")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let text = res.text().await.unwrap();
    assert!(text.contains("chaos_injected_faults_total"));

    service.shutdown.trigger();
}
