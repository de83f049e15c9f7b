//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Install the Prometheus recorder (once per process)
//! - Expose the `/metrics` scrape endpoint
//! - Record HTTP, chaos and scheduler metrics
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by service, method, route, status
//!   (route is the matched template or `unmatched`, never the raw path)
//! - `http_request_duration_ms` (histogram): latency distribution, same labels
//! - `chaos_injected_faults_total` (counter): injected 500s by service, route
//! - `chaos_injected_latency_ms` (histogram): injected delays by service
//! - `scheduler_calls_total` (counter): downstream calls by target, outcome
//! - `scheduler_interval_ms` (gauge): active scheduler interval
//! - `service_info` / `process_start_time_seconds` (gauges)
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without a recorder it is a no-op
//! - Histogram buckets tuned for web latencies up to the chaos latency ceiling

use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Buckets for `http_request_duration_ms` and `chaos_injected_latency_ms`.
pub const LATENCY_BUCKETS_MS: &[f64] = &[
    5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2000.0, 5000.0,
];

/// Route label for requests that matched no route.
pub const UNMATCHED_ROUTE: &str = "unmatched";

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
static INSTALL: Mutex<()> = Mutex::new(());

/// Install the global Prometheus recorder, or return the one already installed.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = HANDLE.get() {
        return Ok(handle.clone());
    }

    let _guard = INSTALL.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(handle) = HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_ms".to_string()),
            LATENCY_BUCKETS_MS,
        )?
        .set_buckets_for_metric(
            Matcher::Full("chaos_injected_latency_ms".to_string()),
            LATENCY_BUCKETS_MS,
        )?
        .install_recorder()?;

    let _ = HANDLE.set(handle.clone());
    tracing::debug!("Prometheus recorder installed");
    Ok(handle)
}

/// Periodically run recorder upkeep (histogram compaction).
pub async fn run_upkeep(handle: PrometheusHandle, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    loop {
        ticker.tick().await;
        handle.run_upkeep();
    }
}

/// `GET /metrics`
pub fn router(handle: PrometheusHandle) -> Router {
    Router::new().route(
        "/metrics",
        get(move || {
            let body = handle.render();
            async move {
                (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
                    body,
                )
                    .into_response()
            }
        }),
    )
}

/// Record service identity and start time.
pub fn record_service_start(service: &str) {
    metrics::gauge!("service_info", "service" => service.to_string()).set(1.0);

    let started = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64();
    metrics::gauge!("process_start_time_seconds", "service" => service.to_string()).set(started);
}

/// Record a completed inbound request.
pub fn record_request(service: &str, method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("service", service.to_string()),
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    metrics::counter!("http_requests_total", &labels).increment(1);
    metrics::histogram!("http_request_duration_ms", &labels).record(elapsed_ms);
}

pub fn record_injected_fault(service: &str, route: &str) {
    metrics::counter!(
        "chaos_injected_faults_total",
        "service" => service.to_string(),
        "route" => route.to_string()
    )
    .increment(1);
}

pub fn record_injected_latency(service: &str, delay: Duration) {
    metrics::histogram!("chaos_injected_latency_ms", "service" => service.to_string())
        .record(delay.as_secs_f64() * 1000.0);
}

pub fn record_scheduler_call(target: &'static str, success: bool) {
    let outcome = if success { "success" } else { "error" };
    metrics::counter!("scheduler_calls_total", "target" => target, "outcome" => outcome)
        .increment(1);
}

pub fn set_scheduler_interval(interval: Duration) {
    metrics::gauge!("scheduler_interval_ms").set(interval.as_millis() as f64);
}
