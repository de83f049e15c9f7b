//! Chaos injection middleware.
//!
//! # Per-request flow
//! ```text
//! exempt path? ──yes──▶ next handler
//!      │ no
//!      ▼
//! latency_max > 0? ──yes──▶ sleep uniform[0, latency_max) ms
//!      │
//!      ▼
//! uniform[0,1) < error_rate? ──yes──▶ 500 "Chaos Monkey struck!" + warn log
//!      │ no
//!      ▼
//! next handler
//! ```
//!
//! The error check reads the configuration again after the delay, so an
//! update made while a request sleeps applies to that request.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use rand::Rng;

use crate::chaos::config::{ChaosCell, ChaosConfig};
use crate::http::response::ErrorBody;
use crate::observability::metrics;

/// Paths that never see injected latency or faults.
pub const EXEMPT_PATHS: [&str; 2] = ["/config", "/metrics"];

/// Body of every injected failure.
pub const FAULT_MESSAGE: &str = "Chaos Monkey struck!";

pub fn is_exempt(path: &str) -> bool {
    EXEMPT_PATHS.contains(&path)
}

/// Delay to inject, if any. Never draws when `latency_max` is zero or negative.
pub fn draw_latency<R: Rng>(config: &ChaosConfig, rng: &mut R) -> Option<Duration> {
    let max = u64::try_from(config.latency_max).ok().filter(|&max| max > 0)?;
    Some(Duration::from_millis(rng.gen_range(0..max)))
}

/// Whether to fail the request. `error_rate >= 1` always fails, `<= 0` never does.
pub fn draw_fault<R: Rng>(config: &ChaosConfig, rng: &mut R) -> bool {
    rng.gen::<f64>() < config.error_rate
}

/// State handed to [`chaos_middleware`].
#[derive(Clone)]
pub struct ChaosState {
    pub cell: ChaosCell,
    pub service: Arc<str>,
}

impl ChaosState {
    pub fn new(cell: ChaosCell, service: impl Into<Arc<str>>) -> Self {
        Self {
            cell,
            service: service.into(),
        }
    }
}

pub async fn chaos_middleware(
    State(state): State<ChaosState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if is_exempt(request.uri().path()) {
        return next.run(request).await;
    }

    // ThreadRng is !Send; draw before any await point.
    let delay = draw_latency(&state.cell.current(), &mut rand::thread_rng());
    if let Some(delay) = delay {
        metrics::record_injected_latency(&state.service, delay);
        tokio::time::sleep(delay).await;
    }

    let fail = draw_fault(&state.cell.current(), &mut rand::thread_rng());
    if fail {
        let path = request.uri().path();
        tracing::warn!(path = %path, "Chaos: Injected error for {}", path);
        metrics::record_injected_fault(&state.service, route_label(&request));
        return fault_response();
    }

    next.run(request).await
}

/// Route template of the request, or [`metrics::UNMATCHED_ROUTE`] for fallback requests.
pub fn route_label<B>(request: &Request<B>) -> &str {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(MatchedPath::as_str)
        .unwrap_or(metrics::UNMATCHED_ROUTE)
}

pub fn fault_response() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new(FAULT_MESSAGE)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(error_rate: f64, latency_max: i64) -> ChaosConfig {
        ChaosConfig {
            error_rate,
            latency_max,
        }
    }

    #[test]
    fn test_exempt_paths() {
        assert!(is_exempt("/config"));
        assert!(is_exempt("/metrics"));
        assert!(!is_exempt("/config/scheduler"));
        assert!(!is_exempt("/vehicles"));
    }

    #[test]
    fn test_zero_error_rate_never_fails() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = config(0.0, 5000);
        assert!((0..10_000).all(|_| !draw_fault(&config, &mut rng)));
    }

    #[test]
    fn test_full_error_rate_always_fails() {
        let mut rng = StdRng::seed_from_u64(7);
        for rate in [1.0, 1.5, 100.0] {
            let config = config(rate, 0);
            assert!((0..10_000).all(|_| draw_fault(&config, &mut rng)));
        }
        let negative = config(-0.5, 0);
        assert!((0..1_000).all(|_| !draw_fault(&negative, &mut rng)));
    }

    #[test]
    fn test_latency_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(draw_latency(&config(1.0, 0), &mut rng), None);
        assert_eq!(draw_latency(&config(1.0, -20), &mut rng), None);

        let config = config(0.0, 50);
        for _ in 0..1_000 {
            let delay = draw_latency(&config, &mut rng).unwrap();
            assert!(delay < Duration::from_millis(50));
        }
    }

    #[test]
    fn test_half_error_rate_is_roughly_half() {
        let mut rng = StdRng::seed_from_u64(1234);
        let config = config(0.5, 0);
        let failures = (0..10_000).filter(|_| draw_fault(&config, &mut rng)).count();
        assert!((4_500..5_500).contains(&failures), "got {}", failures);
    }
}
