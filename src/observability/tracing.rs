//! Request spans and telemetry shutdown.
//!
//! # Responsibilities
//! - Create a span per request carrying service, method, path and request ID
//! - Flush telemetry output before the process exits
//!
//! # Design Decisions
//! - Spans are produced by tower-http's `TraceLayer` with a custom span maker
//! - Output goes to stdout; flushing it is the export pipeline's shutdown

use std::io::Write;

use axum::{body::Body, http::Request};
use tracing::Span;

use crate::http::request::RequestIdExt;

/// Span for one inbound request.
pub fn make_request_span(service: &str, request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        service = %service,
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request.request_id(),
    )
}

/// Flushes telemetry output on shutdown.
#[derive(Debug)]
pub struct TelemetryGuard {
    service: String,
}

impl TelemetryGuard {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Flush buffered output. Call once, after the server has stopped.
    pub fn shutdown(self) -> std::io::Result<()> {
        tracing::info!(service = %self.service, "Tracing terminated");
        let result = std::io::stdout().flush();
        if let Err(e) = &result {
            eprintln!("Error terminating tracing: {}", e);
        }
        result
    }
}
