//! Request metrics middleware.
//! Counts every response and records its duration, except for `/metrics` itself.
//! Labelled by route template so the series count stays bounded.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::observability::metrics;

pub async fn track_metrics(
    State(service): State<Arc<str>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.uri().path() == "/metrics" {
        return next.run(request).await;
    }

    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(MatchedPath::as_str)
        .unwrap_or(metrics::UNMATCHED_ROUTE)
        .to_string();

    let response = next.run(request).await;

    metrics::record_request(&service, &method, &route, response.status().as_u16(), start);
    response
}
