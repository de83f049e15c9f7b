//! Response helpers.
//!
//! # Responsibilities
//! - Uniform `{"error": "..."}` body for every non-2xx the services produce
//! - Map domain errors to HTTP status codes
//!
//! # Design Decisions
//! - Validation failures and domain conflicts are 400, unknown entities 404
//! - Injected faults are 500 and carry the same body shape

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl IntoResponse for ErrorBody {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Shorthand for `(status, ErrorBody)`.
pub fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (status, ErrorBody::new(error)).into_response()
}
