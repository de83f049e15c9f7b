//! Fault injection subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → middleware.rs (exempt? delay? fail?)
//!     → route handler
//!
//! POST /config {errorRate?, latencyMax?}
//!     → handlers.rs (numeric fields only)
//!     → config.rs ChaosCell::apply (read-copy-update)
//!     → next request observes the new config
//! ```
//!
//! # Design Decisions
//! - One `ChaosCell` per service, injected into middleware and handlers
//! - `/config` and `/metrics` are exempt so a misbehaving service can still be tuned and scraped
//! - Random draws are independent per request and per decision

pub mod config;
pub mod handlers;
pub mod middleware;

use axum::{routing::get, Router};

pub use config::{ChaosCell, ChaosConfig, ChaosPatch};
pub use middleware::{chaos_middleware, ChaosState};

/// Admin routes for the chaos configuration.
pub fn router(state: ChaosState) -> Router {
    Router::new()
        .route("/config", get(handlers::get_config).post(handlers::update_config))
        .with_state(state)
}
