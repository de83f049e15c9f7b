//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, shared middleware stack)
//!     → request.rs (request ID)
//!     → middleware/ (metrics)
//!     → [chaos middleware on rental and vehicles]
//!     → service handlers (rental, vehicles, scheduler admin)
//!     → response.rs (uniform error bodies)
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use response::ErrorBody;
pub use server::ServiceServer;
