//! Chaos fleet: platform, rental and vehicles services with fault injection.

pub mod chaos;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rental;
pub mod scheduler;
pub mod vehicles;

pub use chaos::{ChaosCell, ChaosConfig, ChaosPatch};
pub use config::{ServiceConfig, ServiceKind};
pub use http::ServiceServer;
pub use lifecycle::Shutdown;
pub use scheduler::Scheduler;
