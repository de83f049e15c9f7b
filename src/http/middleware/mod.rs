//! Cross-cutting HTTP middleware shared by all services.

pub mod metrics;

pub use metrics::track_metrics;
