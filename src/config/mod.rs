//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! per-service defaults (ServiceConfig::for_service)
//!     → loader.rs (optional TOML file merged on top)
//!     → loader.rs (environment overrides: PORT, SERVICE_NAME, ...)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → chaos settings swapped into the live ChaosCell
//! ```
//!
//! # Design Decisions
//! - Only chaos settings are hot-reloadable; listener and scheduler changes need a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ChaosSettings, DownstreamConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    SchedulerConfig, ServiceConfig, ServiceKind, TimeoutConfig,
};
