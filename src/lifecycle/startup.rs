//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics
//! - Build the service and start background tasks (scheduler, config watcher)
//! - Bind the listener and serve until a shutdown signal
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listener binds last (traffic only when ready)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::{load_config, watcher::ConfigWatcher, ConfigError, ServiceKind};
use crate::http::ServiceServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_listener;
use crate::observability::{logging, metrics, tracing::TelemetryGuard};

/// How often the Prometheus recorder runs its upkeep.
const METRICS_UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Errors that abort start-up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to initialize logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error("failed to install metrics recorder: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to watch config file: {0}")]
    Watch(#[from] notify::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Options selected on the command line.
#[derive(Debug, Clone)]
pub struct StartupOptions {
    pub kind: ServiceKind,
    pub config_path: Option<PathBuf>,
}

/// Run a service process to completion.
pub async fn run(options: StartupOptions) -> Result<(), StartupError> {
    let config = load_config(options.kind, options.config_path.as_deref())?;
    logging::init_logging(&config.observability)?;

    tracing::info!(
        service = %config.service_name,
        version = env!("CARGO_PKG_VERSION"),
        "{} starting",
        config.service_name
    );
    tracing::info!(
        bind_address = %config.listener.bind_address,
        chaos_error_rate = config.chaos.error_rate,
        chaos_latency_max_ms = config.chaos.latency_max_ms,
        scheduler_interval_ms = ?config.scheduler.interval_ms,
        "Configuration loaded"
    );

    let metrics_handle = metrics::install_recorder()?;
    metrics::record_service_start(&config.service_name);
    tokio::spawn(metrics::run_upkeep(metrics_handle.clone(), METRICS_UPKEEP_INTERVAL));

    let telemetry = TelemetryGuard::new(config.service_name.clone());
    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    // Keep the watcher alive for the lifetime of the server.
    let (config_updates, _watcher) = match &options.config_path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(options.kind, path);
            (updates, Some(watcher.run()?))
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (updates, None)
        }
    };

    let address = config.listener.bind_address.clone();
    let server = ServiceServer::new(options.kind, config, metrics_handle)?;

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    server.run(listener, config_updates, shutdown.subscribe()).await?;

    let _ = telemetry.shutdown();
    Ok(())
}
