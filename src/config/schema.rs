//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure shared by the
//! three services. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};

/// Which service this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// Aggregator that polls the other two services.
    Platform,
    /// Rental lifecycle service (chaos-enabled).
    Rental,
    /// Vehicle catalogue service (chaos-enabled).
    Vehicles,
}

impl ServiceKind {
    /// Default service name used in logs and metric labels.
    pub fn default_name(self) -> &'static str {
        match self {
            ServiceKind::Platform => "platform-service",
            ServiceKind::Rental => "rental-service",
            ServiceKind::Vehicles => "vehicles-service",
        }
    }

    /// Default listening port.
    pub fn default_port(self) -> u16 {
        match self {
            ServiceKind::Platform => 7000,
            ServiceKind::Rental => 3001,
            ServiceKind::Vehicles => 3002,
        }
    }

    /// Whether the chaos middleware wraps this service's routes.
    pub fn chaos_enabled(self) -> bool {
        !matches!(self, ServiceKind::Platform)
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceKind::Platform => write!(f, "platform"),
            ServiceKind::Rental => write!(f, "rental"),
            ServiceKind::Vehicles => write!(f, "vehicles"),
        }
    }
}

/// Root configuration for a service process.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service name attached to every log line and metric.
    pub service_name: String,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Initial chaos settings (rental, vehicles).
    pub chaos: ChaosSettings,

    /// Polling scheduler settings (platform).
    pub scheduler: SchedulerConfig,

    /// Downstream service locations (platform).
    pub downstream: DownstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ServiceConfig {
    /// Defaults for the given service.
    pub fn for_service(kind: ServiceKind) -> Self {
        let chaos = match kind {
            ServiceKind::Platform => ChaosSettings {
                error_rate: 0.0,
                latency_max_ms: 0,
            },
            ServiceKind::Rental => ChaosSettings {
                error_rate: 0.1,
                latency_max_ms: 5000,
            },
            ServiceKind::Vehicles => ChaosSettings {
                error_rate: 0.2,
                latency_max_ms: 5000,
            },
        };

        Self {
            service_name: kind.default_name().to_string(),
            listener: ListenerConfig {
                bind_address: format!("0.0.0.0:{}", kind.default_port()),
            },
            chaos,
            ..Self::default()
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_name: ServiceKind::Platform.default_name().to_string(),
            listener: ListenerConfig::default(),
            chaos: ChaosSettings::default(),
            scheduler: SchedulerConfig::default(),
            downstream: DownstreamConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:7000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: format!("0.0.0.0:{}", ServiceKind::Platform.default_port()),
        }
    }
}

/// Chaos settings applied when the service starts and on file reload.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChaosSettings {
    /// Probability in [0, 1] of failing a request. Not clamped.
    pub error_rate: f64,

    /// Upper bound (exclusive) of injected latency in milliseconds.
    pub latency_max_ms: u64,
}

impl Default for ChaosSettings {
    fn default() -> Self {
        Self {
            error_rate: 0.0,
            latency_max_ms: 0,
        }
    }
}

/// Polling scheduler configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Fixed tick interval in milliseconds.
    /// When absent the interval is a random jitter in [0, 2000) ms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,
}

/// Downstream service locations for the platform aggregator.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DownstreamConfig {
    /// Base URL of the rental service.
    pub rental_url: String,

    /// Base URL of the vehicles service.
    pub vehicles_url: String,

    /// Per-call timeout for scheduler requests in milliseconds.
    pub timeout_ms: u64,
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            rental_url: format!("http://localhost:{}", ServiceKind::Rental.default_port()),
            vehicles_url: format!("http://localhost:{}", ServiceKind::Vehicles.default_port()),
            timeout_ms: 10_000,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    /// Must exceed the maximum injected latency or delayed requests turn into timeouts.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
