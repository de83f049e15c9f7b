//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{LogFormat, ServiceConfig, ServiceKind};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid environment variable {key}='{value}': {reason}")]
    Env {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, override from the process environment, and validate.
pub fn load_config(kind: ServiceKind, path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let config = match path {
        Some(path) => load_file(kind, path)?,
        None => ServiceConfig::for_service(kind),
    };
    let config = apply_env_overrides(config, |key| std::env::var(key).ok())?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML file on top of the service defaults.
///
/// Sections and keys missing from the file keep the per-service default,
/// not the generic serde default.
pub fn load_file(kind: ServiceKind, path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_with_defaults(kind, &content)
}

/// Parse TOML text on top of the service defaults.
pub fn parse_with_defaults(kind: ServiceKind, content: &str) -> Result<ServiceConfig, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let mut base = toml::Value::try_from(ServiceConfig::for_service(kind))?;
    merge(&mut base, overlay);

    Ok(base.try_into()?)
}

fn merge(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(mut config: ServiceConfig, lookup: F) -> Result<ServiceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup("PORT") {
        let port: u16 = parse_env("PORT", &port)?;
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{}:{}", host, port);
    }
    if let Some(name) = lookup("SERVICE_NAME") {
        config.service_name = name;
    }
    if let Some(url) = lookup("RENTAL_SERVICE_URL") {
        config.downstream.rental_url = url;
    }
    if let Some(url) = lookup("VEHICLES_SERVICE_URL") {
        config.downstream.vehicles_url = url;
    }
    if let Some(interval) = lookup("SCHEDULER_INTERVAL_MS") {
        config.scheduler.interval_ms = Some(parse_env("SCHEDULER_INTERVAL_MS", &interval)?);
    }
    if let Some(rate) = lookup("CHAOS_ERROR_RATE") {
        config.chaos.error_rate = parse_env("CHAOS_ERROR_RATE", &rate)?;
    }
    if let Some(latency) = lookup("CHAOS_LATENCY_MAX_MS") {
        config.chaos.latency_max_ms = parse_env("CHAOS_LATENCY_MAX_MS", &latency)?;
    }
    if let Some(level) = lookup("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Some(format) = lookup("LOG_FORMAT") {
        config.observability.log_format = parse_env::<LogFormat>("LOG_FORMAT", &format)?;
    }

    Ok(config)
}

fn parse_env<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_file_keeps_service_defaults() {
        let config = parse_with_defaults(
            ServiceKind::Vehicles,
            r#"
            [chaos]
            latency_max_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.service_name, "vehicles-service");
        assert_eq!(config.listener.bind_address, "0.0.0.0:3002");
        assert_eq!(config.chaos.error_rate, 0.2);
        assert_eq!(config.chaos.latency_max_ms, 250);
    }

    #[test]
    fn test_env_overrides() {
        let config = apply_env_overrides(
            ServiceConfig::for_service(ServiceKind::Platform),
            env(&[
                ("PORT", "9000"),
                ("RENTAL_SERVICE_URL", "http://rental:7001"),
                ("SCHEDULER_INTERVAL_MS", "1500"),
                ("LOG_FORMAT", "json"),
            ]),
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "0.0.0.0:9000");
        assert_eq!(config.downstream.rental_url, "http://rental:7001");
        assert_eq!(config.scheduler.interval_ms, Some(1500));
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn test_bad_env_value_is_an_error() {
        let err = apply_env_overrides(
            ServiceConfig::for_service(ServiceKind::Rental),
            env(&[("CHAOS_ERROR_RATE", "lots")]),
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::Env { key: "CHAOS_ERROR_RATE", .. }));
    }

    #[test]
    fn test_load_file_validates() {
        let path = std::env::temp_dir().join("chaos_fleet_loader_invalid.toml");
        fs::write(&path, "[timeouts]\nrequest_secs = 0\n").unwrap();

        let err = load_config(ServiceKind::Rental, Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        fs::remove_file(&path).unwrap_or_default();
    }
}
