//! Live chaos configuration.
//!
//! `ChaosCell` is the single owner of a service's effective `ChaosConfig`.
//! Readers take a lock-free snapshot per decision; writers apply a patch
//! with read-copy-update so concurrent patches never lose a field.

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ChaosSettings;

/// Effective chaos configuration, serialized the way the admin API reports it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChaosConfig {
    /// Probability of failing a request. Values outside [0, 1] are kept as-is.
    pub error_rate: f64,
    /// Exclusive upper bound of injected latency in milliseconds. Zero or
    /// negative disables delays; the value is reported back as supplied.
    pub latency_max: i64,
}

impl From<ChaosSettings> for ChaosConfig {
    fn from(settings: ChaosSettings) -> Self {
        Self {
            error_rate: settings.error_rate,
            latency_max: i64::try_from(settings.latency_max_ms).unwrap_or(i64::MAX),
        }
    }
}

/// Partial update of a `ChaosConfig`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChaosPatch {
    pub error_rate: Option<f64>,
    pub latency_max: Option<i64>,
}

impl ChaosPatch {
    /// Extract the numeric `errorRate` / `latencyMax` fields of a JSON body.
    ///
    /// Anything else (missing fields, strings, non-object bodies) is ignored.
    pub fn from_json(body: &Value) -> Self {
        let error_rate = body.get("errorRate").and_then(Value::as_f64);
        let latency_max = body
            .get("latencyMax")
            .and_then(Value::as_f64)
            .map(latency_from_number);

        Self {
            error_rate,
            latency_max,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.error_rate.is_none() && self.latency_max.is_none()
    }

    /// Apply the present fields on top of `config`.
    pub fn apply(&self, config: ChaosConfig) -> ChaosConfig {
        ChaosConfig {
            error_rate: self.error_rate.unwrap_or(config.error_rate),
            latency_max: self.latency_max.unwrap_or(config.latency_max),
        }
    }
}

/// Whole milliseconds, sign kept. The cast saturates at the `i64` bounds.
fn latency_from_number(ms: f64) -> i64 {
    ms.floor() as i64
}

/// Shared, atomically replaceable chaos configuration.
#[derive(Debug, Clone)]
pub struct ChaosCell {
    inner: Arc<ArcSwap<ChaosConfig>>,
}

impl ChaosCell {
    pub fn new(config: ChaosConfig) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(config)),
        }
    }

    /// Snapshot of the effective configuration.
    pub fn current(&self) -> ChaosConfig {
        **self.inner.load()
    }

    /// Apply a partial update and return the resulting effective configuration.
    pub fn apply(&self, patch: ChaosPatch) -> ChaosConfig {
        let mut updated = self.current();
        self.inner.rcu(|current| {
            updated = patch.apply(**current);
            updated
        });
        updated
    }

    /// Replace the configuration wholesale.
    pub fn replace(&self, config: ChaosConfig) {
        self.inner.store(Arc::new(config));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cell() -> ChaosCell {
        ChaosCell::new(ChaosConfig {
            error_rate: 0.1,
            latency_max: 5000,
        })
    }

    #[test]
    fn test_partial_update_keeps_other_field() {
        let cell = cell();
        let updated = cell.apply(ChaosPatch::from_json(&json!({ "errorRate": 0.5 })));

        assert_eq!(updated.error_rate, 0.5);
        assert_eq!(updated.latency_max, 5000);
        assert_eq!(cell.current(), updated);

        let updated = cell.apply(ChaosPatch::from_json(&json!({ "latencyMax": 0 })));
        assert_eq!(updated.error_rate, 0.5);
        assert_eq!(updated.latency_max, 0);
    }

    #[test]
    fn test_non_numeric_fields_ignored() {
        let patch = ChaosPatch::from_json(&json!({ "errorRate": "1", "latencyMax": null }));
        assert!(patch.is_empty());

        assert!(ChaosPatch::from_json(&json!([1, 2])).is_empty());
        assert!(ChaosPatch::from_json(&Value::Null).is_empty());

        let cell = cell();
        assert_eq!(cell.apply(patch), cell.current());
    }

    #[test]
    fn test_error_rate_not_clamped() {
        let patch = ChaosPatch::from_json(&json!({ "errorRate": 3.0 }));
        assert_eq!(patch.error_rate, Some(3.0));

        let patch = ChaosPatch::from_json(&json!({ "errorRate": -1 }));
        assert_eq!(patch.error_rate, Some(-1.0));
    }

    #[test]
    fn test_latency_floored_and_sign_kept() {
        let patch = ChaosPatch::from_json(&json!({ "latencyMax": 250.9 }));
        assert_eq!(patch.latency_max, Some(250));

        let patch = ChaosPatch::from_json(&json!({ "latencyMax": -20 }));
        assert_eq!(patch.latency_max, Some(-20));

        let config = cell().apply(patch);
        assert_eq!(
            serde_json::to_value(config).unwrap(),
            json!({ "errorRate": 0.1, "latencyMax": -20 })
        );
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(cell().current()).unwrap();
        assert_eq!(value, json!({ "errorRate": 0.1, "latencyMax": 5000 }));
    }

    #[test]
    fn test_replace() {
        let cell = cell();
        let clone = cell.clone();
        cell.replace(ChaosConfig {
            error_rate: 0.0,
            latency_max: 10,
        });
        assert_eq!(clone.current().latency_max, 10);
    }
}
