use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;

use crate::chaos::config::{ChaosConfig, ChaosPatch};
use crate::chaos::middleware::ChaosState;

/// `POST /config`: apply the numeric fields of the body and report the result.
///
/// Never rejects: bodies that are not JSON, or fields that are not numbers,
/// leave the configuration untouched.
pub async fn update_config(State(state): State<ChaosState>, body: Bytes) -> Json<ChaosConfig> {
    let value: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let config = state.cell.apply(ChaosPatch::from_json(&value));

    tracing::info!(
        error_rate = config.error_rate,
        latency_max = config.latency_max,
        "Config updated: errorRate={}, latencyMax={}",
        config.error_rate,
        config.latency_max
    );

    Json(config)
}

/// `GET /config`
pub async fn get_config(State(state): State<ChaosState>) -> Json<ChaosConfig> {
    Json(state.cell.current())
}
