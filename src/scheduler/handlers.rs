use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::response::error_response;
use crate::scheduler::Scheduler;

#[derive(Debug, Serialize, Deserialize)]
pub struct SchedulerUpdated {
    pub status: String,
    pub interval: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SchedulerStatus {
    pub interval: Option<u64>,
}

/// Positive JSON number in milliseconds, or `None`.
pub fn parse_interval(body: &Value) -> Option<Duration> {
    let ms = body.get("interval").and_then(Value::as_f64)?;
    if ms.is_finite() && ms > 0.0 {
        Some(Duration::from_millis(ms.floor() as u64))
    } else {
        None
    }
}

/// `POST /config/scheduler`
pub async fn update_scheduler(State(scheduler): State<Scheduler>, body: Bytes) -> Response {
    let value: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    match parse_interval(&value) {
        Some(interval) => {
            let interval = scheduler.update_interval(interval);
            Json(SchedulerUpdated {
                status: "updated".to_string(),
                interval: interval.as_millis() as u64,
            })
            .into_response()
        }
        None => error_response(StatusCode::BAD_REQUEST, "Invalid interval"),
    }
}

/// `GET /config/scheduler`
pub async fn get_scheduler(State(scheduler): State<Scheduler>) -> Json<SchedulerStatus> {
    Json(SchedulerStatus {
        interval: scheduler.interval().map(|i| i.as_millis() as u64),
    })
}
