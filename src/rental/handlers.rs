use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rental::store::{Rental, RentalError, RentalStore};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalStarted {
    pub status: String,
    pub vehicle_id: String,
    pub start_time: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalEnded {
    pub status: String,
    pub vehicle_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

pub async fn start_rental(
    State(store): State<RentalStore>,
    Path(vehicle_id): Path<String>,
) -> Result<Json<RentalStarted>, RentalError> {
    let rental = store.start(&vehicle_id)?;
    tracing::info!(vehicle_id = %vehicle_id, "Vehicle {} rental started", vehicle_id);

    Ok(Json(RentalStarted {
        status: "started".to_string(),
        vehicle_id,
        start_time: rental.start_time,
    }))
}

pub async fn end_rental(
    State(store): State<RentalStore>,
    Path(vehicle_id): Path<String>,
) -> Result<Json<RentalEnded>, RentalError> {
    let rental = store.end(&vehicle_id)?;
    tracing::info!(vehicle_id = %vehicle_id, "Vehicle {} rental ended", vehicle_id);

    Ok(Json(RentalEnded {
        status: "ended".to_string(),
        vehicle_id,
        start_time: rental.start_time,
        end_time: rental.end_time,
    }))
}

pub async fn get_history(
    State(store): State<RentalStore>,
    Path(vehicle_id): Path<String>,
) -> Json<Vec<Rental>> {
    Json(store.history(&vehicle_id))
}
