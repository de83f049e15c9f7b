use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::http::response::error_response;
use crate::vehicles::fleet::{parse_vehicle_id, Fleet};

pub async fn list_vehicles(State(fleet): State<Fleet>) -> Response {
    Json(fleet.all()).into_response()
}

pub async fn get_vehicle(State(fleet): State<Fleet>, Path(raw_id): Path<String>) -> Response {
    match parse_vehicle_id(&raw_id).and_then(|id| fleet.get(id)) {
        Some(vehicle) => Json(vehicle).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Vehicle not found"),
    }
}
