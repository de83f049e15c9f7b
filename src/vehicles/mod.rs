//! Vehicle catalogue service.
//!
//! A fixed fleet generated at start-up, served read-only:
//! `GET /vehicles` and `GET /vehicles/{vehicleId}` (404 when unknown).

pub mod fleet;
pub mod handlers;

use axum::{routing::get, Router};

pub use fleet::{Coordinates, Fleet, Vehicle, VehicleStatus};

pub fn router(fleet: Fleet) -> Router {
    Router::new()
        .route("/vehicles", get(handlers::list_vehicles))
        .route("/vehicles/{vehicle_id}", get(handlers::get_vehicle))
        .with_state(fleet)
}
