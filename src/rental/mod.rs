//! Rental lifecycle service.
//!
//! ```text
//! POST /start/{vehicleId}   vacant → active        (400 if already active)
//! POST /end/{vehicleId}     active → history       (400 if not active)
//! GET  /history/{vehicleId} completed rentals, [] when none
//! ```

pub mod handlers;
pub mod store;

use axum::{
    routing::{get, post},
    Router,
};

pub use store::{Rental, RentalError, RentalStore};

pub fn router(store: RentalStore) -> Router {
    Router::new()
        .route("/start/{vehicle_id}", post(handlers::start_rental))
        .route("/end/{vehicle_id}", post(handlers::end_rental))
        .route("/history/{vehicle_id}", get(handlers::get_history))
        .with_state(store)
}
