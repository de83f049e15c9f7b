//! In-memory rental book.
//!
//! Active rentals and completed history are both keyed by the raw vehicle id
//! from the URL. Nothing is persisted.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http::response::error_response;

/// A single rental of a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rental {
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

/// Lifecycle conflicts. Reported to clients as 400.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RentalError {
    #[error("Vehicle already rented")]
    AlreadyRented,

    #[error("Vehicle not currently rented")]
    NotRented,
}

impl IntoResponse for RentalError {
    fn into_response(self) -> Response {
        error_response(StatusCode::BAD_REQUEST, self.to_string())
    }
}

/// Thread-safe store of active rentals and completed history.
#[derive(Debug, Clone, Default)]
pub struct RentalStore {
    active: Arc<DashMap<String, Rental>>,
    history: Arc<DashMap<String, Vec<Rental>>>,
}

impl RentalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start renting `vehicle_id`.
    pub fn start(&self, vehicle_id: &str) -> Result<Rental, RentalError> {
        match self.active.entry(vehicle_id.to_string()) {
            Entry::Occupied(_) => Err(RentalError::AlreadyRented),
            Entry::Vacant(slot) => {
                let rental = Rental {
                    start_time: Utc::now(),
                    end_time: None,
                };
                slot.insert(rental.clone());
                Ok(rental)
            }
        }
    }

    /// End the active rental of `vehicle_id` and move it into history.
    pub fn end(&self, vehicle_id: &str) -> Result<Rental, RentalError> {
        let (key, mut rental) = self
            .active
            .remove(vehicle_id)
            .ok_or(RentalError::NotRented)?;

        rental.end_time = Some(Utc::now());
        self.history.entry(key).or_default().push(rental.clone());
        Ok(rental)
    }

    /// Completed rentals of `vehicle_id`, oldest first.
    pub fn history(&self, vehicle_id: &str) -> Vec<Rental> {
        self.history
            .get(vehicle_id)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    /// Number of vehicles currently rented.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}
