//! Downstream polling performed on every scheduler tick.
//!
//! # Responsibilities
//! - Call rental history and vehicle details for random ids in [0, 100)
//! - Isolate each call: its failure is logged and counted, never propagated
//!
//! # Design Decisions
//! - Both calls of a tick run concurrently and independently
//! - No retries; the next tick is the retry
//! - Non-2xx responses count as failures, same as transport errors

use std::time::Duration;

use thiserror::Error;

use crate::config::DownstreamConfig;
use crate::observability::metrics;

/// Ids are drawn from `0..VEHICLE_ID_RANGE`.
pub const VEHICLE_ID_RANGE: u32 = 100;

/// Why a single downstream call failed.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request failed with status code {0}")]
    Status(u16),
}

/// Which downstream endpoint a call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    RentalHistory,
    VehicleDetails,
}

impl Target {
    /// Metric label.
    pub fn label(self) -> &'static str {
        match self {
            Target::RentalHistory => "rental",
            Target::VehicleDetails => "vehicles",
        }
    }

    fn path(self, vehicle_id: u32) -> String {
        match self {
            Target::RentalHistory => format!("/history/{}", vehicle_id),
            Target::VehicleDetails => format!("/vehicles/{}", vehicle_id),
        }
    }
}

/// Result of one downstream call within a tick.
#[derive(Debug)]
pub struct CallOutcome {
    pub target: Target,
    pub vehicle_id: u32,
    pub result: Result<(), PollError>,
}

/// Both outcomes of a tick.
#[derive(Debug)]
pub struct TickReport {
    pub rental: CallOutcome,
    pub vehicles: CallOutcome,
}

/// HTTP client bound to the two downstream services.
#[derive(Debug, Clone)]
pub struct Poller {
    client: reqwest::Client,
    rental_url: String,
    vehicles_url: String,
}

impl Poller {
    pub fn new(config: &DownstreamConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            rental_url: config.rental_url.trim_end_matches('/').to_string(),
            vehicles_url: config.vehicles_url.trim_end_matches('/').to_string(),
        })
    }

    /// Run one tick: both calls, each with its own random id.
    pub async fn tick(&self) -> TickReport {
        tracing::info!("Scheduler: Making requests to downstream services...");

        let rental_id = fastrand::u32(0..VEHICLE_ID_RANGE);
        let vehicle_id = fastrand::u32(0..VEHICLE_ID_RANGE);

        let (rental, vehicles) = tokio::join!(
            self.call(Target::RentalHistory, rental_id),
            self.call(Target::VehicleDetails, vehicle_id),
        );

        TickReport { rental, vehicles }
    }

    /// Perform a single call and log its outcome.
    pub async fn call(&self, target: Target, vehicle_id: u32) -> CallOutcome {
        let result = self.fetch(target, vehicle_id).await;

        match (&result, target) {
            (Ok(()), Target::RentalHistory) => {
                tracing::info!(vehicle_id, "Scheduler: Successfully called Rental Service history for {}", vehicle_id);
            }
            (Ok(()), Target::VehicleDetails) => {
                tracing::info!(vehicle_id, "Scheduler: Successfully called Vehicles Service details for {}", vehicle_id);
            }
            (Err(e), Target::RentalHistory) => {
                tracing::error!(vehicle_id, error = %e, "Scheduler: Error calling Rental Service: {}", e);
            }
            (Err(e), Target::VehicleDetails) => {
                tracing::error!(vehicle_id, error = %e, "Scheduler: Error calling Vehicles Service: {}", e);
            }
        }
        metrics::record_scheduler_call(target.label(), result.is_ok());

        CallOutcome {
            target,
            vehicle_id,
            result,
        }
    }

    async fn fetch(&self, target: Target, vehicle_id: u32) -> Result<(), PollError> {
        let base = match target {
            Target::RentalHistory => &self.rental_url,
            Target::VehicleDetails => &self.vehicles_url,
        };
        let url = format!("{}{}", base, target.path(vehicle_id));

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PollError::Status(status.as_u16()));
        }
        Ok(())
    }
}
