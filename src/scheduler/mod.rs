//! Cross-service polling scheduler (platform service).
//!
//! # Data Flow
//! ```text
//! startup
//!     → startup_interval() (configured, or jitter in [0, 2000) ms)
//!     → Scheduler::start → task.rs spawns the timer
//!
//! every tick (own task, may overlap the previous one)
//!     → poller.rs: GET rental /history/{id}  ┐ concurrently,
//!     → poller.rs: GET vehicles /vehicles/{id} ┘ failures isolated
//!
//! POST /config/scheduler {interval}
//!     → handlers.rs validation (400 on missing/non-numeric/non-positive)
//!     → Scheduler::update_interval: cancel old timer, install new one
//! ```

pub mod handlers;
pub mod poller;
pub mod task;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::{routing::get, Router};
use tracing::Instrument;

use crate::config::SchedulerConfig;
use crate::observability::metrics;

pub use poller::{CallOutcome, PollError, Poller, Target, TickReport};
pub use task::ScheduledTask;

/// Upper bound (exclusive) of the randomized start-up interval.
pub const STARTUP_JITTER_MS: u64 = 2000;

/// Interval used when the scheduler starts.
pub fn startup_interval(config: &SchedulerConfig) -> Duration {
    match config.interval_ms {
        Some(ms) => Duration::from_millis(ms),
        None => Duration::from_millis(fastrand::u64(0..STARTUP_JITTER_MS)),
    }
}

/// Shared handle to the polling task.
#[derive(Clone)]
pub struct Scheduler {
    task: Arc<Mutex<ScheduledTask>>,
}

impl Scheduler {
    /// Build an idle scheduler whose ticks run `poller`.
    pub fn new(poller: Poller, service: impl Into<Arc<str>>) -> Self {
        let poller = Arc::new(poller);
        let service: Arc<str> = service.into();

        let task = ScheduledTask::new(move || {
            let poller = poller.clone();
            let span = tracing::info_span!("scheduler_tick", service = %service);
            async move {
                poller.tick().await;
            }
            .instrument(span)
        });

        Self {
            task: Arc::new(Mutex::new(task)),
        }
    }

    /// Install the initial timer.
    pub fn start(&self, interval: Duration) -> Duration {
        let interval = self.lock().reschedule(interval);
        metrics::set_scheduler_interval(interval);
        tracing::info!(
            interval_ms = interval.as_millis() as u64,
            "Scheduler started with interval {}ms",
            interval.as_millis()
        );
        interval
    }

    /// Replace the running timer with one at `interval`.
    ///
    /// Cancel and install happen under one lock, so two timers never coexist.
    pub fn update_interval(&self, interval: Duration) -> Duration {
        let interval = self.lock().reschedule(interval);
        metrics::set_scheduler_interval(interval);
        tracing::info!(
            interval_ms = interval.as_millis() as u64,
            "Scheduler updated to interval {}ms",
            interval.as_millis()
        );
        interval
    }

    /// Interval of the live timer, if running.
    pub fn interval(&self) -> Option<Duration> {
        self.lock().interval()
    }

    /// Cancel the timer. Returns whether one was running.
    pub fn stop(&self) -> bool {
        let stopped = self.lock().cancel();
        if stopped {
            tracing::info!("Scheduler stopped");
        }
        stopped
    }

    fn lock(&self) -> MutexGuard<'_, ScheduledTask> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Admin routes for the scheduler.
pub fn router(scheduler: Scheduler) -> Router {
    Router::new()
        .route(
            "/config/scheduler",
            get(handlers::get_scheduler).post(handlers::update_scheduler),
        )
        .with_state(scheduler)
}
