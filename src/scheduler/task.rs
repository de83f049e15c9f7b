//! Single-slot repeating timer.
//!
//! # Invariants
//! - At most one live timer per `ScheduledTask`
//! - `reschedule` aborts the old timer before the new one is spawned
//! - The first tick after (re)scheduling fires one full interval later
//!
//! Ticks are spawned as independent tasks, so a slow tick never delays the
//! next one and overlapping ticks are possible.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Smallest period a timer accepts; a zero period would spin.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

type TickFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type TickFn = Arc<dyn Fn() -> TickFuture + Send + Sync>;

struct TimerHandle {
    interval: Duration,
    join: JoinHandle<()>,
}

/// Owned repeating task with explicit `cancel` and `reschedule`.
pub struct ScheduledTask {
    tick: TickFn,
    slot: Option<TimerHandle>,
}

impl ScheduledTask {
    /// Create an idle task that runs `tick` on every firing once scheduled.
    pub fn new<F, Fut>(tick: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let tick: TickFn = Arc::new(move || Box::pin(tick()) as TickFuture);
        Self { tick, slot: None }
    }

    /// Replace any running timer with one firing every `interval`.
    ///
    /// Returns the effective interval (at least [`MIN_INTERVAL`]).
    pub fn reschedule(&mut self, interval: Duration) -> Duration {
        self.cancel();

        let interval = interval.max(MIN_INTERVAL);
        let tick = self.tick.clone();
        let join = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tokio::spawn(tick());
            }
        });

        self.slot = Some(TimerHandle { interval, join });
        interval
    }

    /// Stop the timer. Ticks already running are left to finish.
    ///
    /// Returns whether a timer was active.
    pub fn cancel(&mut self) -> bool {
        match self.slot.take() {
            Some(handle) => {
                handle.join.abort();
                true
            }
            None => false,
        }
    }

    /// Interval of the live timer, if any.
    pub fn interval(&self) -> Option<Duration> {
        self.slot.as_ref().map(|h| h.interval)
    }

    pub fn is_active(&self) -> bool {
        self.slot.is_some()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("interval", &self.interval())
            .finish()
    }
}
