//! Background poller
//!
//! A single spawned loop ticks on a fixed interval and runs
//! [`TaskListController::poll_once`]. Ticks never overlap: the loop awaits
//! each tick to completion, and a tick that runs long delays the next one
//! instead of bursting.

use crate::controller::{PollOutcome, TaskListController};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Lower bound so a misconfigured interval cannot spin
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Owns the poll loop; dropping it cancels the loop
#[derive(Debug)]
pub struct PollerHandle {
    handle: Option<JoinHandle<()>>,
    interval: Duration,
}

impl PollerHandle {
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop polling
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Poller stopped");
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawn the poll loop; the first tick fires one interval from now
pub fn spawn(controller: TaskListController, interval: Duration) -> PollerHandle {
    let interval = interval.max(MIN_POLL_INTERVAL);

    let handle = tokio::spawn(async move {
        let mut timer = interval_at(Instant::now() + interval, interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            timer.tick().await;

            match controller.poll_once().await {
                PollOutcome::Idle => trace!("Poll tick: nothing running"),
                outcome => debug!(?outcome, "Poll tick"),
            }
        }
    });

    debug!(interval_ms = interval.as_millis() as u64, "Poller started");
    PollerHandle {
        handle: Some(handle),
        interval,
    }
}
