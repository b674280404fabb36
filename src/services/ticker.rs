//! Ticker: the periodic driver behind `SimulationClock::advance`.
//!
//! DESIGN
//! ======
//! A background task wakes at a fixed wall-clock period and posts a [`Tick`]
//! into the session channel. It never touches simulation state itself; the
//! session applies the tick on its own task.
//!
//! Each ticker carries a generation number. The session arms a new ticker
//! (with a fresh generation) when the clock enters Running and drops it when
//! the clock leaves Running. Dropping aborts the task, and any tick already
//! queued with an old generation is discarded by the receiver.
//!
//! Missed periods are skipped rather than bursted, and a full channel drops
//! the tick: a late tick is worth less than a fresh one.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// One wake-up of the periodic driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub generation: u64,
    /// Wall-clock seconds represented by this tick.
    pub delta: f64,
}

/// Handle to a running tick task. Dropping it cancels the task.
#[derive(Debug)]
pub struct Ticker {
    generation: u64,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawn the tick task. The first tick fires one full `period` after spawn.
    #[must_use]
    pub fn spawn(generation: u64, period: Duration, tx: mpsc::Sender<Tick>) -> Self {
        let delta = period.as_secs_f64();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick of a tokio interval completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;
                match tx.try_send(Tick { generation, delta }) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        debug!(generation, "ticker: channel full, tick dropped");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        debug!(generation, "ticker: receiver closed, stopping");
                        break;
                    }
                }
            }
        });
        debug!(generation, period_ms = period.as_millis(), "ticker: armed");
        Self { generation, handle }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
        debug!(generation = self.generation, "ticker: disarmed");
    }
}

#[cfg(test)]
#[path = "ticker_test.rs"]
mod tests;
