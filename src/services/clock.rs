//! Clock service: simulated time, transport status, telemetry.
//!
//! DESIGN
//! ======
//! State machine:
//!
//! ```text
//! Stopped --play--> Running --pause--> Paused --play--> Running
//! Running --advance(reaches horizon)--> Completed
//! {Running, Paused, Completed} --stop/reset--> Stopped
//! ```
//!
//! `advance` is the only operation that moves time forward and the only
//! way into Completed. Stopped and Completed never change on their own;
//! a transport command is required.
//!
//! The periodic driver lives in `ticker`; this type is a plain state
//! machine so every transition is testable without a runtime.
//!
//! ERROR HANDLING
//! ==============
//! Invalid transitions and out-of-range values are rejected with a typed
//! error and leave the state untouched. A tick arriving after the clock
//! left Running is a stale tick: `advance` returns `Ok(None)` and logs at debug.

use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::services::telemetry::TelemetryGenerator;
use crate::state::{SimulationState, SimulationStatus, TelemetrySample};

/// Relative distance to the horizon treated as having reached it.
/// Absorbs accumulated float error from many small advance steps.
const HORIZON_SNAP_EPSILON: f64 = 1e-9;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ClockError {
    #[error("speed {value} outside [{min}, {max}]")]
    InvalidSpeedValue { value: f64, min: f64, max: f64 },
    #[error("speed cannot change while the simulation is running")]
    SpeedLocked,
    #[error("horizon must be a positive finite number, got {0}")]
    InvalidHorizon(f64),
    #[error("invalid speed bounds [{min}, {max}] with default {default}")]
    InvalidSpeedBounds { min: f64, max: f64, default: f64 },
    #[error("cannot {action} while {status}")]
    InvalidTransition { action: &'static str, status: &'static str },
    #[error("seek target {target} outside [0, {horizon})")]
    InvalidSeek { target: f64, horizon: f64 },
    #[error("advance delta must be a non-negative finite number, got {0}")]
    InvalidDelta(f64),
}

impl crate::frame::ErrorCode for ClockError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidSpeedValue { .. } => "E_CLOCK_INVALID_SPEED",
            Self::SpeedLocked => "E_CLOCK_SPEED_LOCKED",
            Self::InvalidHorizon(_) => "E_CLOCK_INVALID_HORIZON",
            Self::InvalidSpeedBounds { .. } => "E_CLOCK_INVALID_BOUNDS",
            Self::InvalidTransition { .. } => "E_CLOCK_INVALID_TRANSITION",
            Self::InvalidSeek { .. } => "E_CLOCK_INVALID_SEEK",
            Self::InvalidDelta(_) => "E_CLOCK_INVALID_DELTA",
        }
    }
}

/// Status change caused by one clock operation. `from == to` means the
/// operation changed time or speed but not status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTransition {
    pub from: SimulationStatus,
    pub to: SimulationStatus,
}

impl ClockTransition {
    #[must_use]
    pub fn changed(self) -> bool {
        self.from != self.to
    }
}

/// Result of one effective advance step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Advance {
    pub sample: TelemetrySample,
    /// True only on the step that reached the horizon.
    pub completed: bool,
}

// =============================================================================
// CLOCK
// =============================================================================

pub struct SimulationClock {
    state: SimulationState,
    config: SimulationConfig,
    telemetry: TelemetryGenerator,
    last_sample: Option<TelemetrySample>,
}

impl std::fmt::Debug for SimulationClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationClock").field("state", &self.state).finish_non_exhaustive()
    }
}

impl SimulationClock {
    /// Build a clock in the default state (Stopped at t=0).
    ///
    /// # Errors
    ///
    /// [`ClockError::InvalidHorizon`] for a non-positive or non-finite
    /// horizon and [`ClockError::InvalidSpeedBounds`] when the bounds are
    /// empty or exclude the default speed.
    pub fn new(config: SimulationConfig) -> Result<Self, ClockError> {
        if !config.horizon.is_finite() || config.horizon <= 0.0 {
            return Err(ClockError::InvalidHorizon(config.horizon));
        }
        let bounds_ok = config.min_speed.is_finite()
            && config.max_speed.is_finite()
            && config.min_speed > 0.0
            && config.min_speed <= config.max_speed
            && (config.min_speed..=config.max_speed).contains(&config.default_speed);
        if !bounds_ok {
            return Err(ClockError::InvalidSpeedBounds {
                min: config.min_speed,
                max: config.max_speed,
                default: config.default_speed,
            });
        }

        Ok(Self {
            state: SimulationState::new(config.horizon, config.default_speed),
            config,
            telemetry: TelemetryGenerator::new(config.telemetry_seed),
            last_sample: None,
        })
    }

    #[must_use]
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    #[must_use]
    pub fn status(&self) -> SimulationStatus {
        self.state.status
    }

    #[must_use]
    pub fn current_time(&self) -> f64 {
        self.state.current_time
    }

    #[must_use]
    pub fn horizon(&self) -> f64 {
        self.state.horizon
    }

    #[must_use]
    pub fn speed(&self) -> f64 {
        self.state.speed
    }

    #[must_use]
    pub fn speed_bounds(&self) -> (f64, f64) {
        (self.config.min_speed, self.config.max_speed)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.status == SimulationStatus::Running
    }

    /// Most recent telemetry sample of the current run.
    #[must_use]
    pub fn last_sample(&self) -> Option<&TelemetrySample> {
        self.last_sample.as_ref()
    }

    // =========================================================================
    // TRANSPORT
    // =========================================================================

    /// Start or resume. Valid from Stopped and Paused.
    ///
    /// # Errors
    ///
    /// [`ClockError::InvalidTransition`] from Running or Completed.
    pub fn play(&mut self) -> Result<ClockTransition, ClockError> {
        match self.state.status {
            SimulationStatus::Stopped | SimulationStatus::Paused => Ok(self.set_status(SimulationStatus::Running)),
            status => Err(self.reject("play", status)),
        }
    }

    /// Pause. Valid only from Running.
    ///
    /// # Errors
    ///
    /// [`ClockError::InvalidTransition`] from any other status.
    pub fn pause(&mut self) -> Result<ClockTransition, ClockError> {
        match self.state.status {
            SimulationStatus::Running => Ok(self.set_status(SimulationStatus::Paused)),
            status => Err(self.reject("pause", status)),
        }
    }

    /// Stop from any status: Stopped at t=0 with the telemetry baseline cleared.
    /// Speed is kept.
    pub fn stop(&mut self) -> ClockTransition {
        self.rewind();
        self.set_status(SimulationStatus::Stopped)
    }

    /// Like `stop`, and also restores the default speed.
    pub fn reset(&mut self) -> ClockTransition {
        self.rewind();
        self.state.speed = self.config.default_speed;
        self.set_status(SimulationStatus::Stopped)
    }

    /// Advance simulated time by `delta` wall-clock seconds scaled by speed.
    ///
    /// Returns `Ok(None)` (no effect) unless Running.
    ///
    /// # Errors
    ///
    /// [`ClockError::InvalidDelta`] for a negative or non-finite delta; the
    /// state is untouched.
    pub fn advance(&mut self, delta: f64) -> Result<Option<Advance>, ClockError> {
        if !delta.is_finite() || delta < 0.0 {
            warn!(delta, "clock: advance with invalid delta rejected");
            return Err(ClockError::InvalidDelta(delta));
        }
        if self.state.status != SimulationStatus::Running {
            debug!(status = self.state.status.as_str(), "clock: advance ignored outside running");
            return Ok(None);
        }

        let previous = self.state.current_time;
        let horizon = self.state.horizon;
        let mut next = (previous + delta * self.state.speed).min(horizon);
        if horizon - next <= HORIZON_SNAP_EPSILON * horizon.max(1.0) {
            next = horizon;
        }
        self.state.current_time = next;

        let sample = self.telemetry.sample(next, self.state.progress());
        self.last_sample = Some(sample);

        // EDGE: only the step that crosses into the horizon completes.
        let completed = next >= horizon && previous < horizon;
        if completed {
            self.set_status(SimulationStatus::Completed);
        }
        Ok(Some(Advance { sample, completed }))
    }

    /// Change playback speed. Returns the previous speed.
    ///
    /// # Errors
    ///
    /// [`ClockError::InvalidSpeedValue`] outside the configured bounds and
    /// [`ClockError::SpeedLocked`] while Running. Speed is unchanged on error.
    pub fn set_speed(&mut self, multiplier: f64) -> Result<f64, ClockError> {
        let (min, max) = self.speed_bounds();
        if !multiplier.is_finite() || !(min..=max).contains(&multiplier) {
            warn!(multiplier, min, max, "clock: speed rejected");
            return Err(ClockError::InvalidSpeedValue { value: multiplier, min, max });
        }
        if self.is_running() {
            warn!(multiplier, "clock: speed change rejected while running");
            return Err(ClockError::SpeedLocked);
        }
        let previous = std::mem::replace(&mut self.state.speed, multiplier);
        info!(previous, speed = multiplier, "clock: speed changed");
        Ok(previous)
    }

    /// Move simulated time to `target` without changing status.
    ///
    /// # Errors
    ///
    /// [`ClockError::InvalidSeek`] for targets outside `[0, horizon)` and
    /// [`ClockError::InvalidTransition`] while Completed.
    pub fn seek(&mut self, target: f64) -> Result<(), ClockError> {
        if self.state.status == SimulationStatus::Completed {
            return Err(self.reject("seek", SimulationStatus::Completed));
        }
        if !target.is_finite() || target < 0.0 || target >= self.state.horizon {
            warn!(target, horizon = self.state.horizon, "clock: seek rejected");
            return Err(ClockError::InvalidSeek { target, horizon: self.state.horizon });
        }
        self.state.current_time = target;
        info!(target, "clock: seek");
        Ok(())
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn rewind(&mut self) {
        self.state.current_time = 0.0;
        self.telemetry.reset();
        self.last_sample = None;
    }

    fn set_status(&mut self, to: SimulationStatus) -> ClockTransition {
        let from = std::mem::replace(&mut self.state.status, to);
        if from != to {
            info!(from = from.as_str(), to = to.as_str(), time = self.state.current_time, "clock: status changed");
        }
        ClockTransition { from, to }
    }

    fn reject(&self, action: &'static str, status: SimulationStatus) -> ClockError {
        warn!(action, status = status.as_str(), "clock: transition rejected");
        ClockError::InvalidTransition { action, status: status.as_str() }
    }
}

#[cfg(test)]
#[path = "clock_test.rs"]
mod tests;
