//! Workbench configuration loaded from environment variables.
//!
//! DESIGN
//! ======
//! Every knob has a compiled default and an optional `WORKBENCH_*` override.
//! Unparseable values are logged and fall back to the default instead of
//! failing startup;
//! semantic validation (positive horizon, speed bounds) happens where the
//! value is consumed so an invalid clock can never be constructed.

use std::time::Duration;

use tracing::warn;

pub const DEFAULT_HORIZON_NS: f64 = 100.0;
pub const DEFAULT_MIN_SPEED: f64 = 0.1;
pub const DEFAULT_MAX_SPEED: f64 = 5.0;
pub const DEFAULT_SPEED: f64 = 1.0;
pub const DEFAULT_TELEMETRY_SEED: u64 = 0x5EED_CAFE;
pub const DEFAULT_TICK_MS: u64 = 100;
/// Viewports narrower than this switch to single-panel mode.
pub const DEFAULT_COMPACT_WIDTH: u32 = 1024;
pub const DEFAULT_SINK_CAPACITY: usize = 256;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("tick period must be at least 1ms")]
    ZeroTickPeriod,
    #[error("panel sink capacity must be positive")]
    ZeroSinkCapacity,
}

impl crate::frame::ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroTickPeriod => "E_CONFIG_TICK_PERIOD",
            Self::ZeroSinkCapacity => "E_CONFIG_SINK_CAPACITY",
        }
    }
}

/// Simulation clock parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    /// End point of simulated time, in ns.
    pub horizon: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    /// Speed applied at construction and restored by `reset`.
    pub default_speed: f64,
    /// Seed for the synthetic telemetry stream.
    pub telemetry_seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON_NS,
            min_speed: DEFAULT_MIN_SPEED,
            max_speed: DEFAULT_MAX_SPEED,
            default_speed: DEFAULT_SPEED,
            telemetry_seed: DEFAULT_TELEMETRY_SEED,
        }
    }
}

/// Top-level workbench configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkbenchConfig {
    pub simulation: SimulationConfig,
    /// Wall-clock period of the advance task while running.
    pub tick_period: Duration,
    pub compact_width: u32,
    /// Bounded capacity of each panel's frame sink.
    pub sink_capacity: usize,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            tick_period: Duration::from_millis(DEFAULT_TICK_MS),
            compact_width: DEFAULT_COMPACT_WIDTH,
            sink_capacity: DEFAULT_SINK_CAPACITY,
        }
    }
}

impl WorkbenchConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `WORKBENCH_HORIZON`: default 100 (ns)
    /// - `WORKBENCH_SPEED_MIN` / `WORKBENCH_SPEED_MAX`: default 0.1 / 5.0
    /// - `WORKBENCH_DEFAULT_SPEED`: default 1.0
    /// - `WORKBENCH_TELEMETRY_SEED`: default fixed seed
    /// - `WORKBENCH_TICK_MS`: default 100
    /// - `WORKBENCH_COMPACT_WIDTH`: default 1024 (px)
    /// - `WORKBENCH_SINK_CAPACITY`: default 256
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            simulation: SimulationConfig {
                horizon: env_parse("WORKBENCH_HORIZON", DEFAULT_HORIZON_NS),
                min_speed: env_parse("WORKBENCH_SPEED_MIN", DEFAULT_MIN_SPEED),
                max_speed: env_parse("WORKBENCH_SPEED_MAX", DEFAULT_MAX_SPEED),
                default_speed: env_parse("WORKBENCH_DEFAULT_SPEED", DEFAULT_SPEED),
                telemetry_seed: env_parse("WORKBENCH_TELEMETRY_SEED", DEFAULT_TELEMETRY_SEED),
            },
            tick_period: Duration::from_millis(env_parse("WORKBENCH_TICK_MS", DEFAULT_TICK_MS)),
            compact_width: env_parse("WORKBENCH_COMPACT_WIDTH", DEFAULT_COMPACT_WIDTH),
            sink_capacity: env_parse("WORKBENCH_SINK_CAPACITY", DEFAULT_SINK_CAPACITY),
        }
    }

    /// Check the runtime knobs that are not owned by the clock.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a zero tick period or sink capacity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_period.is_zero() {
            return Err(ConfigError::ZeroTickPeriod);
        }
        if self.sink_capacity == 0 {
            return Err(ConfigError::ZeroSinkCapacity);
        }
        Ok(())
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, value = %raw, "config: unparsable override ignored");
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
