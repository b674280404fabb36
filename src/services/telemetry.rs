//! Synthetic telemetry for the simulation clock.
//!
//! The generator is seeded so a run is reproducible: `reset` reseeds the
//! RNG and restores the energy baseline, so two runs from a reset produce
//! identical samples for identical tick sequences.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::state::TelemetrySample;

/// Potential energy at the start of every run, in kJ/mol.
pub const BASELINE_ENERGY: f64 = -125_000.0;
const BASELINE_TEMPERATURE: f64 = 300.0;
const BASELINE_PRESSURE: f64 = 1.0;
const RMSD_BASE: f64 = 1.2;
const RMSD_AMPLITUDE: f64 = 0.8;
const RMSD_NOISE: f64 = 0.3;
const ENERGY_STEP: f64 = 1_000.0;

pub struct TelemetryGenerator {
    seed: u64,
    rng: StdRng,
    /// Random-walk accumulator; the only state carried between samples.
    energy: f64,
}

impl TelemetryGenerator {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { seed, rng: StdRng::seed_from_u64(seed), energy: BASELINE_ENERGY }
    }

    /// Clear the accumulated baseline.
    pub fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.energy = BASELINE_ENERGY;
    }

    /// Produce the sample for simulated time `time` with completion `progress`.
    pub fn sample(&mut self, time: f64, progress: f64) -> TelemetrySample {
        let rmsd = RMSD_BASE + (time * 0.1).sin() * RMSD_AMPLITUDE + self.rng.random::<f64>() * RMSD_NOISE;
        self.energy += (self.rng.random::<f64>() - 0.5) * ENERGY_STEP;
        let temperature = BASELINE_TEMPERATURE + (self.rng.random::<f64>() - 0.5) * 4.0;
        let pressure = BASELINE_PRESSURE + (self.rng.random::<f64>() - 0.5) * 0.04;

        TelemetrySample { timestamp: time, rmsd, potential_energy: self.energy, temperature, pressure, progress }
    }
}

#[cfg(test)]
#[path = "telemetry_test.rs"]
mod tests;
