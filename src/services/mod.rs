//! Workbench services composed by the orchestrator.
//!
//! ARCHITECTURE
//! ============
//! Each service owns one slice of shared state and is mutated only by the
//! orchestrator: `panel` (layout), `clock` (simulated time), `selection`
//! (highlighted entities), `dataset` (active record and scoped caches).
//! `ticker` drives the clock, `telemetry` feeds it, and `command` turns
//! opaque records into typed actions.

pub mod clock;
pub mod command;
pub mod dataset;
pub mod panel;
pub mod selection;
pub mod telemetry;
pub mod ticker;
