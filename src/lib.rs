//! Panel orchestration and cross-panel sync engine for a molecular dynamics
//! analysis workbench.
//!
//! ARCHITECTURE
//! ============
//! - [`workbench::Workbench`] composes the services and is the single writer
//!   of shared state.
//! - [`services`] hold one slice of state each (panel layout, simulated
//!   time, selection, active dataset).
//! - [`session`] runs a workbench on its own task and drives the clock.
//! - [`frame::Frame`] is the notification record fanned out to panels.

pub mod config;
pub mod frame;
pub mod services;
pub mod session;
pub mod state;
pub mod workbench;
