//! Agent-based simulator for renewable-energy adoption under climate feedback.

pub mod agents;
pub mod config;
pub mod error;
pub mod io;
/// Parameter distributions and per-run Monte Carlo draws.
pub mod params;
/// Simulation engine, climate coupling, and ensemble modules.
pub mod sim;
