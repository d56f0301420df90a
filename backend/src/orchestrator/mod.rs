//! Orchestrator - main simulation loop
//!
//! Implements the cycle loop (Cycle Engine) and the run driver.
//!
//! See `engine.rs` for full implementation.

pub mod checkpoint;
pub mod engine;

// Re-export main types for convenience
pub use engine::{
    compute_openings, run_report, run_simulation, CycleResult, Orchestrator, PolicyKind,
    RunReport, SimulationConfig, SimulationError, MIN_OPENING_FRACTION,
};

// Re-export checkpoint types
pub use checkpoint::{compute_config_hash, validate_snapshot, PopulationSnapshot};
