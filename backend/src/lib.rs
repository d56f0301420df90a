//! Inequity Inertia Simulator Core - Rust Engine
//!
//! Stochastic model of how two population groups come to be represented
//! inside a capacity-constrained power tier over repeated cycles.
//!
//! # Architecture
//!
//! - **rng**: Deterministic random number generation
//! - **models**: Domain types (Group, Population)
//! - **policy**: Selection policies (Weighted, Quota, Random)
//! - **orchestrator**: Cycle engine, run driver and snapshots
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (one seeded RNG per run)
//! 2. Capital stays within [-12, 12] after every cycle
//! 3. Admissions never exceed the openings computed for the cycle
//! 4. FFI boundary is minimal and safe

// Module declarations
pub mod models;
pub mod orchestrator;
pub mod policy;
pub mod rng;

// Re-exports for convenience
pub use models::{Group, Population, PopulationError, CAPITAL_MAX, CAPITAL_MIN};
pub use orchestrator::{
    run_report, run_simulation, CycleResult, Orchestrator, PolicyKind, PopulationSnapshot,
    RunReport, SimulationConfig, SimulationError,
};
pub use policy::{QuotaPolicy, RandomPolicy, SelectionPolicy, WeightedPolicy};
pub use rng::RngManager;

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn inertia_simulator_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::orchestrator::PySimulation>()?;
    m.add_function(wrap_pyfunction!(ffi::orchestrator::run_simulation, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::orchestrator::run_report, m)?)?;
    Ok(())
}
