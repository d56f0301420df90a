//! PyO3 wrappers for the run driver and orchestrator
//!
//! Exposes the engine as a pure function (`run_simulation`) plus a
//! stepping class for callers that want to observe individual cycles.

use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::types::{cycle_result_to_py, parse_simulation_config, run_report_to_py, simulation_error_to_py};
use crate::orchestrator::Orchestrator as RustOrchestrator;

/// Run one simulation and return Group B's final tier share
///
/// # Example (from Python)
///
/// ```python
/// from inertia_simulator_core_rs import run_simulation
///
/// share = run_simulation(N=800, pop_share_B=0.3, beta=0.3, T=600, seed=0)
/// ```
#[pyfunction]
#[pyo3(signature = (**kwargs))]
pub fn run_simulation(kwargs: Option<&Bound<'_, PyDict>>) -> PyResult<f64> {
    let config = match kwargs {
        Some(dict) => parse_simulation_config(dict)?,
        None => Default::default(),
    };
    crate::orchestrator::run_simulation(config).map_err(simulation_error_to_py)
}

/// Run one simulation and return the full report as a dict
#[pyfunction]
pub fn run_report(py: Python<'_>, config: &Bound<'_, PyDict>) -> PyResult<Py<PyDict>> {
    let config = parse_simulation_config(config)?;
    let report = crate::orchestrator::run_report(config).map_err(simulation_error_to_py)?;
    run_report_to_py(py, &report)
}

/// Python wrapper for a stepping simulation
///
/// # Example (from Python)
///
/// ```python
/// from inertia_simulator_core_rs import Simulation
///
/// sim = Simulation({"N": 400, "capacity_P": 80, "T": 50, "policy": "quota"})
/// result = sim.tick()
/// print(f"Cycle {result['cycle']}: {result['admitted']} admitted")
/// ```
#[pyclass(name = "Simulation", unsendable)]
pub struct PySimulation {
    inner: RustOrchestrator,
}

#[pymethods]
impl PySimulation {
    /// Create a new simulation from configuration
    ///
    /// Raises ValueError if a value is out of its valid range.
    #[new]
    fn new(config: &Bound<'_, PyDict>) -> PyResult<Self> {
        let rust_config = parse_simulation_config(config)?;
        let inner = RustOrchestrator::new(rust_config).map_err(simulation_error_to_py)?;
        Ok(PySimulation { inner })
    }

    /// Execute one cycle and return its summary dict
    fn tick(&mut self, py: Python<'_>) -> PyResult<Py<PyDict>> {
        let result = self.inner.tick();
        cycle_result_to_py(py, &result)
    }

    /// Execute the remaining configured cycles and return the report dict
    fn run(&mut self, py: Python<'_>) -> PyResult<Py<PyDict>> {
        let report = self.inner.run();
        run_report_to_py(py, &report)
    }

    /// Cycles executed so far
    fn current_cycle(&self) -> usize {
        self.inner.current_cycle()
    }

    /// Group B share of the current tier
    fn representation_b(&self) -> f64 {
        self.inner.representation_b()
    }

    /// Current number of tier members
    fn tier_size(&self) -> usize {
        self.inner.population().tier_count()
    }
}
