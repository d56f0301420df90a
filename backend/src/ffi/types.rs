//! Type conversion utilities for FFI boundary
//!
//! Converts between Rust types and PyO3-compatible types (PyDict, PyList, etc.)

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::orchestrator::{CycleResult, PolicyKind, RunReport, SimulationConfig, SimulationError};

// ========================================================================
// PyDict Extraction Helpers
// ========================================================================

/// Look up the first of `keys` present in `dict`
///
/// Parameters are accepted under their short model names (`N`, `rA`, ...)
/// and under the Rust field names.
fn lookup<'py>(dict: &Bound<'py, PyDict>, keys: &[&str]) -> PyResult<Option<Bound<'py, PyAny>>> {
    for key in keys {
        if let Some(value) = dict.get_item(*key)? {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// Extract a float field with a default value if missing
fn extract_f64(dict: &Bound<'_, PyDict>, keys: &[&str], default: f64) -> PyResult<f64> {
    match lookup(dict, keys)? {
        Some(value) => value.extract(),
        None => Ok(default),
    }
}

/// Extract a non-negative integer field with a default value if missing
///
/// Negative values raise ValueError naming the parameter instead of the
/// generic OverflowError an unsigned extraction would give.
fn extract_count(dict: &Bound<'_, PyDict>, keys: &[&str], default: u64) -> PyResult<u64> {
    match lookup(dict, keys)? {
        Some(value) => {
            let raw: i64 = value.extract()?;
            u64::try_from(raw).map_err(|_| {
                PyValueError::new_err(format!("Invalid parameter {} = {}: must be >= 0", keys[0], raw))
            })
        }
        None => Ok(default),
    }
}

fn to_usize(value: u64, name: &str) -> PyResult<usize> {
    usize::try_from(value)
        .map_err(|_| PyValueError::new_err(format!("Invalid parameter {} = {}: too large", name, value)))
}

/// Convert a Rust simulation error into a Python exception
pub fn simulation_error_to_py(err: SimulationError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

// ========================================================================
// Configuration Parser
// ========================================================================

/// Convert Python dict to SimulationConfig
///
/// Missing keys take the `SimulationConfig::default()` values.
///
/// # Errors
///
/// Returns PyErr if:
/// - Type conversions fail
/// - Integers are negative
/// - The policy name is unknown
/// - Values fail `SimulationConfig::validate`
pub fn parse_simulation_config(py_config: &Bound<'_, PyDict>) -> PyResult<SimulationConfig> {
    let defaults = SimulationConfig::default();

    let population_size = extract_count(py_config, &["N", "population_size"], defaults.population_size as u64)?;
    let capacity_p = extract_count(py_config, &["capacity_P", "capacity_p"], defaults.capacity_p as u64)?;
    let num_cycles = extract_count(py_config, &["T", "num_cycles"], defaults.num_cycles as u64)?;
    let seed = extract_count(py_config, &["seed"], defaults.seed)?;

    let policy = match lookup(py_config, &["policy"])? {
        Some(value) => {
            let name: String = value.extract()?;
            name.parse::<PolicyKind>().map_err(simulation_error_to_py)?
        }
        None => defaults.policy,
    };

    let record_trajectory = match lookup(py_config, &["record_trajectory"])? {
        Some(value) => value.extract()?,
        None => defaults.record_trajectory,
    };

    let config = SimulationConfig {
        population_size: to_usize(population_size, "N")?,
        pop_share_b: extract_f64(py_config, &["pop_share_B", "pop_share_b"], defaults.pop_share_b)?,
        beta: extract_f64(py_config, &["beta"], defaults.beta)?,
        tau: extract_f64(py_config, &["tau"], defaults.tau)?,
        alpha: extract_f64(py_config, &["alpha"], defaults.alpha)?,
        gamma: extract_f64(py_config, &["gamma"], defaults.gamma)?,
        capacity_p: to_usize(capacity_p, "capacity_P")?,
        turnover_rate: extract_f64(py_config, &["turnover_rate"], defaults.turnover_rate)?,
        retention_a: extract_f64(py_config, &["rA", "retention_a"], defaults.retention_a)?,
        retention_b: extract_f64(py_config, &["rB", "retention_b"], defaults.retention_b)?,
        num_cycles: to_usize(num_cycles, "T")?,
        policy,
        quota_min_b_share: extract_f64(
            py_config,
            &["quota_min_B_share", "quota_min_b_share"],
            defaults.quota_min_b_share,
        )?,
        k: extract_f64(py_config, &["k"], defaults.k)?,
        noise_sd: extract_f64(py_config, &["noise_sd"], defaults.noise_sd)?,
        seed,
        record_trajectory,
    };

    config.validate().map_err(simulation_error_to_py)?;
    Ok(config)
}

// ========================================================================
// Result Converters
// ========================================================================

/// Convert CycleResult to Python dict
pub fn cycle_result_to_py(py: Python<'_>, result: &CycleResult) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("cycle", result.cycle)?;
    dict.set_item("retention_exits", result.retention_exits)?;
    dict.set_item("turnover_exits", result.turnover_exits)?;
    dict.set_item("openings", result.openings)?;
    dict.set_item("candidates", result.candidates)?;
    dict.set_item("admitted", result.admitted)?;
    dict.set_item("admitted_b", result.admitted_b)?;
    dict.set_item("tier_size", result.tier_size)?;
    dict.set_item("tier_size_b", result.tier_size_b)?;
    dict.set_item("representation_b", result.representation_b)?;
    Ok(dict.unbind())
}

/// Convert RunReport to Python dict
pub fn run_report_to_py(py: Python<'_>, report: &RunReport) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("representation_b", report.representation_b)?;
    dict.set_item("representation_a", report.representation_a)?;
    dict.set_item("representation_gap", report.representation_gap)?;
    dict.set_item("pop_share_b", report.pop_share_b)?;
    dict.set_item("cycles", report.cycles)?;
    dict.set_item("final_tier_size", report.final_tier_size)?;
    dict.set_item("policy", report.policy.as_str())?;
    dict.set_item("config_hash", &report.config_hash)?;

    match &report.trajectory {
        Some(trajectory) => {
            let list = PyList::empty_bound(py);
            for result in trajectory {
                list.append(cycle_result_to_py(py, result)?)?;
            }
            dict.set_item("trajectory", list)?;
        }
        None => dict.set_item("trajectory", py.None())?,
    }

    Ok(dict.unbind())
}
