//! Type conversion utilities for FFI boundary
//!
//! Converts between Rust types and PyO3-compatible types.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::metrics::report::ReportSummary;
use crate::models::patient::Identity;
use crate::orchestrator::{ClinicConfig, SimulationError};

/// Map a simulation error to the matching Python exception
///
/// Configuration problems are the caller's fault (`ValueError`); anything
/// else is an engine failure (`RuntimeError`).
pub fn to_py_err(err: SimulationError) -> PyErr {
    match err {
        SimulationError::Configuration(e) => PyValueError::new_err(e.to_string()),
        other => PyRuntimeError::new_err(other.to_string()),
    }
}

/// Parse a JSON config; missing fields take their defaults
pub fn parse_config(config_json: &str) -> PyResult<ClinicConfig> {
    serde_json::from_str(config_json)
        .map_err(|e| PyValueError::new_err(format!("Invalid config JSON: {}", e)))
}

/// Parse a JSON list of `{"id": ..., "name": ...}` records
pub fn parse_roster(roster_json: &str) -> PyResult<Vec<Identity>> {
    serde_json::from_str(roster_json)
        .map_err(|e| PyValueError::new_err(format!("Invalid roster JSON: {}", e)))
}

/// Convert the global aggregates to a Python dict
pub fn summary_to_py(py: Python, summary: &ReportSummary) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new(py);

    dict.set_item("doctor_count", summary.doctor_count)?;
    dict.set_item("total_arrivals", summary.total_arrivals)?;
    dict.set_item("served", summary.served)?;
    dict.set_item("abandoned", summary.abandoned)?;
    dict.set_item("still_waiting", summary.still_waiting)?;
    dict.set_item("mean_wait", summary.mean_wait)?;
    dict.set_item("mean_time_in_system", summary.mean_time_in_system)?;
    dict.set_item("average_queue_length", summary.average_queue_length)?;
    dict.set_item("max_queue_length", summary.max_queue_length)?;

    Ok(dict.into())
}
