//! PyO3 wrapper for the clinic orchestrator

use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::types::{parse_config, parse_roster, summary_to_py, to_py_err};
use crate::metrics::report::Report;
use crate::models::patient::Identity;
use crate::orchestrator::{ClinicConfig, Orchestrator};

/// Python handle on one clinic run
///
/// # Example (from Python)
///
/// ```python
/// from clinic_simulator_core_rs import ClinicSimulation
///
/// sim = ClinicSimulation('{"doctor_count": 4}', roster_json)
/// report_json = sim.run()
/// print(sim.summary()["served"])
/// print(sim.patient("p017"))
/// ```
#[pyclass(name = "ClinicSimulation")]
pub struct PyClinicSimulation {
    config: ClinicConfig,
    roster: Vec<Identity>,
    report: Option<Report>,
}

#[pymethods]
impl PyClinicSimulation {
    /// Validate inputs; raises ValueError on a bad config or roster
    #[new]
    fn new(config_json: &str, roster_json: &str) -> PyResult<Self> {
        let config = parse_config(config_json)?;
        let roster = parse_roster(roster_json)?;
        config
            .validate()
            .map_err(|e| to_py_err(e.into()))?;

        Ok(Self {
            config,
            roster,
            report: None,
        })
    }

    /// Run to completion and return the report as JSON
    ///
    /// Re-running with the same inputs yields the same report.
    fn run(&mut self) -> PyResult<String> {
        let mut orchestrator =
            Orchestrator::new(self.config.clone(), self.roster.clone()).map_err(to_py_err)?;
        let report = orchestrator.run().map_err(to_py_err)?;
        let json = report.to_json().map_err(to_py_err)?;
        self.report = Some(report);
        Ok(json)
    }

    /// Terminal record of one patient as JSON, `None` if unknown
    fn patient(&self, patient_id: &str) -> PyResult<Option<String>> {
        let report = self.finished()?;
        report
            .patient(patient_id)
            .map(|record| {
                serde_json::to_string(record)
                    .map_err(|e| PyRuntimeError::new_err(format!("Serialization failed: {}", e)))
            })
            .transpose()
    }

    /// Global aggregates of the last run
    fn summary(&self, py: Python) -> PyResult<Py<PyDict>> {
        summary_to_py(py, &self.finished()?.summary)
    }

    /// SHA-256 of the configuration
    fn config_hash(&self) -> PyResult<String> {
        crate::orchestrator::compute_config_hash(&self.config).map_err(to_py_err)
    }
}

impl PyClinicSimulation {
    fn finished(&self) -> PyResult<&Report> {
        self.report
            .as_ref()
            .ok_or_else(|| PyRuntimeError::new_err("Simulation has not been run yet"))
    }
}
