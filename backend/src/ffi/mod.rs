//! Python bindings (feature `pyo3`)
//!
//! The dashboard collaborator drives runs through `ClinicSimulation` and
//! consumes the JSON report; nothing here has simulation semantics.

pub mod orchestrator;
pub mod types;
