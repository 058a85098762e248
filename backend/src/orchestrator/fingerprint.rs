//! Run fingerprinting and report validation
//!
//! A run is identified by the hash of its configuration; a finished report
//! by the hash of its JSON form. `validate_report` re-checks the
//! conservation invariants on the final report before it is handed out.
//!
//! # Critical Invariants
//!
//! - **Determinism**: same seed + config + roster produces the same digest
//! - **Conservation**: every arrival ends served, abandoned or still waiting
//! - **Critical patients never abandon**

use crate::metrics::report::Report;
use crate::models::patient::{PatientStatus, TriagePriority};
use crate::orchestrator::config::ClinicConfig;
use crate::orchestrator::engine::SimulationError;
use serde::Serialize;
use sha2::{Digest, Sha256};

// ============================================================================
// Hashing
// ============================================================================

/// Lowercase hex SHA-256 of `bytes`
pub fn digest_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Canonical JSON (recursively sorted keys) of any serializable value
fn canonical_json<T: Serialize>(value: &T) -> Result<String, SimulationError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(value).map_err(|e| {
        SimulationError::Serialization(format!("Config serialization failed: {}", e))
    })?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    serde_json::to_string(&canonicalize(value)).map_err(|e| {
        SimulationError::Serialization(format!("Config serialization failed: {}", e))
    })
}

/// Deterministic SHA-256 of a clinic configuration
///
/// Field order in the source JSON does not matter.
pub fn compute_config_hash(config: &ClinicConfig) -> Result<String, SimulationError> {
    Ok(digest_hex(canonical_json(config)?.as_bytes()))
}

// ============================================================================
// Validation
// ============================================================================

fn violation(msg: String) -> SimulationError {
    SimulationError::StateValidation(msg)
}

/// Check the end-of-run invariants of a report
///
/// - Counters agree with the patient registry
/// - Nobody is still in service once the event list is empty
/// - No Critical patient abandoned
/// - One recorded wait per dispatched or abandoned patient
/// - The last queue sample matches the patients still waiting
pub fn validate_report(report: &Report) -> Result<(), SimulationError> {
    let s = &report.summary;

    if s.total_arrivals != report.patients.len() {
        return Err(violation(format!(
            "{} arrivals counted but {} patients registered",
            s.total_arrivals,
            report.patients.len()
        )));
    }

    let count = |status: PatientStatus| {
        report
            .patients
            .values()
            .filter(|p| p.status == status)
            .count()
    };

    let in_service = count(PatientStatus::InService);
    if in_service != 0 {
        return Err(violation(format!(
            "{} patients still in service after the last event",
            in_service
        )));
    }

    if count(PatientStatus::Served) != s.served
        || count(PatientStatus::Abandoned) != s.abandoned
        || count(PatientStatus::Waiting) != s.still_waiting
    {
        return Err(violation(format!(
            "Counters disagree with registry: served {} abandoned {} waiting {}",
            s.served, s.abandoned, s.still_waiting
        )));
    }

    if s.served + s.abandoned + s.still_waiting != s.total_arrivals {
        return Err(violation(format!(
            "Conservation violated: {} + {} + {} != {}",
            s.served, s.abandoned, s.still_waiting, s.total_arrivals
        )));
    }

    if let Some(p) = report
        .patients
        .values()
        .find(|p| p.priority == TriagePriority::Critical && p.status == PatientStatus::Abandoned)
    {
        return Err(violation(format!("Critical patient {} abandoned", p.id)));
    }

    let recorded_waits: usize = report.wait_times_by_priority.values().map(Vec::len).sum();
    let dispatched = report
        .patients
        .values()
        .filter(|p| p.service_start.is_some())
        .count();
    if recorded_waits != dispatched + s.abandoned {
        return Err(violation(format!(
            "{} waits recorded for {} dispatched and {} abandoned patients",
            recorded_waits, dispatched, s.abandoned
        )));
    }

    if let Some((_, last_len)) = report.queue_length_series.last() {
        if *last_len != s.still_waiting {
            return Err(violation(format!(
                "Final queue length {} but {} patients waiting",
                last_len, s.still_waiting
            )));
        }
    }

    Ok(())
}
