//! Final simulation report
//!
//! Everything the presentation layer needs: global summary, time series,
//! per-priority waits, the patient registry and per-doctor utilization.
//! Serializable to JSON so a run can be diffed and fingerprinted.

use crate::models::patient::{Patient, PatientStatus, TriagePriority};
use crate::orchestrator::config::ClinicConfig;
use crate::orchestrator::engine::SimulationError;
use crate::orchestrator::fingerprint::digest_hex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Queryable view of one patient at the end of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub priority: TriagePriority,
    pub status: PatientStatus,
    pub arrival_time: f64,
    pub service_start: Option<f64>,
    pub exit_time: Option<f64>,
    pub doctor_id: Option<String>,
}

impl From<&Patient> for PatientRecord {
    fn from(patient: &Patient) -> Self {
        PatientRecord {
            id: patient.id().to_string(),
            name: patient.name().to_string(),
            specialty: patient.specialty().to_string(),
            priority: patient.priority(),
            status: patient.status(),
            arrival_time: patient.arrival_time(),
            service_start: patient.service_start(),
            exit_time: patient.exit_time(),
            doctor_id: patient.doctor_id().map(|s| s.to_string()),
        }
    }
}

impl PatientRecord {
    /// Minutes between arrival and service start or abandonment
    pub fn wait_time(&self) -> Option<f64> {
        match self.status {
            PatientStatus::Abandoned => self.exit_time.map(|t| t - self.arrival_time),
            _ => self.service_start.map(|t| t - self.arrival_time),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorSummary {
    pub id: String,
    pub specialty: String,
    pub busy_minutes: f64,
    /// Busy minutes over the horizon, in [0, 1]
    pub utilization: f64,
}

/// A patient joining the waiting queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntryRecord {
    pub time: f64,
    pub patient_id: String,
    pub name: String,
    pub specialty: String,
    pub priority: TriagePriority,
}

/// Queue contents, in queue order, right after a change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub time: f64,
    pub patient_ids: Vec<String>,
}

/// Global aggregates of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub doctor_count: usize,
    pub total_arrivals: usize,
    pub served: usize,
    pub abandoned: usize,
    /// Patients left in the queue when the event list emptied
    pub still_waiting: usize,
    /// Mean wait over dispatched patients only
    pub mean_wait: f64,
    /// Mean arrival-to-departure time over served patients
    pub mean_time_in_system: f64,
    /// Time-weighted over the horizon
    pub average_queue_length: f64,
    pub max_queue_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub config: ClinicConfig,
    pub config_hash: String,
    pub summary: ReportSummary,
    pub queue_length_series: Vec<(f64, usize)>,
    pub occupancy_series: Vec<(f64, usize)>,
    pub abandonment_series: Vec<(f64, usize)>,
    pub wait_times_by_priority: BTreeMap<TriagePriority, Vec<f64>>,
    pub patients: BTreeMap<String, PatientRecord>,
    pub doctors: Vec<DoctorSummary>,
    pub queue_entries: Vec<QueueEntryRecord>,
    pub queue_snapshots: Vec<QueueSnapshot>,
}

impl Report {
    /// Look up a patient by id; `None` when no such patient arrived
    pub fn patient(&self, id: &str) -> Option<&PatientRecord> {
        self.patients.get(id)
    }

    pub fn doctor(&self, id: &str) -> Option<&DoctorSummary> {
        self.doctors.iter().find(|d| d.id == id)
    }

    /// Mean wait per priority, zero for a class with no samples
    pub fn average_wait_by_priority(&self) -> BTreeMap<TriagePriority, f64> {
        TriagePriority::ALL
            .iter()
            .map(|p| {
                let avg = match self.wait_times_by_priority.get(p) {
                    Some(waits) if !waits.is_empty() => {
                        waits.iter().sum::<f64>() / waits.len() as f64
                    }
                    _ => 0.0,
                };
                (*p, avg)
            })
            .collect()
    }

    pub fn to_json(&self) -> Result<String, SimulationError> {
        serde_json::to_string(self).map_err(|e| {
            SimulationError::Serialization(format!("Report serialization failed: {}", e))
        })
    }

    pub fn to_json_pretty(&self) -> Result<String, SimulationError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            SimulationError::Serialization(format!("Report serialization failed: {}", e))
        })
    }

    /// SHA-256 of the compact JSON form
    ///
    /// Two runs with the same seed, config and roster produce the same digest.
    pub fn digest(&self) -> Result<String, SimulationError> {
        Ok(digest_hex(self.to_json()?.as_bytes()))
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;
        writeln!(f, "=== Clinic simulation report ===")?;
        writeln!(
            f,
            "Horizon: {:.0} min | Doctors: {} | Seed: {}",
            self.config.horizon_minutes, s.doctor_count, self.config.rng_seed
        )?;
        writeln!(f, "Arrivals:            {}", s.total_arrivals)?;
        writeln!(f, "Served:              {}", s.served)?;
        writeln!(f, "Abandoned:           {}", s.abandoned)?;
        writeln!(f, "Still waiting:       {}", s.still_waiting)?;
        writeln!(f, "Mean wait:           {:.2} min", s.mean_wait)?;
        writeln!(f, "Mean time in system: {:.2} min", s.mean_time_in_system)?;
        writeln!(f, "Avg queue length:    {:.3}", s.average_queue_length)?;
        writeln!(f, "Max queue length:    {}", s.max_queue_length)?;

        writeln!(f, "--- Wait by priority ---")?;
        for (priority, avg) in self.average_wait_by_priority() {
            writeln!(f, "{:<10} {:.2} min", priority.label(), avg)?;
        }

        writeln!(f, "--- Doctor occupancy ---")?;
        for d in &self.doctors {
            writeln!(
                f,
                "{:<4} {:<14} {:>6.1}%",
                d.id,
                d.specialty,
                d.utilization * 100.0
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_report() -> Report {
        Report {
            config: ClinicConfig::default(),
            config_hash: String::new(),
            summary: ReportSummary {
                doctor_count: 1,
                total_arrivals: 0,
                served: 0,
                abandoned: 0,
                still_waiting: 0,
                mean_wait: 0.0,
                mean_time_in_system: 0.0,
                average_queue_length: 0.0,
                max_queue_length: 0,
            },
            queue_length_series: vec![],
            occupancy_series: vec![],
            abandonment_series: vec![],
            wait_times_by_priority: BTreeMap::new(),
            patients: BTreeMap::new(),
            doctors: vec![DoctorSummary {
                id: "m0".to_string(),
                specialty: "cardiology".to_string(),
                busy_minutes: 120.0,
                utilization: 0.25,
            }],
            queue_entries: vec![],
            queue_snapshots: vec![],
        }
    }

    #[test]
    fn test_average_wait_by_priority_empty_classes_are_zero() {
        let mut report = empty_report();
        report
            .wait_times_by_priority
            .insert(TriagePriority::Urgent, vec![10.0, 20.0]);

        let avg = report.average_wait_by_priority();
        assert_eq!(avg[&TriagePriority::Critical], 0.0);
        assert_eq!(avg[&TriagePriority::Urgent], 15.0);
        assert_eq!(avg[&TriagePriority::Standard], 0.0);
    }

    #[test]
    fn test_unknown_patient_is_none() {
        assert!(empty_report().patient("nobody").is_none());
    }

    #[test]
    fn test_json_roundtrip_preserves_priority_keys() {
        let mut report = empty_report();
        report
            .wait_times_by_priority
            .insert(TriagePriority::Standard, vec![3.0]);

        let json = report.to_json().unwrap();
        assert!(json.contains("\"standard\""));

        let back: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_digest_is_stable() {
        let report = empty_report();
        assert_eq!(report.digest().unwrap(), report.digest().unwrap());
        assert_eq!(report.digest().unwrap().len(), 64);
    }

    #[test]
    fn test_display_lists_doctor_occupancy() {
        let text = empty_report().to_string();
        assert!(text.contains("m0"));
        assert!(text.contains("25.0%"));
    }
}
