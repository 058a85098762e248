//! Patient model
//!
//! A patient is created when its arrival event is processed and then moves
//! through a small state machine:
//!
//! ```text
//! Waiting ──dispatch──▶ InService ──departure──▶ Served
//!    │
//!    └──reneging timeout──▶ Abandoned
//! ```
//!
//! `Served` and `Abandoned` are terminal and never left again.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A roster identity supplied by the external roster store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Triage priority class
///
/// Variant order is the dispatch order: `Critical` is the most urgent and
/// has the lowest rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriagePriority {
    Critical,
    Urgent,
    Standard,
}

impl TriagePriority {
    /// All classes, most urgent first
    pub const ALL: [TriagePriority; 3] = [
        TriagePriority::Critical,
        TriagePriority::Urgent,
        TriagePriority::Standard,
    ];

    /// Numeric rank used by the waiting queue (lower = more urgent)
    pub fn rank(self) -> u8 {
        match self {
            TriagePriority::Critical => 0,
            TriagePriority::Urgent => 1,
            TriagePriority::Standard => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TriagePriority::Critical => "critical",
            TriagePriority::Urgent => "urgent",
            TriagePriority::Standard => "standard",
        }
    }
}

impl fmt::Display for TriagePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle status of a patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatientStatus {
    /// In the waiting queue
    Waiting,
    /// Being seen by a doctor
    InService,
    /// Consultation finished (terminal)
    Served,
    /// Left the queue after exceeding the maximum wait (terminal)
    Abandoned,
}

impl PatientStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, PatientStatus::Served | PatientStatus::Abandoned)
    }
}

/// Errors raised by illegal patient state transitions
#[derive(Debug, Error, PartialEq)]
pub enum PatientError {
    #[error("patient {patient_id} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        patient_id: String,
        from: PatientStatus,
        to: PatientStatus,
    },
}

/// A patient record, owned by the simulation state
///
/// # Example
/// ```
/// use clinic_simulator_core_rs::{Identity, Patient, PatientStatus, TriagePriority};
///
/// let mut p = Patient::new(
///     Identity::new("p1", "Ana"),
///     "cardiology".to_string(),
///     TriagePriority::Urgent,
///     6.0,
/// );
/// assert_eq!(p.status(), PatientStatus::Waiting);
///
/// p.start_service("m0", 15.0).unwrap();
/// assert_eq!(p.wait_time(), Some(9.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    id: String,
    name: String,
    specialty: String,
    priority: TriagePriority,
    arrival_time: f64,
    service_start: Option<f64>,
    /// Departure time when served, abandonment time when abandoned
    exit_time: Option<f64>,
    /// Doctor currently (or last) serving this patient
    doctor_id: Option<String>,
    status: PatientStatus,
}

impl Patient {
    /// Create a patient at arrival; status starts as `Waiting`
    pub fn new(
        identity: Identity,
        specialty: String,
        priority: TriagePriority,
        arrival_time: f64,
    ) -> Self {
        Self {
            id: identity.id,
            name: identity.name,
            specialty,
            priority,
            arrival_time,
            service_start: None,
            exit_time: None,
            doctor_id: None,
            status: PatientStatus::Waiting,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn specialty(&self) -> &str {
        &self.specialty
    }

    pub fn priority(&self) -> TriagePriority {
        self.priority
    }

    pub fn arrival_time(&self) -> f64 {
        self.arrival_time
    }

    pub fn service_start(&self) -> Option<f64> {
        self.service_start
    }

    pub fn exit_time(&self) -> Option<f64> {
        self.exit_time
    }

    pub fn doctor_id(&self) -> Option<&str> {
        self.doctor_id.as_deref()
    }

    pub fn status(&self) -> PatientStatus {
        self.status
    }

    /// Waiting → InService
    pub fn start_service(&mut self, doctor_id: &str, now: f64) -> Result<(), PatientError> {
        self.transition(PatientStatus::Waiting, PatientStatus::InService)?;
        self.service_start = Some(now);
        self.doctor_id = Some(doctor_id.to_string());
        Ok(())
    }

    /// InService → Served
    pub fn complete(&mut self, now: f64) -> Result<(), PatientError> {
        self.transition(PatientStatus::InService, PatientStatus::Served)?;
        self.exit_time = Some(now);
        Ok(())
    }

    /// Waiting → Abandoned
    pub fn abandon(&mut self, now: f64) -> Result<(), PatientError> {
        self.transition(PatientStatus::Waiting, PatientStatus::Abandoned)?;
        self.exit_time = Some(now);
        Ok(())
    }

    /// Minutes spent waiting: until service start, or until abandonment
    pub fn wait_time(&self) -> Option<f64> {
        match self.status {
            PatientStatus::InService | PatientStatus::Served => {
                self.service_start.map(|s| s - self.arrival_time)
            }
            PatientStatus::Abandoned => self.exit_time.map(|t| t - self.arrival_time),
            PatientStatus::Waiting => None,
        }
    }

    /// Minutes from arrival to departure, only for served patients
    pub fn time_in_system(&self) -> Option<f64> {
        match self.status {
            PatientStatus::Served => self.exit_time.map(|t| t - self.arrival_time),
            _ => None,
        }
    }

    fn transition(&mut self, from: PatientStatus, to: PatientStatus) -> Result<(), PatientError> {
        if self.status != from {
            return Err(PatientError::InvalidTransition {
                patient_id: self.id.clone(),
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(priority: TriagePriority) -> Patient {
        Patient::new(
            Identity::new("p7", "Rui"),
            "neurology".to_string(),
            priority,
            10.0,
        )
    }

    #[test]
    fn test_priority_ordering_matches_rank() {
        assert!(TriagePriority::Critical < TriagePriority::Urgent);
        assert!(TriagePriority::Urgent < TriagePriority::Standard);
        for w in TriagePriority::ALL.windows(2) {
            assert!(w[0].rank() < w[1].rank());
        }
    }

    #[test]
    fn test_served_lifecycle() {
        let mut p = patient(TriagePriority::Standard);
        p.start_service("m1", 12.0).unwrap();
        p.complete(30.0).unwrap();

        assert_eq!(p.status(), PatientStatus::Served);
        assert_eq!(p.wait_time(), Some(2.0));
        assert_eq!(p.time_in_system(), Some(20.0));
        assert_eq!(p.doctor_id(), Some("m1"));
    }

    #[test]
    fn test_abandon_records_wait() {
        let mut p = patient(TriagePriority::Standard);
        p.abandon(40.0).unwrap();

        assert!(p.status().is_terminal());
        assert_eq!(p.wait_time(), Some(30.0));
        assert_eq!(p.service_start(), None);
        assert_eq!(p.time_in_system(), None);
    }

    #[test]
    fn test_terminal_states_are_never_left() {
        let mut p = patient(TriagePriority::Urgent);
        p.abandon(20.0).unwrap();

        let err = p.start_service("m0", 21.0).unwrap_err();
        assert_eq!(
            err,
            PatientError::InvalidTransition {
                patient_id: "p7".to_string(),
                from: PatientStatus::Abandoned,
                to: PatientStatus::InService,
            }
        );
    }

    #[test]
    fn test_cannot_abandon_while_in_service() {
        let mut p = patient(TriagePriority::Urgent);
        p.start_service("m0", 11.0).unwrap();
        assert!(p.abandon(70.0).is_err());
        assert_eq!(p.status(), PatientStatus::InService);
    }
}
