//! Simulation State
//!
//! Mutable state of a clinic run: every patient created so far, the doctor
//! pool, and the waiting queue.
//!
//! # Critical Invariants
//!
//! 1. **Patient uniqueness**: each patient id appears exactly once
//! 2. **Queue validity**: a queue entry exists iff its patient is `Waiting`
//! 3. **Single occupancy**: a doctor's current patient is `InService` on that
//!    doctor, and no patient is `InService` on two doctors

use crate::models::doctor::DoctorPool;
use crate::models::patient::{Patient, PatientStatus};
use crate::models::queue::WaitingQueue;
use std::collections::BTreeMap;

/// Complete simulation state
///
/// # Example
///
/// ```rust
/// use clinic_simulator_core_rs::{Doctor, DoctorPool, SimulationState};
///
/// let pool = DoctorPool::from_doctors(vec![Doctor::new("m0", "cardiology")]);
/// let state = SimulationState::new(pool);
/// assert_eq!(state.num_patients(), 0);
/// assert_eq!(state.queue_size(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// All patients created so far, keyed by id
    patients: BTreeMap<String, Patient>,

    /// Fixed doctor roster
    doctors: DoctorPool,

    /// Patients waiting for a matching doctor
    queue: WaitingQueue,
}

impl SimulationState {
    pub fn new(doctors: DoctorPool) -> Self {
        Self {
            patients: BTreeMap::new(),
            doctors,
            queue: WaitingQueue::new(),
        }
    }

    /// Add a newly arrived patient
    ///
    /// # Panics
    ///
    /// Panics if the patient id already exists
    pub fn add_patient(&mut self, patient: Patient) {
        let id = patient.id().to_string();
        assert!(
            !self.patients.contains_key(&id),
            "Patient ID {} already exists",
            id
        );
        self.patients.insert(id, patient);
    }

    pub fn contains_patient(&self, id: &str) -> bool {
        self.patients.contains_key(id)
    }

    pub fn get_patient(&self, id: &str) -> Option<&Patient> {
        self.patients.get(id)
    }

    pub fn get_patient_mut(&mut self, id: &str) -> Option<&mut Patient> {
        self.patients.get_mut(id)
    }

    pub fn patients(&self) -> &BTreeMap<String, Patient> {
        &self.patients
    }

    pub fn doctors(&self) -> &DoctorPool {
        &self.doctors
    }

    pub fn doctors_mut(&mut self) -> &mut DoctorPool {
        &mut self.doctors
    }

    pub fn queue(&self) -> &WaitingQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut WaitingQueue {
        &mut self.queue
    }

    pub fn queue_size(&self) -> usize {
        self.queue.len()
    }

    pub fn num_patients(&self) -> usize {
        self.patients.len()
    }

    /// Number of patients currently in `status`
    pub fn count_with_status(&self, status: PatientStatus) -> usize {
        self.patients
            .values()
            .filter(|p| p.status() == status)
            .count()
    }

    /// Ids of patients currently `InService` on `doctor_id`
    pub fn patients_in_service_on(&self, doctor_id: &str) -> Vec<&str> {
        self.patients
            .values()
            .filter(|p| p.status() == PatientStatus::InService && p.doctor_id() == Some(doctor_id))
            .map(|p| p.id())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::doctor::Doctor;
    use crate::models::patient::{Identity, TriagePriority};

    fn state() -> SimulationState {
        SimulationState::new(DoctorPool::from_doctors(vec![Doctor::new("m0", "cardiology")]))
    }

    fn patient(id: &str) -> Patient {
        Patient::new(
            Identity::new(id, "Someone"),
            "cardiology".to_string(),
            TriagePriority::Standard,
            0.0,
        )
    }

    #[test]
    #[should_panic(expected = "already exists")]
    fn test_duplicate_patient_panics() {
        let mut s = state();
        s.add_patient(patient("p1"));
        s.add_patient(patient("p1"));
    }

    #[test]
    fn test_status_counts() {
        let mut s = state();
        s.add_patient(patient("p1"));
        s.add_patient(patient("p2"));
        s.get_patient_mut("p1").unwrap().start_service("m0", 1.0).unwrap();

        assert_eq!(s.count_with_status(PatientStatus::Waiting), 1);
        assert_eq!(s.count_with_status(PatientStatus::InService), 1);
        assert_eq!(s.patients_in_service_on("m0"), vec!["p1"]);
    }
}
