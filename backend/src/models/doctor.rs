//! Doctor (server) model and the fixed doctor pool
//!
//! Each doctor has a fixed specialty and single capacity. The pool is
//! registered once per run and never grows or shrinks.
//!
//! # Invariants
//!
//! 1. A doctor serves at most one patient at a time
//! 2. Busy time accrues only while busy, truncated at the horizon
//! 3. A doctor refers to its patient by id only; the patient record is
//!    owned by the simulation state

use crate::core::time::SimClock;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by doctor service operations
#[derive(Debug, Error, PartialEq)]
pub enum DoctorError {
    #[error("Doctor {doctor_id} is already serving patient {patient_id}")]
    AlreadyBusy {
        doctor_id: String,
        patient_id: String,
    },

    #[error("Doctor {doctor_id} is not serving anyone")]
    NotBusy { doctor_id: String },
}

/// A single-capacity, specialty-tagged server
///
/// # Example
/// ```
/// use clinic_simulator_core_rs::{Doctor, SimClock};
///
/// let clock = SimClock::new(480.0);
/// let mut doctor = Doctor::new("m0", "cardiology");
/// doctor.start_service("p1", 10.0).unwrap();
/// assert!(doctor.is_busy());
///
/// doctor.end_service(25.0, &clock).unwrap();
/// assert_eq!(doctor.busy_minutes(), 15.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    id: String,
    specialty: String,
    /// Patient currently in consultation, if any
    current_patient: Option<String>,
    /// Cumulative busy time inside the horizon (minutes)
    busy_minutes: f64,
    /// Start of the current (or last) consultation
    last_service_start: f64,
}

impl Doctor {
    pub fn new(id: impl Into<String>, specialty: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            specialty: specialty.into(),
            current_patient: None,
            busy_minutes: 0.0,
            last_service_start: 0.0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn specialty(&self) -> &str {
        &self.specialty
    }

    pub fn is_busy(&self) -> bool {
        self.current_patient.is_some()
    }

    pub fn current_patient(&self) -> Option<&str> {
        self.current_patient.as_deref()
    }

    pub fn busy_minutes(&self) -> f64 {
        self.busy_minutes
    }

    pub fn last_service_start(&self) -> f64 {
        self.last_service_start
    }

    /// Mark busy with `patient_id` from `now`
    pub fn start_service(&mut self, patient_id: &str, now: f64) -> Result<(), DoctorError> {
        if let Some(current) = &self.current_patient {
            return Err(DoctorError::AlreadyBusy {
                doctor_id: self.id.clone(),
                patient_id: current.clone(),
            });
        }
        self.current_patient = Some(patient_id.to_string());
        self.last_service_start = now;
        Ok(())
    }

    /// Mark idle at `now`, accruing the horizon-truncated busy span
    ///
    /// Returns the id of the patient that was being served.
    pub fn end_service(&mut self, now: f64, clock: &SimClock) -> Result<String, DoctorError> {
        let patient_id = self.current_patient.take().ok_or_else(|| DoctorError::NotBusy {
            doctor_id: self.id.clone(),
        })?;
        self.busy_minutes += clock.span_within_horizon(self.last_service_start, now);
        Ok(patient_id)
    }

    /// Fraction of the horizon spent busy
    pub fn utilization(&self, horizon: f64) -> f64 {
        self.busy_minutes / horizon
    }
}

/// The fixed roster of doctors, kept in registration order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorPool {
    doctors: Vec<Doctor>,
}

impl DoctorPool {
    /// Build a pool from an explicit roster (order is preserved)
    pub fn from_doctors(doctors: Vec<Doctor>) -> Self {
        Self { doctors }
    }

    /// Register `count` doctors over `specialties`
    ///
    /// When `count >= specialties.len()` every specialty gets at least one
    /// doctor; remaining seats are filled by uniform random choice. The
    /// specialty list is then shuffled once and doctors are named `m0..`.
    ///
    /// # Example
    /// ```
    /// use clinic_simulator_core_rs::{DoctorPool, RngManager};
    ///
    /// let specialties = vec!["cardiology".to_string(), "neurology".to_string()];
    /// let mut rng = RngManager::new(42);
    /// let pool = DoctorPool::register(3, &specialties, &mut rng);
    ///
    /// assert_eq!(pool.len(), 3);
    /// for s in &specialties {
    ///     assert!(pool.doctors().iter().any(|d| d.specialty() == s));
    /// }
    /// ```
    pub fn register(count: usize, specialties: &[String], rng: &mut RngManager) -> Self {
        let mut assigned: Vec<String> = Vec::with_capacity(count);

        if count >= specialties.len() {
            assigned.extend(specialties.iter().cloned());
        }

        while assigned.len() < count {
            match rng.choose(specialties) {
                Some(s) => assigned.push(s.clone()),
                None => break,
            }
        }

        rng.shuffle(&mut assigned);

        let doctors = assigned
            .into_iter()
            .enumerate()
            .map(|(i, specialty)| Doctor::new(format!("m{}", i), specialty))
            .collect();

        Self { doctors }
    }

    /// First idle doctor of `specialty`, scanning in registration order
    pub fn find_free(&self, specialty: &str) -> Option<usize> {
        self.doctors
            .iter()
            .position(|d| !d.is_busy() && d.specialty() == specialty)
    }

    /// Number of doctors currently in consultation
    pub fn busy_count(&self) -> usize {
        self.doctors.iter().filter(|d| d.is_busy()).count()
    }

    /// Number of doctors offering `specialty`
    pub fn staffed(&self, specialty: &str) -> usize {
        self.doctors
            .iter()
            .filter(|d| d.specialty() == specialty)
            .count()
    }

    pub fn get(&self, index: usize) -> Option<&Doctor> {
        self.doctors.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Doctor> {
        self.doctors.get_mut(index)
    }

    /// Position of the doctor with the given id
    pub fn index_of(&self, doctor_id: &str) -> Option<usize> {
        self.doctors.iter().position(|d| d.id() == doctor_id)
    }

    pub fn doctors(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn len(&self) -> usize {
        self.doctors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doctors.is_empty()
    }
}
