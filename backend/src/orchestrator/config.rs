//! Run configuration
//!
//! `ClinicConfig` is constructed once, validated by the orchestrator, and
//! then threaded read-only through the run and into the report. There is no
//! process-wide mutable configuration.
//!
//! Defaults reproduce the reference clinic: three doctors over an 8-hour
//! day, 10 patients per hour, exponential consultations averaging 15 minutes.

use crate::arrivals::ServiceTimeDistribution;
use crate::models::patient::TriagePriority;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Unknown service time distribution: {0} (expected exponential, normal or uniform)")]
    UnknownDistribution(String),

    #[error("doctor_count must be >= 1")]
    NoDoctors,

    #[error("horizon_minutes must be positive and finite, got {0}")]
    InvalidHorizon(f64),

    #[error("arrival_rate_per_hour must be positive and finite, got {0}")]
    InvalidArrivalRate(f64),

    #[error("mean_service_minutes must be positive and finite, got {0}")]
    InvalidMeanService(f64),

    #[error("At least one specialty is required")]
    NoSpecialties,

    #[error("Duplicate specialty: {0}")]
    DuplicateSpecialty(String),

    #[error("Critical patients never renege; got a bound of {0} minutes")]
    BoundedCriticalThreshold(f64),

    #[error("Max wait for {priority} must be positive and finite, got {minutes}")]
    InvalidThreshold {
        priority: TriagePriority,
        minutes: f64,
    },

    #[error("Duplicate identity in roster: {0}")]
    DuplicateIdentity(String),

    #[error("Arrival of {patient_id} must be at a finite time >= 0, got {time}")]
    InvalidArrivalTime { patient_id: String, time: f64 },

    #[error("Service time of {patient_id} must be finite and >= 0, got {minutes}")]
    InvalidServiceMinutes { patient_id: String, minutes: f64 },
}

/// Maximum wait before a queued patient reneges, per triage class
///
/// `None` means unbounded. Critical must always be unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageThresholds {
    pub critical: Option<f64>,
    pub urgent: Option<f64>,
    pub standard: Option<f64>,
}

impl TriageThresholds {
    /// Max wait in minutes for `priority`, `None` if unbounded
    pub fn max_wait(&self, priority: TriagePriority) -> Option<f64> {
        match priority {
            TriagePriority::Critical => None,
            TriagePriority::Urgent => self.urgent,
            TriagePriority::Standard => self.standard,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(minutes) = self.critical {
            return Err(ConfigError::BoundedCriticalThreshold(minutes));
        }
        for (priority, bound) in [
            (TriagePriority::Urgent, self.urgent),
            (TriagePriority::Standard, self.standard),
        ] {
            if let Some(minutes) = bound {
                if !(minutes.is_finite() && minutes > 0.0) {
                    return Err(ConfigError::InvalidThreshold { priority, minutes });
                }
            }
        }
        Ok(())
    }
}

impl Default for TriageThresholds {
    fn default() -> Self {
        Self {
            critical: None,
            urgent: Some(60.0),
            standard: Some(30.0),
        }
    }
}

/// Complete configuration of a clinic run
///
/// # Example
///
/// ```
/// use clinic_simulator_core_rs::ClinicConfig;
///
/// let config: ClinicConfig = serde_json::from_str(
///     r#"{ "doctor_count": 5, "service_time_distribution": "uniform" }"#,
/// ).unwrap();
///
/// assert_eq!(config.doctor_count, 5);
/// assert_eq!(config.horizon_minutes, 480.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicConfig {
    /// Number of doctors on the roster
    pub doctor_count: usize,

    /// Simulation horizon (minutes)
    pub horizon_minutes: f64,

    /// Mean arrivals per hour (λ·60)
    pub arrival_rate_per_hour: f64,

    /// Service-time family label: exponential, normal or uniform
    ///
    /// Kept as a label so an unknown family surfaces as a configuration
    /// error at validation rather than as a parse failure.
    pub service_time_distribution: String,

    /// Mean consultation length (minutes)
    pub mean_service_minutes: f64,

    /// Ordered specialty labels
    pub specialties: Vec<String>,

    /// Reneging thresholds per triage class
    pub triage_thresholds: TriageThresholds,

    /// RNG seed for deterministic replay
    pub rng_seed: u64,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            doctor_count: 3,
            horizon_minutes: 8.0 * 60.0,
            arrival_rate_per_hour: 10.0,
            service_time_distribution: "exponential".to_string(),
            mean_service_minutes: 15.0,
            specialties: vec![
                "cardiology".to_string(),
                "orthopedics".to_string(),
                "neurology".to_string(),
            ],
            triage_thresholds: TriageThresholds::default(),
            rng_seed: 42,
        }
    }
}

impl ClinicConfig {
    /// Arrival rate per minute (λ)
    pub fn arrival_rate_per_minute(&self) -> f64 {
        self.arrival_rate_per_hour / 60.0
    }

    /// Resolve the service-time family
    pub fn service_distribution(&self) -> Result<ServiceTimeDistribution, ConfigError> {
        ServiceTimeDistribution::from_label(&self.service_time_distribution, self.mean_service_minutes)
    }

    /// Check every option; returns the first violation
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.doctor_count == 0 {
            return Err(ConfigError::NoDoctors);
        }

        if !(self.horizon_minutes.is_finite() && self.horizon_minutes > 0.0) {
            return Err(ConfigError::InvalidHorizon(self.horizon_minutes));
        }

        if !(self.arrival_rate_per_hour.is_finite() && self.arrival_rate_per_hour > 0.0) {
            return Err(ConfigError::InvalidArrivalRate(self.arrival_rate_per_hour));
        }

        if !(self.mean_service_minutes.is_finite() && self.mean_service_minutes > 0.0) {
            return Err(ConfigError::InvalidMeanService(self.mean_service_minutes));
        }

        if self.specialties.is_empty() {
            return Err(ConfigError::NoSpecialties);
        }

        let mut seen = HashSet::new();
        for specialty in &self.specialties {
            if !seen.insert(specialty) {
                return Err(ConfigError::DuplicateSpecialty(specialty.clone()));
            }
        }

        self.triage_thresholds.validate()?;
        self.service_distribution()?;

        Ok(())
    }
}
