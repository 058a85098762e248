//! Arrival generation and service-time sampling
//!
//! All generation is deterministic given the run's `RngManager`.
//!
//! # Key Principles
//!
//! 1. **Determinism**: Same seed + same config + same roster → same arrivals
//! 2. **Poisson arrivals**: inter-arrival gaps are exponential with mean `1/λ`
//! 3. **Bounded by roster and horizon**: generation stops at whichever runs
//!    out first; a short roster is not an error
//! 4. **No silent defaults**: an unknown service-time family is rejected
//!
//! # Example
//!
//! ```
//! use clinic_simulator_core_rs::arrivals::ArrivalGenerator;
//! use clinic_simulator_core_rs::{Identity, RngManager};
//!
//! let generator = ArrivalGenerator::new(10.0 / 60.0, vec!["cardiology".to_string()], 480.0);
//! let roster = vec![Identity::new("p1", "Ana"), Identity::new("p2", "Rui")];
//! let mut rng = RngManager::new(42);
//!
//! let arrivals = generator.generate(roster, &mut rng);
//! assert!(arrivals.len() <= 2);
//! assert!(arrivals.windows(2).all(|w| w[0].time <= w[1].time));
//! ```

use crate::models::patient::{Identity, TriagePriority};
use crate::orchestrator::config::ConfigError;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

/// Triage mix of arriving patients
pub const TRIAGE_WEIGHTS: [(TriagePriority, f64); 3] = [
    (TriagePriority::Critical, 0.15),
    (TriagePriority::Urgent, 0.35),
    (TriagePriority::Standard, 0.50),
];

/// Standard deviation of the `normal` service-time family (minutes)
pub const NORMAL_SERVICE_STD_DEV: f64 = 5.0;

/// Service-time distribution family
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ServiceTimeDistribution {
    /// Exponential with the given mean
    Exponential { mean: f64 },

    /// Normal, clamped at zero
    Normal { mean: f64, std_dev: f64 },

    /// Uniform on `[low, high)`
    Uniform { low: f64, high: f64 },
}

impl ServiceTimeDistribution {
    /// Build the distribution named by `label` around `mean`
    ///
    /// Recognized labels: `exponential`, `normal` (sd = 5), and `uniform`
    /// (0.5·mean to 1.5·mean).
    ///
    /// # Example
    /// ```
    /// use clinic_simulator_core_rs::arrivals::ServiceTimeDistribution;
    ///
    /// let dist = ServiceTimeDistribution::from_label("uniform", 15.0).unwrap();
    /// assert_eq!(dist, ServiceTimeDistribution::Uniform { low: 7.5, high: 22.5 });
    /// assert!(ServiceTimeDistribution::from_label("gamma", 15.0).is_err());
    /// ```
    pub fn from_label(label: &str, mean: f64) -> Result<Self, ConfigError> {
        match label {
            "exponential" => Ok(ServiceTimeDistribution::Exponential { mean }),
            "normal" => Ok(ServiceTimeDistribution::Normal {
                mean,
                std_dev: NORMAL_SERVICE_STD_DEV,
            }),
            "uniform" => Ok(ServiceTimeDistribution::Uniform {
                low: 0.5 * mean,
                high: 1.5 * mean,
            }),
            other => Err(ConfigError::UnknownDistribution(other.to_string())),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ServiceTimeDistribution::Exponential { .. } => "exponential",
            ServiceTimeDistribution::Normal { .. } => "normal",
            ServiceTimeDistribution::Uniform { .. } => "uniform",
        }
    }

    /// Draw one consultation length (minutes, never negative)
    pub fn sample(&self, rng: &mut RngManager) -> f64 {
        match *self {
            ServiceTimeDistribution::Exponential { mean } => rng.exponential(mean),
            ServiceTimeDistribution::Normal { mean, std_dev } => {
                rng.normal(mean, std_dev).max(0.0)
            }
            ServiceTimeDistribution::Uniform { low, high } => rng.uniform(low, high),
        }
    }
}

/// One patient arrival on the pre-generated timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedArrival {
    pub time: f64,
    pub identity: Identity,
    pub specialty: String,
    pub priority: TriagePriority,
    /// Fixed consultation length; `None` samples from the configured family
    pub service_minutes: Option<f64>,
}

impl PlannedArrival {
    pub fn new(
        time: f64,
        identity: Identity,
        specialty: impl Into<String>,
        priority: TriagePriority,
    ) -> Self {
        Self {
            time,
            identity,
            specialty: specialty.into(),
            priority,
            service_minutes: None,
        }
    }

    /// Pin the consultation length (scripted scenarios)
    pub fn with_service_minutes(mut self, minutes: f64) -> Self {
        self.service_minutes = Some(minutes);
        self
    }
}

/// Generator for the arrival timeline of one run
#[derive(Debug, Clone)]
pub struct ArrivalGenerator {
    /// Expected arrivals per minute (λ)
    rate_per_minute: f64,

    /// Specialties a patient may request (uniform choice)
    specialties: Vec<String>,

    /// No arrival is generated at or after this time
    horizon: f64,
}

impl ArrivalGenerator {
    pub fn new(rate_per_minute: f64, specialties: Vec<String>, horizon: f64) -> Self {
        Self {
            rate_per_minute,
            specialties,
            horizon,
        }
    }

    /// Generate the arrival timeline from an already shuffled roster
    ///
    /// Identities are taken from the back of `roster`. Each iteration draws
    /// specialty and triage for the current arrival and then the next gap.
    pub fn generate(&self, mut roster: Vec<Identity>, rng: &mut RngManager) -> Vec<PlannedArrival> {
        let mut arrivals = Vec::new();
        let mut clock = self.next_gap(rng);

        while clock < self.horizon {
            let identity = match roster.pop() {
                Some(identity) => identity,
                None => break,
            };

            let specialty = self.sample_specialty(rng);
            let priority = Self::sample_priority(rng);
            arrivals.push(PlannedArrival::new(clock, identity, specialty, priority));

            clock += self.next_gap(rng);
        }

        arrivals
    }

    /// Exponential inter-arrival gap with mean `1/λ`
    fn next_gap(&self, rng: &mut RngManager) -> f64 {
        rng.exponential(1.0 / self.rate_per_minute)
    }

    fn sample_specialty(&self, rng: &mut RngManager) -> String {
        rng.choose(&self.specialties).cloned().unwrap_or_default()
    }

    /// Weighted triage draw per [`TRIAGE_WEIGHTS`]
    pub fn sample_priority(rng: &mut RngManager) -> TriagePriority {
        let weights: Vec<f64> = TRIAGE_WEIGHTS.iter().map(|(_, w)| *w).collect();
        rng.weighted_index(&weights)
            .map(|i| TRIAGE_WEIGHTS[i].0)
            .unwrap_or(TriagePriority::Standard)
    }
}
