//! Orchestrator Engine
//!
//! Discrete-event loop of the clinic. The whole arrival timeline is
//! generated before the loop starts; the loop then pops events in total
//! order until the scheduler is empty:
//!
//! ```text
//! loop:
//! 1. Pop earliest event (time, kind, patient)
//! 2. Advance clock to event time
//! 3. Sample queue length
//! 4. Dispatch on kind:
//!    Arrival   → create patient; serve now or enqueue (+ reneging timer)
//!    Departure → release doctor; serve best matching queued patient
//!    Reneging  → no-op unless still queued, else abandon
//! ```
//!
//! The loop is not bounded by the horizon: departures and reneging timers
//! scheduled before it still fire after it. Only new arrivals and busy-time
//! accounting stop at the horizon.
//!
//! # Example
//!
//! ```rust
//! use clinic_simulator_core_rs::{ClinicConfig, Identity, Orchestrator};
//!
//! let roster: Vec<Identity> = (0..50)
//!     .map(|i| Identity::new(format!("p{}", i), format!("Patient {}", i)))
//!     .collect();
//!
//! let mut orchestrator = Orchestrator::new(ClinicConfig::default(), roster).unwrap();
//! let report = orchestrator.run().unwrap();
//!
//! assert_eq!(
//!     report.summary.served + report.summary.abandoned + report.summary.still_waiting,
//!     report.summary.total_arrivals
//! );
//! ```

use crate::arrivals::{ArrivalGenerator, PlannedArrival, ServiceTimeDistribution};
use crate::core::time::SimClock;
use crate::events::{EventKind, EventScheduler, ScheduledEvent, SchedulerError};
use crate::metrics::collector::StatisticsCollector;
use crate::metrics::report::Report;
use crate::models::doctor::{Doctor, DoctorError, DoctorPool};
use crate::models::event::{Event, EventLog};
use crate::models::patient::{Identity, Patient, PatientError, PatientStatus};
use crate::models::queue::QueueEntry;
use crate::models::state::SimulationState;
use crate::orchestrator::config::{ClinicConfig, ConfigError};
use crate::orchestrator::fingerprint::{compute_config_hash, validate_report};
use crate::rng::RngManager;
use log::{debug, info, trace};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Simulation errors
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("Doctor not found: {0}")]
    DoctorNotFound(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error(transparent)]
    Patient(#[from] PatientError),

    #[error(transparent)]
    Doctor(#[from] DoctorError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("State validation error: {0}")]
    StateValidation(String),
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Owns all state of one run and drives the event loop
///
/// # Determinism
///
/// All randomness goes through `rng_manager`, seeded from the config.
/// Same seed + config + roster = identical event log and report.
pub struct Orchestrator {
    /// Immutable run configuration
    config: ClinicConfig,

    /// SHA-256 of the canonical config
    config_hash: String,

    /// Resolved service-time family
    service_distribution: ServiceTimeDistribution,

    clock: SimClock,

    /// Deterministic RNG, used after setup only for service times
    rng_manager: RngManager,

    /// Patients, doctors, waiting queue
    state: SimulationState,

    /// Pending events
    scheduler: EventScheduler,

    /// Arrivals whose event has not fired yet, keyed by patient id
    planned: HashMap<String, PlannedArrival>,

    /// Fixed consultation lengths of scripted arrivals not yet dispatched
    service_overrides: HashMap<String, f64>,

    collector: StatisticsCollector,

    /// Trace of every applied state change
    event_log: EventLog,

    events_processed: usize,
}

/// Outcome of a single processed event
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub time: f64,
    pub kind: EventKind,
    pub patient_id: String,
    /// Queue length after the event
    pub queue_length: usize,
    /// Busy doctors after the event
    pub busy_doctors: usize,
}

impl Orchestrator {
    /// Create a run from configuration and the external identity roster
    ///
    /// Setup consumes the RNG in a fixed order: roster shuffle, doctor
    /// registration, then the full arrival timeline. Fails before any
    /// event is processed if the configuration is invalid or the roster
    /// contains a duplicate id.
    pub fn new(config: ClinicConfig, roster: Vec<Identity>) -> Result<Self, SimulationError> {
        config.validate()?;
        Self::ensure_unique_ids(roster.iter().map(|identity| identity.id.as_str()))?;

        let mut rng_manager = RngManager::new(config.rng_seed);

        let mut roster = roster;
        rng_manager.shuffle(&mut roster);

        let doctors =
            DoctorPool::register(config.doctor_count, &config.specialties, &mut rng_manager);

        let generator = ArrivalGenerator::new(
            config.arrival_rate_per_minute(),
            config.specialties.clone(),
            config.horizon_minutes,
        );
        let arrivals = generator.generate(roster, &mut rng_manager);

        Self::assemble(config, doctors, arrivals, rng_manager)
    }

    /// Create a scripted run from an explicit doctor roster and timeline
    ///
    /// Nothing is randomized during setup; the RNG is still seeded from
    /// the config and samples service times for arrivals without a fixed
    /// duration. `config.doctor_count` is ignored in favor of `doctors`.
    pub fn from_scenario(
        config: ClinicConfig,
        doctors: Vec<Doctor>,
        arrivals: Vec<PlannedArrival>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        if doctors.is_empty() {
            return Err(ConfigError::NoDoctors.into());
        }
        Self::ensure_unique_ids(arrivals.iter().map(|a| a.identity.id.as_str()))?;
        for arrival in &arrivals {
            Self::validate_planned(arrival)?;
        }

        let rng_manager = RngManager::new(config.rng_seed);
        Self::assemble(config, DoctorPool::from_doctors(doctors), arrivals, rng_manager)
    }

    fn ensure_unique_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Result<(), SimulationError> {
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id) {
                return Err(ConfigError::DuplicateIdentity(id.to_string()).into());
            }
        }
        Ok(())
    }

    fn validate_planned(arrival: &PlannedArrival) -> Result<(), ConfigError> {
        let patient_id = arrival.identity.id.clone();
        if !(arrival.time.is_finite() && arrival.time >= 0.0) {
            return Err(ConfigError::InvalidArrivalTime {
                patient_id,
                time: arrival.time,
            });
        }
        match arrival.service_minutes {
            Some(minutes) if !(minutes.is_finite() && minutes >= 0.0) => {
                Err(ConfigError::InvalidServiceMinutes {
                    patient_id,
                    minutes,
                })
            }
            _ => Ok(()),
        }
    }

    fn assemble(
        config: ClinicConfig,
        doctors: DoctorPool,
        arrivals: Vec<PlannedArrival>,
        rng_manager: RngManager,
    ) -> Result<Self, SimulationError> {
        let config_hash = compute_config_hash(&config)?;
        let service_distribution = config.service_distribution()?;

        let mut scheduler = EventScheduler::new();
        let mut planned = HashMap::with_capacity(arrivals.len());
        for arrival in arrivals {
            let id = arrival.identity.id.clone();
            scheduler.schedule(ScheduledEvent::arrival(arrival.time, id.clone()))?;
            planned.insert(id, arrival);
        }

        debug!(
            "Registered {} doctors and {} arrivals",
            doctors.len(),
            planned.len()
        );

        Ok(Self {
            clock: SimClock::new(config.horizon_minutes),
            collector: StatisticsCollector::new(config.horizon_minutes),
            state: SimulationState::new(doctors),
            config_hash,
            service_distribution,
            rng_manager,
            scheduler,
            planned,
            service_overrides: HashMap::new(),
            event_log: EventLog::new(),
            events_processed: 0,
            config,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &ClinicConfig {
        &self.config
    }

    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    pub fn current_time(&self) -> f64 {
        self.clock.now()
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn collector(&self) -> &StatisticsCollector {
        &self.collector
    }

    /// Events still in the scheduler (including stale reneging timers)
    pub fn pending_events(&self) -> usize {
        self.scheduler.len()
    }

    pub fn events_processed(&self) -> usize {
        self.events_processed
    }

    pub fn is_finished(&self) -> bool {
        self.scheduler.is_empty()
    }

    // ========================================================================
    // Event Loop
    // ========================================================================

    /// Process the next event; `Ok(None)` once the scheduler is empty
    pub fn step(&mut self) -> Result<Option<StepResult>, SimulationError> {
        if self.scheduler.is_empty() {
            return Ok(None);
        }

        let event = self.scheduler.pop_earliest()?;
        self.clock.advance_to(event.time);
        self.collector
            .record_queue_length(event.time, self.state.queue_size());

        match event.kind {
            EventKind::Arrival => self.handle_arrival(&event.patient_id)?,
            EventKind::Departure => self.handle_departure(&event.patient_id)?,
            EventKind::Reneging => self.handle_reneging(&event.patient_id)?,
        }

        self.events_processed += 1;

        Ok(Some(StepResult {
            time: event.time,
            kind: event.kind,
            patient_id: event.patient_id,
            queue_length: self.state.queue_size(),
            busy_doctors: self.state.doctors().busy_count(),
        }))
    }

    /// Run until the scheduler is empty and build the validated report
    pub fn run(&mut self) -> Result<Report, SimulationError> {
        info!(
            "Starting clinic run: {} doctors, {} scheduled arrivals, horizon {} min, seed {}",
            self.state.doctors().len(),
            self.planned.len(),
            self.config.horizon_minutes,
            self.config.rng_seed
        );

        while self.step()?.is_some() {}

        let report = self.report()?;
        info!(
            "Run finished after {} events: {} served, {} abandoned, {} still waiting",
            self.events_processed,
            report.summary.served,
            report.summary.abandoned,
            report.summary.still_waiting
        );
        Ok(report)
    }

    /// Report of the current state, validated against the run invariants
    ///
    /// Meaningful once `step()` has returned `None`; before that the
    /// in-service check fails.
    pub fn report(&self) -> Result<Report, SimulationError> {
        let report = self
            .collector
            .build_report(&self.config, &self.config_hash, &self.state);
        validate_report(&report)?;
        Ok(report)
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn handle_arrival(&mut self, patient_id: &str) -> Result<(), SimulationError> {
        let now = self.clock.now();

        if self.state.contains_patient(patient_id) {
            return Err(SimulationError::InvalidTransition(format!(
                "patient {} arrived twice",
                patient_id
            )));
        }
        let arrival = self
            .planned
            .remove(patient_id)
            .ok_or_else(|| SimulationError::PatientNotFound(patient_id.to_string()))?;

        if let Some(minutes) = arrival.service_minutes {
            self.service_overrides.insert(patient_id.to_string(), minutes);
        }

        let specialty = arrival.specialty.clone();
        let priority = arrival.priority;
        self.state.add_patient(Patient::new(
            arrival.identity,
            arrival.specialty,
            arrival.priority,
            now,
        ));

        debug!(
            "t={:.2} arrival {} ({}, {})",
            now, patient_id, specialty, priority
        );
        self.event_log.log(Event::Arrival {
            time: now,
            patient_id: patient_id.to_string(),
            specialty: specialty.clone(),
            priority,
        });

        match self.state.doctors().find_free(&specialty) {
            Some(index) => self.start_service(index, patient_id),
            None => self.enqueue(patient_id),
        }
    }

    fn handle_departure(&mut self, patient_id: &str) -> Result<(), SimulationError> {
        let now = self.clock.now();

        let patient = self
            .state
            .get_patient(patient_id)
            .ok_or_else(|| SimulationError::PatientNotFound(patient_id.to_string()))?;
        let doctor_id = patient
            .doctor_id()
            .filter(|_| patient.status() == PatientStatus::InService)
            .ok_or_else(|| {
                SimulationError::InvalidTransition(format!(
                    "departure for {} which is {:?}",
                    patient_id,
                    patient.status()
                ))
            })?
            .to_string();
        let arrival_time = patient.arrival_time();

        let index = self
            .state
            .doctors()
            .index_of(&doctor_id)
            .ok_or_else(|| SimulationError::DoctorNotFound(doctor_id.clone()))?;

        let clock = &self.clock;
        let doctor = self
            .state
            .doctors_mut()
            .get_mut(index)
            .ok_or_else(|| SimulationError::DoctorNotFound(doctor_id.clone()))?;
        let released = doctor.end_service(now, clock)?;
        if released != patient_id {
            return Err(SimulationError::InvalidTransition(format!(
                "doctor {} was serving {}, not {}",
                doctor_id, released, patient_id
            )));
        }
        let specialty = doctor.specialty().to_string();

        self.state
            .get_patient_mut(patient_id)
            .ok_or_else(|| SimulationError::PatientNotFound(patient_id.to_string()))?
            .complete(now)?;

        self.collector.record_departure(now - arrival_time);
        self.collector
            .record_occupancy(now, self.state.doctors().busy_count());

        debug!("t={:.2} departure {} from {}", now, patient_id, doctor_id);
        self.event_log.log(Event::Departure {
            time: now,
            patient_id: patient_id.to_string(),
            doctor_id,
        });

        if let Some(entry) = self.state.queue_mut().dequeue_best_match(&specialty) {
            self.record_queue_change(now);
            self.start_service(index, &entry.patient_id)?;
        }

        Ok(())
    }

    fn handle_reneging(&mut self, patient_id: &str) -> Result<(), SimulationError> {
        let now = self.clock.now();

        // Lazy cancellation: the timer outlives a dispatch
        if self.state.queue_mut().remove_if_present(patient_id).is_none() {
            trace!("t={:.2} stale reneging timer for {}", now, patient_id);
            self.event_log.log(Event::RenegingIgnored {
                time: now,
                patient_id: patient_id.to_string(),
            });
            return Ok(());
        }

        let patient = self
            .state
            .get_patient_mut(patient_id)
            .ok_or_else(|| SimulationError::PatientNotFound(patient_id.to_string()))?;
        patient.abandon(now)?;
        let wait = now - patient.arrival_time();
        let priority = patient.priority();

        self.collector.record_abandonment(now, priority, wait);
        self.record_queue_change(now);

        debug!(
            "t={:.2} {} ({}) abandoned after {:.2} min",
            now, patient_id, priority, wait
        );
        self.event_log.log(Event::Abandoned {
            time: now,
            patient_id: patient_id.to_string(),
            wait,
        });

        Ok(())
    }

    /// Put a free doctor and a waiting patient together
    fn start_service(&mut self, doctor_index: usize, patient_id: &str) -> Result<(), SimulationError> {
        let now = self.clock.now();

        let doctor = self
            .state
            .doctors_mut()
            .get_mut(doctor_index)
            .ok_or_else(|| SimulationError::DoctorNotFound(format!("#{}", doctor_index)))?;
        doctor.start_service(patient_id, now)?;
        let doctor_id = doctor.id().to_string();

        let patient = self
            .state
            .get_patient_mut(patient_id)
            .ok_or_else(|| SimulationError::PatientNotFound(patient_id.to_string()))?;
        patient.start_service(&doctor_id, now)?;
        let wait = now - patient.arrival_time();
        let priority = patient.priority();

        let duration = match self.service_overrides.remove(patient_id) {
            Some(minutes) => minutes,
            None => self.service_distribution.sample(&mut self.rng_manager),
        };
        self.scheduler
            .schedule(ScheduledEvent::departure(now + duration, patient_id))?;

        self.collector.record_service_start(priority, wait);
        self.collector
            .record_occupancy(now, self.state.doctors().busy_count());

        debug!(
            "t={:.2} {} starts with {} (waited {:.2}, lasts {:.2})",
            now, patient_id, doctor_id, wait, duration
        );
        self.event_log.log(Event::ServiceStarted {
            time: now,
            patient_id: patient_id.to_string(),
            doctor_id,
            wait,
            duration,
        });

        Ok(())
    }

    /// No matching doctor is free: queue and arm the reneging timer
    fn enqueue(&mut self, patient_id: &str) -> Result<(), SimulationError> {
        let now = self.clock.now();

        let patient = self
            .state
            .get_patient(patient_id)
            .ok_or_else(|| SimulationError::PatientNotFound(patient_id.to_string()))?;
        let entry = QueueEntry::new(
            patient.priority(),
            patient.arrival_time(),
            patient_id,
            patient.specialty(),
        );
        let reneging_at = self
            .config
            .triage_thresholds
            .max_wait(patient.priority())
            .map(|max_wait| patient.arrival_time() + max_wait);
        self.collector.record_queue_entry(now, patient);

        self.state.queue_mut().enqueue(entry);
        self.record_queue_change(now);

        if let Some(deadline) = reneging_at {
            self.scheduler
                .schedule(ScheduledEvent::reneging(deadline, patient_id))?;
        }

        let queue_length = self.state.queue_size();
        debug!(
            "t={:.2} {} queued (length {}, renege at {:?})",
            now, patient_id, queue_length, reneging_at
        );
        self.event_log.log(Event::Queued {
            time: now,
            patient_id: patient_id.to_string(),
            queue_length,
            reneging_at,
        });

        Ok(())
    }

    fn record_queue_change(&mut self, now: f64) {
        self.collector
            .record_queue_length(now, self.state.queue_size());
        self.collector
            .record_queue_snapshot(now, self.state.queue().patient_ids());
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("current_time", &self.clock.now())
            .field("num_doctors", &self.state.doctors().len())
            .field("num_patients", &self.state.num_patients())
            .field("queue_size", &self.state.queue_size())
            .field("pending_events", &self.scheduler.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::patient::TriagePriority;

    fn roster(n: usize) -> Vec<Identity> {
        (0..n)
            .map(|i| Identity::new(format!("p{:03}", i), format!("Patient {}", i)))
            .collect()
    }

    fn one_doctor_config() -> ClinicConfig {
        ClinicConfig {
            doctor_count: 1,
            specialties: vec!["x".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_orchestrator_creation() {
        let orchestrator = Orchestrator::new(ClinicConfig::default(), roster(20)).unwrap();

        assert_eq!(orchestrator.current_time(), 0.0);
        assert_eq!(orchestrator.state().doctors().len(), 3);
        assert_eq!(orchestrator.state().num_patients(), 0);
        assert_eq!(orchestrator.events_processed(), 0);
        assert!(orchestrator.pending_events() <= 20);
    }

    #[test]
    fn test_empty_roster_runs_to_empty_report() {
        let mut orchestrator = Orchestrator::new(ClinicConfig::default(), vec![]).unwrap();
        assert!(orchestrator.is_finished());

        let report = orchestrator.run().unwrap();
        assert_eq!(report.summary.total_arrivals, 0);
        assert_eq!(report.summary.average_queue_length, 0.0);
    }

    #[test]
    fn test_duplicate_roster_id_rejected() {
        let mut ids = roster(3);
        ids.push(Identity::new("p001", "Someone else"));

        let err = Orchestrator::new(ClinicConfig::default(), ids).unwrap_err();
        assert_eq!(
            err,
            SimulationError::Configuration(ConfigError::DuplicateIdentity("p001".to_string()))
        );
    }

    #[test]
    fn test_scenario_requires_doctors() {
        let err = Orchestrator::from_scenario(one_doctor_config(), vec![], vec![]).unwrap_err();
        assert_eq!(err, SimulationError::Configuration(ConfigError::NoDoctors));
    }

    #[test]
    fn test_scenario_rejects_negative_times() {
        let early = vec![PlannedArrival::new(
            -1.0,
            Identity::new("a", "A"),
            "x",
            TriagePriority::Standard,
        )];
        assert!(matches!(
            Orchestrator::from_scenario(one_doctor_config(), vec![Doctor::new("m0", "x")], early),
            Err(SimulationError::Configuration(ConfigError::InvalidArrivalTime { .. }))
        ));

        let negative_service = vec![PlannedArrival::new(
            1.0,
            Identity::new("a", "A"),
            "x",
            TriagePriority::Standard,
        )
        .with_service_minutes(-5.0)];
        assert!(matches!(
            Orchestrator::from_scenario(
                one_doctor_config(),
                vec![Doctor::new("m0", "x")],
                negative_service
            ),
            Err(SimulationError::Configuration(ConfigError::InvalidServiceMinutes { .. }))
        ));
    }

    #[test]
    fn test_step_reports_event_and_state() {
        let arrivals = vec![
            PlannedArrival::new(2.0, Identity::new("a", "A"), "x", TriagePriority::Standard)
                .with_service_minutes(3.0),
        ];
        let mut orchestrator = Orchestrator::from_scenario(
            one_doctor_config(),
            vec![Doctor::new("m0", "x")],
            arrivals,
        )
        .unwrap();

        let first = orchestrator.step().unwrap().unwrap();
        assert_eq!(first.kind, EventKind::Arrival);
        assert_eq!(first.time, 2.0);
        assert_eq!(first.busy_doctors, 1);

        let second = orchestrator.step().unwrap().unwrap();
        assert_eq!(second.kind, EventKind::Departure);
        assert_eq!(second.time, 5.0);
        assert_eq!(second.busy_doctors, 0);

        assert!(orchestrator.step().unwrap().is_none());
        assert_eq!(orchestrator.events_processed(), 2);
    }

    #[test]
    fn test_event_log_traces_transitions() {
        let arrivals = vec![
            PlannedArrival::new(0.0, Identity::new("a", "A"), "x", TriagePriority::Urgent)
                .with_service_minutes(5.0),
            PlannedArrival::new(1.0, Identity::new("b", "B"), "x", TriagePriority::Urgent)
                .with_service_minutes(5.0),
        ];
        let mut orchestrator = Orchestrator::from_scenario(
            one_doctor_config(),
            vec![Doctor::new("m0", "x")],
            arrivals,
        )
        .unwrap();
        orchestrator.run().unwrap();

        let log = orchestrator.event_log();
        let types: Vec<&str> = log
            .events_for_patient("b")
            .iter()
            .map(|e| e.event_type())
            .collect();
        assert_eq!(
            types,
            vec!["Arrival", "Queued", "ServiceStarted", "Departure", "RenegingIgnored"]
        );
        assert_eq!(log.events_for_doctor("m0").len(), 4);
    }

    #[test]
    fn test_run_is_deterministic() {
        let config = ClinicConfig {
            arrival_rate_per_hour: 25.0,
            ..Default::default()
        };
        let a = Orchestrator::new(config.clone(), roster(200))
            .unwrap()
            .run()
            .unwrap();
        let b = Orchestrator::new(config, roster(200)).unwrap().run().unwrap();

        assert_eq!(a, b);
        assert_eq!(a.digest().unwrap(), b.digest().unwrap());
    }
}
