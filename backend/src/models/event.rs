//! Event trace for replay and auditing
//!
//! Every state change applied by the orchestrator is recorded here, in the
//! order it happened. Two runs with the same seed and configuration produce
//! identical traces, which makes the log the first thing to diff when a
//! replay diverges.
//!
//! These are *records* of what happened. The pending work items that drive
//! the loop live in [`crate::events`].
//!
//! # Example
//!
//! ```rust
//! use clinic_simulator_core_rs::models::event::{Event, EventLog};
//! use clinic_simulator_core_rs::TriagePriority;
//!
//! let mut log = EventLog::new();
//! log.log(Event::Arrival {
//!     time: 5.0,
//!     patient_id: "p1".to_string(),
//!     specialty: "cardiology".to_string(),
//!     priority: TriagePriority::Critical,
//! });
//!
//! assert_eq!(log.events_for_patient("p1").len(), 1);
//! ```

use crate::models::patient::TriagePriority;
use serde::{Deserialize, Serialize};

/// A recorded state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Patient entered the clinic
    Arrival {
        time: f64,
        patient_id: String,
        specialty: String,
        priority: TriagePriority,
    },

    /// Consultation began (immediately on arrival or from the queue)
    ServiceStarted {
        time: f64,
        patient_id: String,
        doctor_id: String,
        wait: f64,
        duration: f64,
    },

    /// No matching doctor was free; patient joined the waiting queue
    Queued {
        time: f64,
        patient_id: String,
        queue_length: usize,
        /// Reneging deadline, `None` for unbounded priorities
        reneging_at: Option<f64>,
    },

    /// Consultation finished
    Departure {
        time: f64,
        patient_id: String,
        doctor_id: String,
    },

    /// Patient left the queue after exceeding the maximum wait
    Abandoned {
        time: f64,
        patient_id: String,
        wait: f64,
    },

    /// A reneging timer fired for a patient no longer waiting
    RenegingIgnored { time: f64, patient_id: String },
}

impl Event {
    /// Simulation time of the event
    pub fn time(&self) -> f64 {
        match self {
            Event::Arrival { time, .. } => *time,
            Event::ServiceStarted { time, .. } => *time,
            Event::Queued { time, .. } => *time,
            Event::Departure { time, .. } => *time,
            Event::Abandoned { time, .. } => *time,
            Event::RenegingIgnored { time, .. } => *time,
        }
    }

    /// Short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::Arrival { .. } => "Arrival",
            Event::ServiceStarted { .. } => "ServiceStarted",
            Event::Queued { .. } => "Queued",
            Event::Departure { .. } => "Departure",
            Event::Abandoned { .. } => "Abandoned",
            Event::RenegingIgnored { .. } => "RenegingIgnored",
        }
    }

    pub fn patient_id(&self) -> &str {
        match self {
            Event::Arrival { patient_id, .. } => patient_id,
            Event::ServiceStarted { patient_id, .. } => patient_id,
            Event::Queued { patient_id, .. } => patient_id,
            Event::Departure { patient_id, .. } => patient_id,
            Event::Abandoned { patient_id, .. } => patient_id,
            Event::RenegingIgnored { patient_id, .. } => patient_id,
        }
    }

    /// Doctor involved, for service events
    pub fn doctor_id(&self) -> Option<&str> {
        match self {
            Event::ServiceStarted { doctor_id, .. } => Some(doctor_id),
            Event::Departure { doctor_id, .. } => Some(doctor_id),
            _ => None,
        }
    }
}

/// Append-only log of simulation events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Events for a specific patient, in order
    pub fn events_for_patient(&self, patient_id: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.patient_id() == patient_id)
            .collect()
    }

    /// Events involving a specific doctor
    pub fn events_for_doctor(&self, doctor_id: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.doctor_id() == Some(doctor_id))
            .collect()
    }
}
