//! Clinic Simulator Core - Rust Engine
//!
//! Discrete-event simulation of an outpatient clinic: patients arrive at
//! random, are triaged, wait for a doctor of the requested specialty, and
//! are served or abandon the queue. Deterministic for a given seed.
//!
//! # Architecture
//!
//! - **core**: Simulation clock
//! - **models**: Domain types (Patient, Doctor, WaitingQueue, State, EventLog)
//! - **events**: Pending events and their scheduler
//! - **arrivals**: Arrival timeline and service-time families
//! - **orchestrator**: Configuration and the main event loop
//! - **metrics**: Statistics collection and the final report
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (one seeded RNG per run)
//! 2. A doctor serves at most one patient at a time
//! 3. Critical patients never abandon the queue
//! 4. FFI boundary is minimal and safe

// Module declarations
pub mod arrivals;
pub mod core;
pub mod events;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod rng;

// Re-exports for convenience
pub use arrivals::{ArrivalGenerator, PlannedArrival, ServiceTimeDistribution};
pub use core::time::SimClock;
pub use events::{EventKind, EventScheduler, ScheduledEvent, SchedulerError};
pub use metrics::{Report, ReportSummary};
pub use models::{
    doctor::{Doctor, DoctorError, DoctorPool},
    event::{Event, EventLog},
    patient::{Identity, Patient, PatientError, PatientStatus, TriagePriority},
    queue::{QueueEntry, WaitingQueue},
    state::SimulationState,
};
pub use orchestrator::{
    sweep_arrival_rates, ClinicConfig, ConfigError, Orchestrator, SimulationError, StepResult,
    SweepPoint, TriageThresholds,
};
pub use rng::RngManager;

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn clinic_simulator_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::orchestrator::PyClinicSimulation>()?;
    Ok(())
}
