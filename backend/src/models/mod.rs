//! Domain models for the clinic simulator

pub mod doctor;
pub mod event;
pub mod patient;
pub mod queue;
pub mod state;

// Re-exports
pub use doctor::{Doctor, DoctorError, DoctorPool};
pub use event::{Event, EventLog};
pub use patient::{Identity, Patient, PatientError, PatientStatus, TriagePriority};
pub use queue::{QueueEntry, WaitingQueue};
pub use state::SimulationState;
