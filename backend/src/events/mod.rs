//! Pending-event scheduling
//!
//! - `types`: the `(time, kind, patient)` event and its total order
//! - `scheduler`: the min-queue the orchestrator pops from

pub mod scheduler;
pub mod types;

pub use scheduler::{EventScheduler, SchedulerError};
pub use types::{EventKind, ScheduledEvent};
