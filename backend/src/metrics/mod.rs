//! Run statistics
//!
//! - `collector`: samples pushed by the orchestrator while the run progresses
//! - `report`: the immutable result handed to the presentation layer

pub mod collector;
pub mod report;

pub use collector::{time_weighted_average, StatisticsCollector};
pub use report::{DoctorSummary, PatientRecord, QueueEntryRecord, QueueSnapshot, Report, ReportSummary};
