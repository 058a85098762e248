//! Orchestrator - configuration, event loop and run-level utilities
//!
//! See `engine.rs` for the event loop.

pub mod config;
pub mod engine;
pub mod fingerprint;
pub mod sweep;

pub use config::{ClinicConfig, ConfigError, TriageThresholds};
pub use engine::{Orchestrator, SimulationError, StepResult};
pub use fingerprint::{compute_config_hash, validate_report};
pub use sweep::{sweep_arrival_rates, SweepPoint};
