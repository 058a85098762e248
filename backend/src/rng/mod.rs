//! Deterministic random number generation
//!
//! Uses xorshift64* for fast, reproducible draws.
//! CRITICAL: Every stochastic choice in a run (roster shuffle, doctor
//! specialties, arrival gaps, triage, service durations) MUST go through
//! the single `RngManager` owned by that run.

mod xorshift;

pub use xorshift::RngManager;
