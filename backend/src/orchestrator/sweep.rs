//! Arrival-rate sweep
//!
//! Mean queue length against λ: one independent run per rate, all sharing
//! the base configuration's seed and the same roster.

use crate::models::patient::Identity;
use crate::orchestrator::config::ClinicConfig;
use crate::orchestrator::engine::{Orchestrator, SimulationError};
use log::info;
use serde::{Deserialize, Serialize};

/// Outcome of one run of a sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub arrival_rate_per_hour: f64,
    pub total_arrivals: usize,
    pub average_queue_length: f64,
    pub max_queue_length: usize,
    pub abandoned: usize,
}

/// Run `base` once per rate in `rates`, in order
///
/// Fails on the first rate that does not validate.
pub fn sweep_arrival_rates(
    base: &ClinicConfig,
    roster: &[Identity],
    rates: &[f64],
) -> Result<Vec<SweepPoint>, SimulationError> {
    rates
        .iter()
        .map(|&rate| {
            let config = ClinicConfig {
                arrival_rate_per_hour: rate,
                ..base.clone()
            };
            let report = Orchestrator::new(config, roster.to_vec())?.run()?;
            info!(
                "Sweep λ={}/h: mean queue {:.3}",
                rate, report.summary.average_queue_length
            );

            Ok(SweepPoint {
                arrival_rate_per_hour: rate,
                total_arrivals: report.summary.total_arrivals,
                average_queue_length: report.summary.average_queue_length,
                max_queue_length: report.summary.max_queue_length,
                abandoned: report.summary.abandoned,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::config::ConfigError;

    fn roster(n: usize) -> Vec<Identity> {
        (0..n)
            .map(|i| Identity::new(format!("p{}", i), format!("Patient {}", i)))
            .collect()
    }

    #[test]
    fn test_one_point_per_rate_in_order() {
        let points =
            sweep_arrival_rates(&ClinicConfig::default(), &roster(300), &[5.0, 20.0]).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].arrival_rate_per_hour, 5.0);
        assert_eq!(points[1].arrival_rate_per_hour, 20.0);
    }

    #[test]
    fn test_sweep_point_matches_single_run() {
        let base = ClinicConfig::default();
        let people = roster(300);
        let points = sweep_arrival_rates(&base, &people, &[12.0]).unwrap();

        let single = Orchestrator::new(
            ClinicConfig {
                arrival_rate_per_hour: 12.0,
                ..base
            },
            people,
        )
        .unwrap()
        .run()
        .unwrap();

        assert_eq!(points[0].average_queue_length, single.summary.average_queue_length);
        assert_eq!(points[0].total_arrivals, single.summary.total_arrivals);
    }

    #[test]
    fn test_invalid_rate_fails() {
        let err = sweep_arrival_rates(&ClinicConfig::default(), &roster(10), &[0.0]).unwrap_err();
        assert_eq!(
            err,
            SimulationError::Configuration(ConfigError::InvalidArrivalRate(0.0))
        );
    }
}
