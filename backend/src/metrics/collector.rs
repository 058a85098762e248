//! Statistics collector
//!
//! Accumulates samples over the irregular event timeline. Nothing here
//! drives the simulation; the orchestrator pushes a sample whenever the
//! corresponding quantity may have changed.

use crate::metrics::report::{
    DoctorSummary, PatientRecord, QueueEntryRecord, QueueSnapshot, Report, ReportSummary,
};
use crate::models::patient::{Patient, PatientStatus, TriagePriority};
use crate::models::state::SimulationState;
use crate::orchestrator::config::ClinicConfig;
use std::collections::BTreeMap;

/// Time-weighted mean of a step function given as `(time, value)` samples
///
/// Each sample holds until the next one. The last sample contributes
/// nothing, and fewer than two samples give zero.
///
/// The integration window runs to the last sample, which may lie past the
/// horizon while the divisor stays `horizon`. A run that drains after the
/// horizon can therefore report a mean above its maximum queue length.
///
/// # Example
/// ```
/// use clinic_simulator_core_rs::metrics::time_weighted_average;
///
/// let avg = time_weighted_average(&[(0.0, 0), (5.0, 1), (15.0, 0)], 15.0);
/// assert!((avg - 10.0 / 15.0).abs() < 1e-12);
/// ```
pub fn time_weighted_average(history: &[(f64, usize)], horizon: f64) -> f64 {
    if history.len() < 2 || horizon <= 0.0 {
        return 0.0;
    }

    let area: f64 = history
        .windows(2)
        .map(|w| {
            let (t, value) = w[0];
            let (t_next, _) = w[1];
            value as f64 * (t_next - t)
        })
        .sum();

    area / horizon
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Incremental statistics for one run
#[derive(Debug, Clone)]
pub struct StatisticsCollector {
    horizon: f64,

    /// `(time, queue length)` before every event and after every queue change
    queue_length_history: Vec<(f64, usize)>,

    /// `(time, busy doctors)` at every service start and end
    occupancy_history: Vec<(f64, usize)>,

    /// `(time, cumulative abandonments)` at every abandonment
    abandonment_history: Vec<(f64, usize)>,

    abandonments: usize,
    served: usize,

    /// Waits on entering service or abandoning, per priority
    wait_times: BTreeMap<TriagePriority, Vec<f64>>,

    /// Waits of dispatched patients only
    dispatched_waits: Vec<f64>,

    /// Arrival-to-departure times of served patients
    system_times: Vec<f64>,

    queue_entries: Vec<QueueEntryRecord>,
    queue_snapshots: Vec<QueueSnapshot>,
}

impl StatisticsCollector {
    pub fn new(horizon: f64) -> Self {
        let wait_times = TriagePriority::ALL
            .iter()
            .map(|p| (*p, Vec::new()))
            .collect();

        Self {
            horizon,
            queue_length_history: Vec::new(),
            occupancy_history: Vec::new(),
            abandonment_history: Vec::new(),
            abandonments: 0,
            served: 0,
            wait_times,
            dispatched_waits: Vec::new(),
            system_times: Vec::new(),
            queue_entries: Vec::new(),
            queue_snapshots: Vec::new(),
        }
    }

    pub fn record_queue_length(&mut self, time: f64, length: usize) {
        self.queue_length_history.push((time, length));
    }

    /// Who is in the queue, in queue order, after a queue change
    pub fn record_queue_snapshot(&mut self, time: f64, patient_ids: Vec<String>) {
        self.queue_snapshots.push(QueueSnapshot { time, patient_ids });
    }

    /// A patient joined the waiting queue
    pub fn record_queue_entry(&mut self, time: f64, patient: &Patient) {
        self.queue_entries.push(QueueEntryRecord {
            time,
            patient_id: patient.id().to_string(),
            name: patient.name().to_string(),
            specialty: patient.specialty().to_string(),
            priority: patient.priority(),
        });
    }

    pub fn record_occupancy(&mut self, time: f64, busy_doctors: usize) {
        self.occupancy_history.push((time, busy_doctors));
    }

    /// A patient entered service after waiting `wait` minutes
    pub fn record_service_start(&mut self, priority: TriagePriority, wait: f64) {
        self.wait_times.entry(priority).or_default().push(wait);
        self.dispatched_waits.push(wait);
    }

    /// A patient was served after `time_in_system` minutes in the clinic
    pub fn record_departure(&mut self, time_in_system: f64) {
        self.served += 1;
        self.system_times.push(time_in_system);
    }

    /// A patient abandoned the queue at `time` after `wait` minutes
    pub fn record_abandonment(&mut self, time: f64, priority: TriagePriority, wait: f64) {
        self.abandonments += 1;
        self.abandonment_history.push((time, self.abandonments));
        self.wait_times.entry(priority).or_default().push(wait);
    }

    pub fn abandonments(&self) -> usize {
        self.abandonments
    }

    pub fn served(&self) -> usize {
        self.served
    }

    pub fn queue_length_history(&self) -> &[(f64, usize)] {
        &self.queue_length_history
    }

    pub fn average_queue_length(&self) -> f64 {
        time_weighted_average(&self.queue_length_history, self.horizon)
    }

    pub fn max_queue_length(&self) -> usize {
        self.queue_length_history
            .iter()
            .map(|(_, len)| *len)
            .max()
            .unwrap_or(0)
    }

    /// Assemble the final report from the collected samples and end state
    pub fn build_report(
        &self,
        config: &ClinicConfig,
        config_hash: &str,
        state: &SimulationState,
    ) -> Report {
        let patients: BTreeMap<String, PatientRecord> = state
            .patients()
            .iter()
            .map(|(id, p)| (id.clone(), PatientRecord::from(p)))
            .collect();

        let doctors: Vec<DoctorSummary> = state
            .doctors()
            .doctors()
            .iter()
            .map(|d| DoctorSummary {
                id: d.id().to_string(),
                specialty: d.specialty().to_string(),
                busy_minutes: d.busy_minutes(),
                utilization: d.utilization(self.horizon),
            })
            .collect();

        let summary = ReportSummary {
            doctor_count: doctors.len(),
            total_arrivals: state.num_patients(),
            served: self.served,
            abandoned: self.abandonments,
            still_waiting: state.count_with_status(PatientStatus::Waiting),
            mean_wait: mean(&self.dispatched_waits),
            mean_time_in_system: mean(&self.system_times),
            average_queue_length: self.average_queue_length(),
            max_queue_length: self.max_queue_length(),
        };

        Report {
            config: config.clone(),
            config_hash: config_hash.to_string(),
            summary,
            queue_length_series: self.queue_length_history.clone(),
            occupancy_series: self.occupancy_history.clone(),
            abandonment_series: self.abandonment_history.clone(),
            wait_times_by_priority: self.wait_times.clone(),
            patients,
            doctors,
            queue_entries: self.queue_entries.clone(),
            queue_snapshots: self.queue_snapshots.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_weighted_average_degenerate_histories() {
        assert_eq!(time_weighted_average(&[], 10.0), 0.0);
        assert_eq!(time_weighted_average(&[(3.0, 4)], 10.0), 0.0);
    }

    #[test]
    fn test_zero_length_steps_contribute_nothing() {
        // Same-instant samples, as produced before and after a queue change
        let history = [(0.0, 0), (2.0, 0), (2.0, 1), (6.0, 1), (6.0, 0), (10.0, 0)];
        let avg = time_weighted_average(&history, 10.0);
        assert!((avg - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_abandonment_series_is_cumulative() {
        let mut c = StatisticsCollector::new(100.0);
        c.record_abandonment(30.0, TriagePriority::Standard, 30.0);
        c.record_abandonment(45.0, TriagePriority::Urgent, 60.0);

        assert_eq!(c.abandonments(), 2);
        assert_eq!(c.abandonment_history, vec![(30.0, 1), (45.0, 2)]);
        assert_eq!(c.wait_times[&TriagePriority::Urgent], vec![60.0]);
    }

    #[test]
    fn test_every_priority_has_a_wait_list() {
        let c = StatisticsCollector::new(100.0);
        for p in TriagePriority::ALL {
            assert!(c.wait_times[&p].is_empty());
        }
    }

    #[test]
    fn test_max_queue_length() {
        let mut c = StatisticsCollector::new(100.0);
        assert_eq!(c.max_queue_length(), 0);
        c.record_queue_length(0.0, 0);
        c.record_queue_length(1.0, 3);
        c.record_queue_length(2.0, 1);
        assert_eq!(c.max_queue_length(), 3);
    }
}
