//! Property tests over generated runs
//!
//! Arbitrary seeds, rates, doctor counts and service families; each case
//! steps a run event by event and checks the state invariants after every
//! transition.

use clinic_simulator_core_rs::{
    ClinicConfig, Identity, Orchestrator, PatientStatus, TriagePriority,
};
use proptest::prelude::*;

fn roster(n: usize) -> Vec<Identity> {
    (0..n)
        .map(|i| Identity::new(format!("p{:03}", i), format!("Patient {}", i)))
        .collect()
}

fn config_strategy() -> impl Strategy<Value = ClinicConfig> {
    (
        any::<u64>(),
        2.0f64..40.0,
        1usize..6,
        prop::sample::select(vec!["exponential", "normal", "uniform"]),
    )
        .prop_map(|(seed, rate, doctors, family)| ClinicConfig {
            rng_seed: seed,
            arrival_rate_per_hour: rate,
            doctor_count: doctors,
            service_time_distribution: family.to_string(),
            ..Default::default()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_same_seed_same_report(config in config_strategy()) {
        let a = Orchestrator::new(config.clone(), roster(120)).unwrap().run().unwrap();
        let b = Orchestrator::new(config, roster(120)).unwrap().run().unwrap();
        prop_assert_eq!(a.digest().unwrap(), b.digest().unwrap());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_invariants_hold_after_every_event(config in config_strategy()) {
        let mut orchestrator = Orchestrator::new(config, roster(120)).unwrap();

        while let Some(step) = orchestrator.step().unwrap() {
            let state = orchestrator.state();

            // Queue holds exactly the waiting patients, and the last sample agrees
            let waiting = state.count_with_status(PatientStatus::Waiting);
            prop_assert_eq!(state.queue_size(), waiting);
            prop_assert_eq!(step.queue_length, waiting);
            let last_sample = orchestrator.collector().queue_length_history().last().copied();
            prop_assert_eq!(last_sample.map(|(_, len)| len), Some(waiting));

            // At most one patient in service per doctor, matching its busy flag
            for doctor in state.doctors().doctors() {
                let serving = state.patients_in_service_on(doctor.id());
                prop_assert!(serving.len() <= 1);
                prop_assert_eq!(serving.len() == 1, doctor.is_busy());
            }
            prop_assert_eq!(
                state.count_with_status(PatientStatus::InService),
                state.doctors().busy_count()
            );
        }
    }

    #[test]
    fn prop_conservation_and_critical_never_abandon(config in config_strategy()) {
        let staffed_everything = config.doctor_count >= config.specialties.len();
        let report = Orchestrator::new(config, roster(120)).unwrap().run().unwrap();
        let s = &report.summary;

        prop_assert_eq!(s.served + s.abandoned + s.still_waiting, s.total_arrivals);

        for p in report.patients.values() {
            prop_assert!(p.status != PatientStatus::InService);
            if p.priority == TriagePriority::Critical {
                prop_assert!(p.status != PatientStatus::Abandoned);
            }
            // Only Critical patients can be stranded, and only on an unstaffed specialty
            if p.status == PatientStatus::Waiting {
                prop_assert_eq!(p.priority, TriagePriority::Critical);
                prop_assert!(!staffed_everything);
            }
        }
    }

    #[test]
    fn prop_utilization_within_unit_interval(config in config_strategy()) {
        let report = Orchestrator::new(config, roster(120)).unwrap().run().unwrap();
        for d in &report.doctors {
            prop_assert!(d.utilization >= 0.0 && d.utilization <= 1.0 + 1e-12);
        }
    }
}
