use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{info, warn};

use clinic_simulator_core_rs::{sweep_arrival_rates, ClinicConfig, Identity, Orchestrator, Report};

#[derive(Parser, Debug)]
#[clap(about = "Discrete-event simulation of an outpatient clinic", long_about = None)]
struct Args {
    /// Configuration JSON file (missing fields take defaults).
    #[clap(long)]
    config: Option<PathBuf>,

    /// Roster JSON file: a list of {"id", "name"} records.
    #[clap(long)]
    roster: Option<PathBuf>,

    /// Size of the generated roster when --roster is not given.
    #[clap(long, default_value = "500")]
    roster_size: usize,

    /// Number of doctors.
    #[clap(long)]
    doctors: Option<usize>,

    /// Horizon in hours.
    #[clap(long)]
    hours: Option<f64>,

    /// Arrivals per hour.
    #[clap(long)]
    rate: Option<f64>,

    /// Service time family (exponential/normal/uniform).
    #[clap(long)]
    distribution: Option<String>,

    /// Random seed.
    #[clap(long)]
    seed: Option<u64>,

    /// Write the full report as JSON to this path.
    #[clap(long)]
    output: Option<PathBuf>,

    /// Print the terminal record of one patient.
    #[clap(long)]
    patient: Option<String>,

    /// Comma-separated arrival rates per hour for a mean-queue sweep.
    #[clap(long, value_delimiter = ',')]
    sweep: Vec<f64>,
}

fn load_config(args: &Args) -> Result<ClinicConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ClinicConfig::default(),
    };

    if let Some(doctors) = args.doctors {
        config.doctor_count = doctors;
    }
    if let Some(hours) = args.hours {
        config.horizon_minutes = hours * 60.0;
    }
    if let Some(rate) = args.rate {
        config.arrival_rate_per_hour = rate;
    }
    if let Some(distribution) = &args.distribution {
        config.service_time_distribution = distribution.clone();
    }
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }

    Ok(config)
}

fn load_roster(args: &Args) -> Result<Vec<Identity>> {
    match &args.roster {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading roster {}", path.display()))?;
            let roster: Vec<Identity> = serde_json::from_str(&text)
                .with_context(|| format!("parsing roster {}", path.display()))?;
            info!("Loaded {} identities from {}", roster.len(), path.display());
            Ok(roster)
        }
        None => Ok((0..args.roster_size)
            .map(|i| Identity::new(format!("p{:04}", i), format!("Patient {}", i)))
            .collect()),
    }
}

/// Print the terminal record of one patient; an unknown id is reported, not fatal
fn print_patient(report: &Report, id: &str) -> Result<()> {
    match report.patient(id) {
        Some(record) => println!("{}", serde_json::to_string_pretty(record)?),
        None => {
            warn!("Patient lookup found no record for {}", id);
            println!("patient {} not found", id);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let roster = load_roster(&args)?;

    let mut orchestrator = Orchestrator::new(config.clone(), roster.clone())?;
    let report = orchestrator.run()?;
    print!("{}", report);

    if let Some(path) = &args.output {
        fs::write(path, report.to_json_pretty()?)
            .with_context(|| format!("writing report {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    if let Some(id) = &args.patient {
        print_patient(&report, id)?;
    }

    if !args.sweep.is_empty() {
        println!("--- Mean queue vs arrival rate ---");
        for point in sweep_arrival_rates(&config, &roster, &args.sweep)? {
            println!(
                "{:>6.1}/h  arrivals {:>4}  mean queue {:>7.3}  max {:>3}  abandoned {:>3}",
                point.arrival_rate_per_hour,
                point.total_arrivals,
                point.average_queue_length,
                point.max_queue_length,
                point.abandoned
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_simulator_core_rs::{Doctor, PlannedArrival, TriagePriority};

    fn one_patient_report() -> Report {
        let config = ClinicConfig {
            specialties: vec!["x".to_string()],
            ..Default::default()
        };
        let arrivals = vec![PlannedArrival::new(
            1.0,
            Identity::new("a", "A"),
            "x",
            TriagePriority::Standard,
        )
        .with_service_minutes(5.0)];
        Orchestrator::from_scenario(config, vec![Doctor::new("m0", "x")], arrivals)
            .unwrap()
            .run()
            .unwrap()
    }

    #[test]
    fn test_unknown_patient_is_not_fatal() {
        let report = one_patient_report();
        assert!(report.patient("nobody").is_none());
        assert!(print_patient(&report, "nobody").is_ok());
    }

    #[test]
    fn test_known_patient_prints_record() {
        let report = one_patient_report();
        assert!(print_patient(&report, "a").is_ok());
    }
}
