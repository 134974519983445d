//! SecureScan simulation CLI.
//!
//! Runs a configured number of discovery exchanges under either protocol,
//! prints the run summary, and optionally appends the shared-schema CSV
//! row for the analysis tooling. Passing `--seed` switches to the
//! deterministic environment (virtual clock, seeded RNG); without it the
//! run uses the real clock and OS entropy, so handshake timings are
//! wall-clock measurements.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use securescan_core::{Environment, Protocol};
use securescan_sim::{oracle, SimConfig, SimEnv, Simulation, SystemEnv};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "securescan", version, about = "Privacy-preserving Wi-Fi discovery simulator")]
struct Args {
    /// Number of stations
    #[arg(short = 's', long, default_value_t = 1)]
    stations: usize,

    /// Number of access points
    #[arg(short = 'a', long, default_value_t = 1)]
    access_points: usize,

    /// Probability that a (station, access point) pair is trusted
    #[arg(short = 'p', long = "probability", default_value_t = 0.5)]
    probability: f64,

    /// Number of exchanges to simulate
    #[arg(short = 'n', long, default_value_t = 100)]
    iterations: usize,

    /// Discovery protocol: standard or secure_scan
    #[arg(long, default_value = "secure_scan")]
    protocol: Protocol,

    /// Seed for a deterministic run on a virtual clock
    #[arg(long)]
    seed: Option<u64>,

    /// Append the run's summary row to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Dump every frame sent
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = SimConfig {
        protocol: args.protocol,
        stations: args.stations,
        access_points: args.access_points,
        connection_probability: args.probability,
        iterations: args.iterations,
        verbose: args.verbose,
        ..SimConfig::default()
    };

    match args.seed {
        Some(seed) => run(config, SimEnv::new(seed), args.csv.as_deref()),
        None => run(config, SystemEnv::new(), args.csv.as_deref()),
    }
}

fn run<E: Environment>(config: SimConfig, env: E, csv: Option<&Path>) -> anyhow::Result<()> {
    let mut simulation = Simulation::new(config, env).map_err(anyhow::Error::msg)?;
    let report = simulation.run();

    simulation
        .verify(oracle::all_of(vec![
            oracle::no_pending_exchanges(),
            oracle::history_well_formed(),
            oracle::rotating_addresses_unique(),
        ]))
        .map_err(anyhow::Error::msg)
        .context("post-run invariant check failed")?;

    println!("{report}");
    if let Some(path) = csv {
        report
            .append_csv(path)
            .with_context(|| format!("appending to {}", path.display()))?;
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}
