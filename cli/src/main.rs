//! Inequity Inertia Simulator CLI
//!
//! Runs one seeded simulation and prints the final Group B tier share.

use clap::Parser;
use inertia_simulator_core_rs::orchestrator::{
    run_report, PolicyKind, SimulationConfig, SimulationError,
};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// CLI error types
#[derive(Debug, Error)]
enum CliError {
    /// Config file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Config file is not a valid configuration document
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Report could not be encoded
    #[error("Failed to serialize report: {0}")]
    Report(#[source] serde_json::Error),

    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

/// Simulate group representation inside a capacity-constrained power tier
#[derive(Parser, Debug)]
#[command(name = "inertia-sim")]
#[command(about = "Run one deterministic tier-representation simulation", long_about = None)]
struct Args {
    /// JSON file with a full or partial configuration (flags override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Population size (N)
    #[arg(short = 'n', long = "population-size")]
    population_size: Option<usize>,

    /// Probability an agent belongs to Group B
    #[arg(long)]
    pop_share_b: Option<f64>,

    /// Structural bias against Group B, in [0, 1]
    #[arg(long)]
    beta: Option<f64>,

    /// Intervention bonus for Group B (weighted policy)
    #[arg(long)]
    tau: Option<f64>,

    /// Capital gained per cycle inside the tier
    #[arg(long)]
    alpha: Option<f64>,

    /// Random capital drift scale
    #[arg(long)]
    gamma: Option<f64>,

    /// Tier capacity
    #[arg(short = 'c', long)]
    capacity: Option<usize>,

    /// Forced turnover rate per cycle
    #[arg(long)]
    turnover_rate: Option<f64>,

    /// Group A retention probability
    #[arg(long)]
    retention_a: Option<f64>,

    /// Group B retention probability
    #[arg(long)]
    retention_b: Option<f64>,

    /// Number of cycles (T)
    #[arg(short = 't', long)]
    cycles: Option<usize>,

    /// Selection policy (weighted, quota, random)
    #[arg(short = 'p', long)]
    policy: Option<String>,

    /// Minimum Group B share of admissions (quota policy)
    #[arg(long)]
    quota_min_b_share: Option<f64>,

    /// Capital weight in the selection score
    #[arg(short = 'k', long = "capital-weight")]
    k: Option<f64>,

    /// Extra capital noise scale
    #[arg(long)]
    noise_sd: Option<f64>,

    /// Master seed for determinism
    #[arg(short, long)]
    seed: Option<u64>,

    /// Record per-cycle results in the report
    #[arg(long)]
    trajectory: bool,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output (per-cycle debug logs)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Start from the config file (or defaults) and apply explicit flags
    fn build_config(&self) -> Result<SimulationConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
                    path: path.clone(),
                    source,
                })?;
                serde_json::from_str(&text).map_err(|source| CliError::Parse {
                    path: path.clone(),
                    source,
                })?
            }
            None => SimulationConfig::default(),
        };

        if let Some(v) = self.population_size {
            config.population_size = v;
        }
        if let Some(v) = self.pop_share_b {
            config.pop_share_b = v;
        }
        if let Some(v) = self.beta {
            config.beta = v;
        }
        if let Some(v) = self.tau {
            config.tau = v;
        }
        if let Some(v) = self.alpha {
            config.alpha = v;
        }
        if let Some(v) = self.gamma {
            config.gamma = v;
        }
        if let Some(v) = self.capacity {
            config.capacity_p = v;
        }
        if let Some(v) = self.turnover_rate {
            config.turnover_rate = v;
        }
        if let Some(v) = self.retention_a {
            config.retention_a = v;
        }
        if let Some(v) = self.retention_b {
            config.retention_b = v;
        }
        if let Some(v) = self.cycles {
            config.num_cycles = v;
        }
        if let Some(name) = &self.policy {
            config.policy = name.parse::<PolicyKind>()?;
        }
        if let Some(v) = self.quota_min_b_share {
            config.quota_min_b_share = v;
        }
        if let Some(v) = self.k {
            config.k = v;
        }
        if let Some(v) = self.noise_sd {
            config.noise_sd = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if self.trajectory {
            config.record_trajectory = true;
        }

        Ok(config)
    }
}

/// Log filter from `RUST_LOG`, falling back to the `-v` level
fn log_filter(verbose: bool, directives: Option<&str>) -> EnvFilter {
    let fallback = if verbose { "debug" } else { "info" };
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback))
}

fn run(args: &Args) -> Result<(), CliError> {
    let config = args.build_config()?;
    info!(policy = %config.policy, seed = config.seed, "running simulation");

    let report = run_report(config)?;
    if args.json {
        let json = serde_json::to_string_pretty(&report).map_err(CliError::Report)?;
        println!("{}", json);
    } else {
        println!("{}", report.representation_b);
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr so stdout stays machine-readable
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(args.verbose, rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
