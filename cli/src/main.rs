//! station-udf - batch UDF optimization over a station CSV
//!
//! ```text
//! station-udf [INPUT] [OUTPUT] [DISCRETIZATION] [--checkpoint-dir DIR] [--workers N] ...
//! ```
//!
//! Re-running with the same checkpoint directory resumes: stations that
//! already have a checkpoint are reloaded instead of recomputed.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use station_udf_core_rs::ctmc::DEFAULT_EULER_ITERATIONS;
use station_udf_core_rs::io::{load_stations, write_results};
use station_udf_core_rs::orchestrator::DEFAULT_CHECKPOINT_DIR;
use station_udf_core_rs::{
    BatchConfig, BatchOrchestrator, ExponentialMethod, PenaltyRates, StepTiming, UdfConfig,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "station-udf", version, about = "Optimal starting inventory per bike-share station")]
struct Args {
    /// Station CSV (id, name, rentalrate_HH:MM..., returnrate_HH:MM..., capacity)
    #[arg(default_value = "../data/station_30min_intervals_with_capacity.csv")]
    input: PathBuf,

    /// Consolidated results CSV
    #[arg(default_value = "results.csv")]
    output: PathBuf,

    /// Integration step length in minutes
    #[arg(default_value_t = 30.0)]
    discretization: f64,

    /// Cost of one renter finding the station empty
    #[arg(long, default_value_t = 1.0)]
    penalty_renter: f64,

    /// Cost of one returner finding the station full
    #[arg(long, default_value_t = 1.0)]
    penalty_returner: f64,

    /// Elapsed time passed to each step's transition matrix
    #[arg(long, value_enum, default_value_t = TimingArg::SlotCumulative)]
    step_timing: TimingArg,

    /// Matrix exponential method
    #[arg(long, value_enum, default_value_t = MethodArg::Pade)]
    exponential: MethodArg,

    /// Iterations for `--exponential euler-limit`
    #[arg(long, default_value_t = DEFAULT_EULER_ITERATIONS)]
    euler_iterations: usize,

    /// Directory for per-station checkpoints
    #[arg(long, default_value = DEFAULT_CHECKPOINT_DIR)]
    checkpoint_dir: PathBuf,

    /// Worker threads (default: one per logical CPU)
    #[arg(long)]
    workers: Option<usize>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TimingArg {
    SlotCumulative,
    PerStep,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MethodArg {
    Pade,
    EulerLimit,
}

impl Args {
    fn batch_config(&self) -> BatchConfig {
        let step_timing = match self.step_timing {
            TimingArg::SlotCumulative => StepTiming::SlotCumulative,
            TimingArg::PerStep => StepTiming::PerStep,
        };
        let exponential = match self.exponential {
            MethodArg::Pade => ExponentialMethod::Pade,
            MethodArg::EulerLimit => ExponentialMethod::EulerLimit {
                iterations: self.euler_iterations,
            },
        };

        BatchConfig {
            udf: UdfConfig {
                discretization_minutes: self.discretization,
                penalties: PenaltyRates {
                    renter: self.penalty_renter,
                    returner: self.penalty_returner,
                },
                step_timing,
                exponential,
            },
            checkpoint_dir: self.checkpoint_dir.clone(),
            workers: self.workers,
        }
    }
}

fn run(args: Args) -> Result<()> {
    info!("Loading stations from: {}", args.input.display());
    info!("Using discretization level: {} minutes", args.discretization);

    let stations = load_stations(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    if stations.is_empty() {
        bail!("No stations were loaded from the file.");
    }
    info!("Loaded {} stations.", stations.len());

    let orchestrator = BatchOrchestrator::new(args.batch_config())?;
    let report = orchestrator.run(&stations)?;

    let rows = write_results(&args.output, &stations, &report)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!(rows, "Results written to: {}", args.output.display());

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
