//! Neutryx Lattice CLI - Command Line Driver for the Binomial Lattice Engine
//!
//! # Commands
//!
//! - `lattice price [--job <file>]` - Price a job and print the present value
//! - `lattice check [--job <file>]` - Validate a job and print `dt`, `u`, `d`, `p`
//!
//! # Architecture
//!
//! As part of the **S**ervice layer, this crate supplies `LatticeConfig` and
//! the exercise rule to pricer_lattice from job files, environment variables
//! and flags, and formats the results.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use pricer_core::types::ExerciseStyle;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;

pub use error::{CliError, Result};

use config::{build_job, CliArgs, LogLevel, OutputFormat};

/// Neutryx binomial lattice pricer
#[derive(Parser)]
#[command(name = "lattice")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct JobArgs {
    /// Job file path (TOML format)
    #[arg(short, long, value_name = "FILE")]
    job: Option<PathBuf>,

    /// Number of time steps
    #[arg(short, long)]
    steps: Option<usize>,

    /// Exercise style (european, american)
    #[arg(short, long)]
    exercise_style: Option<ExerciseStyle>,

    /// Output format (table, json)
    #[arg(short, long)]
    format: Option<OutputFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a job
    Price {
        #[command(flatten)]
        job: JobArgs,

        /// Print the price, payoff and value grids
        #[arg(long)]
        show_grids: bool,

        /// Evaluate lattice columns in parallel
        #[arg(long)]
        parallel: bool,

        /// Print the Black-Scholes reference (Plain European jobs)
        #[arg(long)]
        reference: bool,
    },

    /// Validate a job without building any grid
    Check {
        #[command(flatten)]
        job: JobArgs,
    },
}

impl Cli {
    fn to_config_args(&self) -> CliArgs {
        let log_level = if self.verbose {
            Some(LogLevel::Debug)
        } else {
            self.log_level
        };
        let (job, show_grids, parallel, reference) = match &self.command {
            Commands::Price {
                job,
                show_grids,
                parallel,
                reference,
            } => (job, *show_grids, *parallel, *reference),
            Commands::Check { job } => (job, false, false, false),
        };
        CliArgs {
            job_file: job.job.clone(),
            steps: job.steps,
            exercise_style: job.exercise_style,
            format: job.format,
            log_level,
            show_grids,
            reference,
            parallel,
        }
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let args = cli.to_config_args();
    let job = build_job(&args).context("Failed to assemble pricing job")?;

    init_tracing(job.output.log_level.as_filter_str());
    debug!(
        job_file = ?args.job_file,
        rule = job.rule.name(),
        steps = job.lattice.steps(),
        format = ?job.output.format,
        "Job configuration loaded"
    );

    match cli.command {
        Commands::Price { .. } => commands::price::run(&job).context("Pricing failed")?,
        Commands::Check { .. } => commands::check::run(&job).context("Job check failed")?,
    }
    Ok(())
}
