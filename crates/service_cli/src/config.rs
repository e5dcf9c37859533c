//! Job configuration management
//!
//! A pricing job is assembled from a TOML job file, environment variables and
//! CLI flags. Priority (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (`LATTICE_LOG_LEVEL`, `LATTICE_STEPS`, `LATTICE_FORMAT`)
//! 3. Job file
//! 4. Default values (S0 = K = 100, σ = 20%, r = 5%, T = 1, two steps, European call)
//!
//! ```toml
//! [lattice]
//! spot = 50.0
//! strike = 50.0
//! volatility = 0.35
//! rate = 0.03
//! maturity = 5.0
//! steps = 200
//! exercise_style = "american"
//!
//! [rule]
//! kind = "barrier-turnover"
//! vesting_period = 1.0
//! turnover_rate = 0.05
//! exercise_multiplier = 2.0
//!
//! [output]
//! format = "json"
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use pricer_core::types::{ExerciseStyle, OptionKind};
use pricer_lattice::config::LatticeConfig;
use pricer_lattice::engine::Schedule;
use pricer_lattice::rules::{
    BarrierTurnoverSpec, ExerciseProbabilities, RuleSpec, VestingTurnoverSpec,
};
use serde::Deserialize;

use crate::{CliError, Result};

/// Environment variable overriding the log level
pub const ENV_LOG_LEVEL: &str = "LATTICE_LOG_LEVEL";
/// Environment variable overriding the step count
pub const ENV_STEPS: &str = "LATTICE_STEPS";
/// Environment variable overriding the output format
pub const ENV_FORMAT: &str = "LATTICE_FORMAT";

/// Log levels supported by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(CliError::Config(format!(
                "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                s
            ))),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Output formats for pricing results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(CliError::InvalidArgument(format!(
                "Unknown format: {}. Supported: table, json",
                other
            ))),
        }
    }
}

/// `[lattice]` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LatticeSection {
    pub spot: f64,
    pub strike: f64,
    pub volatility: f64,
    pub rate: f64,
    pub dividend_yield: f64,
    pub maturity: f64,
    pub steps: usize,
    pub option_kind: OptionKind,
    pub exercise_style: ExerciseStyle,
    /// Up multiplier override; requires `down`
    pub up: Option<f64>,
    /// Down multiplier override; requires `up`
    pub down: Option<f64>,
    /// Evaluate columns on the rayon pool
    pub parallel: bool,
}

impl Default for LatticeSection {
    fn default() -> Self {
        Self {
            spot: 100.0,
            strike: 100.0,
            volatility: 0.2,
            rate: 0.05,
            dividend_yield: 0.0,
            maturity: 1.0,
            steps: 2,
            option_kind: OptionKind::Call,
            exercise_style: ExerciseStyle::European,
            up: None,
            down: None,
            parallel: false,
        }
    }
}

/// `[rule]` section, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RuleSection {
    #[default]
    Plain,
    VestingTurnover {
        vesting_period: f64,
        turnover_rate: f64,
        /// Same voluntary-exercise probability at every node
        exercise_probability: Option<f64>,
        /// Square `(steps + 1) x (steps + 1)` matrix, one row per level
        exercise_probabilities: Option<Vec<Vec<f64>>>,
    },
    BarrierTurnover {
        vesting_period: f64,
        turnover_rate: f64,
        exercise_multiplier: f64,
    },
}

impl RuleSection {
    /// Convert to the engine rule selector
    pub fn to_rule_spec(&self) -> Result<RuleSpec> {
        match self {
            RuleSection::Plain => Ok(RuleSpec::Plain),
            RuleSection::VestingTurnover {
                vesting_period,
                turnover_rate,
                exercise_probability,
                exercise_probabilities,
            } => {
                let spec = VestingTurnoverSpec::new(*vesting_period, *turnover_rate);
                let spec = match (exercise_probability, exercise_probabilities) {
                    (Some(_), Some(_)) => {
                        return Err(CliError::Config(
                            "rule sets both exercise_probability and exercise_probabilities".to_string(),
                        ))
                    }
                    (Some(p), None) => spec.with_exercise_probabilities(ExerciseProbabilities::constant(*p)),
                    (None, Some(rows)) => {
                        spec.with_exercise_probabilities(ExerciseProbabilities::from_rows(rows.clone()))
                    }
                    (None, None) => spec,
                };
                Ok(RuleSpec::VestingTurnover(spec))
            }
            RuleSection::BarrierTurnover {
                vesting_period,
                turnover_rate,
                exercise_multiplier,
            } => Ok(RuleSpec::BarrierTurnover(BarrierTurnoverSpec::new(
                *vesting_period,
                *turnover_rate,
                *exercise_multiplier,
            ))),
        }
    }
}

/// `[output]` section
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    pub format: OutputFormat,
    /// Print the price, payoff and value grids
    pub show_grids: bool,
    /// Print the Black-Scholes reference for Plain European jobs
    pub reference: bool,
    pub log_level: LogLevel,
}

/// Job file structure
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobFile {
    pub lattice: LatticeSection,
    pub rule: RuleSection,
    pub output: OutputSection,
}

impl JobFile {
    /// Parse a job from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a job from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Override with environment variables read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.output.log_level = level.parse()?;
        }
        if let Some(steps) = lookup(ENV_STEPS) {
            self.lattice.steps = steps.trim().parse().map_err(|_| {
                CliError::Config(format!("{} must be a positive integer, got {:?}", ENV_STEPS, steps))
            })?;
        }
        if let Some(format) = lookup(ENV_FORMAT) {
            self.output.format = format.parse()?;
        }
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) {
        if let Some(steps) = cli.steps {
            self.lattice.steps = steps;
        }
        if let Some(style) = cli.exercise_style {
            self.lattice.exercise_style = style;
        }
        if let Some(format) = cli.format {
            self.output.format = format;
        }
        if let Some(level) = cli.log_level {
            self.output.log_level = level;
        }
        self.output.show_grids |= cli.show_grids;
        self.output.reference |= cli.reference;
        self.lattice.parallel |= cli.parallel;
    }
}

/// CLI arguments relevant to job assembly
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub job_file: Option<PathBuf>,
    pub steps: Option<usize>,
    pub exercise_style: Option<ExerciseStyle>,
    pub format: Option<OutputFormat>,
    pub log_level: Option<LogLevel>,
    pub show_grids: bool,
    pub reference: bool,
    pub parallel: bool,
}

/// Fully resolved pricing job
#[derive(Debug, Clone)]
pub struct Job {
    pub lattice: LatticeConfig,
    pub movements: Option<(f64, f64)>,
    pub schedule: Schedule,
    pub rule: RuleSpec,
    pub output: OutputSection,
}

impl Job {
    /// Validate the merged sections and build the engine inputs
    pub fn from_file_config(file: &JobFile) -> Result<Self> {
        let section = &file.lattice;
        let lattice = LatticeConfig::builder()
            .spot(section.spot)
            .strike(section.strike)
            .volatility(section.volatility)
            .rate(section.rate)
            .dividend_yield(section.dividend_yield)
            .maturity(section.maturity)
            .steps(section.steps)
            .option_kind(section.option_kind)
            .exercise_style(section.exercise_style)
            .build()?;
        let movements = match (section.up, section.down) {
            (Some(up), Some(down)) => Some((up, down)),
            (None, None) => None,
            _ => {
                return Err(CliError::Config(
                    "up and down multipliers must be given together".to_string(),
                ))
            }
        };
        Ok(Self {
            lattice,
            movements,
            schedule: if section.parallel {
                Schedule::Parallel
            } else {
                Schedule::Sequential
            },
            rule: file.rule.to_rule_spec()?,
            output: file.output.clone(),
        })
    }
}

/// Build the job from all sources using the process environment
pub fn build_job(cli: &CliArgs) -> Result<Job> {
    build_job_with_env(cli, |key| std::env::var(key).ok())
}

/// Build the job from all sources with an explicit environment lookup
pub fn build_job_with_env<F>(cli: &CliArgs, lookup: F) -> Result<Job>
where
    F: Fn(&str) -> Option<String>,
{
    let mut file = match &cli.job_file {
        Some(path) => JobFile::from_file(path)?,
        None => JobFile::default(),
    };
    file.apply_env(lookup)?;
    file.merge_with_cli(cli);
    Job::from_file_config(&file)
}
