//! Check command implementation
//!
//! Validates a job and reports the derived lattice measure without building
//! any grid.

use pricer_lattice::params::LatticeParameters;
use serde::Serialize;
use tracing::info;

use super::{price, render};
use crate::config::{Job, OutputFormat};
use crate::Result;

/// Derived measure of a valid job
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub rule: &'static str,
    pub steps: usize,
    pub dt: f64,
    pub up: f64,
    pub down: f64,
    pub probability: f64,
    pub discount: f64,
}

impl From<(&Job, LatticeParameters)> for CheckReport {
    fn from((job, params): (&Job, LatticeParameters)) -> Self {
        Self {
            rule: job.rule.name(),
            steps: params.steps(),
            dt: params.dt(),
            up: params.up(),
            down: params.down(),
            probability: params.probability(),
            discount: params.discount(),
        }
    }
}

/// Validate a job and derive its measure
pub fn check(job: &Job) -> Result<CheckReport> {
    job.rule.validate(&job.lattice)?;
    let params = price::pricer(job).parameters()?;
    info!(rule = job.rule.name(), "Job is valid");
    Ok(CheckReport::from((job, params)))
}

/// Run the check command
pub fn run(job: &Job) -> Result<()> {
    let report = check(job)?;
    match job.output.format {
        OutputFormat::Table => {
            let rows = [
                ("Rule", report.rule.to_string()),
                ("Steps", report.steps.to_string()),
                ("dt", format!("{:.6}", report.dt)),
                ("u", format!("{:.6}", report.up)),
                ("d", format!("{:.6}", report.down)),
                ("p", format!("{:.6}", report.probability)),
                ("Discount", format!("{:.6}", report.discount)),
            ];
            print!("{}", render::table(&rows));
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}
