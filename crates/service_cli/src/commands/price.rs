//! Price command implementation
//!
//! Prices one job with the pricer_lattice engine and prints the result as a
//! table or as JSON, optionally with every intermediate grid.

use pricer_core::math::grid::TriangularGrid;
use pricer_lattice::analytical::black_scholes;
use pricer_lattice::pricer::{LatticePricer, LatticeValuation, ValuationSummary};
use pricer_lattice::rules::RuleSpec;
use serde::Serialize;
use tracing::{info, warn};

use super::render;
use crate::config::{Job, OutputFormat};
use crate::Result;

/// Valuation of a job together with its optional reference price
#[derive(Debug, Clone)]
pub struct PriceReport {
    pub valuation: LatticeValuation,
    /// Black-Scholes price, for Plain European jobs when requested
    pub reference: Option<f64>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    summary: ValuationSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    black_scholes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    grids: Option<JsonGrids<'a>>,
}

#[derive(Serialize)]
struct JsonGrids<'a> {
    price_tree: &'a TriangularGrid<f64>,
    payoffs: &'a TriangularGrid<f64>,
    values: &'a TriangularGrid<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vesting_mask: Option<&'a TriangularGrid<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    forced_exercise: Option<&'a TriangularGrid<bool>>,
}

/// Configure the engine for a job
pub fn pricer(job: &Job) -> LatticePricer {
    let pricer = LatticePricer::new(job.lattice.clone()).with_schedule(job.schedule);
    match job.movements {
        Some((up, down)) => pricer.with_movements(up, down),
        None => pricer,
    }
}

/// Price a job
pub fn price(job: &Job) -> Result<PriceReport> {
    info!(
        rule = job.rule.name(),
        steps = job.lattice.steps(),
        kind = %job.lattice.option_kind(),
        style = %job.lattice.exercise_style(),
        schedule = ?job.schedule,
        "Starting pricing"
    );

    let valuation = pricer(job).price(&job.rule)?;

    let reference = if !job.output.reference {
        None
    } else if job.rule == RuleSpec::Plain && job.lattice.exercise_style().is_european() {
        Some(black_scholes(&job.lattice))
    } else {
        warn!(
            rule = job.rule.name(),
            style = %job.lattice.exercise_style(),
            "Black-Scholes reference only applies to Plain European jobs"
        );
        None
    };

    info!(present_value = valuation.present_value, "Pricing complete");
    Ok(PriceReport { valuation, reference })
}

impl PriceReport {
    /// Render the report in the requested format
    pub fn render(&self, format: OutputFormat, show_grids: bool) -> Result<String> {
        match format {
            OutputFormat::Table => Ok(self.render_table(show_grids)),
            OutputFormat::Json => self.render_json(show_grids),
        }
    }

    fn render_table(&self, show_grids: bool) -> String {
        let valuation = &self.valuation;
        let mut out = String::new();

        if show_grids {
            out.push_str(&render::values("Price tree", valuation.price_tree.grid()));
            out.push('\n');
            out.push_str(&render::values("Payoffs", valuation.payoffs.grid()));
            out.push('\n');
            if let Some(mask) = &valuation.vesting_mask {
                out.push_str(&render::flags("Vesting mask", mask));
                out.push('\n');
            }
            if let Some(forced) = &valuation.forced_exercise {
                out.push_str(&render::flags("Forced exercise", forced));
                out.push('\n');
            }
            out.push_str(&render::values("Option values", valuation.values.grid()));
            out.push('\n');
        }

        let summary = valuation.summary();
        let mut rows = vec![
            ("Rule", summary.rule.clone()),
            ("Steps", summary.steps.to_string()),
            ("dt", format!("{:.6}", summary.dt)),
            ("u", format!("{:.6}", summary.up)),
            ("d", format!("{:.6}", summary.down)),
            ("p", format!("{:.6}", summary.probability)),
        ];
        if let Some(count) = summary.forced_exercise_nodes {
            rows.push(("Forced nodes", count.to_string()));
        }
        rows.push(("Present value", format!("{:.6}", summary.present_value)));
        if let Some(reference) = self.reference {
            rows.push(("Black-Scholes", format!("{:.6}", reference)));
        }
        out.push_str(&render::table(&rows));
        out
    }

    fn render_json(&self, show_grids: bool) -> Result<String> {
        let valuation = &self.valuation;
        let report = JsonReport {
            summary: valuation.summary(),
            black_scholes: self.reference,
            grids: show_grids.then(|| JsonGrids {
                price_tree: valuation.price_tree.grid(),
                payoffs: valuation.payoffs.grid(),
                values: valuation.values.grid(),
                vesting_mask: valuation.vesting_mask.as_ref(),
                forced_exercise: valuation.forced_exercise.as_ref(),
            }),
        };
        let mut json = serde_json::to_string_pretty(&report)?;
        json.push('\n');
        Ok(json)
    }
}

/// Run the price command
pub fn run(job: &Job) -> Result<()> {
    let report = price(job)?;
    print!("{}", report.render(job.output.format, job.output.show_grids)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{build_job_with_env, CliArgs, JobFile};
    use approx::assert_relative_eq;

    fn default_job(cli: &CliArgs) -> Job {
        build_job_with_env(cli, |_| None).unwrap()
    }

    #[test]
    fn test_default_job_prices_reference_scenario() {
        let report = price(&default_job(&CliArgs::default())).unwrap();
        assert_relative_eq!(report.valuation.present_value, 9.540_501_338_582_947, epsilon = 1e-6);
        assert!(report.reference.is_none());
    }

    #[test]
    fn test_reference_for_plain_european() {
        let cli = CliArgs {
            steps: Some(500),
            reference: true,
            ..Default::default()
        };
        let report = price(&default_job(&cli)).unwrap();
        let reference = report.reference.unwrap();
        assert!((report.valuation.present_value - reference).abs() < 0.01);
    }

    #[test]
    fn test_reference_skipped_for_esop() {
        let file = JobFile::from_toml_str(
            r#"
            [lattice]
            maturity = 4.0
            steps = 16
            [rule]
            kind = "barrier-turnover"
            vesting_period = 1.0
            turnover_rate = 0.05
            exercise_multiplier = 1.5
            [output]
            reference = true
            "#,
        )
        .unwrap();
        let job = Job::from_file_config(&file).unwrap();
        let report = price(&job).unwrap();
        assert!(report.reference.is_none());
        assert!(report.valuation.forced_exercise.is_some());
    }

    #[test]
    fn test_table_output() {
        let report = price(&default_job(&CliArgs::default())).unwrap();
        let table = report.render(OutputFormat::Table, false).unwrap();
        assert!(table.contains("│ Present value │ 9.540501"));
        assert!(!table.contains("Price tree"));

        let with_grids = report.render(OutputFormat::Table, true).unwrap();
        assert!(with_grids.starts_with("Price tree\n"));
        assert!(with_grids.contains("132.6896"));
        assert!(with_grids.contains("Option values"));
    }

    #[test]
    fn test_json_output() {
        let report = price(&default_job(&CliArgs::default())).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&report.render(OutputFormat::Json, true).unwrap()).unwrap();
        assert_eq!(json["rule"], "plain");
        assert_eq!(json["steps"], 2);
        assert_relative_eq!(json["present_value"].as_f64().unwrap(), 9.540_501_338_582_947, epsilon = 1e-6);
        assert!(json.get("black_scholes").is_none());
        assert!(json["grids"]["values"].is_object());
        assert!(json["grids"].get("vesting_mask").is_none());

        let compact: serde_json::Value =
            serde_json::from_str(&report.render(OutputFormat::Json, false).unwrap()).unwrap();
        assert!(compact.get("grids").is_none());
    }

    #[test]
    fn test_pricing_error_propagates() {
        let file = JobFile::from_toml_str(
            r#"
            [rule]
            kind = "vesting-turnover"
            vesting_period = 0.5
            turnover_rate = 0.1
            "#,
        )
        .unwrap();
        let job = Job::from_file_config(&file).unwrap();
        assert!(matches!(price(&job), Err(crate::CliError::Pricing(_))));
    }

    #[test]
    fn test_json_grids_read_back_with_shape_check() {
        let report = price(&default_job(&CliArgs::default())).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&report.render(OutputFormat::Json, true).unwrap()).unwrap();
        let values: TriangularGrid<f64> =
            serde_json::from_value(json["grids"]["values"].clone()).unwrap();
        assert_eq!(values.steps(), 2);
        assert_eq!(values.node_count(), 6);
        assert_relative_eq!(values[(0, 0)], report.valuation.present_value, max_relative = 1e-12);

        let ragged = serde_json::json!({ "columns": [[0.3], [0.3, 0.3], [0.3]] });
        assert!(serde_json::from_value::<TriangularGrid<f64>>(ragged).is_err());
    }
}
