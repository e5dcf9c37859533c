//! Exercise rules for backward induction.
//!
//! An [`ExerciseRule`] turns a node's payoff and its discounted continuation
//! value into the node value. One recursion engine serves every rule; the
//! rule is chosen by configuration through [`RuleSpec`] and dispatched
//! statically.
//!
//! | Rule | Node value |
//! |------|------------|
//! | [`PlainRule`] | `c` (European) or `max(payoff, c)` (American) |
//! | [`VestingTurnoverRule`] | `P·payoff + (1 − P)·c`, `P = e + (1 − e)·tr` |
//! | [`BarrierTurnoverRule`] | `payoff` when `S ≥ m·K` after vesting, else `tr·dt·payoff + (1 − tr·dt)·c` |

mod barrier_turnover;
mod plain;
mod vesting_turnover;

pub use barrier_turnover::BarrierTurnoverRule;
pub use plain::PlainRule;
pub use vesting_turnover::VestingTurnoverRule;

use pricer_core::math::grid::{check_square, TriangularGrid};
use pricer_core::types::PricingError;

use crate::config::LatticeConfig;
use crate::payoff::PayoffMatrix;
use crate::vesting::validate_vesting_period;

/// Everything a rule may read at a single node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    /// Row index, the number of down moves.
    pub level: usize,
    /// Column index, the time step.
    pub step: usize,
    /// Underlying price at the node.
    pub price: f64,
    /// Payoff at the node, after any rule masking.
    pub payoff: f64,
    /// Discounted expectation of the next column, `exp(−r dt)(p·V_up + (1 − p)·V_down)`.
    pub continuation: f64,
}

/// Node valuation policy.
///
/// Rules must be `Sync` so that a column may be evaluated concurrently.
pub trait ExerciseRule: Sync {
    /// Short identifier used in logs and summaries.
    fn name(&self) -> &'static str;

    /// Adjusts payoffs before the recursion starts. The default leaves them untouched.
    fn prepare_payoffs(&self, _payoffs: &mut PayoffMatrix) {}

    /// Value of a non-terminal node.
    fn node_value(&self, node: &Node) -> f64;

    /// Returns whether exercise is forced at a node regardless of continuation.
    fn forces_exercise(&self, _step: usize, _price: f64) -> bool {
        false
    }
}

/// Voluntary-exercise propensities per node, in [0, 1].
#[derive(Clone, Debug, PartialEq)]
pub enum ExerciseProbabilities {
    /// Same probability at every node.
    Constant(f64),
    /// Square `(M + 1) x (M + 1)` row-major matrix, `rows[level][step]`.
    Rows(Vec<Vec<f64>>),
    /// Triangular grid with the lattice shape.
    Grid(TriangularGrid<f64>),
}

impl ExerciseProbabilities {
    /// Same probability everywhere.
    pub fn constant(probability: f64) -> Self {
        ExerciseProbabilities::Constant(probability)
    }

    /// Square row-major matrix, one row per level.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        ExerciseProbabilities::Rows(rows)
    }

    /// Triangular grid.
    pub fn from_grid(grid: TriangularGrid<f64>) -> Self {
        ExerciseProbabilities::Grid(grid)
    }

    /// Checks shape and range against a lattice with `steps` steps without
    /// building a grid.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::InvalidInput` if the shape does not match the
    /// lattice or any valid-region entry lies outside [0, 1].
    pub fn validate(&self, steps: usize) -> Result<(), PricingError> {
        match self {
            ExerciseProbabilities::Constant(probability) => {
                if in_unit_interval(*probability) {
                    Ok(())
                } else {
                    Err(PricingError::invalid(format!(
                        "exercise probability must be in [0, 1], got {}",
                        probability
                    )))
                }
            }
            ExerciseProbabilities::Rows(rows) => {
                check_square(steps, rows)?;
                let mut entries = (0..=steps)
                    .flat_map(|step| (0..=step).map(move |level| (level, step, rows[level][step])));
                check_range(&mut entries)
            }
            ExerciseProbabilities::Grid(grid) => {
                if grid.steps() != steps {
                    return Err(PricingError::invalid(format!(
                        "exercise probability grid has {} steps, lattice has {}",
                        grid.steps(),
                        steps
                    )));
                }
                check_range(&mut grid.iter())
            }
        }
    }

    /// Resolves to a validated grid for a lattice with `steps` steps.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn resolve(&self, steps: usize) -> Result<TriangularGrid<f64>, PricingError> {
        self.validate(steps)?;
        let grid = match self {
            ExerciseProbabilities::Constant(probability) => {
                TriangularGrid::filled(steps, *probability)
            }
            ExerciseProbabilities::Rows(rows) => TriangularGrid::from_square(steps, rows)?,
            ExerciseProbabilities::Grid(grid) => grid.clone(),
        };
        Ok(grid)
    }
}

fn check_range(
    entries: &mut dyn Iterator<Item = (usize, usize, f64)>,
) -> Result<(), PricingError> {
    match Iterator::find(&mut &mut *entries, |&(_, _, value)| !in_unit_interval(value)) {
        Some((level, step, value)) => Err(PricingError::invalid(format!(
            "exercise probability at (level {}, step {}) must be in [0, 1], got {}",
            level, step, value
        ))),
        None => Ok(()),
    }
}

/// Context for [`VestingTurnoverRule`].
///
/// Exercise probabilities must be attached with
/// [`with_exercise_probabilities`](Self::with_exercise_probabilities)
/// before pricing.
#[derive(Clone, Debug, PartialEq)]
pub struct VestingTurnoverSpec {
    /// Vesting period in years.
    pub vesting_period: f64,
    /// Per-period attrition probability in [0, 1].
    pub turnover_rate: f64,
    /// Voluntary-exercise propensities.
    pub exercise_probabilities: Option<ExerciseProbabilities>,
}

impl VestingTurnoverSpec {
    /// Creates a spec without exercise probabilities.
    pub fn new(vesting_period: f64, turnover_rate: f64) -> Self {
        Self {
            vesting_period,
            turnover_rate,
            exercise_probabilities: None,
        }
    }

    /// Attaches the exercise probabilities.
    pub fn with_exercise_probabilities(mut self, probabilities: ExerciseProbabilities) -> Self {
        self.exercise_probabilities = Some(probabilities);
        self
    }

    /// Attached probabilities, or `InvalidInput` when none were supplied.
    pub fn probabilities(&self) -> Result<&ExerciseProbabilities, PricingError> {
        self.exercise_probabilities
            .as_ref()
            .ok_or_else(|| PricingError::invalid("exercise probabilities must be supplied before pricing"))
    }
}

/// Context for [`BarrierTurnoverRule`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarrierTurnoverSpec {
    /// Vesting period in years.
    pub vesting_period: f64,
    /// Annualised attrition rate; `turnover_rate · dt` is the per-step weight.
    pub turnover_rate: f64,
    /// Price-to-strike ratio that forces exercise after vesting, at least 1.
    pub exercise_multiplier: f64,
}

impl BarrierTurnoverSpec {
    /// Creates a spec.
    pub fn new(vesting_period: f64, turnover_rate: f64, exercise_multiplier: f64) -> Self {
        Self {
            vesting_period,
            turnover_rate,
            exercise_multiplier,
        }
    }
}

/// Exercise rule selector with its rule-specific context.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RuleSpec {
    /// European or American exercise, driven by the configured style.
    #[default]
    Plain,
    /// ESOP with vesting, voluntary exercise and turnover.
    VestingTurnover(VestingTurnoverSpec),
    /// ESOP with vesting, turnover and a price-multiple exercise trigger.
    BarrierTurnover(BarrierTurnoverSpec),
}

impl RuleSpec {
    /// Short identifier of the selected rule.
    pub fn name(&self) -> &'static str {
        match self {
            RuleSpec::Plain => "plain",
            RuleSpec::VestingTurnover(_) => "vesting-turnover",
            RuleSpec::BarrierTurnover(_) => "barrier-turnover",
        }
    }

    /// Validates the rule context against the lattice configuration.
    ///
    /// No grid is built here. Exercise probabilities are checked for shape
    /// and range against `config.steps()`.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::InvalidInput` if:
    /// - the vesting period is negative or exceeds the maturity
    /// - the turnover rate is outside [0, 1]
    /// - exercise probabilities are missing, misshaped or outside [0, 1] (VestingTurnover)
    /// - the exercise multiplier is below 1, or `turnover_rate · dt` exceeds 1 (BarrierTurnover)
    pub fn validate(&self, config: &LatticeConfig) -> Result<(), PricingError> {
        match self {
            RuleSpec::Plain => Ok(()),
            RuleSpec::VestingTurnover(spec) => {
                validate_vesting_period(spec.vesting_period, config.maturity())?;
                validate_turnover_rate(spec.turnover_rate)?;
                spec.probabilities()?.validate(config.steps())
            }
            RuleSpec::BarrierTurnover(spec) => {
                validate_vesting_period(spec.vesting_period, config.maturity())?;
                validate_turnover_rate(spec.turnover_rate)?;
                if !(spec.exercise_multiplier.is_finite() && spec.exercise_multiplier >= 1.0) {
                    return Err(PricingError::invalid(format!(
                        "exercise multiplier must be at least 1, got {}",
                        spec.exercise_multiplier
                    )));
                }
                let step_weight = spec.turnover_rate * config.dt();
                if step_weight > 1.0 {
                    return Err(PricingError::invalid(format!(
                        "per-step turnover weight {} exceeds 1 (turnover rate {} with dt {})",
                        step_weight,
                        spec.turnover_rate,
                        config.dt()
                    )));
                }
                Ok(())
            }
        }
    }
}

#[inline]
fn in_unit_interval(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

fn validate_turnover_rate(turnover_rate: f64) -> Result<(), PricingError> {
    if in_unit_interval(turnover_rate) {
        Ok(())
    } else {
        Err(PricingError::invalid(format!(
            "turnover rate must be in [0, 1], got {}",
            turnover_rate
        )))
    }
}
