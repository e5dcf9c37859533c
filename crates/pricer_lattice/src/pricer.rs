//! Pricing orchestration.
//!
//! [`LatticePricer`] validates the configuration and rule context, derives
//! the measure, builds the price tree and payoffs, and runs the backward
//! induction with the selected rule:
//!
//! ```text
//! LatticeConfig + RuleSpec
//! └── validate (InvalidInput, before any grid)
//!     └── LatticeParameters (ArbitrageViolation, NumericDegeneracy)
//!         └── vesting mask, exercise probabilities
//!         └── PriceTree → PayoffMatrix → [rule masking] → BackwardInduction
//!             └── LatticeValuation { present value, grids }
//! ```
//!
//! Each call owns its grids; a pricer may be shared across threads.

use tracing::debug;

use pricer_core::math::grid::TriangularGrid;
use pricer_core::types::PricingError;

use crate::config::LatticeConfig;
use crate::engine::{BackwardInduction, Schedule, ValueMatrix};
use crate::params::{LatticeParameters, MovementSource};
use crate::payoff::PayoffMatrix;
use crate::rules::{
    BarrierTurnoverRule, BarrierTurnoverSpec, ExerciseRule, PlainRule, RuleSpec,
    VestingTurnoverRule,
};
use crate::tree::PriceTree;
use crate::vesting::VestingContext;

/// Binomial lattice pricer.
///
/// # Examples
///
/// ```rust
/// use pricer_lattice::config::LatticeConfig;
/// use pricer_lattice::pricer::LatticePricer;
/// use pricer_lattice::rules::RuleSpec;
///
/// let config = LatticeConfig::builder()
///     .spot(100.0).strike(100.0).volatility(0.2).rate(0.05).maturity(1.0).steps(2)
///     .build()
///     .unwrap();
/// let pv = LatticePricer::new(config).present_value(&RuleSpec::Plain).unwrap();
/// assert!((pv - 9.540_501_338_582_947).abs() < 1e-6);
/// ```
#[derive(Clone, Debug)]
pub struct LatticePricer {
    config: LatticeConfig,
    movements: Option<(f64, f64)>,
    schedule: Schedule,
}

impl LatticePricer {
    /// Creates a pricer with CRR movements and a sequential schedule.
    pub fn new(config: LatticeConfig) -> Self {
        Self {
            config,
            movements: None,
            schedule: Schedule::Sequential,
        }
    }

    /// Overrides the up/down multipliers; `p` is recomputed from them.
    pub fn with_movements(mut self, up: f64, down: f64) -> Self {
        self.movements = Some((up, down));
        self
    }

    /// Sets the column schedule of the backward induction.
    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Lattice configuration.
    #[inline]
    pub fn config(&self) -> &LatticeConfig {
        &self.config
    }

    /// Derives the lattice measure without building any grid.
    ///
    /// # Errors
    ///
    /// See [`LatticeParameters::derive`] and [`LatticeParameters::with_movements`].
    pub fn parameters(&self) -> Result<LatticeParameters, PricingError> {
        let params = match self.movements {
            Some((up, down)) => LatticeParameters::with_movements(&self.config, up, down)?,
            None => LatticeParameters::derive(&self.config)?,
        };
        debug!(
            steps = params.steps(),
            dt = params.dt(),
            up = params.up(),
            down = params.down(),
            probability = params.probability(),
            overridden = params.source() == MovementSource::Override,
            "Derived lattice parameters"
        );
        Ok(params)
    }

    /// Present value under `rule`.
    ///
    /// # Errors
    ///
    /// Propagates every error of [`price`](Self::price).
    pub fn present_value(&self, rule: &RuleSpec) -> Result<f64, PricingError> {
        Ok(self.price(rule)?.present_value)
    }

    /// Prices under `rule`, returning the value together with every grid.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an invalid configuration or rule context
    /// - `ArbitrageViolation` if `p` falls outside (0, 1)
    /// - `NumericDegeneracy` if `u == d`
    pub fn price(&self, rule: &RuleSpec) -> Result<LatticeValuation, PricingError> {
        self.config.validate()?;
        rule.validate(&self.config)?;
        let params = self.parameters()?;
        let inputs = RuleInputs::resolve(rule, &self.config, &params)?;

        let tree = PriceTree::build(&self.config, &params);
        let payoffs = PayoffMatrix::evaluate(&tree, self.config.strike(), self.config.option_kind());
        let style = self.config.exercise_style();
        debug!(
            rule = rule.name(),
            style = %style,
            nodes = tree.grid().node_count(),
            "Built price tree and payoffs"
        );

        let valuation = match inputs {
            RuleInputs::Plain => {
                let (payoffs, values) = self.induct(&params, &tree, payoffs, &PlainRule::new(style));
                LatticeValuation::new(params, tree, payoffs, values, rule.name())
            }
            RuleInputs::VestingTurnover {
                vesting,
                probabilities,
                turnover_rate,
            } => {
                let esop = VestingTurnoverRule::new(style, &vesting, &probabilities, turnover_rate);
                let (payoffs, values) = self.induct(&params, &tree, payoffs, &esop);
                LatticeValuation::new(params, tree, payoffs, values, rule.name())
                    .with_vesting_mask(vesting.mask().clone())
            }
            RuleInputs::BarrierTurnover { vesting, spec } => {
                let barrier = BarrierTurnoverRule::new(
                    style,
                    &vesting,
                    self.config.strike(),
                    spec.exercise_multiplier,
                    spec.turnover_rate,
                    params.dt(),
                );
                let (payoffs, values) = self.induct(&params, &tree, payoffs, &barrier);
                let forced = forced_exercise_map(&tree, &barrier);
                debug!(
                    trigger_price = barrier.trigger_price(),
                    forced_nodes = forced.iter().filter(|&(_, _, f)| f).count(),
                    "Applied exercise multiple trigger"
                );
                LatticeValuation::new(params, tree, payoffs, values, rule.name())
                    .with_vesting_mask(vesting.mask().clone())
                    .with_forced_exercise(forced)
            }
        };

        debug!(
            rule = valuation.rule,
            present_value = valuation.present_value,
            "Lattice valuation complete"
        );
        Ok(valuation)
    }

    fn induct<R: ExerciseRule>(
        &self,
        params: &LatticeParameters,
        tree: &PriceTree,
        mut payoffs: PayoffMatrix,
        rule: &R,
    ) -> (PayoffMatrix, ValueMatrix) {
        rule.prepare_payoffs(&mut payoffs);
        let values = BackwardInduction::new(params)
            .with_schedule(self.schedule)
            .run(tree, &payoffs, rule);
        (payoffs, values)
    }
}

/// Rule context resolved against the lattice, ahead of the price tree.
enum RuleInputs {
    Plain,
    VestingTurnover {
        vesting: VestingContext,
        probabilities: TriangularGrid<f64>,
        turnover_rate: f64,
    },
    BarrierTurnover {
        vesting: VestingContext,
        spec: BarrierTurnoverSpec,
    },
}

impl RuleInputs {
    fn resolve(
        rule: &RuleSpec,
        config: &LatticeConfig,
        params: &LatticeParameters,
    ) -> Result<Self, PricingError> {
        Ok(match rule {
            RuleSpec::Plain => RuleInputs::Plain,
            RuleSpec::VestingTurnover(spec) => RuleInputs::VestingTurnover {
                vesting: VestingContext::new(config, spec.vesting_period)?,
                probabilities: spec.probabilities()?.resolve(params.steps())?,
                turnover_rate: spec.turnover_rate,
            },
            RuleSpec::BarrierTurnover(spec) => RuleInputs::BarrierTurnover {
                vesting: VestingContext::new(config, spec.vesting_period)?,
                spec: *spec,
            },
        })
    }
}

/// Marks the non-terminal nodes where `rule` forces exercise.
fn forced_exercise_map<R: ExerciseRule>(tree: &PriceTree, rule: &R) -> TriangularGrid<bool> {
    let steps = tree.steps();
    tree.grid()
        .map(|_, step, price| step < steps && rule.forces_exercise(step, price))
}

/// Present value with every intermediate grid of one valuation.
#[derive(Clone, Debug)]
pub struct LatticeValuation {
    /// Root value `V(0, 0)`.
    pub present_value: f64,
    /// Derived measure.
    pub parameters: LatticeParameters,
    /// Underlying prices.
    pub price_tree: PriceTree,
    /// Payoffs as seen by the rule, after vesting masking.
    pub payoffs: PayoffMatrix,
    /// Option values.
    pub values: ValueMatrix,
    /// Nodes inside the vesting period (ESOP rules only).
    pub vesting_mask: Option<TriangularGrid<bool>>,
    /// Nodes where the exercise multiple trigger fired (BarrierTurnover only).
    pub forced_exercise: Option<TriangularGrid<bool>>,
    /// Identifier of the rule that produced the values.
    pub rule: &'static str,
}

impl LatticeValuation {
    fn new(
        parameters: LatticeParameters,
        price_tree: PriceTree,
        payoffs: PayoffMatrix,
        values: ValueMatrix,
        rule: &'static str,
    ) -> Self {
        Self {
            present_value: values.present_value(),
            parameters,
            price_tree,
            payoffs,
            values,
            vesting_mask: None,
            forced_exercise: None,
            rule,
        }
    }

    fn with_vesting_mask(mut self, mask: TriangularGrid<bool>) -> Self {
        self.vesting_mask = Some(mask);
        self
    }

    fn with_forced_exercise(mut self, forced: TriangularGrid<bool>) -> Self {
        self.forced_exercise = Some(forced);
        self
    }

    /// Scalar summary for reporting.
    pub fn summary(&self) -> ValuationSummary {
        ValuationSummary {
            rule: self.rule.to_string(),
            present_value: self.present_value,
            steps: self.parameters.steps(),
            dt: self.parameters.dt(),
            up: self.parameters.up(),
            down: self.parameters.down(),
            probability: self.parameters.probability(),
            forced_exercise_nodes: self
                .forced_exercise
                .as_ref()
                .map(|grid| grid.iter().filter(|&(_, _, f)| f).count()),
        }
    }
}

/// Scalar outputs of a valuation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValuationSummary {
    /// Rule identifier.
    pub rule: String,
    /// Root value.
    pub present_value: f64,
    /// Number of time steps.
    pub steps: usize,
    /// Step size in years.
    pub dt: f64,
    /// Up multiplier.
    pub up: f64,
    /// Down multiplier.
    pub down: f64,
    /// Risk-neutral probability.
    pub probability: f64,
    /// Count of forced-exercise nodes, when the rule has a trigger.
    pub forced_exercise_nodes: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{ExerciseProbabilities, VestingTurnoverSpec};
    use approx::assert_relative_eq;
    use pricer_core::types::{ExerciseStyle, OptionKind};

    fn config(steps: usize) -> LatticeConfig {
        LatticeConfig::builder()
            .spot(100.0)
            .strike(100.0)
            .volatility(0.2)
            .rate(0.05)
            .maturity(1.0)
            .steps(steps)
            .build()
            .unwrap()
    }

    #[test]
    fn test_plain_valuation_exposes_grids() {
        let valuation = LatticePricer::new(config(2)).price(&RuleSpec::Plain).unwrap();
        assert_relative_eq!(valuation.present_value, 9.540_501_338_582_947, epsilon = 1e-6);
        assert_eq!(valuation.price_tree.steps(), 2);
        assert_eq!(valuation.values.column(2), valuation.payoffs.column(2));
        assert!(valuation.vesting_mask.is_none());
        assert!(valuation.forced_exercise.is_none());
        assert_eq!(valuation.rule, "plain");
    }

    #[test]
    fn test_invalid_rule_rejected_before_parameters() {
        // Both the rule and the measure are invalid; the rule error wins
        let arbitrage = LatticeConfig::builder()
            .spot(100.0)
            .strike(100.0)
            .volatility(0.01)
            .rate(0.5)
            .maturity(1.0)
            .steps(1)
            .build()
            .unwrap();
        let rule = RuleSpec::BarrierTurnover(BarrierTurnoverSpec::new(0.5, 0.1, 0.5));
        let result = LatticePricer::new(arbitrage.clone()).price(&rule);
        assert!(matches!(result, Err(PricingError::InvalidInput(_))));

        let result = LatticePricer::new(arbitrage).price(&RuleSpec::Plain);
        assert!(matches!(result, Err(PricingError::ArbitrageViolation { .. })));
    }

    #[test]
    fn test_movement_override() {
        let pricer = LatticePricer::new(config(1)).with_movements(1.2, 0.8);
        let params = pricer.parameters().unwrap();
        assert_eq!(params.source(), MovementSource::Override);
        let pv = pricer.present_value(&RuleSpec::Plain).unwrap();
        let p = ((0.05_f64).exp() - 0.8) / 0.4;
        assert_relative_eq!(pv, (-0.05_f64).exp() * p * 20.0, max_relative = 1e-14);
    }

    #[test]
    fn test_vesting_turnover_masks_payoffs() {
        let config = LatticeConfig::builder()
            .spot(100.0)
            .strike(90.0)
            .volatility(0.3)
            .rate(0.03)
            .maturity(4.0)
            .steps(8)
            .option_kind(OptionKind::Call)
            .build()
            .unwrap();
        let rule = RuleSpec::VestingTurnover(
            VestingTurnoverSpec::new(1.0, 0.05)
                .with_exercise_probabilities(ExerciseProbabilities::constant(0.1)),
        );
        let valuation = LatticePricer::new(config).price(&rule).unwrap();
        let mask = valuation.vesting_mask.as_ref().unwrap();
        for (level, step, masked) in mask.iter() {
            if masked {
                assert_eq!(valuation.payoffs.payoff(level, step), 0.0);
            }
        }
        assert!(valuation.payoffs.payoff(0, 2) == 0.0);
        assert!(valuation.payoffs.payoff(0, 3) > 0.0);
        assert!(valuation.present_value > 0.0);
    }

    #[test]
    fn test_barrier_forced_exercise_map() {
        let config = LatticeConfig::builder()
            .spot(100.0)
            .strike(100.0)
            .volatility(0.4)
            .rate(0.03)
            .maturity(4.0)
            .steps(16)
            .build()
            .unwrap();
        let rule = RuleSpec::BarrierTurnover(BarrierTurnoverSpec::new(1.0, 0.05, 1.5));
        let valuation = LatticePricer::new(config).price(&rule).unwrap();
        let forced = valuation.forced_exercise.as_ref().unwrap();
        for (level, step, is_forced) in forced.iter() {
            let price = valuation.price_tree.price(level, step);
            let expected = step < 16 && price >= 150.0 && step > 4;
            assert_eq!(is_forced, expected, "node ({}, {})", level, step);
            if is_forced {
                assert_eq!(valuation.values.value(level, step), valuation.payoffs.payoff(level, step));
            }
        }
        let summary = valuation.summary();
        assert!(summary.forced_exercise_nodes.unwrap() > 0);
        assert_eq!(summary.rule, "barrier-turnover");
    }

    #[test]
    fn test_misshaped_probabilities_rejected_before_measure() {
        // The rule error is reported even though the measure has arbitrage
        let arbitrage = LatticeConfig::builder()
            .spot(100.0)
            .strike(100.0)
            .volatility(0.01)
            .rate(0.5)
            .maturity(1.0)
            .steps(2)
            .build()
            .unwrap();
        let rule = RuleSpec::VestingTurnover(
            VestingTurnoverSpec::new(0.5, 0.1)
                .with_exercise_probabilities(ExerciseProbabilities::from_rows(vec![vec![0.1; 7]; 7])),
        );
        let result = LatticePricer::new(arbitrage).price(&rule);
        assert!(matches!(result, Err(PricingError::InvalidInput(_))));

        let mut rows = vec![vec![0.1; 3]; 3];
        rows[0][1] = 5.0;
        let rule = RuleSpec::VestingTurnover(
            VestingTurnoverSpec::new(0.5, 0.1)
                .with_exercise_probabilities(ExerciseProbabilities::from_rows(rows)),
        );
        match LatticePricer::new(config(2)).price(&rule) {
            Err(PricingError::InvalidInput(msg)) => assert!(msg.contains("level 0, step 1")),
            other => panic!("Expected InvalidInput, got {:?}", other.map(|v| v.present_value)),
        }
    }

    #[test]
    fn test_missing_probabilities_fail() {
        let rule = RuleSpec::VestingTurnover(VestingTurnoverSpec::new(0.5, 0.1));
        let result = LatticePricer::new(config(4)).price(&rule);
        assert!(matches!(result, Err(PricingError::InvalidInput(_))));
    }

    #[test]
    fn test_parallel_schedule_same_result() {
        let american = config(800)
            .to_builder()
            .exercise_style(ExerciseStyle::American)
            .option_kind(OptionKind::Put)
            .build()
            .unwrap();
        let sequential = LatticePricer::new(american.clone())
            .present_value(&RuleSpec::Plain)
            .unwrap();
        let parallel = LatticePricer::new(american)
            .with_schedule(Schedule::Parallel)
            .present_value(&RuleSpec::Plain)
            .unwrap();
        assert_eq!(sequential, parallel);
    }
}
