//! ESOP valuation with voluntary exercise and turnover.
//!
//! At each node the holder exercises voluntarily with probability `e(i, j)`;
//! when they do not, they leave with probability `tr` and must exercise
//! anyway. The total exercise probability is therefore
//!
//! ```text
//! P(i, j) = e(i, j) + (1 − e(i, j)) · tr
//! V(i, j) = P · payoff(i, j) + (1 − P) · c(i, j)
//! ```
//!
//! Payoffs inside the vesting period are zeroed before the recursion, so a
//! departure during vesting forfeits the option.

use pricer_core::math::grid::TriangularGrid;
use pricer_core::types::ExerciseStyle;

use super::{ExerciseRule, Node};
use crate::payoff::PayoffMatrix;
use crate::vesting::VestingContext;

/// Vesting, voluntary exercise and turnover.
#[derive(Clone, Copy, Debug)]
pub struct VestingTurnoverRule<'a> {
    style: ExerciseStyle,
    vesting: &'a VestingContext,
    exercise_probabilities: &'a TriangularGrid<f64>,
    turnover_rate: f64,
}

impl<'a> VestingTurnoverRule<'a> {
    /// Creates the rule from validated inputs.
    pub fn new(
        style: ExerciseStyle,
        vesting: &'a VestingContext,
        exercise_probabilities: &'a TriangularGrid<f64>,
        turnover_rate: f64,
    ) -> Self {
        Self {
            style,
            vesting,
            exercise_probabilities,
            turnover_rate,
        }
    }

    /// Total exercise probability at a node.
    #[inline]
    pub fn total_probability(&self, level: usize, step: usize) -> f64 {
        let voluntary = self.exercise_probabilities[(level, step)];
        voluntary + (1.0 - voluntary) * self.turnover_rate
    }
}

impl ExerciseRule for VestingTurnoverRule<'_> {
    fn name(&self) -> &'static str {
        "vesting-turnover"
    }

    fn prepare_payoffs(&self, payoffs: &mut PayoffMatrix) {
        self.vesting.mask_payoffs(payoffs);
    }

    #[inline]
    fn node_value(&self, node: &Node) -> f64 {
        let total = self.total_probability(node.level, node.step);
        let blended = total * node.payoff + (1.0 - total) * node.continuation;
        self.style.apply(node.payoff, blended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LatticeConfig;
    use approx::assert_relative_eq;

    fn vesting() -> VestingContext {
        let config = LatticeConfig::builder()
            .spot(100.0)
            .strike(100.0)
            .volatility(0.2)
            .maturity(2.0)
            .steps(4)
            .build()
            .unwrap();
        VestingContext::new(&config, 0.5).unwrap()
    }

    fn node(payoff: f64, continuation: f64) -> Node {
        Node {
            level: 0,
            step: 2,
            price: 120.0,
            payoff,
            continuation,
        }
    }

    #[test]
    fn test_total_probability() {
        let vesting = vesting();
        let probs = TriangularGrid::filled(4, 0.2);
        let rule = VestingTurnoverRule::new(ExerciseStyle::European, &vesting, &probs, 0.1);
        // 0.2 + 0.8 * 0.1
        assert_relative_eq!(rule.total_probability(0, 2), 0.28, max_relative = 1e-15);
    }

    #[test]
    fn test_blended_value() {
        let vesting = vesting();
        let probs = TriangularGrid::filled(4, 0.2);
        let rule = VestingTurnoverRule::new(ExerciseStyle::European, &vesting, &probs, 0.1);
        let value = rule.node_value(&node(20.0, 15.0));
        assert_relative_eq!(value, 0.28 * 20.0 + 0.72 * 15.0, max_relative = 1e-15);
    }

    #[test]
    fn test_american_floor() {
        let vesting = vesting();
        let probs = TriangularGrid::filled(4, 0.5);
        let rule = VestingTurnoverRule::new(ExerciseStyle::American, &vesting, &probs, 0.0);
        // blended 0.5 * 20 + 0.5 * 10 = 15 is below the payoff
        assert_eq!(rule.node_value(&node(20.0, 10.0)), 20.0);
    }

    #[test]
    fn test_zero_probabilities_reduce_to_continuation() {
        let vesting = vesting();
        let probs = TriangularGrid::filled(4, 0.0);
        let rule = VestingTurnoverRule::new(ExerciseStyle::European, &vesting, &probs, 0.0);
        assert_eq!(rule.node_value(&node(20.0, 12.5)), 12.5);
    }

    #[test]
    fn test_certain_exercise_takes_payoff() {
        let vesting = vesting();
        let probs = TriangularGrid::filled(4, 1.0);
        let rule = VestingTurnoverRule::new(ExerciseStyle::European, &vesting, &probs, 0.3);
        assert_eq!(rule.node_value(&node(20.0, 35.0)), 20.0);
    }
}
