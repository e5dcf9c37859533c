//! ESOP valuation with a price-multiple exercise trigger.
//!
//! Once vesting has elapsed, the holder exercises as soon as the underlying
//! reaches `m · K`. Elsewhere the option is exposed to departure at rate
//! `tr` per year:
//!
//! ```text
//! V(i, j) = payoff(i, j)                               if S(i, j) ≥ m·K and T·(j/M) > vesting
//! V(i, j) = tr·dt · payoff(i, j) + (1 − tr·dt) · c     otherwise
//! ```

use pricer_core::types::ExerciseStyle;

use super::{ExerciseRule, Node};
use crate::payoff::PayoffMatrix;
use crate::vesting::VestingContext;

/// Vesting, turnover and a barrier-style exercise trigger.
#[derive(Clone, Copy, Debug)]
pub struct BarrierTurnoverRule<'a> {
    style: ExerciseStyle,
    vesting: &'a VestingContext,
    trigger_price: f64,
    step_turnover: f64,
}

impl<'a> BarrierTurnoverRule<'a> {
    /// Creates the rule from validated inputs.
    ///
    /// # Arguments
    ///
    /// * `strike` - Option strike (K)
    /// * `exercise_multiplier` - Trigger ratio (m), at least 1
    /// * `turnover_rate` - Annualised attrition rate (tr)
    /// * `dt` - Step size in years
    pub fn new(
        style: ExerciseStyle,
        vesting: &'a VestingContext,
        strike: f64,
        exercise_multiplier: f64,
        turnover_rate: f64,
        dt: f64,
    ) -> Self {
        Self {
            style,
            vesting,
            trigger_price: exercise_multiplier * strike,
            step_turnover: turnover_rate * dt,
        }
    }

    /// Underlying price at and above which vested options are exercised.
    #[inline]
    pub fn trigger_price(&self) -> f64 {
        self.trigger_price
    }
}

impl ExerciseRule for BarrierTurnoverRule<'_> {
    fn name(&self) -> &'static str {
        "barrier-turnover"
    }

    fn prepare_payoffs(&self, payoffs: &mut PayoffMatrix) {
        self.vesting.mask_payoffs(payoffs);
    }

    #[inline]
    fn node_value(&self, node: &Node) -> f64 {
        let value = if self.forces_exercise(node.step, node.price) {
            node.payoff
        } else {
            self.step_turnover * node.payoff + (1.0 - self.step_turnover) * node.continuation
        };
        self.style.apply(node.payoff, value)
    }

    #[inline]
    fn forces_exercise(&self, step: usize, price: f64) -> bool {
        price >= self.trigger_price && self.vesting.is_vested(step)
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
            .maturity(4.0)
            .steps(4)
            .build()
            .unwrap();
        VestingContext::new(&config, 1.0).unwrap()
    }

    fn node(step: usize, price: f64, payoff: f64, continuation: f64) -> Node {
        Node {
            level: 0,
            step,
            price,
            payoff,
            continuation,
        }
    }

    #[test]
    fn test_trigger_after_vesting() {
        let vesting = vesting();
        let rule = BarrierTurnoverRule::new(ExerciseStyle::European, &vesting, 100.0, 1.5, 0.1, 1.0);
        assert_eq!(rule.trigger_price(), 150.0);
        assert!(rule.forces_exercise(2, 150.0));
        assert!(!rule.forces_exercise(2, 149.0));
        // step 1 is at exactly the vesting period: not yet vested
        assert!(!rule.forces_exercise(1, 200.0));
        assert_eq!(rule.node_value(&node(2, 160.0, 60.0, 75.0)), 60.0);
    }

    #[test]
    fn test_turnover_blend_below_trigger() {
        let vesting = vesting();
        let rule = BarrierTurnoverRule::new(ExerciseStyle::European, &vesting, 100.0, 2.0, 0.1, 1.0);
        let value = rule.node_value(&node(2, 130.0, 30.0, 40.0));
        assert_relative_eq!(value, 0.1 * 30.0 + 0.9 * 40.0, max_relative = 1e-15);
    }

    #[test]
    fn test_american_floor_applies_on_top() {
        let vesting = vesting();
        let rule = BarrierTurnoverRule::new(ExerciseStyle::American, &vesting, 100.0, 3.0, 0.0, 1.0);
        assert_eq!(rule.node_value(&node(3, 140.0, 40.0, 35.0)), 40.0);
        assert_eq!(rule.node_value(&node(3, 140.0, 40.0, 45.0)), 45.0);
    }
}
