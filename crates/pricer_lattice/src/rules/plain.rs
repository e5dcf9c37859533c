//! European and American exercise.

use pricer_core::types::ExerciseStyle;

use super::{ExerciseRule, Node};

/// Standard exercise: hold for European, `max(payoff, continuation)` for American.
///
/// # Examples
///
/// ```rust
/// use pricer_core::types::ExerciseStyle;
/// use pricer_lattice::rules::{ExerciseRule, Node, PlainRule};
///
/// let node = Node { level: 0, step: 0, price: 90.0, payoff: 10.0, continuation: 8.0 };
/// assert_eq!(PlainRule::new(ExerciseStyle::European).node_value(&node), 8.0);
/// assert_eq!(PlainRule::new(ExerciseStyle::American).node_value(&node), 10.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlainRule {
    style: ExerciseStyle,
}

impl PlainRule {
    /// Creates the rule for an exercise style.
    pub fn new(style: ExerciseStyle) -> Self {
        Self { style }
    }

    /// Configured exercise style.
    pub fn style(&self) -> ExerciseStyle {
        self.style
    }
}

impl ExerciseRule for PlainRule {
    fn name(&self) -> &'static str {
        "plain"
    }

    #[inline]
    fn node_value(&self, node: &Node) -> f64 {
        self.style.apply(node.payoff, node.continuation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(payoff: f64, continuation: f64) -> Node {
        Node {
            level: 1,
            step: 3,
            price: 100.0,
            payoff,
            continuation,
        }
    }

    #[test]
    fn test_european_ignores_payoff() {
        let rule = PlainRule::new(ExerciseStyle::European);
        assert_eq!(rule.node_value(&node(50.0, 1.0)), 1.0);
        assert!(!rule.forces_exercise(3, 1e9));
    }

    #[test]
    fn test_american_takes_maximum() {
        let rule = PlainRule::new(ExerciseStyle::American);
        assert_eq!(rule.node_value(&node(50.0, 1.0)), 50.0);
        assert_eq!(rule.node_value(&node(0.5, 1.0)), 1.0);
        assert_eq!(rule.style(), ExerciseStyle::American);
    }
}
