//! Backward induction over the lattice.
//!
//! State machine over the time index, terminal state `j = M`, root state `j = 0`:
//!
//! 1. `V(·, M) = payoff(·, M)`
//! 2. For `j = M − 1, …, 0` and every level `i ≤ j`:
//!    `c = exp(−r dt)(p·V(i, j + 1) + (1 − p)·V(i + 1, j + 1))`, then `V(i, j)` from the rule
//! 3. `V(0, 0)` is the present value
//!
//! Column `j` only reads column `j + 1`, so the nodes of a column are
//! independent. [`Schedule::Parallel`] evaluates them with rayon; the column
//! loop itself is the barrier.

use rayon::prelude::*;
use tracing::trace;

use pricer_core::math::grid::TriangularGrid;

use crate::params::LatticeParameters;
use crate::payoff::PayoffMatrix;
use crate::rules::{ExerciseRule, Node};
use crate::tree::PriceTree;

/// Minimum number of nodes handed to a rayon task.
const PARALLEL_MIN_LEN: usize = 256;

/// How the nodes of a column are evaluated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Schedule {
    /// One node after another on the calling thread.
    #[default]
    Sequential,
    /// Nodes of a column in parallel on the rayon pool.
    Parallel,
}

/// Option values at every node, written once per node from maturity backwards.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueMatrix {
    grid: TriangularGrid<f64>,
}

impl ValueMatrix {
    /// Value at `(level, step)`.
    ///
    /// # Panics
    /// Panics outside the valid region.
    #[inline]
    pub fn value(&self, level: usize, step: usize) -> f64 {
        self.grid[(level, step)]
    }

    /// Root value `V(0, 0)`.
    #[inline]
    pub fn present_value(&self) -> f64 {
        self.grid[(0, 0)]
    }

    /// Values of column `step`.
    #[inline]
    pub fn column(&self, step: usize) -> &[f64] {
        self.grid.column(step)
    }

    /// Number of time steps.
    #[inline]
    pub fn steps(&self) -> usize {
        self.grid.steps()
    }

    /// Underlying grid.
    #[inline]
    pub fn grid(&self) -> &TriangularGrid<f64> {
        &self.grid
    }
}

/// Column-by-column recursion driven by an [`ExerciseRule`].
#[derive(Clone, Copy, Debug)]
pub struct BackwardInduction<'a> {
    params: &'a LatticeParameters,
    schedule: Schedule,
}

impl<'a> BackwardInduction<'a> {
    /// Creates a sequential engine for a derived measure.
    pub fn new(params: &'a LatticeParameters) -> Self {
        Self {
            params,
            schedule: Schedule::Sequential,
        }
    }

    /// Sets the column schedule.
    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Runs the recursion and returns the full value matrix.
    ///
    /// `payoffs` must already carry any rule masking; the terminal column of
    /// the result is a copy of its terminal column.
    ///
    /// # Panics
    /// Panics if the tree, payoffs and parameters disagree on the step count.
    pub fn run<R: ExerciseRule>(&self, tree: &PriceTree, payoffs: &PayoffMatrix, rule: &R) -> ValueMatrix {
        let steps = self.params.steps();
        assert_eq!(tree.steps(), steps, "price tree step count");
        assert_eq!(payoffs.steps(), steps, "payoff matrix step count");

        let mut grid = TriangularGrid::filled(steps, 0.0);
        grid.column_mut(steps).copy_from_slice(payoffs.column(steps));

        for step in (0..steps).rev() {
            let prices = tree.column(step);
            let intrinsic = payoffs.column(step);
            let (current, next) = grid.split_column_mut(step);
            match self.schedule {
                Schedule::Sequential => {
                    for (level, slot) in current.iter_mut().enumerate() {
                        *slot = self.node_value(rule, level, step, prices, intrinsic, next);
                    }
                }
                Schedule::Parallel => {
                    trace!(step, nodes = current.len(), "evaluating column in parallel");
                    current
                        .par_iter_mut()
                        .with_min_len(PARALLEL_MIN_LEN)
                        .enumerate()
                        .for_each(|(level, slot)| {
                            *slot = self.node_value(rule, level, step, prices, intrinsic, next);
                        });
                }
            }
        }

        ValueMatrix { grid }
    }

    #[inline]
    fn node_value<R: ExerciseRule>(
        &self,
        rule: &R,
        level: usize,
        step: usize,
        prices: &[f64],
        payoffs: &[f64],
        next: &[f64],
    ) -> f64 {
        let p = self.params.probability();
        let continuation = self.params.discount() * (p * next[level] + (1.0 - p) * next[level + 1]);
        rule.node_value(&Node {
            level,
            step,
            price: prices[level],
            payoff: payoffs[level],
            continuation,
        })
    }
}
