//! Intrinsic exercise values over the price tree.

use pricer_core::math::grid::TriangularGrid;
use pricer_core::types::OptionKind;

use crate::tree::PriceTree;

/// Intrinsic value at every valid node of a [`PriceTree`].
///
/// `payoff(i, j) = max(S(i, j) − K, 0)` for a call and `max(K − S(i, j), 0)` for a put.
#[derive(Clone, Debug, PartialEq)]
pub struct PayoffMatrix {
    grid: TriangularGrid<f64>,
}

impl PayoffMatrix {
    /// Evaluates the payoff of `kind` struck at `strike` on every node of `tree`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pricer_core::types::OptionKind;
    /// use pricer_lattice::config::LatticeConfig;
    /// use pricer_lattice::params::LatticeParameters;
    /// use pricer_lattice::payoff::PayoffMatrix;
    /// use pricer_lattice::tree::PriceTree;
    ///
    /// let config = LatticeConfig::builder()
    ///     .spot(100.0).strike(100.0).volatility(0.2).maturity(1.0).steps(4)
    ///     .build()
    ///     .unwrap();
    /// let params = LatticeParameters::derive(&config).unwrap();
    /// let tree = PriceTree::build(&config, &params);
    /// let payoffs = PayoffMatrix::evaluate(&tree, 100.0, OptionKind::Put);
    ///
    /// assert_eq!(payoffs.payoff(0, 4), 0.0);
    /// assert!(payoffs.payoff(4, 4) > 0.0);
    /// ```
    pub fn evaluate(tree: &PriceTree, strike: f64, kind: OptionKind) -> Self {
        let grid = tree.grid().map(|_, _, spot| kind.intrinsic(spot, strike));
        Self { grid }
    }

    /// Payoff at `(level, step)`.
    ///
    /// # Panics
    /// Panics outside the valid region.
    #[inline]
    pub fn payoff(&self, level: usize, step: usize) -> f64 {
        self.grid[(level, step)]
    }

    /// Payoffs of column `step`.
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

    /// Zeroes every node where `mask(level, step)` holds.
    ///
    /// Masking is irreversible: the exercise rules only ever see the masked values.
    pub(crate) fn zero_where<F>(&mut self, mut mask: F)
    where
        F: FnMut(usize, usize) -> bool,
    {
        self.grid = self
            .grid
            .map(|level, step, payoff| if mask(level, step) { 0.0 } else { payoff });
    }
}
