//! Recombining price tree.
//!
//! Node `(level, step)` holds `S0 · u^(step − level) · d^level`, evaluated as
//! `S0 · exp((step − level)·ln u + level·ln d)`. The value depends only on the
//! number of up and down moves, never on their order, which is what bounds the
//! lattice to `(M + 1)(M + 2) / 2` nodes.

use pricer_core::math::grid::TriangularGrid;

use crate::config::LatticeConfig;
use crate::params::LatticeParameters;

/// Triangular grid of underlying prices, read-only once built.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceTree {
    grid: TriangularGrid<f64>,
}

impl PriceTree {
    /// Builds the tree from the closed-form node formula.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pricer_lattice::config::LatticeConfig;
    /// use pricer_lattice::params::LatticeParameters;
    /// use pricer_lattice::tree::PriceTree;
    ///
    /// let config = LatticeConfig::builder()
    ///     .spot(100.0).strike(100.0).volatility(0.2).rate(0.05).maturity(1.0).steps(2)
    ///     .build()
    ///     .unwrap();
    /// let params = LatticeParameters::derive(&config).unwrap();
    /// let tree = PriceTree::build(&config, &params);
    ///
    /// assert_eq!(tree.price(0, 0), 100.0);
    /// // up then down lands back on the spot
    /// assert!((tree.price(1, 2) - 100.0).abs() < 1e-12);
    /// ```
    pub fn build(config: &LatticeConfig, params: &LatticeParameters) -> Self {
        let spot = config.spot();
        let (log_up, log_down) = (params.log_up(), params.log_down());
        let grid = TriangularGrid::from_fn(params.steps(), |level, step| {
            let ups = (step - level) as f64;
            let downs = level as f64;
            spot * (ups * log_up + downs * log_down).exp()
        });
        Self { grid }
    }

    /// Builds the tree forward from the root, one multiplication per node.
    ///
    /// Every level below the bottom one is reached by an up move from the
    /// same level of the previous column; the bottom node by a down move.
    pub fn build_iterative(config: &LatticeConfig, params: &LatticeParameters) -> Self {
        let steps = params.steps();
        let (up, down) = (params.up(), params.down());
        let mut grid = TriangularGrid::filled(steps, 0.0);
        grid[(0, 0)] = config.spot();
        for step in 1..=steps {
            let previous = grid.column(step - 1).to_vec();
            let current = grid.column_mut(step);
            for (level, &price) in previous.iter().enumerate() {
                current[level] = price * up;
            }
            current[step] = previous[step - 1] * down;
        }
        Self { grid }
    }

    /// Number of time steps.
    #[inline]
    pub fn steps(&self) -> usize {
        self.grid.steps()
    }

    /// Price at `(level, step)`.
    ///
    /// # Panics
    /// Panics outside the valid region `level <= step <= steps`.
    #[inline]
    pub fn price(&self, level: usize, step: usize) -> f64 {
        self.grid[(level, step)]
    }

    /// Prices of column `step`, ordered from the highest (level 0) down.
    #[inline]
    pub fn column(&self, step: usize) -> &[f64] {
        self.grid.column(step)
    }

    /// Underlying grid.
    #[inline]
    pub fn grid(&self) -> &TriangularGrid<f64> {
        &self.grid
    }
}
