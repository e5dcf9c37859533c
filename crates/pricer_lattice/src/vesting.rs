//! Vesting restrictions for employee stock options.
//!
//! Exercise is impossible at every node whose elapsed time `T·(j/M)` is
//! within the vesting period, regardless of moneyness.

use pricer_core::math::grid::TriangularGrid;
use pricer_core::types::PricingError;

use crate::config::LatticeConfig;
use crate::payoff::PayoffMatrix;

/// Elapsed-time grid and derived vesting mask.
#[derive(Clone, Debug, PartialEq)]
pub struct VestingContext {
    vesting_period: f64,
    elapsed: Vec<f64>,
    mask: TriangularGrid<bool>,
}

impl VestingContext {
    /// Builds the vesting context for a lattice.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::InvalidInput` if the vesting period is negative,
    /// not finite, or exceeds the maturity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pricer_lattice::config::LatticeConfig;
    /// use pricer_lattice::vesting::VestingContext;
    ///
    /// let config = LatticeConfig::builder()
    ///     .spot(100.0).strike(100.0).volatility(0.2).maturity(4.0).steps(4)
    ///     .build()
    ///     .unwrap();
    /// let vesting = VestingContext::new(&config, 1.0).unwrap();
    ///
    /// assert!(vesting.is_vesting(1));
    /// assert!(!vesting.is_vesting(2));
    /// ```
    pub fn new(config: &LatticeConfig, vesting_period: f64) -> Result<Self, PricingError> {
        validate_vesting_period(vesting_period, config.maturity())?;
        // T·(j/M), not j·dt: step M lands on T exactly, and a boundary step may
        // differ from j·dt in the last ulp.
        let elapsed: Vec<f64> = (0..=config.steps()).map(|step| config.elapsed(step)).collect();
        let mask = TriangularGrid::from_fn(config.steps(), |_, step| elapsed[step] <= vesting_period);
        Ok(Self {
            vesting_period,
            elapsed,
            mask,
        })
    }

    /// Vesting period in years.
    #[inline]
    pub fn vesting_period(&self) -> f64 {
        self.vesting_period
    }

    /// Elapsed time at `step`. Identical for every level of a column.
    #[inline]
    pub fn elapsed(&self, step: usize) -> f64 {
        self.elapsed[step]
    }

    /// Returns whether nodes at `step` are still inside the vesting period.
    #[inline]
    pub fn is_vesting(&self, step: usize) -> bool {
        self.elapsed[step] <= self.vesting_period
    }

    /// Returns whether the vesting period has strictly elapsed at `step`.
    #[inline]
    pub fn is_vested(&self, step: usize) -> bool {
        !self.is_vesting(step)
    }

    /// Node-level vesting mask; `true` where exercise is impossible.
    #[inline]
    pub fn mask(&self) -> &TriangularGrid<bool> {
        &self.mask
    }

    /// Zeroes every payoff inside the vesting period.
    pub fn mask_payoffs(&self, payoffs: &mut PayoffMatrix) {
        payoffs.zero_where(|level, step| self.mask[(level, step)]);
    }
}

pub(crate) fn validate_vesting_period(vesting_period: f64, maturity: f64) -> Result<(), PricingError> {
    if !vesting_period.is_finite() || vesting_period < 0.0 {
        return Err(PricingError::invalid(format!(
            "vesting period must be non-negative and finite, got {}",
            vesting_period
        )));
    }
    if vesting_period > maturity {
        return Err(PricingError::invalid(format!(
            "vesting period {} exceeds maturity {}",
            vesting_period, maturity
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::LatticeParameters;
    use crate::tree::PriceTree;
    use pricer_core::types::OptionKind;

    fn config(maturity: f64, steps: usize) -> LatticeConfig {
        LatticeConfig::builder()
            .spot(100.0)
            .strike(80.0)
            .volatility(0.25)
            .rate(0.03)
            .maturity(maturity)
            .steps(steps)
            .build()
            .unwrap()
    }

    #[test]
    fn test_mask_boundary_is_inclusive() {
        let vesting = VestingContext::new(&config(4.0, 8), 1.0).unwrap();
        // dt = 0.5: steps 0, 1, 2 are at 0.0, 0.5, 1.0
        assert!(vesting.is_vesting(2));
        assert!(vesting.is_vested(3));
        assert!(vesting.mask()[(2, 2)]);
        assert!(!vesting.mask()[(0, 3)]);
    }

    #[test]
    fn test_boundary_uses_fraction_of_maturity() {
        // 14 · (0.3 / 35) rounds above 0.12; 0.3 · (14 / 35) is exactly 0.12
        let config = config(0.3, 35);
        let vesting = VestingContext::new(&config, 0.12).unwrap();
        assert!(14.0 * config.dt() > 0.12);
        assert_eq!(vesting.elapsed(14), 0.12);
        assert!(vesting.is_vesting(14));
        assert!(vesting.is_vested(15));
    }

    #[test]
    fn test_zero_vesting_masks_root_only() {
        let vesting = VestingContext::new(&config(1.0, 4), 0.0).unwrap();
        assert!(vesting.is_vesting(0));
        assert!(vesting.is_vested(1));
    }

    #[test]
    fn test_full_vesting_masks_everything() {
        let config = config(0.7, 7);
        let vesting = VestingContext::new(&config, 0.7).unwrap();
        assert!(vesting.mask().iter().all(|(_, _, masked)| masked));
        assert_eq!(vesting.elapsed(7), 0.7);
    }

    #[test]
    fn test_invalid_vesting_periods() {
        let config = config(2.0, 4);
        assert!(matches!(
            VestingContext::new(&config, -0.1),
            Err(PricingError::InvalidInput(_))
        ));
        assert!(matches!(
            VestingContext::new(&config, 2.5),
            Err(PricingError::InvalidInput(_))
        ));
        assert!(VestingContext::new(&config, f64::NAN).is_err());
    }

    #[test]
    fn test_mask_payoffs() {
        let config = config(2.0, 4);
        let params = LatticeParameters::derive(&config).unwrap();
        let tree = PriceTree::build(&config, &params);
        let mut payoffs = PayoffMatrix::evaluate(&tree, config.strike(), OptionKind::Call);
        let vesting = VestingContext::new(&config, 1.0).unwrap();
        vesting.mask_payoffs(&mut payoffs);
        for step in 0..=2 {
            assert!(payoffs.column(step).iter().all(|&v| v == 0.0));
        }
        assert!(payoffs.payoff(0, 3) > 0.0);
    }
}
