//! Cox-Ross-Rubinstein lattice parameters.
//!
//! Derives the step size, up/down multipliers and risk-neutral probability
//! from a [`LatticeConfig`]:
//!
//! ```text
//! dt = T / M
//! u  = exp(σ √dt)
//! d  = 1 / u
//! p  = (exp((r − q) dt) − d) / (u − d)
//! ```
//!
//! The discretisation is arbitrage-free only when `0 < p < 1`; anything else
//! is reported as [`PricingError::ArbitrageViolation`].

use pricer_core::types::PricingError;

use crate::config::LatticeConfig;

/// Origin of the up/down multipliers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MovementSource {
    /// Derived from volatility as `u = exp(σ √dt)`, `d = 1 / u`.
    Volatility,
    /// Supplied externally, e.g. from a calibrated model.
    Override,
}

/// Derived lattice measure.
///
/// # Examples
///
/// ```rust
/// use pricer_lattice::config::LatticeConfig;
/// use pricer_lattice::params::LatticeParameters;
///
/// let config = LatticeConfig::builder()
///     .spot(100.0).strike(100.0).volatility(0.2).rate(0.05).maturity(1.0).steps(2)
///     .build()
///     .unwrap();
/// let params = LatticeParameters::derive(&config).unwrap();
///
/// assert!((params.up() * params.down() - 1.0).abs() < 1e-15);
/// assert!(params.probability() > 0.0 && params.probability() < 1.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatticeParameters {
    steps: usize,
    dt: f64,
    up: f64,
    down: f64,
    log_up: f64,
    log_down: f64,
    probability: f64,
    discount: f64,
    source: MovementSource,
}

impl LatticeParameters {
    /// Derives CRR parameters from volatility.
    ///
    /// # Errors
    ///
    /// - `NumericDegeneracy` if `σ √dt` is too small to separate `u` from `d`
    /// - `ArbitrageViolation` if the derived probability is outside (0, 1)
    pub fn derive(config: &LatticeConfig) -> Result<Self, PricingError> {
        config.validate()?;
        let dt = config.dt();
        let log_up = config.volatility() * dt.sqrt();
        let up = log_up.exp();
        Self::complete(
            config,
            dt,
            up,
            1.0 / up,
            log_up,
            -log_up,
            MovementSource::Volatility,
        )
    }

    /// Uses externally supplied multipliers and recomputes `p` from them.
    ///
    /// `u` and `d` are taken as given; nothing is re-derived from σ.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if either multiplier is not positive and finite, or `u < d`
    /// - `NumericDegeneracy` if `u == d`
    /// - `ArbitrageViolation` if the recomputed probability is outside (0, 1)
    pub fn with_movements(config: &LatticeConfig, up: f64, down: f64) -> Result<Self, PricingError> {
        config.validate()?;
        for (name, value) in [("up", up), ("down", down)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(PricingError::invalid(format!(
                    "{} multiplier must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        if up < down {
            return Err(PricingError::invalid(format!(
                "up multiplier {} must exceed down multiplier {}",
                up, down
            )));
        }
        Self::complete(
            config,
            config.dt(),
            up,
            down,
            up.ln(),
            down.ln(),
            MovementSource::Override,
        )
    }

    fn complete(
        config: &LatticeConfig,
        dt: f64,
        up: f64,
        down: f64,
        log_up: f64,
        log_down: f64,
        source: MovementSource,
    ) -> Result<Self, PricingError> {
        let spread = up - down;
        if !(spread.is_finite() && spread > 0.0) {
            return Err(PricingError::NumericDegeneracy(format!(
                "up and down multipliers coincide (u = {}, d = {}); vol·√dt is too small",
                up, down
            )));
        }

        let growth = ((config.rate() - config.dividend_yield()) * dt).exp();
        let probability = (growth - down) / spread;
        if !probability.is_finite() {
            return Err(PricingError::NumericDegeneracy(format!(
                "risk-neutral probability is not finite (u = {}, d = {})",
                up, down
            )));
        }
        if probability <= 0.0 || probability >= 1.0 {
            return Err(PricingError::ArbitrageViolation {
                probability,
                up,
                down,
            });
        }

        Ok(Self {
            steps: config.steps(),
            dt,
            up,
            down,
            log_up,
            log_down,
            probability,
            discount: (-config.rate() * dt).exp(),
            source,
        })
    }

    /// Number of time steps.
    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Step size in years.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Up multiplier (u).
    #[inline]
    pub fn up(&self) -> f64 {
        self.up
    }

    /// Down multiplier (d).
    #[inline]
    pub fn down(&self) -> f64 {
        self.down
    }

    /// Natural log of the up multiplier.
    #[inline]
    pub fn log_up(&self) -> f64 {
        self.log_up
    }

    /// Natural log of the down multiplier. Exactly `-log_up` for derived movements.
    #[inline]
    pub fn log_down(&self) -> f64 {
        self.log_down
    }

    /// Risk-neutral up-move probability (p).
    #[inline]
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// One-step discount factor `exp(−r dt)`.
    #[inline]
    pub fn discount(&self) -> f64 {
        self.discount
    }

    /// Where the multipliers came from.
    #[inline]
    pub fn source(&self) -> MovementSource {
        self.source
    }
}
