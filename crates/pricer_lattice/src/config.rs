//! Lattice pricing configuration.
//!
//! This module provides the immutable [`LatticeConfig`] and its builder.
//! All market and contract inputs are validated once, at build time.

use pricer_core::types::{ExerciseStyle, OptionKind, PricingError};

/// Maximum number of time steps allowed.
///
/// The price, payoff and value grids each hold `(M + 1)(M + 2) / 2` nodes.
pub const MAX_STEPS: usize = 10_000;

/// Validated market and contract inputs for a binomial valuation.
///
/// Use [`LatticeConfigBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust
/// use pricer_lattice::config::LatticeConfig;
/// use pricer_core::types::{ExerciseStyle, OptionKind};
///
/// let config = LatticeConfig::builder()
///     .spot(100.0)
///     .strike(100.0)
///     .volatility(0.2)
///     .rate(0.05)
///     .maturity(1.0)
///     .steps(2)
///     .option_kind(OptionKind::Call)
///     .exercise_style(ExerciseStyle::European)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.steps(), 2);
/// assert_eq!(config.dt(), 0.5);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LatticeConfig {
    spot: f64,
    strike: f64,
    volatility: f64,
    rate: f64,
    dividend_yield: f64,
    maturity: f64,
    steps: usize,
    option_kind: OptionKind,
    exercise_style: ExerciseStyle,
}

impl LatticeConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> LatticeConfigBuilder {
        LatticeConfigBuilder::default()
    }

    /// Returns a builder pre-populated with this configuration.
    ///
    /// ```rust
    /// use pricer_lattice::config::LatticeConfig;
    /// use pricer_core::types::ExerciseStyle;
    ///
    /// let european = LatticeConfig::builder()
    ///     .spot(100.0).strike(95.0).volatility(0.3).maturity(0.5).steps(50)
    ///     .build()
    ///     .unwrap();
    /// let american = european
    ///     .to_builder()
    ///     .exercise_style(ExerciseStyle::American)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(american.strike(), 95.0);
    /// ```
    pub fn to_builder(&self) -> LatticeConfigBuilder {
        LatticeConfigBuilder {
            spot: Some(self.spot),
            strike: Some(self.strike),
            volatility: Some(self.volatility),
            rate: self.rate,
            dividend_yield: self.dividend_yield,
            maturity: Some(self.maturity),
            steps: Some(self.steps),
            option_kind: self.option_kind,
            exercise_style: self.exercise_style,
        }
    }

    /// Spot price of the underlying (S0).
    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Strike price (K).
    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Annualised volatility (σ).
    #[inline]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Continuously compounded risk-free rate (r).
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Continuous dividend or carry yield (q).
    #[inline]
    pub fn dividend_yield(&self) -> f64 {
        self.dividend_yield
    }

    /// Time to maturity in years (T).
    #[inline]
    pub fn maturity(&self) -> f64 {
        self.maturity
    }

    /// Number of time steps (M).
    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Call or put.
    #[inline]
    pub fn option_kind(&self) -> OptionKind {
        self.option_kind
    }

    /// European or American.
    #[inline]
    pub fn exercise_style(&self) -> ExerciseStyle {
        self.exercise_style
    }

    /// Step size in years, `T / M`.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.maturity / self.steps as f64
    }

    /// Elapsed time at `step`, computed as `T · (step / M)`.
    ///
    /// The terminal step maps to exactly `T`.
    #[inline]
    pub fn elapsed(&self, step: usize) -> f64 {
        self.maturity * (step as f64 / self.steps as f64)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::InvalidInput` if:
    /// - spot, strike, volatility or maturity is not a positive finite number
    /// - rate or dividend yield is not finite
    /// - steps is 0 or greater than [`MAX_STEPS`]
    pub fn validate(&self) -> Result<(), PricingError> {
        require_positive("spot", self.spot)?;
        require_positive("strike", self.strike)?;
        require_positive("volatility", self.volatility)?;
        require_positive("maturity", self.maturity)?;
        require_finite("rate", self.rate)?;
        require_finite("dividend_yield", self.dividend_yield)?;
        if self.steps == 0 || self.steps > MAX_STEPS {
            return Err(PricingError::invalid(format!(
                "Invalid step count {}: must be in range [1, {}]",
                self.steps, MAX_STEPS
            )));
        }
        Ok(())
    }
}

fn require_positive(name: &str, value: f64) -> Result<(), PricingError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PricingError::invalid(format!(
            "{} must be positive and finite, got {}",
            name, value
        )))
    }
}

fn require_finite(name: &str, value: f64) -> Result<(), PricingError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PricingError::invalid(format!(
            "{} must be finite, got {}",
            name, value
        )))
    }
}

/// Builder for [`LatticeConfig`].
///
/// Spot, strike, volatility, maturity and steps are required. Rate and
/// dividend yield default to zero, option kind to call and exercise style
/// to European.
#[derive(Clone, Debug, Default)]
pub struct LatticeConfigBuilder {
    spot: Option<f64>,
    strike: Option<f64>,
    volatility: Option<f64>,
    rate: f64,
    dividend_yield: f64,
    maturity: Option<f64>,
    steps: Option<usize>,
    option_kind: OptionKind,
    exercise_style: ExerciseStyle,
}

impl LatticeConfigBuilder {
    /// Sets the spot price.
    #[inline]
    pub fn spot(mut self, spot: f64) -> Self {
        self.spot = Some(spot);
        self
    }

    /// Sets the strike price.
    #[inline]
    pub fn strike(mut self, strike: f64) -> Self {
        self.strike = Some(strike);
        self
    }

    /// Sets the annualised volatility.
    #[inline]
    pub fn volatility(mut self, volatility: f64) -> Self {
        self.volatility = Some(volatility);
        self
    }

    /// Sets the risk-free rate.
    #[inline]
    pub fn rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    /// Sets the dividend or carry yield.
    #[inline]
    pub fn dividend_yield(mut self, dividend_yield: f64) -> Self {
        self.dividend_yield = dividend_yield;
        self
    }

    /// Sets the maturity in years.
    #[inline]
    pub fn maturity(mut self, maturity: f64) -> Self {
        self.maturity = Some(maturity);
        self
    }

    /// Sets the number of time steps.
    ///
    /// # Arguments
    ///
    /// * `steps` - Number of steps in [1, 10_000]
    #[inline]
    pub fn steps(mut self, steps: usize) -> Self {
        self.steps = Some(steps);
        self
    }

    /// Sets the option kind.
    #[inline]
    pub fn option_kind(mut self, option_kind: OptionKind) -> Self {
        self.option_kind = option_kind;
        self
    }

    /// Sets the exercise style.
    #[inline]
    pub fn exercise_style(mut self, exercise_style: ExerciseStyle) -> Self {
        self.exercise_style = exercise_style;
        self
    }

    /// Builds the configuration, validating all parameters.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::InvalidInput` if a required field is missing
    /// or any value fails [`LatticeConfig::validate`].
    pub fn build(self) -> Result<LatticeConfig, PricingError> {
        let config = LatticeConfig {
            spot: self.spot.ok_or_else(|| missing("spot"))?,
            strike: self.strike.ok_or_else(|| missing("strike"))?,
            volatility: self.volatility.ok_or_else(|| missing("volatility"))?,
            rate: self.rate,
            dividend_yield: self.dividend_yield,
            maturity: self.maturity.ok_or_else(|| missing("maturity"))?,
            steps: self.steps.ok_or_else(|| missing("steps"))?,
            option_kind: self.option_kind,
            exercise_style: self.exercise_style,
        };
        config.validate()?;
        Ok(config)
    }
}

fn missing(name: &str) -> PricingError {
    PricingError::invalid(format!("{} is required", name))
}
