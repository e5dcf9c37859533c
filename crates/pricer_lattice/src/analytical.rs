//! Closed-form European reference prices.
//!
//! The CRR lattice converges to the Black-Scholes-Merton price as the step
//! count grows; this module supplies that limit for comparisons.
//!
//! **Call**: C = S·e^(−qT)·N(d₁) − K·e^(−rT)·N(d₂)
//! **Put**: P = K·e^(−rT)·N(−d₂) − S·e^(−qT)·N(−d₁)
//!
//! with d₁ = (ln(S/K) + (r − q + σ²/2)T) / (σ√T) and d₂ = d₁ − σ√T.

use pricer_core::math::distributions::norm_cdf;
use pricer_core::types::OptionKind;

use crate::config::LatticeConfig;

/// Black-Scholes-Merton price of a European option.
///
/// Inputs are assumed validated (positive spot, strike, volatility and maturity).
///
/// # Examples
/// ```
/// use pricer_core::types::OptionKind;
/// use pricer_lattice::analytical::black_scholes_price;
///
/// let call = black_scholes_price(OptionKind::Call, 100.0, 100.0, 0.2, 0.05, 0.0, 1.0);
/// assert!((call - 10.4506).abs() < 1e-3);
/// ```
pub fn black_scholes_price(
    kind: OptionKind,
    spot: f64,
    strike: f64,
    volatility: f64,
    rate: f64,
    dividend_yield: f64,
    maturity: f64,
) -> f64 {
    let sqrt_t = maturity.sqrt();
    let vol_sqrt_t = volatility * sqrt_t;
    let d1 = ((spot / strike).ln() + (rate - dividend_yield + 0.5 * volatility * volatility) * maturity)
        / vol_sqrt_t;
    let d2 = d1 - vol_sqrt_t;
    let forward_spot = spot * (-dividend_yield * maturity).exp();
    let discounted_strike = strike * (-rate * maturity).exp();

    match kind {
        OptionKind::Call => forward_spot * norm_cdf(d1) - discounted_strike * norm_cdf(d2),
        OptionKind::Put => discounted_strike * norm_cdf(-d2) - forward_spot * norm_cdf(-d1),
    }
}

/// European reference price for a lattice configuration, ignoring its exercise style.
pub fn black_scholes(config: &LatticeConfig) -> f64 {
    black_scholes_price(
        config.option_kind(),
        config.spot(),
        config.strike(),
        config.volatility(),
        config.rate(),
        config.dividend_yield(),
        config.maturity(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_call_and_put() {
        let call = black_scholes_price(OptionKind::Call, 100.0, 100.0, 0.2, 0.05, 0.0, 1.0);
        let put = black_scholes_price(OptionKind::Put, 100.0, 100.0, 0.2, 0.05, 0.0, 1.0);
        assert_relative_eq!(call, 10.450_583_572_185_565, epsilon = 1e-4);
        assert_relative_eq!(put, 5.573_526_022_256_971, epsilon = 1e-4);
    }

    #[test]
    fn test_put_call_parity_with_dividends() {
        let (s, k, v, r, q, t) = (110.0, 95.0, 0.3, 0.04, 0.02, 2.0);
        let call = black_scholes_price(OptionKind::Call, s, k, v, r, q, t);
        let put = black_scholes_price(OptionKind::Put, s, k, v, r, q, t);
        let parity = s * (-q * t).exp() - k * (-r * t).exp();
        assert_relative_eq!(call - put, parity, epsilon = 1e-6);
    }

    #[test]
    fn test_config_helper() {
        let config = LatticeConfig::builder()
            .spot(100.0)
            .strike(100.0)
            .volatility(0.2)
            .rate(0.05)
            .maturity(1.0)
            .steps(10)
            .option_kind(OptionKind::Put)
            .build()
            .unwrap();
        assert_eq!(
            black_scholes(&config),
            black_scholes_price(OptionKind::Put, 100.0, 100.0, 0.2, 0.05, 0.0, 1.0)
        );
    }
}
