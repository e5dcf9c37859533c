//! Error types for structured error handling.
//!
//! This module provides:
//! - `PricingError`: Errors from lattice parameter derivation and pricing
//! - `GridError`: Errors from triangular grid construction

use thiserror::Error;

/// Categorised pricing errors.
///
/// Every failure is reported to the caller; the engine never substitutes
/// defaults or proceeds with a grid built from invalid parameters.
///
/// # Variants
/// - `InvalidInput`: Invalid market data, lattice or rule parameters
/// - `ArbitrageViolation`: Risk-neutral probability outside (0, 1)
/// - `NumericDegeneracy`: Degenerate movements (u == d) or non-finite derivation
///
/// # Examples
/// ```
/// use pricer_core::types::PricingError;
///
/// let err = PricingError::InvalidInput("Negative spot price".to_string());
/// assert_eq!(format!("{}", err), "Invalid input: Negative spot price");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Invalid input data or parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The discretisation admits riskless arbitrage.
    #[error(
        "Arbitrage violation: risk-neutral probability p = {probability} outside (0, 1) \
         for u = {up}, d = {down}"
    )]
    ArbitrageViolation {
        /// Derived up-move probability
        probability: f64,
        /// Up multiplier
        up: f64,
        /// Down multiplier
        down: f64,
    },

    /// Degenerate numerics during parameter derivation
    #[error("Numeric degeneracy: {0}")]
    NumericDegeneracy(String),
}

impl PricingError {
    /// Shorthand for an `InvalidInput` error.
    pub fn invalid(message: impl Into<String>) -> Self {
        PricingError::InvalidInput(message.into())
    }

    /// Returns whether this error is an arbitrage violation.
    pub fn is_arbitrage_violation(&self) -> bool {
        matches!(self, PricingError::ArbitrageViolation { .. })
    }
}

/// Triangular grid errors.
///
/// # Examples
/// ```
/// use pricer_core::types::GridError;
///
/// let err = GridError::ColumnLength { step: 3, expected: 4, found: 2 };
/// assert!(format!("{}", err).contains("column 3"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Supplied matrix does not have the lattice shape.
    #[error("Shape mismatch: expected {expected}x{expected}, got {rows} rows with {cols} columns")]
    ShapeMismatch {
        /// Expected row and column count (steps + 1)
        expected: usize,
        /// Number of rows supplied
        rows: usize,
        /// Column count of the first offending row
        cols: usize,
    },

    /// Column data does not have the triangular shape.
    #[error("Malformed grid: column {step} holds {found} nodes, expected {expected}")]
    ColumnLength {
        /// Column index (time step)
        step: usize,
        /// Required node count, `step + 1`
        expected: usize,
        /// Node count supplied
        found: usize,
    },

    /// A grid needs at least the root column.
    #[error("Malformed grid: no columns")]
    Empty,
}

impl From<GridError> for PricingError {
    fn from(err: GridError) -> Self {
        PricingError::InvalidInput(err.to_string())
    }
}
