//! Core financial types and errors.
//!
//! This module provides:
//! - `option`: Option kind (call/put) and exercise style (European/American)
//! - `error`: Structured error types for lattice construction and pricing
//!
//! # Re-exports
//!
//! For convenience, commonly used types are re-exported at this module level:
//! - [`OptionKind`], [`ExerciseStyle`] from `option`
//! - [`PricingError`], [`GridError`] from `error`

pub mod error;
pub mod option;

// Re-export commonly used types at module level
pub use error::{GridError, PricingError};
pub use option::{ExerciseStyle, OptionKind};
