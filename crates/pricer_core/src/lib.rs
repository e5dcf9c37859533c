//! # pricer_core: Foundation for the Binomial Lattice Engine
//!
//! ## Layer 1 (Foundation) Role
//!
//! pricer_core serves as the bottom layer of the workspace, providing:
//! - Error types: `PricingError`, `GridError` (`types::error`)
//! - Option vocabulary: `OptionKind`, `ExerciseStyle` (`types::option`)
//! - Triangular lattice storage: `TriangularGrid` (`math::grid`)
//! - Standard normal distribution functions (`math::distributions`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other pricer_* crates, with minimal external dependencies:
//! - thiserror: Structured error types
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_core::math::grid::TriangularGrid;
//! use pricer_core::types::{ExerciseStyle, OptionKind};
//!
//! // A two-step lattice holds 3 columns of sizes 1, 2 and 3
//! let grid = TriangularGrid::from_fn(2, |level, step| (step - level) as f64);
//! assert_eq!(grid.node_count(), 6);
//! assert_eq!(grid[(0, 2)], 2.0);
//!
//! // Intrinsic values
//! assert_eq!(OptionKind::Call.intrinsic(110.0, 100.0), 10.0);
//! assert!(ExerciseStyle::American.allows_early_exercise());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for `OptionKind`, `ExerciseStyle` and `TriangularGrid`

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod types;
