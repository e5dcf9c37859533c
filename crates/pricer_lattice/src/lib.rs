//! # pricer_lattice: Binomial Lattice Engine (Layer 2)
//!
//! ## Layer 2 Role
//!
//! pricer_lattice builds on pricer_core to price options on a recombining
//! Cox-Ross-Rubinstein tree:
//! - Validated inputs: `LatticeConfig` (`config`)
//! - Risk-neutral measure: `LatticeParameters` (`params`)
//! - Price and payoff grids: `PriceTree`, `PayoffMatrix` (`tree`, `payoff`)
//! - Vesting restrictions for employee stock options (`vesting`)
//! - Pluggable exercise rules: `ExerciseRule`, `RuleSpec` (`rules`)
//! - Backward induction: `BackwardInduction`, `ValueMatrix` (`engine`)
//! - Orchestration: `LatticePricer`, `LatticeValuation` (`pricer`)
//! - Black-Scholes reference prices (`analytical`)
//!
//! ## Pipeline
//!
//! ```text
//! LatticeConfig ─► LatticeParameters ─► PriceTree ─► PayoffMatrix
//!                                                      │ ExerciseRule::prepare_payoffs
//!                                                      ▼
//!                                           BackwardInduction ─► ValueMatrix ─► V(0, 0)
//! ```
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_core::types::{ExerciseStyle, OptionKind};
//! use pricer_lattice::config::LatticeConfig;
//! use pricer_lattice::pricer::LatticePricer;
//! use pricer_lattice::rules::{BarrierTurnoverSpec, RuleSpec};
//!
//! let config = LatticeConfig::builder()
//!     .spot(100.0)
//!     .strike(100.0)
//!     .volatility(0.3)
//!     .rate(0.04)
//!     .maturity(5.0)
//!     .steps(100)
//!     .option_kind(OptionKind::Call)
//!     .exercise_style(ExerciseStyle::American)
//!     .build()
//!     .unwrap();
//!
//! let pricer = LatticePricer::new(config);
//! let plain = pricer.present_value(&RuleSpec::Plain).unwrap();
//! let esop = pricer
//!     .present_value(&RuleSpec::BarrierTurnover(BarrierTurnoverSpec::new(1.0, 0.05, 2.0)))
//!     .unwrap();
//!
//! // Vesting, departures and early exercise all cost the holder value
//! assert!(esop < plain);
//! ```
//!
//! ## Concurrency
//!
//! Each valuation owns its grids. With `Schedule::Parallel` the nodes of a
//! column are evaluated on the rayon pool; columns stay strictly ordered.
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for `ValuationSummary`, `MovementSource` and the pricer_core types

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod config;
pub mod engine;
pub mod params;
pub mod payoff;
pub mod pricer;
pub mod rules;
pub mod tree;
pub mod vesting;

pub use config::{LatticeConfig, LatticeConfigBuilder, MAX_STEPS};
pub use engine::{BackwardInduction, Schedule, ValueMatrix};
pub use params::{LatticeParameters, MovementSource};
pub use payoff::PayoffMatrix;
pub use pricer::{LatticePricer, LatticeValuation, ValuationSummary};
pub use rules::{
    BarrierTurnoverRule, BarrierTurnoverSpec, ExerciseProbabilities, ExerciseRule, PlainRule, RuleSpec,
    VestingTurnoverRule, VestingTurnoverSpec,
};
pub use tree::PriceTree;
pub use vesting::VestingContext;
