//! Mathematical building blocks.
//!
//! - `grid`: Triangular storage for recombining lattices
//! - `distributions`: Standard normal CDF

pub mod distributions;
pub mod grid;

pub use grid::TriangularGrid;
