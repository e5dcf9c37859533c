//! Triangular storage for recombining lattices.
//!
//! A lattice with `steps` time steps has `steps + 1` columns; column `step`
//! holds `step + 1` nodes indexed by `level` (the number of down moves).
//! Only nodes with `level <= step` exist; the region `level > step` of the
//! square matrix view is never stored.
//!
//! ```text
//!  step:   0      1      2
//!        [0,0]  [0,1]  [0,2]     level 0 (all up moves)
//!               [1,1]  [1,2]     level 1
//!                      [2,2]     level 2 (all down moves)
//! ```

use std::ops::{Index, IndexMut};

use crate::types::error::GridError;

/// Ragged column-major triangular grid.
///
/// # Examples
/// ```
/// use pricer_core::math::grid::TriangularGrid;
///
/// let mut grid = TriangularGrid::filled(3, 0.0_f64);
/// grid[(1, 2)] = 4.5;
/// assert_eq!(grid.get(1, 2), Some(4.5));
/// assert_eq!(grid.get(2, 1), None);
/// assert_eq!(grid.column(3).len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TriangularGrid<T> {
    columns: Vec<Vec<T>>,
}

impl<T: Copy> TriangularGrid<T> {
    /// Creates a grid with every valid node set to `value`.
    pub fn filled(steps: usize, value: T) -> Self {
        let columns = (0..=steps).map(|step| vec![value; step + 1]).collect();
        Self { columns }
    }

    /// Creates a grid by evaluating `f(level, step)` at every valid node.
    pub fn from_fn<F>(steps: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        let columns = (0..=steps)
            .map(|step| (0..=step).map(|level| f(level, step)).collect())
            .collect();
        Self { columns }
    }

    /// Creates a grid from a square row-major matrix `rows[level][step]`.
    ///
    /// The matrix must be `(steps + 1) x (steps + 1)`; entries below the
    /// diagonal (`level > step`) are ignored.
    ///
    /// # Errors
    /// Returns `GridError::ShapeMismatch` if the matrix is not square of the
    /// expected size.
    pub fn from_square(steps: usize, rows: &[Vec<T>]) -> Result<Self, GridError> {
        check_square(steps, rows)?;
        Ok(Self::from_fn(steps, |level, step| rows[level][step]))
    }

    /// Number of time steps (one less than the column count).
    #[inline]
    pub fn steps(&self) -> usize {
        self.columns.len() - 1
    }

    /// Total number of valid nodes, `(steps + 1)(steps + 2) / 2`.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    /// Returns the node value, or `None` outside the valid region.
    #[inline]
    pub fn get(&self, level: usize, step: usize) -> Option<T> {
        self.columns.get(step)?.get(level).copied()
    }

    /// Column `step` as a slice of length `step + 1`.
    ///
    /// # Panics
    /// Panics if `step > steps`.
    #[inline]
    pub fn column(&self, step: usize) -> &[T] {
        &self.columns[step]
    }

    /// Mutable column `step`.
    ///
    /// # Panics
    /// Panics if `step > steps`.
    #[inline]
    pub fn column_mut(&mut self, step: usize) -> &mut [T] {
        &mut self.columns[step]
    }

    /// Borrows column `step` mutably together with column `step + 1`.
    ///
    /// This is the access pattern of backward induction: the current column
    /// is written from the already completed next column.
    ///
    /// # Panics
    /// Panics if `step >= steps`.
    pub fn split_column_mut(&mut self, step: usize) -> (&mut [T], &[T]) {
        let (head, tail) = self.columns.split_at_mut(step + 1);
        (&mut head[step], &tail[0])
    }

    /// Iterates over `(level, step, value)` for every valid node, column by column.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        self.columns.iter().enumerate().flat_map(|(step, column)| {
            column
                .iter()
                .enumerate()
                .map(move |(level, &value)| (level, step, value))
        })
    }

    /// Applies `f` to every valid node, producing a grid of the same shape.
    pub fn map<U, F>(&self, mut f: F) -> TriangularGrid<U>
    where
        U: Copy,
        F: FnMut(usize, usize, T) -> U,
    {
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(step, column)| {
                column
                    .iter()
                    .enumerate()
                    .map(|(level, &value)| f(level, step, value))
                    .collect()
            })
            .collect();
        TriangularGrid { columns }
    }

}

/// Checks that `rows` is the `(steps + 1) x (steps + 1)` square matrix a
/// lattice with `steps` steps expects.
///
/// # Errors
/// Returns `GridError::ShapeMismatch` on the first row count or row length
/// that differs.
pub fn check_square<T>(steps: usize, rows: &[Vec<T>]) -> Result<(), GridError> {
    let expected = steps + 1;
    if rows.len() != expected {
        return Err(GridError::ShapeMismatch {
            expected,
            rows: rows.len(),
            cols: rows.first().map_or(0, Vec::len),
        });
    }
    match rows.iter().find(|row| row.len() != expected) {
        Some(row) => Err(GridError::ShapeMismatch {
            expected,
            rows: rows.len(),
            cols: row.len(),
        }),
        None => Ok(()),
    }
}

impl<T> TryFrom<Vec<Vec<T>>> for TriangularGrid<T> {
    type Error = GridError;

    /// Adopts columns that already have the lattice shape.
    ///
    /// # Errors
    /// Returns `GridError::Empty` without columns, or
    /// `GridError::ColumnLength` if column `step` does not hold `step + 1` nodes.
    fn try_from(columns: Vec<Vec<T>>) -> Result<Self, GridError> {
        if columns.is_empty() {
            return Err(GridError::Empty);
        }
        if let Some((step, column)) = columns
            .iter()
            .enumerate()
            .find(|(step, column)| column.len() != step + 1)
        {
            return Err(GridError::ColumnLength {
                step,
                expected: step + 1,
                found: column.len(),
            });
        }
        Ok(Self { columns })
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::TriangularGrid;
    use serde::{de, Deserialize, Deserializer};

    #[derive(Deserialize)]
    struct Columns<T> {
        columns: Vec<Vec<T>>,
    }

    // Same `{columns}` shape as the derived `Serialize`, checked by `try_from`
    impl<'de, T: Deserialize<'de>> Deserialize<'de> for TriangularGrid<T> {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw = Columns::<T>::deserialize(deserializer)?;
            TriangularGrid::try_from(raw.columns).map_err(de::Error::custom)
        }
    }
}

impl<T> Index<(usize, usize)> for TriangularGrid<T> {
    type Output = T;

    /// Indexes by `(level, step)`.
    ///
    /// # Panics
    /// Panics outside the valid region.
    #[inline]
    fn index(&self, (level, step): (usize, usize)) -> &T {
        &self.columns[step][level]
    }
}

impl<T> IndexMut<(usize, usize)> for TriangularGrid<T> {
    #[inline]
    fn index_mut(&mut self, (level, step): (usize, usize)) -> &mut T {
        &mut self.columns[step][level]
    }
}
