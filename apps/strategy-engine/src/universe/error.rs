//! Universe load errors.

use thiserror::Error;

/// Errors from validating a universe load.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UniverseError {
    /// No instruments supplied.
    #[error("Universe contains no instruments")]
    Empty,

    /// Price grid has no points.
    #[error("Price grid is empty")]
    EmptyGrid,

    /// A per-instrument array disagrees with the instrument count.
    #[error("Array '{field}' has length {actual}, expected {expected}")]
    DimensionMismatch {
        /// Input field name.
        field: &'static str,
        /// Expected leading dimension.
        expected: usize,
        /// Actual leading dimension.
        actual: usize,
    },

    /// A matrix row has the wrong width.
    #[error("Row {row} of '{field}' has length {actual}, expected {expected}")]
    RowLength {
        /// Input field name.
        field: &'static str,
        /// Row index.
        row: usize,
        /// Expected row width.
        expected: usize,
        /// Actual row width.
        actual: usize,
    },

    /// Price grid is not ascending.
    #[error("Price grid must be ascending (violated at index {index})")]
    UnsortedGrid {
        /// First index whose price is below its predecessor.
        index: usize,
    },
}
