//! Error types for swathmatch.

use thiserror::Error;

/// Result alias for swathmatch operations.
pub type SwathMatchResult<T> = std::result::Result<T, SwathMatchError>;

/// Errors that can occur when indexing or matching granule data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SwathMatchError {
    /// No valid geolocation sample was found within the search window.
    #[error("no valid geolocation within {limit} rows of row {row}, column {col}")]
    DataGeometry {
        /// Row where the corner walk started.
        row: usize,
        /// Column of the corner being located.
        col: usize,
        /// Number of rows searched before giving up.
        limit: usize,
    },
    /// A chunk operation was applied to data of the wrong shape.
    #[error("shape mismatch for {context}: expected {expected}, got {got}")]
    ShapeMismatch {
        expected: usize,
        got: usize,
        context: &'static str,
    },
    /// An index fell outside the referenced collection.
    #[error("index {index} out of bounds for {context} of length {len}")]
    IndexOutOfBounds {
        index: usize,
        len: usize,
        context: &'static str,
    },
    /// The granule's scan count has no entry in the region-length table.
    #[error("unsupported scan count: {scans}")]
    UnsupportedScanCount { scans: usize },
    /// A scan range was constructed with its bounds reversed.
    #[error("invalid scan range: start {start} > end {end}")]
    InvalidScanRange { start: usize, end: usize },
}
