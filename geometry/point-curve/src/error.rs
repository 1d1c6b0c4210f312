//! Error types for point curve operations.

use thiserror::Error;

/// Errors that can occur when evaluating or editing a point curve.
///
/// Segmentation failures are not reported through this type: the solver
/// returns an unsuccessful [`SegmentationResult`](crate::SegmentationResult)
/// instead, so callers can keep the last good segmentation around.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CurveError {
    /// Insufficient points to define the curve.
    #[error("insufficient points: need at least {required}, got {actual}")]
    InsufficientPoints {
        /// Minimum required points.
        required: usize,
        /// Actual number of points.
        actual: usize,
    },

    /// The arc-time table is missing or stale, call `finalize` first.
    #[error("curve is not finalized: {num_points} points, {num_times} time entries")]
    NotFinalized {
        /// Number of control points.
        num_points: usize,
        /// Number of entries in the time table.
        num_times: usize,
    },

    /// Point index is outside the curve.
    #[error("point index {index} out of range (curve has {len} points)")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of points in the curve.
        len: usize,
    },

    /// Degenerate curve (e.g., zero length).
    #[error("degenerate curve: {reason}")]
    Degenerate {
        /// Description of the degeneracy.
        reason: String,
    },
}

impl CurveError {
    /// Create an insufficient points error.
    #[must_use]
    pub fn insufficient_points(required: usize, actual: usize) -> Self {
        Self::InsufficientPoints { required, actual }
    }

    /// Create an index out of range error.
    #[must_use]
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Create a degenerate curve error.
    #[must_use]
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::Degenerate {
            reason: reason.into(),
        }
    }

    /// Check if this is an insufficient points error.
    #[must_use]
    pub fn is_insufficient_points(&self) -> bool {
        matches!(self, Self::InsufficientPoints { .. })
    }

    /// Check if this is a not finalized error.
    #[must_use]
    pub fn is_not_finalized(&self) -> bool {
        matches!(self, Self::NotFinalized { .. })
    }
}
