//! Segment points, segment types and segmentation results.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Position of a traversal step within the whole curve.
///
/// Consumers use this to decide which route node a step belongs to, e.g.
/// the first step maps to the route's first node and the last step to the
/// route's last node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SegmentType {
    /// First step of a traversal.
    First,
    /// Any step between the first and the last.
    Intermediate,
    /// Final step of a traversal (also used when the traversal is a single step).
    Last,
}

/// A point on the curve together with the control points bracketing it.
///
/// ```text
///   begin ----------- point ---------------- end
///         local_time = |begin, point| / |begin, end|
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentPoint {
    /// Control point at the start of the bracketing curve segment.
    pub begin: Point3<f64>,
    /// Control point at the end of the bracketing curve segment.
    pub end: Point3<f64>,
    /// The evaluated point.
    pub point: Point3<f64>,
    /// Normalized position between `begin` and `end`.
    pub local_time: f64,
    /// Normalized arc-length position along the whole curve.
    pub time: f64,
}

/// Outcome of solving for a constant segment length.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentationResult {
    /// Segment length that partitions the curve, `-1` when unsolved.
    pub segment_length: f64,
    /// Accumulated signed error at `segment_length`.
    pub error: f64,
    /// Requested number of segments.
    pub num_segments: usize,
    /// Number of solver iterations used.
    pub num_iterations: usize,
    /// True if the error is within the requested tolerance.
    pub successful: bool,
}

impl SegmentationResult {
    /// Unsuccessful result carrying an infinite error.
    #[must_use]
    pub const fn failed(num_segments: usize) -> Self {
        Self {
            segment_length: -1.0,
            error: f64::INFINITY,
            num_segments,
            num_iterations: 0,
            successful: false,
        }
    }

    /// Successful result.
    #[must_use]
    pub const fn solved(
        segment_length: f64,
        error: f64,
        num_segments: usize,
        num_iterations: usize,
    ) -> Self {
        Self {
            segment_length,
            error,
            num_segments,
            num_iterations,
            successful: true,
        }
    }
}

impl Default for SegmentationResult {
    fn default() -> Self {
        Self::failed(0)
    }
}
