//! Constant arc-length segmentation of piecewise linear curves.
//!
//! Cables and wires are routed through a handful of user placed nodes, but
//! the physics engine wants them as a chain of equally long segments. This
//! crate resamples the route polygon into such a chain:
//!
//! - [`PointCurve`] - Control points with a normalized arc-time table
//! - [`Traversal`] - Lazy walk along the curve in constant chord steps
//! - [`PointCurve::find_segment_length`] - Solves for the step length that
//!   lands exactly on the curve end after a given number of steps
//! - [`twist`] - Step rotations interpolating the twist between route nodes
//!
//! # Example
//!
//! ```
//! use point_curve::{PointCurve, SegmentationParams, default_error};
//! use nalgebra::Point3;
//!
//! let mut curve = PointCurve::from_points([
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(2.0, 0.0, 0.0),
//! ]);
//! assert!(curve.finalize());
//!
//! let params = SegmentationParams::default();
//! let result = curve.find_segment_length(2, default_error, &params);
//! assert!(result.successful);
//!
//! let points: Vec<_> = curve
//!     .traverse(result.segment_length, params.step_tolerance)
//!     .map(|step| step.next.point.x)
//!     .collect();
//! assert_eq!(points.len(), 2);
//! ```
//!
//! # Layer 0 Crate
//!
//! This crate has no engine or rendering dependencies and is single
//! threaded; a curve is owned by the cable or wire that segments it.
//!
//! # Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for curves, results and parameters

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::suboptimal_flops,
    clippy::float_cmp
)]

mod curve;
mod error;
mod params;
mod segment;
mod solver;
mod traverse;
pub mod twist;

pub use curve::PointCurve;
pub use error::CurveError;
pub use params::SegmentationParams;
pub use segment::{SegmentPoint, SegmentType, SegmentationResult};
pub use solver::default_error;
pub use traverse::{SegmentStep, Traversal};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};

/// Result type for point curve operations.
pub type Result<T> = std::result::Result<T, CurveError>;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Solve, walk and frame a bent route end to end.
    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_segment_and_frame_route() {
        let mut curve = PointCurve::from_points([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(1.0, 0.0, 3.0),
        ]);
        assert!(curve.finalize());

        let params = SegmentationParams::default();
        let result = curve.find_segment_length(8, default_error, &params);
        assert!(result.successful);

        let steps: Vec<_> = curve
            .traverse(result.segment_length, params.step_tolerance)
            .collect();
        assert_eq!(steps.len(), 8);
        assert_relative_eq!(steps[0].curr.time, 0.0);
        assert!((steps[7].next.point - Point3::new(1.0, 0.0, 3.0)).norm() < params.error_tolerance);

        for step in &steps {
            let dir = Unit::new_normalize(step.next.point - step.curr.point);
            let q = twist::twisted_rotation(
                &UnitQuaternion::identity(),
                &UnitQuaternion::identity(),
                &dir,
                step.curr.local_time,
            );
            assert_relative_eq!(q * Vector3::z(), dir.into_inner(), epsilon = 1e-9);
        }
    }
}
