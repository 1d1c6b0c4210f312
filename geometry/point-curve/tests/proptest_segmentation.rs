//! Property-based tests for route segmentation.
//!
//! Run with: cargo test -p point-curve -- proptest

#![allow(missing_docs, clippy::unwrap_used)]

use point_curve::{Point3, PointCurve, SegmentType, SegmentationParams, default_error};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// A control point in a bounded box.
fn arb_point() -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-10.0..10.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

/// A route of 2 to 6 control points.
fn arb_curve() -> impl Strategy<Value = PointCurve> {
    prop::collection::vec(arb_point(), 2..=6).prop_map(PointCurve::from_points)
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A solved segmentation takes exactly the requested number of steps and
    /// its clamped walk ends on the curve end; a failed one reports an
    /// infinite error.
    #[test]
    fn proptest_solved_or_infinite(mut curve in arb_curve(), num_segments in 1usize..40) {
        prop_assume!(curve.finalize());
        let params = SegmentationParams::default();
        let result = curve.find_segment_length(num_segments, default_error, &params);

        if result.successful {
            prop_assert!(result.segment_length > 0.0);
            prop_assert!(
                result.error.abs() < params.error_tolerance
                    || result.error.abs() <= params.fallback_tolerance * result.segment_length
            );

            let steps: Vec<_> = curve
                .traverse(result.segment_length, params.step_tolerance)
                .clamp_to_end()
                .collect();
            prop_assert_eq!(steps.len(), num_segments);
            prop_assert_eq!(steps[0].curr.time, 0.0);

            let last = steps[steps.len() - 1];
            prop_assert_eq!(last.segment_type, SegmentType::Last);
            prop_assert_eq!(last.next.time, 1.0);
            let end = *curve.end_point().unwrap();
            prop_assert!((last.next.point - end).norm() < 1e-4);
        } else {
            prop_assert_eq!(result.error, f64::INFINITY);
            prop_assert_eq!(result.segment_length, -1.0);
        }
    }

    /// Traversal is a pure function of the curve and the step length.
    #[test]
    fn proptest_traversal_is_repeatable(mut curve in arb_curve(), fraction in 0.05..0.5f64) {
        prop_assume!(curve.finalize());
        let length = fraction * curve.total_length();

        let first: Vec<_> = curve.traverse(length, 1e-3).map(|step| step.next.time).collect();
        let second: Vec<_> = curve.traverse(length, 1e-3).map(|step| step.next.time).collect();
        prop_assert_eq!(first, second);
    }
}
