//! Segment length solver.
//!
//! Finds the chord length `L` for which a traversal of the curve takes `n`
//! steps and ends on the curve's last point. A traversal sample is "short"
//! when it takes more than `n` steps, or exactly `n` steps with a positive
//! accumulated error, and "long" otherwise. Short and long lengths bracket
//! the solution; inside the bracket the error is driven to zero with central
//! difference Newton steps, falling back to bisection.

use tracing::{debug, warn};

use crate::{PointCurve, SegmentPoint, SegmentType, SegmentationParams, SegmentationResult};

/// Default error function.
///
/// Zero for all but the last step. For the last step, the distance from
/// the step end to the curve's end point, positive when the step ends
/// before the curve end (`time < 1`) and negative when it overshoots.
#[must_use]
pub fn default_error(
    curve: &PointCurve,
    _curr: &SegmentPoint,
    next: &SegmentPoint,
    segment_type: SegmentType,
) -> f64 {
    if segment_type != SegmentType::Last {
        return 0.0;
    }
    let Some(end) = curve.end_point() else {
        return 0.0;
    };
    let distance = (next.point - end).norm();
    if next.time < 1.0 { distance } else { -distance }
}

/// Accumulated error and step count of one traversal.
#[derive(Debug, Clone, Copy)]
struct Sample {
    error: f64,
    steps: usize,
}

impl Sample {
    fn is_short(self, num_segments: usize) -> bool {
        self.steps > num_segments || (self.steps == num_segments && self.error > 0.0)
    }
}

impl PointCurve {
    /// Find the segment length that splits the curve into `num_segments`
    /// constant-length steps.
    ///
    /// `error_fn` is summed over every step of a traversal. By convention a
    /// positive sum means the traversal ended before the curve end (the
    /// length is too short) and a negative sum that it overshot. The search
    /// succeeds when a traversal takes exactly `num_segments` steps and the
    /// sum is within [`SegmentationParams::error_tolerance`]. Use
    /// [`default_error`] to land the last step on the curve's end point.
    ///
    /// Around sharp bends the chord walk can jump over the root, so no
    /// length meets the tolerance. The search then settles for the best
    /// `num_segments` step sample, if its error is within
    /// [`SegmentationParams::fallback_tolerance`] of the segment length.
    ///
    /// A successful result is also stored as the curve's
    /// [`last_successful_result`](Self::last_successful_result). A zero-length
    /// curve, `num_segments == 0` or a non-converging search returns
    /// [`SegmentationResult::failed`].
    ///
    /// # Example
    ///
    /// ```
    /// use point_curve::{PointCurve, SegmentationParams, default_error};
    /// use nalgebra::Point3;
    ///
    /// let mut curve = PointCurve::from_points([
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(1.0, 1.0, 0.0),
    /// ]);
    /// curve.finalize();
    ///
    /// let result = curve.find_segment_length(5, default_error, &SegmentationParams::default());
    /// assert!(result.successful);
    /// assert!(result.segment_length > 0.0 && result.segment_length < 0.4);
    /// ```
    pub fn find_segment_length<F>(
        &mut self,
        num_segments: usize,
        error_fn: F,
        params: &SegmentationParams,
    ) -> SegmentationResult
    where
        F: Fn(&PointCurve, &SegmentPoint, &SegmentPoint, SegmentType) -> f64,
    {
        if !self.is_finalized() && !self.finalize() {
            debug!(
                "Segment length solver skipped: undefined curve with {} points",
                self.num_points()
            );
            return SegmentationResult::failed(num_segments);
        }

        let total_length = self.total_length();
        if total_length <= 0.0 || num_segments < 1 {
            return SegmentationResult::failed(num_segments);
        }

        let n = num_segments as f64;
        let dl = params.derivative_step / n;
        let min_length = params.min_segment_length.max(0.0);

        let mut length = total_length / n;
        let mut short: Option<f64> = None;
        let mut long: Option<f64> = None;
        // Closest `num_segments` step sample as (length, error).
        let mut best: Option<(f64, f64)> = None;
        let mut iterations = 0;

        while iterations < params.max_iterations {
            iterations += 1;

            let Some(sample) = self.sample(length, params.step_tolerance, &error_fn) else {
                break;
            };

            if sample.steps == num_segments {
                if best.is_none_or(|(_, error)| sample.error.abs() < error.abs()) {
                    best = Some((length, sample.error));
                }
                if sample.error.abs() < params.error_tolerance {
                    let result =
                        SegmentationResult::solved(length, sample.error, num_segments, iterations);
                    self.store_result(result);
                    debug!(
                        "Segment length {:.6} for {} segments (error {:.3e}, {} iterations)",
                        length, num_segments, sample.error, iterations
                    );
                    return result;
                }
            }

            let is_short = sample.is_short(num_segments);
            if is_short {
                short = Some(short.map_or(length, |lo| lo.max(length)));
            } else {
                long = Some(long.map_or(length, |hi| hi.min(length)));
            }

            let inside = |candidate: f64| {
                candidate - dl > min_length
                    && candidate <= total_length
                    && short.is_none_or(|lo| candidate > lo)
                    && long.is_none_or(|hi| candidate < hi)
            };

            let newton = if sample.steps == num_segments {
                self.newton_step(length, dl, sample.error, num_segments, params.step_tolerance, &error_fn)
                    .filter(|&candidate| inside(candidate))
            } else {
                None
            };

            length = match (newton, short, long) {
                (Some(candidate), _, _) => candidate,
                (None, Some(lo), Some(hi)) if lo < hi => 0.5 * (lo + hi),
                // No bracket yet, rescale by the step count mismatch.
                (None, _, _) if sample.steps != num_segments => {
                    length * (sample.steps as f64 / n).clamp(0.5, 2.0)
                }
                (None, _, _) if is_short => length * (1.0 + 0.25 / n),
                (None, _, _) => length * (1.0 - 0.25 / n),
            };

            if length - dl <= min_length {
                break;
            }
        }

        if let Some((length, error)) =
            best.filter(|&(length, error)| error.abs() <= params.fallback_tolerance * length)
        {
            let result = SegmentationResult::solved(length, error, num_segments, iterations);
            self.store_result(result);
            debug!(
                "Segment length {:.6} for {} segments accepted with end error {:.3e}",
                length, num_segments, error
            );
            return result;
        }

        warn!(
            "Segment length solver failed for {} segments after {} iterations (best error {:.3e})",
            num_segments,
            iterations,
            best.map_or(f64::INFINITY, |(_, error)| error.abs())
        );

        SegmentationResult {
            num_iterations: iterations,
            ..SegmentationResult::failed(num_segments)
        }
    }

    /// Sample one traversal, `None` if it never reached a last step.
    fn sample<F>(&self, segment_length: f64, tolerance: f64, error_fn: &F) -> Option<Sample>
    where
        F: Fn(&PointCurve, &SegmentPoint, &SegmentPoint, SegmentType) -> f64,
    {
        let mut error = 0.0;
        let mut steps = 0;
        let mut reached_last = false;
        for step in self.traverse(segment_length, tolerance) {
            error += error_fn(self, &step.curr, &step.next, step.segment_type);
            steps += 1;
            reached_last = step.segment_type == SegmentType::Last;
        }
        (reached_last && error.is_finite()).then_some(Sample { error, steps })
    }

    /// Central difference Newton candidate, only when both samples keep the
    /// step count.
    fn newton_step<F>(
        &self,
        length: f64,
        dl: f64,
        error: f64,
        num_segments: usize,
        tolerance: f64,
        error_fn: &F,
    ) -> Option<f64>
    where
        F: Fn(&PointCurve, &SegmentPoint, &SegmentPoint, SegmentType) -> f64,
    {
        let prev = self.sample(length - dl, tolerance, error_fn)?;
        let next = self.sample(length + dl, tolerance, error_fn)?;
        if prev.steps != num_segments || next.steps != num_segments {
            return None;
        }
        let slope = next.error - prev.error;
        if slope == 0.0 {
            return None;
        }
        let candidate = length - 2.0 * dl * error / slope;
        candidate.is_finite().then_some(candidate)
    }
}
