//! Constant chord-length traversal of a point curve.
//!
//! Starting at `t = 0`, each step advances `dt = L / total_length` and then
//! corrects the step end until the straight distance from the step start is
//! `L` (within `tolerance * total_length`). The traversal stops when a step
//! passes `t = 1 + dt` or lands within `L / 2` of the curve's last point.
//! With [`Traversal::clamp_to_end`] that last step is moved onto the curve
//! end.
//!
//! ```text
//!   o-----x-----x-----x-----x--o
//!   |  L  |  L  |  L  |  L  |
//! First  Intermediate ...  Last
//! ```

use nalgebra::Point3;
use tracing::warn;

use crate::{PointCurve, SegmentPoint, SegmentType};

/// Maximum chord corrections per step.
const MAX_CORRECTIONS: usize = 100;

/// One step of a traversal: the chord from `curr` to `next`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentStep {
    /// Start of the step.
    pub curr: SegmentPoint,
    /// End of the step.
    pub next: SegmentPoint,
    /// Position of the step within the traversal.
    pub segment_type: SegmentType,
}

/// Lazy iterator over the constant-length steps of a [`PointCurve`].
///
/// Created by [`PointCurve::traverse`]. The sequence is a pure function of
/// the curve's control points and the step length; call `traverse` again to
/// restart.
#[derive(Debug, Clone)]
pub struct Traversal<'a> {
    curve: &'a PointCurve,
    end_point: Point3<f64>,
    segment_length: f64,
    total_length: f64,
    chord_tolerance: f64,
    dt: f64,
    prev_t: f64,
    prev: Option<SegmentPoint>,
    segment_type: SegmentType,
    remaining_steps: usize,
    clamp_end: bool,
}

impl<'a> Traversal<'a> {
    fn new(curve: &'a PointCurve, segment_length: f64, tolerance: f64) -> Self {
        let total_length = curve.total_length();
        let dt = segment_length / total_length;
        let valid = segment_length > 0.0 && total_length > 0.0 && dt.is_finite();

        let prev = if valid { curve.evaluate(0.0).ok() } else { None };
        let end_point = curve.end_point().copied().unwrap_or_else(Point3::origin);

        // Converged steps advance at least `dt`, so this only trips on
        // non-converging corrections.
        let remaining_steps = if valid {
            ((1.0 / dt).ceil() as usize).saturating_mul(4).saturating_add(16)
        } else {
            0
        };

        Self {
            curve,
            end_point,
            segment_length,
            total_length,
            chord_tolerance: tolerance * total_length,
            dt,
            prev_t: 0.0,
            prev,
            segment_type: SegmentType::First,
            remaining_steps,
            clamp_end: false,
        }
    }

    /// End the last step exactly at the curve end (`time == 1`).
    ///
    /// Solver samples stay unclamped so the end error remains measurable.
    #[must_use]
    pub fn clamp_to_end(mut self) -> Self {
        self.clamp_end = true;
        self
    }

    /// Step length this traversal walks with.
    #[must_use]
    pub fn segment_length(&self) -> f64 {
        self.segment_length
    }

    fn evaluate_or_stop(&mut self, t: f64) -> Option<SegmentPoint> {
        let point = self.curve.evaluate(t).ok();
        if point.is_none() {
            self.prev = None;
        }
        point
    }
}

impl Iterator for Traversal<'_> {
    type Item = SegmentStep;

    fn next(&mut self) -> Option<SegmentStep> {
        let prev = self.prev?;

        if self.remaining_steps == 0 {
            warn!(
                "Traversal with segment length {:.6} exceeded its step limit at t = {:.6}",
                self.segment_length, self.prev_t
            );
            self.prev = None;
            return None;
        }
        self.remaining_steps -= 1;

        let dt = self.dt;
        let mut curr_t = self.prev_t + dt;
        let mut curr = self.evaluate_or_stop(curr_t)?;
        let mut chord = (curr.point - prev.point).norm();

        let mut corrections = 0;
        while chord > 0.0
            && curr_t < 1.0 + 0.5 * dt
            && (chord - self.segment_length).abs() >= self.chord_tolerance
            && corrections < MAX_CORRECTIONS
        {
            corrections += 1;
            curr_t -= (chord - self.segment_length) / self.total_length;
            curr = self.evaluate_or_stop(curr_t)?;
            chord = (curr.point - prev.point).norm();
        }

        let done = curr_t > 1.0 + dt
            || (curr_t + 0.5 * dt >= 1.0
                && (curr.point - self.end_point).norm() < 0.5 * self.segment_length);

        if done {
            self.segment_type = SegmentType::Last;
            if self.clamp_end {
                if let Ok(mut end) = self.curve.evaluate(1.0) {
                    end.point = self.end_point;
                    curr = end;
                }
            }
        }

        let step = SegmentStep {
            curr: prev,
            next: curr,
            segment_type: self.segment_type,
        };

        if self.segment_type == SegmentType::First {
            self.segment_type = SegmentType::Intermediate;
        }

        if done {
            self.prev = None;
        } else {
            self.prev_t = curr_t;
            self.prev = Some(curr);
        }

        Some(step)
    }
}

impl std::iter::FusedIterator for Traversal<'_> {}

impl PointCurve {
    /// Walk the curve in steps of constant chord length.
    ///
    /// `tolerance` is the accepted chord length error as a factor of the
    /// total curve length. The traversal is empty for a non-positive
    /// `segment_length`, an unfinalized curve or a zero-length curve.
    ///
    /// # Example
    ///
    /// ```
    /// use point_curve::{PointCurve, SegmentType};
    /// use nalgebra::Point3;
    ///
    /// let mut curve = PointCurve::from_points([
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(4.0, 0.0, 0.0),
    /// ]);
    /// curve.finalize();
    ///
    /// let steps: Vec<_> = curve.traverse(1.0, 1e-6).collect();
    /// assert_eq!(steps.len(), 4);
    /// assert_eq!(steps[0].segment_type, SegmentType::First);
    /// assert_eq!(steps[3].segment_type, SegmentType::Last);
    /// ```
    #[must_use]
    pub fn traverse(&self, segment_length: f64, tolerance: f64) -> Traversal<'_> {
        Traversal::new(self, segment_length, tolerance)
    }

    /// Callback form of [`traverse`](Self::traverse).
    ///
    /// Returns the number of steps visited.
    pub fn traverse_with<F>(&self, segment_length: f64, tolerance: f64, mut callback: F) -> usize
    where
        F: FnMut(&SegmentPoint, &SegmentPoint, SegmentType),
    {
        let mut count = 0;
        for step in self.traverse(segment_length, tolerance) {
            callback(&step.curr, &step.next, step.segment_type);
            count += 1;
        }
        count
    }
}
