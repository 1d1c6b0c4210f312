//! Piecewise linear point curves with normalized arc-time.
//!
//! A point curve is the control polygon of a cable or wire route. Before it
//! can be evaluated, [`PointCurve::finalize`] computes the normalized arc
//! length ("time") at every control point:
//!
//! ```text
//! time[0] = 0,  time[i] = time[i - 1] + |p[i] - p[i - 1]| / L,  time[n - 1] = 1
//! ```

use nalgebra::Point3;

use crate::{CurveError, Result, SegmentPoint, SegmentationResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Times closer than this to 0 or 1 snap to the first or last control point.
pub(crate) const TIME_EPSILON: f64 = 1.0e-6;

/// A piecewise linear curve through an ordered list of control points.
///
/// The curve also remembers the last successful segmentation, so owners can
/// reuse it while the control points are unchanged.
///
/// # Example
///
/// ```
/// use point_curve::PointCurve;
/// use nalgebra::Point3;
///
/// let mut curve = PointCurve::from_points([
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
/// ]);
/// assert!(curve.finalize());
///
/// let corner = curve.evaluate(0.5)?;
/// assert!((corner.point.x - 1.0).abs() < 1e-10);
/// assert!(corner.point.y.abs() < 1e-10);
/// # Ok::<(), point_curve::CurveError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointCurve {
    points: Vec<Point3<f64>>,
    times: Vec<f64>,
    last_result: SegmentationResult,
}

impl PointCurve {
    /// Create an empty curve.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a curve from control points. The curve is not finalized.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Point3<f64>>) -> Self {
        Self {
            points: points.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Control points of the curve.
    #[must_use]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Iterate the control points.
    pub fn iter(&self) -> std::slice::Iter<'_, Point3<f64>> {
        self.points.iter()
    }

    /// Number of control points.
    #[must_use]
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Check if the curve has no control points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Control point at `index`.
    #[must_use]
    pub fn point(&self, index: usize) -> Option<&Point3<f64>> {
        self.points.get(index)
    }

    /// Last control point.
    #[must_use]
    pub fn end_point(&self) -> Option<&Point3<f64>> {
        self.points.last()
    }

    /// Total length of the unsegmented curve, 0 for fewer than two points.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }

    /// Move the control point at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::IndexOutOfRange`] if `index` is outside the curve.
    pub fn set_point(&mut self, index: usize, point: Point3<f64>) -> Result<()> {
        let len = self.points.len();
        let slot = self
            .points
            .get_mut(index)
            .ok_or_else(|| CurveError::index_out_of_range(index, len))?;
        *slot = point;
        self.times.clear();
        Ok(())
    }

    /// Move the control points, in order, to `points`.
    ///
    /// Pairs points up to the shorter of the two sequences; the point
    /// count never changes. Use [`clear`](Self::clear) and
    /// [`add`](Self::add) to rebuild a curve.
    pub fn move_points(&mut self, points: impl IntoIterator<Item = Point3<f64>>) {
        for (slot, point) in self.points.iter_mut().zip(points) {
            *slot = point;
        }
        self.times.clear();
    }

    /// Append a control point.
    pub fn add(&mut self, point: Point3<f64>) {
        self.points.push(point);
        self.times.clear();
    }

    /// Insert a control point at `index`, shifting later points.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::IndexOutOfRange`] if `index > num_points()`.
    pub fn insert(&mut self, index: usize, point: Point3<f64>) -> Result<()> {
        if index > self.points.len() {
            return Err(CurveError::index_out_of_range(index, self.points.len()));
        }
        self.points.insert(index, point);
        self.times.clear();
        Ok(())
    }

    /// Remove the control point at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::IndexOutOfRange`] if `index` is outside the curve.
    pub fn remove_at(&mut self, index: usize) -> Result<Point3<f64>> {
        if index >= self.points.len() {
            return Err(CurveError::index_out_of_range(index, self.points.len()));
        }
        self.times.clear();
        Ok(self.points.remove(index))
    }

    /// Remove all control points.
    pub fn clear(&mut self) {
        self.points.clear();
        self.times.clear();
    }

    /// Last result stored by a successful [`find_segment_length`](Self::find_segment_length).
    #[must_use]
    pub fn last_successful_result(&self) -> SegmentationResult {
        self.last_result
    }

    /// Overwrite the stored result, e.g. to invalidate it.
    pub fn set_last_successful_result(&mut self, result: SegmentationResult) {
        self.last_result = result;
    }

    pub(crate) fn store_result(&mut self, result: SegmentationResult) {
        self.last_result = result;
    }

    /// Compute the arc-time table.
    ///
    /// Has to be called after the control points have changed and before
    /// the curve is evaluated, traversed or segmented.
    ///
    /// Returns false if the curve has fewer than two points or zero length.
    pub fn finalize(&mut self) -> bool {
        self.times.clear();

        let total_length = self.total_length();
        if self.points.len() < 2 || total_length <= 0.0 {
            return false;
        }

        self.times.reserve(self.points.len());
        let mut accumulated = 0.0;
        self.times.push(accumulated);
        for w in self.points.windows(2) {
            accumulated += (w[1] - w[0]).norm() / total_length;
            self.times.push(accumulated);
        }
        if let Some(last) = self.times.last_mut() {
            *last = 1.0;
        }

        true
    }

    /// Check if the arc-time table matches the current control points.
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.points.len() >= 2 && self.times.len() == self.points.len()
    }

    /// Index of the control point at, or before, time `t`.
    ///
    /// Returns 0 for `t` near or below 0 and `num_points() - 1` for `t` near
    /// or above 1. Otherwise the index of the last control point whose time
    /// is strictly less than `t`.
    #[must_use]
    pub fn find_index(&self, t: f64) -> usize {
        if t <= TIME_EPSILON {
            return 0;
        }
        if t >= 1.0 - TIME_EPSILON {
            return self.points.len().saturating_sub(1);
        }
        self.times
            .partition_point(|&time| time < t)
            .saturating_sub(1)
    }

    /// Evaluate the curve at time `t`.
    ///
    /// Times beyond 1 extrapolate along the last curve segment.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InsufficientPoints`] for fewer than two points
    /// and [`CurveError::NotFinalized`] if the arc-time table is stale.
    pub fn evaluate(&self, t: f64) -> Result<SegmentPoint> {
        if self.points.len() < 2 {
            return Err(CurveError::insufficient_points(2, self.points.len()));
        }
        if !self.is_finalized() {
            return Err(CurveError::NotFinalized {
                num_points: self.points.len(),
                num_times: self.times.len(),
            });
        }

        let index = self.find_index(t).min(self.points.len() - 2);
        let begin = self.points[index];
        let end = self.points[index + 1];
        let (t0, t1) = (self.times[index], self.times[index + 1]);

        let (local_time, point) = if t1 - t0 <= 0.0 {
            (1.0, end)
        } else {
            let local_time = (t - t0) / (t1 - t0);
            (local_time, begin + (end - begin) * local_time)
        };

        Ok(SegmentPoint {
            begin,
            end,
            point,
            local_time,
            time: t,
        })
    }
}

impl<'a> IntoIterator for &'a PointCurve {
    type Item = &'a Point3<f64>;
    type IntoIter = std::slice::Iter<'a, Point3<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
