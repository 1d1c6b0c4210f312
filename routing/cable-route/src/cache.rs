//! Memoized route curve.
//!
//! Segmenting a route means running the segment length solver, which walks
//! the curve many times. The cache keeps the curve, the resolution it was
//! solved for and the resulting route points, and only resolves when
//! [`RouteCurveCache::is_up_to_date`] says the route or resolution changed.

use nalgebra::Point3;
use point_curve::{PointCurve, SegmentType, SegmentationParams, SegmentationResult, default_error};
use route_types::{Route, RouteNode};
use tracing::debug;

/// Resolutions closer than this are considered equal.
const RESOLUTION_EPSILON: f64 = 1.0e-6;

/// Lazily segmented curve through the nodes of a route.
#[derive(Debug, Clone, Default)]
pub struct RouteCurveCache {
    curve: Option<PointCurve>,
    resolution_per_unit_length: Option<f64>,
    route_points: Vec<Point3<f64>>,
}

impl RouteCurveCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached curve, if it has been built.
    #[must_use]
    pub fn curve(&self) -> Option<&PointCurve> {
        self.curve.as_ref()
    }

    /// Route points of the last successful synchronization.
    ///
    /// Empty if the last synchronization failed.
    #[must_use]
    pub fn route_points(&self) -> &[Point3<f64>] {
        &self.route_points
    }

    /// Resolution the cached segmentation was solved for.
    #[must_use]
    pub const fn resolution_per_unit_length(&self) -> Option<f64> {
        self.resolution_per_unit_length
    }

    /// Returns `true` if the cached curve still describes `route` at
    /// `resolution_per_unit_length`.
    ///
    /// That is the case when a curve exists, it was solved for the same
    /// resolution, and every route node is within `tolerance` of its curve
    /// point.
    #[must_use]
    pub fn is_up_to_date<N: RouteNode>(
        &self,
        route: &Route<N>,
        resolution_per_unit_length: f64,
        tolerance: f64,
    ) -> bool {
        let Some(curve) = &self.curve else {
            return false;
        };
        self.resolution_per_unit_length
            .is_some_and(|cached| (cached - resolution_per_unit_length).abs() < RESOLUTION_EPSILON)
            && route.is_synchronized(curve, tolerance)
    }

    /// Drop the cached segmentation. The next synchronization solves again.
    pub fn invalidate(&mut self) {
        self.resolution_per_unit_length = None;
        self.route_points.clear();
        if let Some(curve) = &mut self.curve {
            curve.set_last_successful_result(SegmentationResult::failed(0));
        }
    }

    /// Segment `route` at `resolution_per_unit_length`.
    ///
    /// Returns the cached result while [`is_up_to_date`](Self::is_up_to_date)
    /// holds and the cached result is successful. Otherwise the curve is
    /// updated from the route (rebuilt if the node count changed, moved in
    /// place if not) and solved for `max(ceil(resolution * length), 1)`
    /// segments.
    pub fn synchronize<N: RouteNode>(
        &mut self,
        route: &Route<N>,
        resolution_per_unit_length: f64,
        tolerance: f64,
        params: &SegmentationParams,
    ) -> SegmentationResult {
        if self.is_up_to_date(route, resolution_per_unit_length, tolerance) {
            if let Some(cached) = self
                .curve
                .as_ref()
                .map(PointCurve::last_successful_result)
                .filter(|result| result.successful)
            {
                return cached;
            }
        }

        let curve = self.curve.get_or_insert_with(PointCurve::new);
        curve.set_last_successful_result(SegmentationResult::failed(0));
        self.route_points.clear();

        if curve.num_points() == route.num_nodes() {
            curve.move_points(route.positions());
        } else {
            debug!(
                "Rebuilding route curve: {} points for {} route nodes",
                curve.num_points(),
                route.num_nodes()
            );
            curve.clear();
            for position in route.positions() {
                curve.add(position);
            }
        }

        let total_length = route.total_length();
        let num_segments = ((resolution_per_unit_length * total_length).ceil() as usize).max(1);

        if !curve.finalize() {
            debug!(
                "Route curve with {} points and length {:.6} cannot be segmented",
                curve.num_points(),
                total_length
            );
            return SegmentationResult::failed(num_segments);
        }

        let result = curve.find_segment_length(num_segments, default_error, params);
        if !result.successful {
            return SegmentationResult::failed(num_segments);
        }

        self.resolution_per_unit_length = Some(resolution_per_unit_length);
        for step in curve
            .traverse(result.segment_length, params.step_tolerance)
            .clamp_to_end()
        {
            self.route_points.push(step.curr.point);
            if step.segment_type == SegmentType::Last
                && (step.next.time - 1.0).abs() < (step.curr.time - 1.0).abs()
            {
                self.route_points.push(step.next.point);
            }
        }

        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use route_types::CableRouteNode;

    fn route(points: &[[f64; 3]]) -> Route<CableRouteNode> {
        points
            .iter()
            .map(|p| CableRouteNode::free(Point3::new(p[0], p[1], p[2])))
            .collect()
    }

    #[test]
    fn test_empty_cache_is_not_up_to_date() {
        let cache = RouteCurveCache::new();
        assert!(!cache.is_up_to_date(&route(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]), 1.0, 1e-4));
        assert!(cache.route_points().is_empty());
    }

    #[test]
    fn test_colinear_route_points() {
        let route = route(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        let mut cache = RouteCurveCache::new();
        let result = cache.synchronize(&route, 1.0, 1e-4, &SegmentationParams::default());

        assert!(result.successful);
        assert_eq!(result.num_segments, 2);
        assert_relative_eq!(result.segment_length, 1.0, epsilon = 1e-6);

        let xs: Vec<_> = cache.route_points().iter().map(|p| p.x).collect();
        assert_eq!(xs.len(), 3);
        for (x, expected) in xs.iter().zip([0.0, 1.0, 2.0]) {
            assert_relative_eq!(*x, expected, epsilon = 1e-6);
        }
        assert!(cache.is_up_to_date(&route, 1.0, 1e-4));
    }

    #[test]
    fn test_route_points_end_on_last_node() {
        let routes: [&[[f64; 3]]; 3] = [
            &[[0.0, 0.0, 0.0], [1.0, 0.4, 0.0], [1.5, 2.0, 0.3]],
            &[[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 3.0]],
            &[[2.0, 1.0, 0.0], [-1.0, 1.5, 0.5], [-1.0, -2.0, 1.0]],
        ];
        let params = SegmentationParams::default();

        for points in routes {
            let route = route(points);
            let end = route.positions().last().unwrap();
            for resolution in [1.0, 3.0, 5.0, 7.0] {
                let mut cache = RouteCurveCache::new();
                if !cache.synchronize(&route, resolution, 1e-4, &params).successful {
                    continue;
                }
                let last = *cache.route_points().last().unwrap();
                assert!((last - end).norm() < 1e-4, "resolution {resolution}: {last} vs {end}");
            }
        }
    }

    #[test]
    fn test_in_place_update_keeps_curve() {
        let mut route = route(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        let mut cache = RouteCurveCache::new();
        let params = SegmentationParams::default();
        cache.synchronize(&route, 2.0, 1e-4, &params);

        route
            .get_mut(1)
            .unwrap()
            .frame_mut()
            .set_position(Point3::new(2.0, 0.0, 0.0));
        let result = cache.synchronize(&route, 2.0, 1e-4, &params);

        assert_eq!(result.num_segments, 4);
        assert_eq!(cache.curve().unwrap().point(1), Some(&Point3::new(2.0, 0.0, 0.0)));
        assert!(cache.is_up_to_date(&route, 2.0, 1e-4));
    }

    #[test]
    fn test_resolution_change_invalidates() {
        let route = route(&[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        let mut cache = RouteCurveCache::new();
        let params = SegmentationParams::default();

        let first = cache.synchronize(&route, 1.0, 1e-4, &params);
        assert_eq!(first.num_segments, 2);
        assert!(!cache.is_up_to_date(&route, 2.0, 1e-4));

        let second = cache.synchronize(&route, 2.0, 1e-4, &params);
        assert_eq!(second.num_segments, 4);
        assert_eq!(cache.resolution_per_unit_length(), Some(2.0));
    }

    #[test]
    fn test_node_count_change_rebuilds_curve() {
        let mut route = route(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        let mut cache = RouteCurveCache::new();
        let params = SegmentationParams::default();
        assert!(cache.synchronize(&route, 2.0, 1e-4, &params).successful);

        route.add(CableRouteNode::free(Point3::new(1.0, 1.0, 0.0))).unwrap();
        assert!(!cache.is_up_to_date(&route, 2.0, 1e-4));

        let result = cache.synchronize(&route, 2.0, 1e-4, &params);
        assert!(result.successful);
        assert_eq!(cache.curve().unwrap().num_points(), 3);
        assert_eq!(result.num_segments, 4);
    }

    #[test]
    fn test_degenerate_route_fails() {
        let route = route(&[[1.0, 1.0, 1.0], [1.0, 1.0, 1.0]]);
        let mut cache = RouteCurveCache::new();
        let result = cache.synchronize(&route, 5.0, 1e-4, &SegmentationParams::default());

        assert!(!result.successful);
        assert_eq!(result.error, f64::INFINITY);
        assert!(cache.route_points().is_empty());
        assert!(!cache.is_up_to_date(&route, 5.0, 1e-4));
    }

    #[test]
    fn test_invalidate_forces_new_solve() {
        let route = route(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        let mut cache = RouteCurveCache::new();
        let params = SegmentationParams::default();
        cache.synchronize(&route, 3.0, 1e-4, &params);

        cache.invalidate();
        assert!(!cache.is_up_to_date(&route, 3.0, 1e-4));
        assert!(cache.route_points().is_empty());

        assert!(cache.synchronize(&route, 3.0, 1e-4, &params).successful);
        assert!(!cache.route_points().is_empty());
    }
}
