//! Segmented cables.
//!
//! A [`Cable`] owns a route of [`CableRouteNode`]s and turns it into a
//! native cable. With [`RouteAlgorithm::Segmenting`] the route is first
//! resampled into equally long segments:
//!
//! ```text
//!   route:    A=========B-------------C          (A, C body fixed)
//!   segments: o---o---o---o---o---o---o
//!             ^ rigid to A        rigid to C ^
//! ```
//!
//! Every segment start becomes a free native node, oriented along the
//! segment and twisted between the rotations of the route nodes around it.
//! A body fixed route node is attached, once, to the first segment that
//! starts at or after it.

use hashbrown::HashSet;
use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};
use point_curve::{SegmentPoint, SegmentType, SegmentationResult, twist};
use route_types::{AttachmentKind, CableRouteNode, NodeId, Route, RouteNode};
use tracing::{debug, error};

use crate::{
    CableConfig, CableEngine, CableError, CableProperty, NativeAttachment, NativeBinding,
    NativeCableNode, Result, RouteAlgorithm, RouteCurveCache,
};

/// Step directions shorter than this fall back to the route direction.
const DIRECTION_EPSILON: f64 = 1.0e-12;

/// One traversal step of a segmented cable route.
#[derive(Debug, Clone, Copy)]
pub struct RoutePointData<'a> {
    /// Route node at or before the step start.
    pub curr_node: &'a CableRouteNode,
    /// Route node after the step start.
    pub next_node: &'a CableRouteNode,
    /// Step start.
    pub position: Point3<f64>,
    /// Step rotation, forward (+Z) along the step, twisted between the
    /// rotations of `curr_node` and `next_node`.
    pub rotation: UnitQuaternion<f64>,
    /// Curve point at the step start.
    pub curr_point: SegmentPoint,
    /// Curve point at the step end.
    pub next_point: SegmentPoint,
    /// Position of the step in the traversal.
    pub segment_type: SegmentType,
}

impl RoutePointData<'_> {
    /// Route node to attach to the native node of this step, if any.
    ///
    /// The current node for first and intermediate steps, the next node
    /// for the last step; free nodes are never attached.
    #[must_use]
    pub fn attachment_node(&self) -> Option<&CableRouteNode> {
        let node = match self.segment_type {
            SegmentType::First | SegmentType::Intermediate => self.curr_node,
            SegmentType::Last => self.next_node,
        };
        (!node.is_free()).then_some(node)
    }
}

/// A cable described by a route and simulated by a native engine.
///
/// # Example
///
/// ```ignore
/// let mut cable = Cable::new(engine);
/// cable.route_mut().add(CableRouteNode::free(Point3::new(0.0, 0.0, 0.0)))?;
/// cable.route_mut().add(CableRouteNode::free(Point3::new(2.0, 0.0, 0.0)))?;
///
/// let result = cable.synchronize_route_point_curve();
/// assert_eq!(result.num_segments, 10);
/// cable.initialize()?;
/// ```
pub struct Cable<E: CableEngine> {
    config: CableConfig,
    route: Route<CableRouteNode>,
    cache: RouteCurveCache,
    engine: E,
    native: Option<E::Cable>,
}

impl<E: CableEngine> Cable<E> {
    /// Cable with default configuration and an empty route.
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, CableConfig::default())
    }

    /// Cable with `config` and an empty route.
    pub fn with_config(engine: E, config: CableConfig) -> Self {
        Self {
            config,
            route: Route::new(),
            cache: RouteCurveCache::new(),
            engine,
            native: None,
        }
    }

    /// Replace the route and return the cable.
    #[must_use]
    pub fn with_route(mut self, route: Route<CableRouteNode>) -> Self {
        self.route = route;
        self
    }

    /// Current configuration.
    pub const fn config(&self) -> &CableConfig {
        &self.config
    }

    /// The route.
    pub const fn route(&self) -> &Route<CableRouteNode> {
        &self.route
    }

    /// The route, for editing. The route curve is resolved on next use.
    pub fn route_mut(&mut self) -> &mut Route<CableRouteNode> {
        &mut self.route
    }

    /// The engine.
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// The engine, mutably.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// The native cable, once initialized.
    pub const fn native(&self) -> Option<&E::Cable> {
        self.native.as_ref()
    }

    /// Returns `true` once [`initialize`](Self::initialize) succeeded.
    pub const fn is_initialized(&self) -> bool {
        self.native.is_some()
    }

    /// The memoized route curve.
    pub const fn route_curve_cache(&self) -> &RouteCurveCache {
        &self.cache
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Cable radius.
    pub const fn radius(&self) -> f64 {
        self.config.radius
    }

    /// Set the radius.
    pub fn set_radius(&mut self, radius: f64) {
        self.config.radius = radius;
        self.apply_to_native(CableProperty::Radius(radius));
    }

    /// Cable diameter.
    pub fn diameter(&self) -> f64 {
        self.config.diameter()
    }

    /// Set the radius from a diameter.
    pub fn set_diameter(&mut self, diameter: f64) {
        self.set_radius(0.5 * diameter);
    }

    /// Segments per unit length.
    pub const fn resolution_per_unit_length(&self) -> f64 {
        self.config.resolution_per_unit_length
    }

    /// Set the resolution. The route curve is resolved on next use.
    pub fn set_resolution_per_unit_length(&mut self, resolution: f64) {
        self.config.resolution_per_unit_length = resolution;
        self.apply_to_native(CableProperty::ResolutionPerUnitLength(resolution));
    }

    /// Linear velocity damping.
    pub const fn linear_velocity_damping(&self) -> f64 {
        self.config.linear_velocity_damping
    }

    /// Set the linear velocity damping.
    pub fn set_linear_velocity_damping(&mut self, damping: f64) {
        self.config.linear_velocity_damping = damping;
        self.apply_to_native(CableProperty::LinearVelocityDamping(damping));
    }

    /// Angular velocity damping.
    pub const fn angular_velocity_damping(&self) -> f64 {
        self.config.angular_velocity_damping
    }

    /// Set the angular velocity damping.
    pub fn set_angular_velocity_damping(&mut self, damping: f64) {
        self.config.angular_velocity_damping = damping;
        self.apply_to_native(CableProperty::AngularVelocityDamping(damping));
    }

    /// Route handling during initialization.
    pub const fn route_algorithm(&self) -> RouteAlgorithm {
        self.config.route_algorithm
    }

    /// Set the route handling. Only affects the next initialization.
    pub fn set_route_algorithm(&mut self, algorithm: RouteAlgorithm) {
        self.config.route_algorithm = algorithm;
    }

    // =========================================================================
    // Route points
    // =========================================================================

    /// Returns `true` if the cached route curve still matches the route and
    /// the resolution.
    pub fn is_route_point_curve_up_to_date(&self) -> bool {
        self.cache.is_up_to_date(
            &self.route,
            self.config.resolution_per_unit_length,
            self.config.sync_tolerance,
        )
    }

    /// Segment the route at the current resolution.
    ///
    /// Returns the cached result while the route curve is up to date. A
    /// failed result has `successful == false` and an infinite error.
    pub fn synchronize_route_point_curve(&mut self) -> SegmentationResult {
        self.cache.synchronize(
            &self.route,
            self.config.resolution_per_unit_length,
            self.config.sync_tolerance,
            &self.config.segmentation,
        )
    }

    /// Visit every segment of the route.
    ///
    /// Returns `false`, without calling `callback`, if the route can't be
    /// segmented.
    pub fn traverse_route_points<F>(&mut self, mut callback: F) -> bool
    where
        F: FnMut(&RoutePointData<'_>),
    {
        let result = self.synchronize_route_point_curve();
        if !result.successful {
            return false;
        }
        let Some(curve) = self.cache.curve() else {
            return false;
        };
        let route = &self.route;
        let last_index = route.num_nodes().saturating_sub(2);

        let steps = curve
            .traverse(result.segment_length, self.config.segmentation.step_tolerance)
            .clamp_to_end();
        for step in steps {
            let curr_index = curve.find_index(step.curr.time).min(last_index);
            let (Some(curr_node), Some(next_node)) = (route.get(curr_index), route.get(curr_index + 1))
            else {
                return false;
            };

            let direction = Unit::try_new(step.next.point - step.curr.point, DIRECTION_EPSILON)
                .or_else(|| Unit::try_new(next_node.position() - curr_node.position(), DIRECTION_EPSILON))
                .unwrap_or_else(Vector3::z_axis);

            let rotation = twist::twisted_rotation(
                &curr_node.rotation(),
                &next_node.rotation(),
                &direction,
                step.curr.local_time,
            );

            callback(&RoutePointData {
                curr_node,
                next_node,
                position: step.curr.point,
                rotation,
                curr_point: step.curr,
                next_point: step.next,
                segment_type: step.segment_type,
            });
        }

        true
    }

    /// Segment start points of the route, plus the route end.
    ///
    /// Segments the route first if nothing is cached. Empty if the route
    /// can't be segmented.
    pub fn route_points(&mut self) -> &[Point3<f64>] {
        if self.cache.route_points().is_empty() && self.route.num_nodes() > 1 {
            self.synchronize_route_point_curve();
        }
        self.cache.route_points()
    }

    // =========================================================================
    // Native cable
    // =========================================================================

    /// Create the native cable.
    ///
    /// On failure the error is logged and the cable stays without native
    /// binding. Calling this on an initialized cable does nothing.
    pub fn initialize(&mut self) -> Result<()> {
        if self.native.is_some() {
            return Ok(());
        }

        match self.create_native() {
            Ok(native) => {
                self.native = Some(native);
                self.synchronize_properties();
                debug!(
                    "Cable initialized from {} route nodes ({:?})",
                    self.route.num_nodes(),
                    self.config.route_algorithm
                );
                Ok(())
            }
            Err(err) => {
                error!("Cable initialization failed: {err}");
                Err(err)
            }
        }
    }

    /// Remove the native cable from the engine.
    pub fn destroy(&mut self) {
        if let Some(native) = self.native.take() {
            self.engine.remove(native);
        }
    }

    fn create_native(&mut self) -> Result<E::Cable> {
        let issues = self.config.validate();
        if !issues.is_empty() {
            return Err(CableError::invalid_config(&issues));
        }
        if self.route.num_nodes() < 2 {
            return Err(CableError::TooFewNodes {
                actual: self.route.num_nodes(),
            });
        }

        let (mut native, nodes) = match self.config.route_algorithm {
            RouteAlgorithm::Segmenting => {
                let nodes = self.segmented_nodes()?;
                let resolution = self.cache.curve().map_or(0.0, |curve| {
                    curve.last_successful_result().num_segments as f64 / self.route.total_length()
                });
                (self.engine.create_cable(self.config.radius, resolution), nodes)
            }
            RouteAlgorithm::Identity => {
                let nodes = self.route.iter().map(NativeCableNode::from).collect::<Vec<_>>();
                let native = self
                    .engine
                    .create_cable(self.config.radius, self.config.resolution_per_unit_length);
                (native, nodes)
            }
        };

        for (index, node) in nodes.into_iter().enumerate() {
            let kind = if node.is_attached() { "attached node" } else { "node" };
            if !self.engine.add_node(&mut native, node) {
                self.engine.remove(native);
                return Err(CableError::node_rejected(index, kind));
            }
        }

        if self.engine.initialize(&mut native).num_segments == 0 {
            self.engine.remove(native);
            return Err(CableError::InitializationFailed);
        }

        Ok(native)
    }

    /// Free native nodes along the segmented route, with rigid attachments
    /// to the non-free route nodes.
    fn segmented_nodes(&mut self) -> Result<Vec<NativeCableNode>> {
        let mut nodes = Vec::new();
        let mut handled: HashSet<NodeId> = HashSet::new();

        let success = self.traverse_route_points(|data| {
            let mut node = NativeCableNode::free(data.position, data.rotation, data.curr_node.frame().parent());
            if let Some(attachment_node) = data.attachment_node() {
                if handled.insert(attachment_node.id()) {
                    node.attachments.push(NativeAttachment::from_frame(
                        AttachmentKind::Rigid,
                        attachment_node.frame(),
                    ));
                }
            }
            nodes.push(node);
        });

        if success {
            Ok(nodes)
        } else {
            Err(CableError::SegmentationFailed {
                num_nodes: self.route.num_nodes(),
                resolution: self.config.resolution_per_unit_length,
            })
        }
    }

    fn synchronize_properties(&mut self) {
        let properties = [
            CableProperty::LinearVelocityDamping(self.config.linear_velocity_damping),
            CableProperty::AngularVelocityDamping(self.config.angular_velocity_damping),
        ];
        for property in properties {
            self.apply_to_native(property);
        }
    }
}

impl<E: CableEngine> NativeBinding for Cable<E> {
    type Property = CableProperty;

    fn has_native_binding(&self) -> bool {
        self.native.is_some()
    }

    fn apply_to_native(&mut self, property: CableProperty) -> bool {
        let Some(native) = self.native.as_mut() else {
            return false;
        };
        self.engine.set_property(native, property);
        true
    }
}

impl<E: CableEngine> std::fmt::Debug for Cable<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cable")
            .field("config", &self.config)
            .field("num_nodes", &self.route.num_nodes())
            .field("initialized", &self.native.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::native::mock::RecordingEngine;
    use approx::assert_relative_eq;
    use nalgebra::Isometry3;
    use route_types::{CableNodeType, ParentTransform};
    use std::f64::consts::FRAC_PI_2;

    fn cable(points: &[[f64; 3]]) -> Cable<RecordingEngine> {
        let route = points
            .iter()
            .map(|p| CableRouteNode::free(Point3::new(p[0], p[1], p[2])))
            .collect();
        Cable::new(RecordingEngine::default()).with_route(route)
    }

    #[test]
    fn test_colinear_scenario() {
        let mut cable = cable(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        cable.set_resolution_per_unit_length(1.0);

        let result = cable.synchronize_route_point_curve();
        assert!(result.successful);
        assert_eq!(result.num_segments, 2);
        assert_relative_eq!(result.segment_length, 1.0, epsilon = 1e-6);

        let xs: Vec<_> = cable.route_points().iter().map(|p| p.x).collect();
        assert_eq!(xs.len(), 3);
        assert_relative_eq!(xs[2], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_synchronize_is_memoized() {
        let mut cable = cable(&[[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]]);
        let first = cable.synchronize_route_point_curve();
        assert!(cable.is_route_point_curve_up_to_date());

        let second = cable.synchronize_route_point_curve();
        assert_eq!(first, second);

        cable.set_resolution_per_unit_length(2.0);
        assert!(!cable.is_route_point_curve_up_to_date());
    }

    #[test]
    fn test_moved_node_invalidates_curve() {
        let mut cable = cable(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        cable.synchronize_route_point_curve();
        cable
            .route_mut()
            .get_mut(1)
            .unwrap()
            .frame_mut()
            .set_position(Point3::new(2.0, 0.0, 0.0));
        assert!(!cable.is_route_point_curve_up_to_date());

        let result = cable.synchronize_route_point_curve();
        assert_eq!(result.num_segments, 10);
    }

    #[test]
    fn test_sharp_bend_route_ends_on_last_node() {
        let mut cable = cable(&[[0.0, 0.0, 0.0], [1.0, 0.3, 0.0], [1.3, 1.7, 0.2], [2.9, 1.1, 0.4]]);
        cable.set_resolution_per_unit_length(1.0);

        let mut last = None;
        assert!(cable.traverse_route_points(|data| last = Some((data.next_point, data.segment_type))));
        let (end, segment_type) = last.unwrap();
        assert_eq!(segment_type, SegmentType::Last);
        assert_eq!(end.time, 1.0);
        assert_eq!(end.point, Point3::new(2.9, 1.1, 0.4));

        cable.initialize().unwrap();
        assert_eq!(cable.native().unwrap().nodes.len(), 5);
    }

    #[test]
    fn test_traverse_degenerate_route() {
        let mut cable = cable(&[[1.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        let mut calls = 0;
        assert!(!cable.traverse_route_points(|_| calls += 1));
        assert_eq!(calls, 0);
        assert!(cable.route_points().is_empty());
    }

    #[test]
    fn test_route_point_rotations_follow_direction() {
        let mut cable = cable(&[[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 1.0]]);
        let mut visited = 0;
        assert!(cable.traverse_route_points(|data| {
            let dir = (data.next_point.point - data.curr_point.point).normalize();
            assert_relative_eq!(data.rotation * Vector3::z(), dir, epsilon = 1e-9);
            assert_relative_eq!(data.position, data.curr_point.point);
            visited += 1;
        }));
        assert_eq!(visited, 10);
    }

    #[test]
    fn test_route_point_nodes_bracket_step() {
        let mut cable = cable(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]]);
        let ids: Vec<_> = cable.route().iter().map(RouteNode::id).collect();
        let mut pairs = Vec::new();
        cable.traverse_route_points(|data| pairs.push((data.curr_node.id(), data.next_node.id())));

        assert_eq!(pairs.first(), Some(&(ids[0], ids[1])));
        assert_eq!(pairs.last(), Some(&(ids[1], ids[2])));
    }

    #[test]
    fn test_twist_between_node_rotations() {
        let twisted = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        let route = [
            CableRouteNode::free(Point3::origin()),
            CableRouteNode::free(Point3::new(0.0, 0.0, 1.0)).with_rotation(twisted),
        ]
        .into_iter()
        .collect();
        let mut cable = Cable::new(RecordingEngine::default()).with_route(route);
        cable.set_resolution_per_unit_length(4.0);

        let mut angles = Vec::new();
        cable.traverse_route_points(|data| {
            let x = data.rotation * Vector3::x();
            angles.push(x.y.atan2(x.x));
        });

        assert_eq!(angles.len(), 4);
        for (angle, t) in angles.iter().zip([0.0, 0.25, 0.5, 0.75]) {
            assert_relative_eq!(*angle, FRAC_PI_2 * t, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_initialize_too_few_nodes() {
        let mut cable = cable(&[[0.0, 0.0, 0.0]]);
        assert_eq!(cable.initialize(), Err(CableError::TooFewNodes { actual: 1 }));
        assert!(!cable.has_native_binding());
        assert_eq!(cable.engine().created, 0);
    }

    #[test]
    fn test_initialize_invalid_config() {
        let mut cable = cable(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        cable.set_radius(-1.0);
        assert!(matches!(cable.initialize(), Err(CableError::InvalidConfig(_))));
    }

    #[test]
    fn test_initialize_segmenting_attaches_body_fixed_ends() {
        let begin = ParentTransform::new("begin", Isometry3::identity());
        let end = ParentTransform::new("end", Isometry3::translation(1.0, 0.0, 0.0));
        let route = [
            CableRouteNode::body_fixed(&begin, Point3::origin(), UnitQuaternion::identity()),
            CableRouteNode::free(Point3::new(0.5, 0.0, 0.0)),
            CableRouteNode::body_fixed(&end, Point3::origin(), UnitQuaternion::identity()),
        ]
        .into_iter()
        .collect();
        let mut cable = Cable::new(RecordingEngine::default()).with_route(route);
        cable.set_resolution_per_unit_length(4.0);

        cable.initialize().unwrap();
        let native = cable.native().unwrap();

        assert_eq!(native.nodes.len(), 4);
        assert_relative_eq!(native.resolution, 4.0, epsilon = 1e-9);
        assert!(native.nodes.iter().all(|n| n.node_type == CableNodeType::Free));

        let attached: Vec<_> = native
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_attached())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(attached, vec![0, 3]);
        assert_eq!(native.nodes[0].attachments.len(), 1);
        assert_eq!(native.nodes[0].attachments[0].kind, AttachmentKind::Rigid);
        assert_eq!(native.nodes[3].attachments[0].parent.as_ref().unwrap().name(), "end");
    }

    #[test]
    fn test_initialize_identity_adds_route_nodes() {
        let mut cable = cable(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]]);
        cable.set_route_algorithm(RouteAlgorithm::Identity);
        cable.initialize().unwrap();

        let native = cable.native().unwrap();
        assert_eq!(native.nodes.len(), 3);
        assert_relative_eq!(native.resolution, 5.0);
        assert_eq!(native.nodes[2].position, Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_initialize_rejected_node() {
        let mut cable = cable(&[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        cable.engine_mut().max_nodes = Some(3);

        let err = cable.initialize().unwrap_err();
        assert!(err.is_node_rejected());
        assert!(!cable.is_initialized());
        assert_eq!(cable.engine().removed, 1);
    }

    #[test]
    fn test_initialize_zero_segments() {
        let mut cable = cable(&[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        cable.engine_mut().force_zero_segments = true;
        assert_eq!(cable.initialize(), Err(CableError::InitializationFailed));
        assert!(cable.native().is_none());
    }

    #[test]
    fn test_initialize_segmentation_failure() {
        let mut cable = cable(&[[0.0, 0.0, 0.0], [0.0, 0.0, 0.0]]);
        let err = cable.initialize().unwrap_err();
        assert!(matches!(err, CableError::SegmentationFailed { num_nodes: 2, .. }));
    }

    #[test]
    fn test_properties_forward_once_bound() {
        let mut cable = cable(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        cable.set_linear_velocity_damping(0.5);
        assert!(!cable.apply_to_native(CableProperty::Radius(0.1)));

        cable.initialize().unwrap();
        assert!(cable.has_native_binding());
        cable.set_diameter(0.2);
        assert_relative_eq!(cable.radius(), 0.1);

        let properties = &cable.native().unwrap().properties;
        assert_eq!(
            properties,
            &vec![
                "LinearVelocityDamping(0.5)".to_string(),
                "AngularVelocityDamping(0.0)".to_string(),
                "Radius(0.1)".to_string(),
            ]
        );
    }

    #[test]
    fn test_destroy_releases_native() {
        let mut cable = cable(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        cable.initialize().unwrap();
        assert!(cable.initialize().is_ok());
        assert_eq!(cable.engine().created, 1);

        cable.destroy();
        assert!(!cable.is_initialized());
        assert_eq!(cable.engine().removed, 1);
    }
}
