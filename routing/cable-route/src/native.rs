//! Boundary to the native physics engine.
//!
//! The engine that simulates cables and wires is an external collaborator.
//! This module describes what is handed to it: plain node descriptions in
//! world and parent-local coordinates, and property updates. Engines hand
//! back opaque native objects that the owning [`Cable`](crate::Cable) or
//! [`Wire`](crate::Wire) keeps as its native binding.

use std::rc::Rc;

use nalgebra::{Point3, UnitQuaternion};
use route_types::{
    AttachmentKind, CableAttachment, CableNodeType, CableRouteNode, Frame, ParentTransform,
    RouteNode, WireNodeType, WireRouteNode,
};

/// Components whose properties only reach the engine once a native object
/// exists.
///
/// Setters store their value unconditionally and forward it through
/// [`apply_to_native`](Self::apply_to_native), which is a no-op while
/// unbound.
pub trait NativeBinding {
    /// Property update understood by the native object.
    type Property;

    /// Returns `true` if a native object exists.
    fn has_native_binding(&self) -> bool;

    /// Forward a property to the native object.
    ///
    /// Returns `false` if there is no native object.
    fn apply_to_native(&mut self, property: Self::Property) -> bool;
}

/// Cable property update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CableProperty {
    /// Cable radius.
    Radius(f64),
    /// Segments per unit length.
    ResolutionPerUnitLength(f64),
    /// Linear velocity damping, applied across the cable.
    LinearVelocityDamping(f64),
    /// Angular velocity damping, applied across the cable.
    AngularVelocityDamping(f64),
}

/// Wire property update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WireProperty {
    /// Wire radius.
    Radius(f64),
    /// Lumped nodes per unit length.
    ResolutionPerUnitLength(f64),
}

/// Constraint between a native cable node and a parent.
#[derive(Debug, Clone)]
pub struct NativeAttachment {
    /// Constraint type.
    pub kind: AttachmentKind,
    /// Object the node is attached to, `None` for the world.
    pub parent: Option<Rc<ParentTransform>>,
    /// Attachment position relative to `parent`.
    pub local_position: Point3<f64>,
    /// Attachment rotation relative to `parent`.
    pub local_rotation: UnitQuaternion<f64>,
}

impl NativeAttachment {
    /// Attachment of `kind` at `frame`.
    #[must_use]
    pub fn from_frame(kind: AttachmentKind, frame: &Frame) -> Self {
        Self {
            kind,
            parent: frame.parent(),
            local_position: frame.local_position(),
            local_rotation: frame.local_rotation(),
        }
    }
}

impl From<&CableAttachment> for NativeAttachment {
    fn from(attachment: &CableAttachment) -> Self {
        Self::from_frame(attachment.kind(), attachment.frame())
    }
}

/// Cable node handed to the engine.
#[derive(Debug, Clone)]
pub struct NativeCableNode {
    /// Connection type.
    pub node_type: CableNodeType,
    /// World position.
    pub position: Point3<f64>,
    /// World rotation.
    pub rotation: UnitQuaternion<f64>,
    /// Parent of the node, `None` for the world.
    pub parent: Option<Rc<ParentTransform>>,
    /// Position relative to `parent`.
    pub local_position: Point3<f64>,
    /// Rotation relative to `parent`.
    pub local_rotation: UnitQuaternion<f64>,
    /// Extra constraints of the node.
    pub attachments: Vec<NativeAttachment>,
}

impl NativeCableNode {
    /// Free node at a world pose.
    #[must_use]
    pub fn free(
        position: Point3<f64>,
        rotation: UnitQuaternion<f64>,
        parent: Option<Rc<ParentTransform>>,
    ) -> Self {
        let mut frame = Frame::new(position, rotation);
        frame.set_parent(parent.as_ref(), true);
        Self {
            node_type: CableNodeType::Free,
            position,
            rotation,
            parent,
            local_position: frame.local_position(),
            local_rotation: frame.local_rotation(),
            attachments: Vec::new(),
        }
    }

    /// Returns `true` if the node has any attachments.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        !self.attachments.is_empty()
    }
}

impl From<&CableRouteNode> for NativeCableNode {
    fn from(node: &CableRouteNode) -> Self {
        let frame = node.frame();
        Self {
            node_type: node.node_type(),
            position: frame.position(),
            rotation: frame.rotation(),
            parent: frame.parent(),
            local_position: frame.local_position(),
            local_rotation: frame.local_rotation(),
            attachments: node.attachments().iter().map(NativeAttachment::from).collect(),
        }
    }
}

/// Role of a native wire node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireNodeRole {
    /// The node of a route node.
    Route,
    /// Companion node of a connecting node, at the parent's center of mass.
    CenterOfMass,
}

/// Wire node handed to the engine.
#[derive(Debug, Clone)]
pub struct NativeWireNode {
    /// Kind of the route node this native node stems from.
    pub node_type: WireNodeType,
    /// Role of the node.
    pub role: WireNodeRole,
    /// World position.
    pub position: Point3<f64>,
    /// Parent of the node, `None` for the world.
    pub parent: Option<Rc<ParentTransform>>,
    /// Position relative to `parent`.
    pub local_position: Point3<f64>,
}

impl NativeWireNode {
    /// Center of mass companion of a connecting node.
    ///
    /// Placed at the parent's origin, or at the node itself without parent.
    #[must_use]
    pub fn center_of_mass(node: &WireRouteNode) -> Self {
        let parent = node.frame().parent();
        let position = parent
            .as_ref()
            .map_or_else(|| node.position(), |parent| parent.position());
        Self {
            node_type: node.node_type(),
            role: WireNodeRole::CenterOfMass,
            position,
            local_position: if parent.is_some() {
                Point3::origin()
            } else {
                position
            },
            parent,
        }
    }
}

impl From<&WireRouteNode> for NativeWireNode {
    fn from(node: &WireRouteNode) -> Self {
        let frame = node.frame();
        Self {
            node_type: node.node_type(),
            role: WireNodeRole::Route,
            position: frame.position(),
            parent: frame.parent(),
            local_position: frame.local_position(),
        }
    }
}

/// Outcome of adding a cable to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InitializationReport {
    /// Number of segments the engine created.
    pub num_segments: usize,
}

/// Native engine able to simulate cables.
pub trait CableEngine {
    /// Native cable object.
    type Cable;

    /// Create an empty native cable.
    fn create_cable(&mut self, radius: f64, resolution_per_unit_length: f64) -> Self::Cable;

    /// Append a node. Returns `false` if the engine rejects it.
    fn add_node(&mut self, cable: &mut Self::Cable, node: NativeCableNode) -> bool;

    /// Add the cable to the simulation, creating its segments.
    fn initialize(&mut self, cable: &mut Self::Cable) -> InitializationReport;

    /// Update a property of an initialized cable.
    fn set_property(&mut self, cable: &mut Self::Cable, property: CableProperty);

    /// Remove a cable from the simulation and release it.
    fn remove(&mut self, cable: Self::Cable) {
        drop(cable);
    }
}

/// Native engine able to simulate wires.
pub trait WireEngine {
    /// Native wire object.
    type Wire;

    /// Create an empty native wire.
    fn create_wire(&mut self, radius: f64, resolution_per_unit_length: f64) -> Self::Wire;

    /// Append a node. Returns `false` if the engine rejects it.
    fn add_node(&mut self, wire: &mut Self::Wire, node: NativeWireNode) -> bool;

    /// Add the wire to the simulation. Returns `true` if it initialized.
    fn initialize(&mut self, wire: &mut Self::Wire) -> bool;

    /// Update a property of an initialized wire.
    fn set_property(&mut self, wire: &mut Self::Wire, property: WireProperty);

    /// Remove a wire from the simulation and release it.
    fn remove(&mut self, wire: Self::Wire) {
        drop(wire);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Isometry3, Vector3};

    #[test]
    fn test_free_node_local_pose() {
        let parent = ParentTransform::new("body", Isometry3::translation(0.0, 1.0, 0.0));
        let node = NativeCableNode::free(
            Point3::new(1.0, 1.0, 0.0),
            UnitQuaternion::identity(),
            Some(parent),
        );
        assert_eq!(node.node_type, CableNodeType::Free);
        assert_relative_eq!(node.local_position, Point3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
        assert!(!node.is_attached());
    }

    #[test]
    fn test_cable_route_node_conversion() {
        let parent = ParentTransform::new("body", Isometry3::translation(0.0, 0.0, 2.0));
        let mut route_node =
            CableRouteNode::body_fixed(&parent, Point3::new(0.5, 0.0, 0.0), UnitQuaternion::identity());
        route_node.add(AttachmentKind::Ball, Frame::with_parent(&parent, Point3::origin(), UnitQuaternion::identity()));

        let node = NativeCableNode::from(&route_node);
        assert_eq!(node.node_type, CableNodeType::BodyFixed);
        assert_relative_eq!(node.position, Point3::new(0.5, 0.0, 2.0), epsilon = 1e-12);
        assert_relative_eq!(node.local_position, Point3::new(0.5, 0.0, 0.0), epsilon = 1e-12);
        assert_eq!(node.attachments.len(), 1);
        assert_eq!(node.attachments[0].kind, AttachmentKind::Ball);
        assert!(node.attachments[0].parent.is_some());
    }

    #[test]
    fn test_center_of_mass_node() {
        let parent = ParentTransform::new(
            "body",
            Isometry3::new(Vector3::new(3.0, 0.0, 0.0), Vector3::zeros()),
        );
        let node = WireRouteNode::attached(WireNodeType::Connecting, &parent, Point3::new(0.0, 0.5, 0.0));

        let cm = NativeWireNode::center_of_mass(&node);
        assert_eq!(cm.role, WireNodeRole::CenterOfMass);
        assert_eq!(cm.position, Point3::new(3.0, 0.0, 0.0));
        assert_eq!(cm.local_position, Point3::origin());

        let native = NativeWireNode::from(&node);
        assert_eq!(native.role, WireNodeRole::Route);
        assert_eq!(native.position, Point3::new(3.0, 0.5, 0.0));
    }

    #[test]
    fn test_unparented_center_of_mass_node() {
        let node = WireRouteNode::new(WireNodeType::Connecting, Frame::default());
        let cm = NativeWireNode::center_of_mass(&node);
        assert!(cm.parent.is_none());
        assert_eq!(cm.position, Point3::origin());
    }
}
