//! Cable route nodes and their attachments.

use std::rc::Rc;

use nalgebra::{Point3, UnitQuaternion};

use crate::{Frame, NodeId, ParentTransform, RouteNode};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a cable route node is connected to its surroundings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CableNodeType {
    /// Fixed to its parent.
    #[default]
    BodyFixed,
    /// Free in the world.
    Free,
}

/// Constraint type of a cable attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AttachmentKind {
    /// Locks all degrees of freedom between segment and parent.
    #[default]
    Rigid,
    /// Locks translation only.
    Ball,
}

/// An extra constraint between a cable segment and a parent.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CableAttachment {
    id: NodeId,
    kind: AttachmentKind,
    frame: Frame,
}

impl CableAttachment {
    /// Create an attachment at `frame`.
    #[must_use]
    pub fn new(kind: AttachmentKind, frame: Frame) -> Self {
        Self {
            id: NodeId::next(),
            kind,
            frame,
        }
    }

    /// Identity of this attachment.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Constraint type.
    #[must_use]
    pub const fn kind(&self) -> AttachmentKind {
        self.kind
    }

    /// Pose of the attachment.
    #[must_use]
    pub const fn frame(&self) -> &Frame {
        &self.frame
    }
}

/// A waypoint of a cable route.
///
/// # Example
///
/// ```
/// use route_types::{AttachmentKind, CableNodeType, CableRouteNode, ParentTransform, RouteNode};
/// use nalgebra::{Isometry3, Point3, UnitQuaternion};
///
/// let body = ParentTransform::new("clamp", Isometry3::translation(0.0, 0.0, 1.0));
/// let mut node = CableRouteNode::body_fixed(&body, Point3::origin(), UnitQuaternion::identity());
/// assert_eq!(node.node_type(), CableNodeType::BodyFixed);
/// assert_eq!(node.position(), Point3::new(0.0, 0.0, 1.0));
///
/// let frame = node.frame().clone();
/// assert!(node.add(AttachmentKind::Ball, frame));
/// assert_eq!(node.attachments().len(), 1);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CableRouteNode {
    id: NodeId,
    node_type: CableNodeType,
    frame: Frame,
    attachments: Vec<CableAttachment>,
}

impl CableRouteNode {
    /// Create a node of `node_type` at `frame`.
    #[must_use]
    pub fn new(node_type: CableNodeType, frame: Frame) -> Self {
        Self {
            id: NodeId::next(),
            node_type,
            frame,
            attachments: Vec::new(),
        }
    }

    /// Free node at a world position with identity rotation.
    #[must_use]
    pub fn free(position: Point3<f64>) -> Self {
        Self::new(
            CableNodeType::Free,
            Frame::new(position, UnitQuaternion::identity()),
        )
    }

    /// Node fixed to `parent` at a local pose.
    #[must_use]
    pub fn body_fixed(
        parent: &Rc<ParentTransform>,
        local_position: Point3<f64>,
        local_rotation: UnitQuaternion<f64>,
    ) -> Self {
        Self::new(
            CableNodeType::BodyFixed,
            Frame::with_parent(parent, local_position, local_rotation),
        )
    }

    /// Set the rotation and return the node.
    #[must_use]
    pub fn with_rotation(mut self, rotation: UnitQuaternion<f64>) -> Self {
        self.frame.set_rotation(rotation);
        self
    }

    /// Connection type of this node.
    #[must_use]
    pub const fn node_type(&self) -> CableNodeType {
        self.node_type
    }

    /// Change the connection type.
    pub fn set_node_type(&mut self, node_type: CableNodeType) {
        self.node_type = node_type;
    }

    /// Returns `true` for free nodes.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.node_type == CableNodeType::Free
    }

    /// Attachments of this node, in insertion order.
    #[must_use]
    pub fn attachments(&self) -> &[CableAttachment] {
        &self.attachments
    }

    /// Create and add an attachment.
    ///
    /// Returns `false` if the attachment was rejected.
    pub fn add(&mut self, kind: AttachmentKind, frame: Frame) -> bool {
        self.add_attachment(CableAttachment::new(kind, frame))
    }

    /// Add an attachment, rejecting one that is already present.
    pub fn add_attachment(&mut self, attachment: CableAttachment) -> bool {
        if self.attachments.iter().any(|a| a.id == attachment.id) {
            return false;
        }
        self.attachments.push(attachment);
        true
    }
}

impl RouteNode for CableRouteNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn frame(&self) -> &Frame {
        &self.frame
    }

    fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Isometry3;

    #[test]
    fn test_free_node() {
        let node = CableRouteNode::free(Point3::new(1.0, 2.0, 3.0));
        assert!(node.is_free());
        assert_eq!(node.position(), Point3::new(1.0, 2.0, 3.0));
        assert!(node.attachments().is_empty());
    }

    #[test]
    fn test_body_fixed_node_default_type() {
        assert_eq!(CableNodeType::default(), CableNodeType::BodyFixed);
        let parent = ParentTransform::new("body", Isometry3::translation(1.0, 0.0, 0.0));
        let node = CableRouteNode::body_fixed(&parent, Point3::origin(), UnitQuaternion::identity());
        assert!(!node.is_free());
        assert_eq!(node.position(), Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_duplicate_attachment_rejected() {
        let mut node = CableRouteNode::free(Point3::origin());
        let attachment = CableAttachment::new(AttachmentKind::Rigid, Frame::default());

        assert!(node.add_attachment(attachment.clone()));
        assert!(!node.add_attachment(attachment));
        assert!(node.add(AttachmentKind::Rigid, Frame::default()));
        assert_eq!(node.attachments().len(), 2);
    }

    #[test]
    fn test_clone_keeps_id() {
        let node = CableRouteNode::free(Point3::origin());
        let other = CableRouteNode::free(Point3::origin());
        assert_eq!(node.clone().id(), node.id());
        assert_ne!(other.id(), node.id());
    }
}
