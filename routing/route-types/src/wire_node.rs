//! Wire route nodes.

use std::fmt;
use std::rc::Rc;

use nalgebra::{Point3, UnitQuaternion};

use crate::{Frame, NodeId, ParentTransform, RouteNode};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Kind of a wire route node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WireNodeType {
    /// Fixed to its parent.
    BodyFixed,
    /// Free in the world.
    #[default]
    Free,
    /// Connects the wire to a body through a companion node at the body's
    /// center of mass.
    Connecting,
    /// Lets the wire slide through the parent.
    Eye,
    /// Contact point on a shape.
    Contact,
    /// Wire winch, reeling the wire in and out.
    Winch,
}

impl WireNodeType {
    /// Returns `true` for node types that are only allowed at the begin or
    /// end of a wire.
    #[must_use]
    pub const fn is_end_only(self) -> bool {
        matches!(self, Self::BodyFixed | Self::Connecting | Self::Winch)
    }
}

impl fmt::Display for WireNodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BodyFixed => "Body fixed node",
            Self::Free => "Free node",
            Self::Connecting => "Connecting node",
            Self::Eye => "Eye node",
            Self::Contact => "Contact node",
            Self::Winch => "Winch node",
        };
        f.write_str(name)
    }
}

/// A waypoint of a wire route.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WireRouteNode {
    id: NodeId,
    node_type: WireNodeType,
    frame: Frame,
}

impl WireRouteNode {
    /// Create a node of `node_type` at `frame`.
    #[must_use]
    pub fn new(node_type: WireNodeType, frame: Frame) -> Self {
        Self {
            id: NodeId::next(),
            node_type,
            frame,
        }
    }

    /// Free node at a world position.
    #[must_use]
    pub fn free(position: Point3<f64>) -> Self {
        Self::new(
            WireNodeType::Free,
            Frame::new(position, UnitQuaternion::identity()),
        )
    }

    /// Node of `node_type` placed relative to `parent`.
    #[must_use]
    pub fn attached(
        node_type: WireNodeType,
        parent: &Rc<ParentTransform>,
        local_position: Point3<f64>,
    ) -> Self {
        Self::new(
            node_type,
            Frame::with_parent(parent, local_position, UnitQuaternion::identity()),
        )
    }

    /// Kind of this node.
    #[must_use]
    pub const fn node_type(&self) -> WireNodeType {
        self.node_type
    }

    /// Change the kind of this node.
    pub fn set_node_type(&mut self, node_type: WireNodeType) {
        self.node_type = node_type;
    }
}

impl RouteNode for WireRouteNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn frame(&self) -> &Frame {
        &self.frame
    }

    fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    fn validate_at(&self, index: usize, num_nodes: usize) -> Option<String> {
        let intermediate = index > 0 && index + 1 < num_nodes;
        (intermediate && self.node_type.is_end_only()).then(|| {
            format!(
                "{} can only be at the begin or at the end of a wire.",
                self.node_type
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_only_types() {
        assert!(WireNodeType::BodyFixed.is_end_only());
        assert!(WireNodeType::Connecting.is_end_only());
        assert!(WireNodeType::Winch.is_end_only());
        assert!(!WireNodeType::Free.is_end_only());
        assert!(!WireNodeType::Eye.is_end_only());
        assert!(!WireNodeType::Contact.is_end_only());
    }

    #[test]
    fn test_validate_at_intermediate() {
        let node = WireRouteNode::new(WireNodeType::Winch, Frame::default());
        assert!(node.validate_at(0, 3).is_none());
        assert!(node.validate_at(2, 3).is_none());

        let message = node.validate_at(1, 3);
        assert_eq!(
            message.as_deref(),
            Some("Winch node can only be at the begin or at the end of a wire.")
        );
    }

    #[test]
    fn test_free_nodes_valid_anywhere() {
        let node = WireRouteNode::free(Point3::origin());
        assert!(node.validate_at(1, 5).is_none());
    }
}
