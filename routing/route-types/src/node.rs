//! Node identity and the common route node interface.

use std::sync::atomic::{AtomicU64, Ordering};

use nalgebra::{Point3, UnitQuaternion};

use crate::Frame;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Process-unique identifier of a route node or attachment.
///
/// Ids are handed out at construction. Cloning a node keeps its id, so a
/// clone counts as the same node when added to a route.
///
/// Deserializing an id reserves it, so later [`NodeId::next`] calls never
/// hand out an id already present in loaded data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(transparent))]
pub struct NodeId(u64);

/// Global counter for node ids.
static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(0);

impl NodeId {
    /// Generate the next unique id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap a raw id value.
    ///
    /// Ids created this way are not reserved and may equal a later
    /// [`NodeId::next`]. Use them for lookups, not for new nodes.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Wrap a raw id and keep [`NodeId::next`] from handing it out again.
    ///
    /// Returns `None` for `u64::MAX`, which cannot be reserved.
    fn reserve(id: u64) -> Option<Self> {
        let following = id.checked_add(1)?;
        NEXT_NODE_ID.fetch_max(following, Ordering::Relaxed);
        Some(Self(id))
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = u64::deserialize(deserializer)?;
        Self::reserve(id).ok_or_else(|| serde::de::Error::custom(format!("node id {id} is out of range")))
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// A waypoint of a cable or wire route.
///
/// Implementors own a [`Frame`] holding their pose, optionally relative to
/// a parent transform.
pub trait RouteNode {
    /// Identity of this node.
    fn id(&self) -> NodeId;

    /// Pose of this node.
    fn frame(&self) -> &Frame;

    /// Mutable pose of this node.
    fn frame_mut(&mut self) -> &mut Frame;

    /// World position of this node.
    fn position(&self) -> Point3<f64> {
        self.frame().position()
    }

    /// World rotation of this node.
    fn rotation(&self) -> UnitQuaternion<f64> {
        self.frame().rotation()
    }

    /// Check whether this node may sit at `index` of a route with
    /// `num_nodes` nodes.
    ///
    /// Returns a message describing the problem, or `None` if the node is
    /// valid there.
    fn validate_at(&self, _index: usize, _num_nodes: usize) -> Option<String> {
        None
    }
}
