//! Error types for route editing.
//!
//! This module defines the [`RouteError`] enum returned when a route
//! rejects an edit.

use crate::NodeId;

/// Errors that can occur when editing a route.
///
/// # Example
///
/// ```
/// use route_types::{CableNodeType, CableRouteNode, Route, RouteError};
/// use nalgebra::Point3;
///
/// let node = CableRouteNode::free(Point3::origin());
/// let mut route = Route::new();
/// route.add(node.clone())?;
///
/// let error = route.add(node).unwrap_err();
/// assert!(error.is_duplicate_node());
/// # Ok::<(), RouteError>(())
/// ```
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RouteError {
    /// The node is already part of the route.
    ///
    /// A route holds every node at most once; clones share the id of the
    /// node they were cloned from.
    #[error("node {0} is already in the route")]
    DuplicateNode(NodeId),

    /// The referenced node is not part of the route.
    #[error("node {0} not found in the route")]
    NodeNotFound(NodeId),

    /// An index is outside the route.
    #[error("index {index} out of range for route with {len} nodes")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of nodes in the route.
        len: usize,
    },
}

impl RouteError {
    /// Creates an index out of range error.
    #[must_use]
    pub const fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Returns `true` if this is a duplicate node error.
    #[must_use]
    pub const fn is_duplicate_node(&self) -> bool {
        matches!(self, Self::DuplicateNode(_))
    }

    /// Returns `true` if this is a node not found error.
    #[must_use]
    pub const fn is_node_not_found(&self) -> bool {
        matches!(self, Self::NodeNotFound(_))
    }
}
