//! Ordered routes of nodes.
//!
//! A [`Route`] is the user-facing description of a cable or wire: an
//! ordered list of waypoints where insertion order is the order along the
//! cable. Every node is held at most once.
//!
//! # Example
//!
//! ```
//! use route_types::{CableRouteNode, Route};
//! use nalgebra::Point3;
//!
//! let mut route = Route::new();
//! let begin = CableRouteNode::free(Point3::new(0.0, 0.0, 0.0));
//! let end = CableRouteNode::free(Point3::new(2.0, 0.0, 0.0));
//! let end_id = route_types::RouteNode::id(&end);
//!
//! route.add(begin)?;
//! route.add(end)?;
//! route.insert_before(CableRouteNode::free(Point3::new(1.0, 1.0, 0.0)), end_id)?;
//!
//! assert_eq!(route.num_nodes(), 3);
//! assert_eq!(route.index_of(end_id), Some(2));
//! assert!(route.validated().is_valid());
//! # Ok::<(), route_types::RouteError>(())
//! ```

use nalgebra::Point3;
use point_curve::PointCurve;
use tracing::debug;

use crate::{NodeId, Result, RouteError, RouteNode};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Message of a route with too few nodes.
pub const TOO_FEW_NODES_MESSAGE: &str = "Route has to contain at least two or more nodes.";

/// Message of a route with one or more invalid nodes.
pub const INVALID_NODES_MESSAGE: &str = "One or more nodes are wrong.";

/// Ordered sequence of unique route nodes.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Route<N> {
    nodes: Vec<N>,
}

impl<N> Default for Route<N> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<N: RouteNode> Route<N> {
    /// Create an empty route.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the route has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&N> {
        self.nodes.get(index)
    }

    /// Mutable node at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut N> {
        self.nodes.get_mut(index)
    }

    /// Node with id `id`.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&N> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    /// Mutable node with id `id`.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut N> {
        self.nodes.iter_mut().find(|node| node.id() == id)
    }

    /// Index of the node with id `id`.
    #[must_use]
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|node| node.id() == id)
    }

    /// Returns `true` if the route holds the node with id `id`.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.index_of(id).is_some()
    }

    /// Iterate the nodes in route order.
    pub fn iter(&self) -> std::slice::Iter<'_, N> {
        self.nodes.iter()
    }

    /// Iterate the nodes mutably in route order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, N> {
        self.nodes.iter_mut()
    }

    /// World positions of the nodes in route order.
    pub fn positions(&self) -> impl Iterator<Item = Point3<f64>> + '_ {
        self.nodes.iter().map(RouteNode::position)
    }

    /// Append a node. Returns its index.
    pub fn add(&mut self, node: N) -> Result<usize> {
        self.insert_at(self.nodes.len(), node)
    }

    /// Insert a node before the node with id `before`. Returns its index.
    pub fn insert_before(&mut self, node: N, before: NodeId) -> Result<usize> {
        let index = self
            .index_of(before)
            .ok_or(RouteError::NodeNotFound(before))?;
        self.insert_at(index, node)
    }

    /// Insert a node after the node with id `after`. Returns its index.
    pub fn insert_after(&mut self, node: N, after: NodeId) -> Result<usize> {
        let index = self
            .index_of(after)
            .ok_or(RouteError::NodeNotFound(after))?;
        self.insert_at(index + 1, node)
    }

    /// Insert a node at `index`. Returns `index`.
    pub fn insert_at(&mut self, index: usize, node: N) -> Result<usize> {
        if index > self.nodes.len() {
            return Err(RouteError::index_out_of_range(index, self.nodes.len()));
        }
        if self.contains(node.id()) {
            return Err(RouteError::DuplicateNode(node.id()));
        }
        debug!("Route node {} added at index {}", node.id(), index);
        self.nodes.insert(index, node);
        Ok(index)
    }

    /// Remove the node with id `id`.
    pub fn remove(&mut self, id: NodeId) -> Result<N> {
        let index = self.index_of(id).ok_or(RouteError::NodeNotFound(id))?;
        Ok(self.nodes.remove(index))
    }

    /// Remove all nodes.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Sum of the straight distances between consecutive nodes.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.nodes
            .windows(2)
            .map(|pair| (pair[1].position() - pair[0].position()).norm())
            .sum()
    }

    /// Returns `true` if `curve` has one point per node and every point is
    /// within `tolerance` of its node's position.
    #[must_use]
    pub fn is_synchronized(&self, curve: &PointCurve, tolerance: f64) -> bool {
        curve.num_points() == self.nodes.len()
            && self
                .positions()
                .zip(curve.iter())
                .all(|(position, point)| (position - point).norm() <= tolerance)
    }

    /// Validate the route.
    ///
    /// A route needs at least two nodes, and every node must accept its
    /// position in the route (see [`RouteNode::validate_at`]).
    #[must_use]
    pub fn validated(&self) -> ValidatedRoute {
        let num_nodes = self.nodes.len();
        let nodes: Vec<_> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| ValidatedNode {
                id: node.id(),
                error: node.validate_at(index, num_nodes),
            })
            .collect();

        let error = if num_nodes < 2 {
            Some(TOO_FEW_NODES_MESSAGE.to_string())
        } else if nodes.iter().any(|node| !node.is_valid()) {
            Some(INVALID_NODES_MESSAGE.to_string())
        } else {
            None
        };

        ValidatedRoute { error, nodes }
    }
}

impl<N> std::ops::Index<usize> for Route<N> {
    type Output = N;

    fn index(&self, index: usize) -> &N {
        &self.nodes[index]
    }
}

impl<'a, N> IntoIterator for &'a Route<N> {
    type Item = &'a N;
    type IntoIter = std::slice::Iter<'a, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl<N: RouteNode> FromIterator<N> for Route<N> {
    /// Collect nodes into a route, skipping duplicates.
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        let mut route = Self::new();
        for node in iter {
            let _ = route.add(node);
        }
        route
    }
}

/// Validation result of one route node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedNode {
    /// The validated node.
    pub id: NodeId,
    /// Why the node is invalid at its position, if it is.
    pub error: Option<String>,
}

impl ValidatedNode {
    /// Returns `true` if the node is valid at its position.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Validation result of a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRoute {
    /// Why the route is invalid, if it is.
    pub error: Option<String>,
    /// Per-node results in route order.
    pub nodes: Vec<ValidatedNode>,
}

impl ValidatedRoute {
    /// Returns `true` if the route is valid.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Nodes that are invalid at their position, with their index.
    pub fn invalid_nodes(&self) -> impl Iterator<Item = (usize, &ValidatedNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.is_valid())
    }
}
