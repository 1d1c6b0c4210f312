//! Core types for cable and wire routes: nodes, parent frames and routes.
//!
//! This crate provides the user-facing description of a cable or wire
//! before it is discretized for simulation.
//!
//! # Overview
//!
//! - **Frames**: Node poses, optionally relative to a shared, non-owned
//!   parent ([`Frame`], [`ParentTransform`])
//! - **Nodes**: Cable and wire waypoints ([`CableRouteNode`], [`WireRouteNode`])
//!   behind the common [`RouteNode`] trait
//! - **Routes**: Ordered, duplicate-free node sequences ([`Route`]) and
//!   their validation ([`ValidatedRoute`])
//!
//! # Example
//!
//! ```
//! use route_types::{CableRouteNode, ParentTransform, Route};
//! use nalgebra::{Isometry3, Point3, UnitQuaternion};
//! use point_curve::PointCurve;
//!
//! let anchor = ParentTransform::new("anchor", Isometry3::identity());
//!
//! let mut route = Route::new();
//! route.add(CableRouteNode::body_fixed(&anchor, Point3::origin(), UnitQuaternion::identity()))?;
//! route.add(CableRouteNode::free(Point3::new(0.0, 0.0, 1.0)))?;
//! route.add(CableRouteNode::free(Point3::new(0.0, 1.0, 1.0)))?;
//!
//! assert!((route.total_length() - 2.0).abs() < 1e-12);
//!
//! // Curves built from the route positions are synchronized with it
//! let curve = PointCurve::from_points(route.positions());
//! assert!(route.is_synchronized(&curve, 1e-4));
//! # Ok::<(), route_types::RouteError>(())
//! ```
//!
//! # Ownership
//!
//! Parents are shared through `Rc`; frames only keep a `Weak` reference.
//! Routes are single threaded and owned by the cable or wire they describe.
//!
//! # Feature Flags
//!
//! - `serde`: Enables serialization/deserialization of nodes and routes.
//!   Parent references are not serialized.

#![doc(html_root_url = "https://docs.rs/route-types/0.7.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod cable_node;
pub mod error;
pub mod frame;
pub mod node;
pub mod route;
pub mod wire_node;

// Re-export main types at crate root for convenience
pub use cable_node::{AttachmentKind, CableAttachment, CableNodeType, CableRouteNode};
pub use error::RouteError;
pub use frame::{Frame, ParentTransform};
pub use node::{NodeId, RouteNode};
pub use route::{Route, ValidatedNode, ValidatedRoute};
pub use wire_node::{WireNodeType, WireRouteNode};

/// Result type for route operations.
pub type Result<T> = std::result::Result<T, RouteError>;
