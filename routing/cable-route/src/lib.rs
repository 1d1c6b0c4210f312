//! Cables and wires built from routes.
//!
//! A user routes a cable through a few nodes, some of them fixed to bodies.
//! This crate turns such a route into what a native physics engine wants:
//!
//! - [`Cable`] - Resamples the route into equally long, twist-consistent
//!   segments and attaches them to the bodies of the route
//! - [`Wire`] - Validates a wire route and hands its nodes to the engine,
//!   pairing connecting nodes with a center of mass node
//! - [`RouteCurveCache`] - Memoizes the segmentation until the route or
//!   the resolution changes
//! - [`CableEngine`] / [`WireEngine`] - The boundary to the engine
//!
//! # Example
//!
//! ```
//! use cable_route::{
//!     Cable, CableEngine, CableProperty, InitializationReport, NativeCableNode,
//! };
//! use route_types::CableRouteNode;
//! use nalgebra::Point3;
//!
//! #[derive(Default)]
//! struct CountingEngine;
//!
//! impl CableEngine for CountingEngine {
//!     type Cable = Vec<NativeCableNode>;
//!
//!     fn create_cable(&mut self, _radius: f64, _resolution: f64) -> Self::Cable {
//!         Vec::new()
//!     }
//!     fn add_node(&mut self, cable: &mut Self::Cable, node: NativeCableNode) -> bool {
//!         cable.push(node);
//!         true
//!     }
//!     fn initialize(&mut self, cable: &mut Self::Cable) -> InitializationReport {
//!         InitializationReport { num_segments: cable.len() }
//!     }
//!     fn set_property(&mut self, _cable: &mut Self::Cable, _property: CableProperty) {}
//! }
//!
//! let mut cable = Cable::new(CountingEngine);
//! cable.route_mut().add(CableRouteNode::free(Point3::new(0.0, 0.0, 0.0)))?;
//! cable.route_mut().add(CableRouteNode::free(Point3::new(0.0, 0.0, 2.0)))?;
//!
//! let result = cable.synchronize_route_point_curve();
//! assert_eq!(result.num_segments, 10);
//!
//! cable.initialize()?;
//! assert_eq!(cable.native().map(Vec::len), Some(10));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for configurations

#![doc(html_root_url = "https://docs.rs/cable-route/0.7.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions
)]

mod cable;
mod cache;
mod config;
mod error;
mod native;
mod wire;

pub use cable::{Cable, RoutePointData};
pub use cache::RouteCurveCache;
pub use config::{CableConfig, RouteAlgorithm, WireConfig};
pub use error::CableError;
pub use native::{
    CableEngine, CableProperty, InitializationReport, NativeAttachment, NativeBinding,
    NativeCableNode, NativeWireNode, WireEngine, WireNodeRole, WireProperty,
};
pub use wire::Wire;

/// Result type for cable and wire operations.
pub type Result<T> = std::result::Result<T, CableError>;
