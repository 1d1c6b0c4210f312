//! Cable and wire configuration.
//!
//! # Example
//!
//! ```
//! use cable_route::{CableConfig, RouteAlgorithm};
//!
//! let config = CableConfig::default()
//!     .with_radius(0.02)
//!     .with_resolution_per_unit_length(10.0)
//!     .with_route_algorithm(RouteAlgorithm::Identity);
//!
//! assert!(config.validate().is_empty());
//! assert!((config.diameter() - 0.04).abs() < 1e-12);
//! ```

use point_curve::SegmentationParams;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the route of a cable becomes native nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RouteAlgorithm {
    /// Route nodes are handed to the engine as they are.
    Identity,
    /// The route is resampled into equally long segments first; non-free
    /// route nodes become attachments of the segment nodes.
    #[default]
    Segmenting,
}

/// Configuration of a [`Cable`](crate::Cable).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CableConfig {
    /// Cable radius.
    pub radius: f64,
    /// Segments per unit length.
    pub resolution_per_unit_length: f64,
    /// Linear velocity damping of the segments.
    pub linear_velocity_damping: f64,
    /// Angular velocity damping of the segments.
    pub angular_velocity_damping: f64,
    /// Route handling during initialization.
    pub route_algorithm: RouteAlgorithm,
    /// Distance within which a route node and its curve point are
    /// considered equal.
    pub sync_tolerance: f64,
    /// Segment length solver parameters.
    pub segmentation: SegmentationParams,
}

impl Default for CableConfig {
    fn default() -> Self {
        Self {
            radius: 0.05,
            resolution_per_unit_length: 5.0,
            linear_velocity_damping: 0.0,
            angular_velocity_damping: 0.0,
            route_algorithm: RouteAlgorithm::default(),
            sync_tolerance: 1.0e-4,
            segmentation: SegmentationParams::default(),
        }
    }
}

impl CableConfig {
    /// Sets the radius.
    #[must_use]
    pub const fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the resolution per unit length.
    #[must_use]
    pub const fn with_resolution_per_unit_length(mut self, resolution: f64) -> Self {
        self.resolution_per_unit_length = resolution;
        self
    }

    /// Sets the linear velocity damping.
    #[must_use]
    pub const fn with_linear_velocity_damping(mut self, damping: f64) -> Self {
        self.linear_velocity_damping = damping;
        self
    }

    /// Sets the angular velocity damping.
    #[must_use]
    pub const fn with_angular_velocity_damping(mut self, damping: f64) -> Self {
        self.angular_velocity_damping = damping;
        self
    }

    /// Sets the route algorithm.
    #[must_use]
    pub const fn with_route_algorithm(mut self, algorithm: RouteAlgorithm) -> Self {
        self.route_algorithm = algorithm;
        self
    }

    /// Sets the synchronization tolerance.
    #[must_use]
    pub const fn with_sync_tolerance(mut self, tolerance: f64) -> Self {
        self.sync_tolerance = tolerance;
        self
    }

    /// Sets the segment length solver parameters.
    #[must_use]
    pub const fn with_segmentation(mut self, params: SegmentationParams) -> Self {
        self.segmentation = params;
        self
    }

    /// Cable diameter.
    #[must_use]
    pub fn diameter(&self) -> f64 {
        2.0 * self.radius
    }

    /// Validates the configuration, returning a list of issues.
    #[must_use]
    #[allow(clippy::neg_cmp_op_on_partial_ord)] // NaN must fail the check
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !(self.radius > 0.0) {
            issues.push(format!("radius must be positive, got {}", self.radius));
        }
        if !(self.resolution_per_unit_length > 0.0) {
            issues.push(format!(
                "resolution_per_unit_length must be positive, got {}",
                self.resolution_per_unit_length
            ));
        }
        if !(self.linear_velocity_damping >= 0.0) {
            issues.push(format!(
                "linear_velocity_damping must be non-negative, got {}",
                self.linear_velocity_damping
            ));
        }
        if !(self.angular_velocity_damping >= 0.0) {
            issues.push(format!(
                "angular_velocity_damping must be non-negative, got {}",
                self.angular_velocity_damping
            ));
        }
        if !(self.sync_tolerance >= 0.0) {
            issues.push(format!(
                "sync_tolerance must be non-negative, got {}",
                self.sync_tolerance
            ));
        }
        issues.extend(self.segmentation.validate());

        issues
    }
}

/// Configuration of a [`Wire`](crate::Wire).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WireConfig {
    /// Wire radius.
    pub radius: f64,
    /// Lumped nodes per unit length.
    pub resolution_per_unit_length: f64,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            radius: 0.015,
            resolution_per_unit_length: 1.5,
        }
    }
}

impl WireConfig {
    /// Sets the radius.
    #[must_use]
    pub const fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the resolution per unit length.
    #[must_use]
    pub const fn with_resolution_per_unit_length(mut self, resolution: f64) -> Self {
        self.resolution_per_unit_length = resolution;
        self
    }

    /// Wire diameter.
    #[must_use]
    pub fn diameter(&self) -> f64 {
        2.0 * self.radius
    }

    /// Validates the configuration, returning a list of issues.
    #[must_use]
    #[allow(clippy::neg_cmp_op_on_partial_ord)] // NaN must fail the check
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !(self.radius > 0.0) {
            issues.push(format!("radius must be positive, got {}", self.radius));
        }
        if !(self.resolution_per_unit_length > 0.0) {
            issues.push(format!(
                "resolution_per_unit_length must be positive, got {}",
                self.resolution_per_unit_length
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cable_defaults() {
        let config = CableConfig::default();
        assert_eq!(config.radius, 0.05);
        assert_eq!(config.resolution_per_unit_length, 5.0);
        assert_eq!(config.linear_velocity_damping, 0.0);
        assert_eq!(config.angular_velocity_damping, 0.0);
        assert_eq!(config.route_algorithm, RouteAlgorithm::Segmenting);
        assert_eq!(config.sync_tolerance, 1e-4);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_cable_validate_reports_each_issue() {
        let config = CableConfig::default()
            .with_radius(0.0)
            .with_resolution_per_unit_length(f64::NAN)
            .with_angular_velocity_damping(-1.0);
        let issues = config.validate();
        assert_eq!(issues.len(), 3);
        assert!(issues[0].contains("radius"));
        assert!(issues[1].contains("resolution_per_unit_length"));
        assert!(issues[2].contains("angular_velocity_damping"));
    }

    #[test]
    fn test_cable_validate_includes_segmentation() {
        let config = CableConfig::default()
            .with_segmentation(SegmentationParams::default().with_max_iterations(0));
        assert_eq!(config.validate().len(), 1);
    }

    #[test]
    fn test_wire_defaults() {
        let config = WireConfig::default();
        assert_eq!(config.radius, 0.015);
        assert_eq!(config.resolution_per_unit_length, 1.5);
        assert!((config.diameter() - 0.03).abs() < 1e-12);
        assert!(config.validate().is_empty());
        assert_eq!(WireConfig::default().with_radius(-0.1).validate().len(), 1);
    }
}
