//! Error types for cable and wire initialization.

/// Errors that can occur when initializing a cable or wire.
///
/// Segmentation outcomes that are not errors (an out of date curve, a
/// degenerate route queried for points) are reported through
/// [`point_curve::SegmentationResult`] instead.
///
/// # Example
///
/// ```
/// use cable_route::CableError;
///
/// let error = CableError::TooFewNodes { actual: 1 };
/// assert!(error.to_string().contains("minimum number of route nodes is two"));
/// ```
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum CableError {
    /// The route has fewer than two nodes.
    #[error("invalid number of nodes ({actual}), minimum number of route nodes is two")]
    TooFewNodes {
        /// Number of nodes in the route.
        actual: usize,
    },

    /// No segment length splits the route at the configured resolution.
    #[error(
        "invalid route, unable to find segment length for {num_nodes} nodes and resolution/length = {resolution}"
    )]
    SegmentationFailed {
        /// Number of nodes in the route.
        num_nodes: usize,
        /// Configured resolution per unit length.
        resolution: f64,
    },

    /// The native engine rejected a node.
    #[error("unable to add node {index} ({kind})")]
    NodeRejected {
        /// Index of the node in the order it was added.
        index: usize,
        /// Description of the node.
        kind: String,
    },

    /// The native engine produced no segments.
    #[error("initialization failed, check route and/or resolution")]
    InitializationFailed,

    /// The route failed validation.
    #[error("invalid route: {0}")]
    InvalidRoute(String),

    /// A configuration parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CableError {
    /// Creates a node rejected error.
    #[must_use]
    pub fn node_rejected(index: usize, kind: impl Into<String>) -> Self {
        Self::NodeRejected {
            index,
            kind: kind.into(),
        }
    }

    /// Creates an invalid configuration error from validation messages.
    #[must_use]
    pub fn invalid_config(problems: &[String]) -> Self {
        Self::InvalidConfig(problems.join("; "))
    }

    /// Returns `true` if the native engine rejected a node.
    #[must_use]
    pub const fn is_node_rejected(&self) -> bool {
        matches!(self, Self::NodeRejected { .. })
    }

    /// Returns `true` if the error was detected before the native engine
    /// was involved.
    #[must_use]
    pub const fn is_route_error(&self) -> bool {
        matches!(
            self,
            Self::TooFewNodes { .. } | Self::SegmentationFailed { .. } | Self::InvalidRoute(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segmentation_failed_display() {
        let error = CableError::SegmentationFailed {
            num_nodes: 2,
            resolution: 5.0,
        };
        let msg = error.to_string();
        assert!(msg.contains("2 nodes"));
        assert!(msg.contains("resolution/length = 5"));
        assert!(error.is_route_error());
    }

    #[test]
    fn test_node_rejected() {
        let error = CableError::node_rejected(3, "free node");
        assert_eq!(error.to_string(), "unable to add node 3 (free node)");
        assert!(error.is_node_rejected());
        assert!(!error.is_route_error());
    }

    #[test]
    fn test_invalid_config_joins_problems() {
        let error = CableError::invalid_config(&["radius".to_string(), "resolution".to_string()]);
        assert_eq!(error.to_string(), "invalid configuration: radius; resolution");
    }
}
