//! Segmentation solver parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for [`PointCurve::find_segment_length`](crate::PointCurve::find_segment_length).
///
/// # Example
///
/// ```
/// use point_curve::SegmentationParams;
///
/// let params = SegmentationParams::default()
///     .with_error_tolerance(1e-3)
///     .with_max_iterations(50);
///
/// assert!(params.validate().is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentationParams {
    /// Accumulated error below which the solver reports success.
    pub error_tolerance: f64,

    /// Chord length tolerance during traversal, as a factor of the total length.
    pub step_tolerance: f64,

    /// Finite difference step for the error derivative, divided by the
    /// number of segments.
    pub derivative_step: f64,

    /// Maximum number of solver iterations.
    pub max_iterations: usize,

    /// Shortest segment length the solver may try.
    pub min_segment_length: f64,

    /// Largest end error accepted when no length meets `error_tolerance`,
    /// as a factor of the segment length. Zero disables the fallback.
    pub fallback_tolerance: f64,
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            error_tolerance: 5.0e-3,
            step_tolerance: 1.0e-3,
            derivative_step: 1.0e-3,
            max_iterations: 100,
            min_segment_length: 1.0e-6,
            fallback_tolerance: 0.25,
        }
    }
}

impl SegmentationParams {
    /// Create new parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tight tolerances for short, finely resolved routes.
    #[must_use]
    pub fn precise() -> Self {
        Self {
            error_tolerance: 1.0e-4,
            step_tolerance: 1.0e-5,
            max_iterations: 200,
            ..Self::default()
        }
    }

    /// Set the error tolerance.
    #[must_use]
    pub const fn with_error_tolerance(mut self, tolerance: f64) -> Self {
        self.error_tolerance = tolerance;
        self
    }

    /// Set the traversal step tolerance.
    #[must_use]
    pub const fn with_step_tolerance(mut self, tolerance: f64) -> Self {
        self.step_tolerance = tolerance;
        self
    }

    /// Set the derivative step.
    #[must_use]
    pub const fn with_derivative_step(mut self, step: f64) -> Self {
        self.derivative_step = step;
        self
    }

    /// Set the maximum number of iterations.
    #[must_use]
    pub const fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Set the minimum segment length.
    #[must_use]
    pub const fn with_min_segment_length(mut self, length: f64) -> Self {
        self.min_segment_length = length;
        self
    }

    /// Set the fallback tolerance.
    #[must_use]
    pub const fn with_fallback_tolerance(mut self, tolerance: f64) -> Self {
        self.fallback_tolerance = tolerance;
        self
    }

    /// Validates the parameters, returning a list of issues.
    ///
    /// An empty list means the parameters are usable.
    #[must_use]
    #[allow(clippy::neg_cmp_op_on_partial_ord)] // NaN must fail the check
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !(self.error_tolerance > 0.0) {
            issues.push(format!(
                "error_tolerance must be positive, got {}",
                self.error_tolerance
            ));
        }
        if !(self.step_tolerance > 0.0) {
            issues.push(format!(
                "step_tolerance must be positive, got {}",
                self.step_tolerance
            ));
        }
        if !(self.derivative_step > 0.0) {
            issues.push(format!(
                "derivative_step must be positive, got {}",
                self.derivative_step
            ));
        }
        if self.max_iterations == 0 {
            issues.push("max_iterations must be at least 1".to_string());
        }
        if self.min_segment_length < 0.0 {
            issues.push(format!(
                "min_segment_length must be non-negative, got {}",
                self.min_segment_length
            ));
        }

        if !(self.fallback_tolerance >= 0.0) {
            issues.push(format!(
                "fallback_tolerance must be non-negative, got {}",
                self.fallback_tolerance
            ));
        }

        issues
    }
}
