//! Twist-consistent framing of curve steps.
//!
//! A step of a traversal only defines a direction. The rotation of the step
//! is built in three parts:
//!
//! 1. A look rotation taking the forward axis (+Z) onto the step direction.
//! 2. A twist about the step direction onto the current route node's axes.
//! 3. A fraction of the twist between the current and next route node,
//!    proportional to the step's local time between them.
//!
//! Twist angles are measured in the plane perpendicular to the step
//! direction, signed about that direction, so frames never flip when the
//! nodes are twisted more than a quarter turn relative to each other.
//!
//! Axis conventions: forward = +Z, right = +X, up = +Y.

use std::f64::consts::{PI, TAU};

use nalgebra::{Unit, UnitQuaternion, Vector3};

/// Vectors shorter than this are treated as zero.
const AXIS_EPSILON: f64 = 1.0e-9;

/// Rotation taking `from` onto `to`.
///
/// Antiparallel vectors give a half turn about an axis perpendicular to
/// `from`. Zero vectors give the identity.
#[must_use]
pub fn from_to_rotation(from: &Vector3<f64>, to: &Vector3<f64>) -> UnitQuaternion<f64> {
    if from.norm() < AXIS_EPSILON || to.norm() < AXIS_EPSILON {
        return UnitQuaternion::identity();
    }
    UnitQuaternion::rotation_between(from, to).unwrap_or_else(|| {
        UnitQuaternion::from_axis_angle(&Unit::new_normalize(any_perpendicular(from)), PI)
    })
}

/// Component of `v` perpendicular to the unit vector `normal`.
#[must_use]
pub fn project_on_plane(v: &Vector3<f64>, normal: &Vector3<f64>) -> Vector3<f64> {
    v - normal * v.dot(normal)
}

/// Signed angle in radians from `from` to `to`, positive toward `reference`.
///
/// With `reference = axis × from`, this is the rotation angle about `axis`.
#[must_use]
pub fn signed_angle(from: &Vector3<f64>, to: &Vector3<f64>, reference: &Vector3<f64>) -> f64 {
    to.dot(reference).atan2(from.dot(to))
}

/// Interpolate between two angles (radians) along the shortest arc.
///
/// `t` is clamped to `[0, 1]`.
#[must_use]
pub fn lerp_angle(a: f64, b: f64, t: f64) -> f64 {
    let mut delta = (b - a).rem_euclid(TAU);
    if delta > PI {
        delta -= TAU;
    }
    a + delta * t.clamp(0.0, 1.0)
}

/// Right and up axes of `rotation` projected into the plane perpendicular
/// to the unit vector `direction`, as an orthonormal pair.
///
/// If the rotated right axis is parallel to `direction` it is recovered
/// from the projected up axis.
#[must_use]
pub fn in_plane_axes(
    rotation: &UnitQuaternion<f64>,
    direction: &Vector3<f64>,
) -> (Vector3<f64>, Vector3<f64>) {
    let x = project_on_plane(&(rotation * Vector3::x()), direction).try_normalize(AXIS_EPSILON);
    let x = x.unwrap_or_else(|| {
        project_on_plane(&(rotation * Vector3::y()), direction)
            .try_normalize(AXIS_EPSILON)
            .map_or_else(|| any_perpendicular(direction), |y| y.cross(direction))
    });
    let x = x.normalize();
    let y = direction.cross(&x);
    (x, y)
}

/// Rotation of a step with direction `direction` between two route nodes.
///
/// `local_time` is the step's position between the current and next node.
/// When both nodes share a rotation whose forward axis is `direction`, the
/// result is that rotation for every `local_time`.
#[must_use]
pub fn twisted_rotation(
    curr_rotation: &UnitQuaternion<f64>,
    next_rotation: &UnitQuaternion<f64>,
    direction: &Unit<Vector3<f64>>,
    local_time: f64,
) -> UnitQuaternion<f64> {
    let dir = direction.into_inner();

    // Naive look rotation, forward onto the step direction.
    let look = from_to_rotation(&Vector3::z(), &dir);
    let look_x = look * Vector3::x();
    let look_y = look * Vector3::y();

    let (curr_x, curr_y) = in_plane_axes(curr_rotation, &dir);
    let (next_x, _) = in_plane_axes(next_rotation, &dir);

    let twist_to_curr = signed_angle(&look_x, &curr_x, &look_y);
    let twist_curr_to_next = signed_angle(&curr_x, &next_x, &curr_y);
    let twist = lerp_angle(0.0, twist_curr_to_next, local_time);

    UnitQuaternion::from_axis_angle(direction, twist)
        * UnitQuaternion::from_axis_angle(direction, twist_to_curr)
        * look
}

/// Some unit vector perpendicular to `v`.
fn any_perpendicular(v: &Vector3<f64>) -> Vector3<f64> {
    let helper = if v.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    v.cross(&helper).try_normalize(AXIS_EPSILON).unwrap_or_else(Vector3::z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6};

    #[test]
    fn test_from_to_rotation() {
        let q = from_to_rotation(&Vector3::z(), &Vector3::x());
        assert_relative_eq!(q * Vector3::z(), Vector3::x(), epsilon = 1e-12);

        let flip = from_to_rotation(&Vector3::z(), &-Vector3::z());
        assert_relative_eq!(flip * Vector3::z(), -Vector3::z(), epsilon = 1e-12);

        let identity = from_to_rotation(&Vector3::zeros(), &Vector3::x());
        assert_relative_eq!(identity.angle(), 0.0);
    }

    #[test]
    fn test_signed_angle() {
        let angle = signed_angle(&Vector3::x(), &Vector3::y(), &Vector3::y());
        assert_relative_eq!(angle, FRAC_PI_2, epsilon = 1e-12);

        let angle = signed_angle(&Vector3::x(), &-Vector3::y(), &Vector3::y());
        assert_relative_eq!(angle, -FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_lerp_angle_wraps() {
        assert_relative_eq!(lerp_angle(0.0, FRAC_PI_2, 0.5), FRAC_PI_4, epsilon = 1e-12);
        // 350 degrees is -10 degrees the short way.
        let b = 350.0_f64.to_radians();
        assert_relative_eq!(lerp_angle(0.0, b, 1.0), -10.0_f64.to_radians(), epsilon = 1e-12);
        assert_relative_eq!(lerp_angle(0.0, FRAC_PI_2, 2.0), FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_in_plane_axes_degenerate_right_axis() {
        // Identity right axis is parallel to the direction.
        let (x, y) = in_plane_axes(&UnitQuaternion::identity(), &Vector3::x());
        assert_relative_eq!(x.dot(&Vector3::x()), 0.0, epsilon = 1e-12);
        assert_relative_eq!(y, Vector3::y(), epsilon = 1e-12);
        assert_relative_eq!(x.cross(&y), Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_equal_rotations_have_no_twist_drift() {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_6);
        for i in 0..=10 {
            let t = f64::from(i) / 10.0;
            let q = twisted_rotation(&rotation, &rotation, &Vector3::z_axis(), t);
            assert_relative_eq!(q.angle_to(&rotation), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_twist_interpolates_between_nodes() {
        let curr = UnitQuaternion::identity();
        let next = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);

        let half = twisted_rotation(&curr, &next, &Vector3::z_axis(), 0.5);
        let expected = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_4);
        assert_relative_eq!(half.angle_to(&expected), 0.0, epsilon = 1e-9);

        let end = twisted_rotation(&curr, &next, &Vector3::z_axis(), 1.0);
        assert_relative_eq!(end.angle_to(&next), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_forward_follows_direction() {
        let dir = Unit::new_normalize(Vector3::new(1.0, 1.0, 0.0));
        let tilted = UnitQuaternion::from_euler_angles(0.3, -0.2, 1.1);
        let q = twisted_rotation(&tilted, &UnitQuaternion::identity(), &dir, 0.3);
        assert_relative_eq!(q * Vector3::z(), dir.into_inner(), epsilon = 1e-9);
    }

    #[test]
    fn test_twist_beyond_quarter_turn_does_not_flip() {
        let curr = UnitQuaternion::identity();
        let next = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 170.0_f64.to_radians());
        let mut previous = 0.0;
        for i in 1..=10 {
            let t = f64::from(i) / 10.0;
            let q = twisted_rotation(&curr, &next, &Vector3::z_axis(), t);
            let angle = (q * Vector3::x()).y.atan2((q * Vector3::x()).x);
            assert!(angle > previous, "twist must increase monotonically");
            previous = angle;
        }
    }
}
