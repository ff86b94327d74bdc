//! Rigid poses and the angle helpers shared by the reach subsystems
//!
//! Conventions follow the engine: +Z is forward, +Y is up, +X is right.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Tolerance below which vectors are treated as degenerate
pub const EPSILON: f32 = 1e-6;

/// Position and orientation in some parent space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Translation
    pub position: Vec3,
    /// Orientation
    pub rotation: Quat,
}

impl Pose {
    /// Pose at the origin with no rotation
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Create a new pose
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Create an unrotated pose at a position
    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Create a pose turned by `degrees` around the up axis
    pub fn from_position_yaw(position: Vec3, degrees: f32) -> Self {
        Self::new(position, Quat::from_rotation_y(degrees.to_radians()))
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Map a point from this pose's local space to the parent space
    #[inline]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Map a point from the parent space into this pose's local space
    #[inline]
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position)
    }

    /// Compose a child pose expressed in this pose's space
    pub fn mul_pose(&self, local: &Pose) -> Pose {
        Pose {
            position: self.transform_point(local.position),
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }

    /// Express a parent-space pose relative to this pose
    pub fn relative(&self, world: &Pose) -> Pose {
        let inverse = self.rotation.inverse();
        Pose {
            position: inverse * (world.position - self.position),
            rotation: (inverse * world.rotation).normalize(),
        }
    }

    /// Interpolate position linearly and rotation spherically
    pub fn lerp(&self, other: &Pose, t: f32) -> Pose {
        Pose {
            position: self.position.lerp(other.position, t),
            rotation: self.rotation.slerp(other.rotation, t),
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Linear interpolation written so that `t == 1.0` lands exactly on `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Where `value` sits between `a` and `b`, clamped to [0, 1]
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    let span = b - a;
    if span.abs() < EPSILON {
        return 0.0;
    }
    ((value - a) / span).clamp(0.0, 1.0)
}

/// Hermite ease over [0, 1]
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Unsigned angle between two vectors in degrees
pub fn angle_between(from: Vec3, to: Vec3) -> f32 {
    let denominator = (from.length_squared() * to.length_squared()).sqrt();
    if denominator < EPSILON {
        return 0.0;
    }
    (from.dot(to) / denominator).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Signed angle in degrees from `from` to `to`, positive when turning
/// clockwise around `axis` (right of forward when `axis` is up)
pub fn signed_angle(from: Vec3, to: Vec3, axis: Vec3) -> f32 {
    let unsigned = angle_between(from, to);
    if axis.dot(from.cross(to)) < 0.0 {
        -unsigned
    } else {
        unsigned
    }
}

/// Wrap an angle in degrees into (-180, 180]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_transform_round_trip() {
        let pose = Pose::from_position_yaw(Vec3::new(1.0, 0.0, 2.0), 90.0);
        let local = Vec3::new(0.5, 1.0, -0.25);
        let world = pose.transform_point(local);
        let back = pose.inverse_transform_point(world);

        assert_abs_diff_eq!(back.x, local.x, epsilon = 1e-5);
        assert_abs_diff_eq!(back.y, local.y, epsilon = 1e-5);
        assert_abs_diff_eq!(back.z, local.z, epsilon = 1e-5);
    }

    #[test]
    fn test_yaw_turns_forward_right() {
        let pose = Pose::from_position_yaw(Vec3::ZERO, 90.0);
        let forward = pose.forward();
        assert_abs_diff_eq!(forward.x, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(forward.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_signed_angle_sign() {
        assert_abs_diff_eq!(signed_angle(Vec3::Z, Vec3::X, Vec3::Y), 90.0, epsilon = 1e-4);
        assert_abs_diff_eq!(signed_angle(Vec3::Z, -Vec3::X, Vec3::Y), -90.0, epsilon = 1e-4);
    }

    #[test]
    fn test_relative_then_compose() {
        let parent = Pose::from_position_yaw(Vec3::new(3.0, 0.0, 0.0), 45.0);
        let world = Pose::from_position_yaw(Vec3::new(1.0, 2.0, 1.0), -30.0);
        let rebuilt = parent.mul_pose(&parent.relative(&world));

        assert_abs_diff_eq!(rebuilt.position.x, world.position.x, epsilon = 1e-5);
        assert_abs_diff_eq!(rebuilt.position.y, world.position.y, epsilon = 1e-5);
        assert_abs_diff_eq!(rebuilt.position.z, world.position.z, epsilon = 1e-5);
    }

    #[test]
    fn test_interpolation_helpers() {
        assert_eq!(lerp(2.0, 7.0, 1.0), 7.0);
        assert_eq!(lerp(2.0, 7.0, 0.0), 2.0);
        assert_eq!(inverse_lerp(1.0, 3.0, 2.0), 0.5);
        assert_eq!(inverse_lerp(1.0, 3.0, 9.0), 1.0);
        assert_eq!(inverse_lerp(1.0, 1.0, 9.0), 0.0);
        assert_eq!(wrap_degrees(270.0), -90.0);
        assert_eq!(wrap_degrees(-180.0), 180.0);
    }
}
