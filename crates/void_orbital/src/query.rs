//! Normalized target coordinates relative to the actor

use crate::config::OrbitalConfig;
use crate::pose::{inverse_lerp, Pose};
use glam::Vec3;

/// Where a target sits in the actor's reach envelope
///
/// Derived on every evaluation and never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalQuery {
    /// Height in [-1, 1]; 0 at `mid_height`
    pub height: f32,
    /// Angle in [-1, 1]; 0 straight ahead, positive to the right, ±1 behind
    pub angle: f32,
    /// Planar distance in [0, 1] between `min_distance` and `max_distance`
    pub distance: f32,
    /// Clamped height in actor space, used for the crouch decision
    pub raw_height: f32,
}

impl OrbitalQuery {
    /// Project `target` into the actor's envelope
    pub fn from_poses(actor: &Pose, target: Vec3, config: &OrbitalConfig) -> Self {
        let local = actor.inverse_transform_point(target);
        let angle = local.x.atan2(local.z) / std::f32::consts::PI;

        let raw_height = local.y.clamp(config.min_height, config.max_height);
        let height = if raw_height >= config.mid_height {
            inverse_lerp(config.mid_height, config.max_height, raw_height)
        } else {
            -inverse_lerp(config.mid_height, config.min_height, raw_height)
        };

        let planar = (local.x * local.x + local.z * local.z).sqrt();
        let distance = inverse_lerp(config.min_distance, config.max_distance, planar);

        Self {
            height,
            angle: angle.clamp(-1.0, 1.0),
            distance,
            raw_height,
        }
    }

    /// Whether the crouch sub-state applies
    pub fn is_crouched(&self, config: &OrbitalConfig) -> bool {
        self.raw_height < config.crouch_height
    }

    /// Angle as seen by the mirrored (other-hand) blend tree
    pub fn mirrored_angle(&self, mirrored: bool) -> f32 {
        if mirrored {
            -self.angle
        } else {
            self.angle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_front_mid_height_is_centered() {
        let config = OrbitalConfig::default();
        let actor = Pose::IDENTITY;
        let target = Vec3::new(0.0, config.mid_height, 0.5);
        let query = OrbitalQuery::from_poses(&actor, target, &config);

        assert_abs_diff_eq!(query.angle, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(query.height, 0.0, epsilon = 1e-6);
        assert!(query.distance > 0.0 && query.distance < 1.0);
    }

    #[test]
    fn test_sides_and_back() {
        let config = OrbitalConfig::default();
        let actor = Pose::IDENTITY;

        let right = OrbitalQuery::from_poses(&actor, Vec3::new(0.5, 1.0, 0.0), &config);
        let left = OrbitalQuery::from_poses(&actor, Vec3::new(-0.5, 1.0, 0.0), &config);
        let back = OrbitalQuery::from_poses(&actor, Vec3::new(0.0, 1.0, -0.5), &config);

        assert_abs_diff_eq!(right.angle, 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(left.angle, -0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(back.angle.abs(), 1.0, epsilon = 1e-6);
        assert_eq!(left.mirrored_angle(true), 0.5);
    }

    #[test]
    fn test_height_clamped_and_split_at_mid() {
        let config = OrbitalConfig::default();
        let actor = Pose::IDENTITY;

        let high = OrbitalQuery::from_poses(&actor, Vec3::new(0.0, 5.0, 0.5), &config);
        let low = OrbitalQuery::from_poses(&actor, Vec3::new(0.0, -1.0, 0.5), &config);

        assert_eq!(high.height, 1.0);
        assert_eq!(low.height, -1.0);
        assert_eq!(low.raw_height, config.min_height);
        assert!(low.is_crouched(&config));
        assert!(!high.is_crouched(&config));
    }

    #[test]
    fn test_actor_rotation_respected() {
        let config = OrbitalConfig::default();
        let actor = Pose::from_position_yaw(Vec3::ZERO, 90.0);
        // Actor faces +X, so +X is straight ahead
        let query = OrbitalQuery::from_poses(&actor, Vec3::new(0.5, 1.1, 0.0), &config);
        assert_abs_diff_eq!(query.angle, 0.0, epsilon = 1e-5);
    }
}
