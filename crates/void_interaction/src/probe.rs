//! Geometric eligibility predicates
//!
//! Stateless tests shared by every effector link: the cone/radius test, the
//! orbital envelope test, line-of-sight obstruction and the touch probe.

use crate::behavior::InteractionKind;
use crate::collaborators::{ColliderId, LineOfSight, RayHit};
use crate::effector::{ConeOverride, EffectorRule};
use glam::Vec3;
use void_orbital::pose::{inverse_lerp, lerp, signed_angle, wrap_degrees, EPSILON};
use void_orbital::{OrbitalConfig, Pose};

/// Whether `target` lies inside an effector's cone and radius band
///
/// Radii are inclusive on both ends. `overrides` replaces individual values
/// of the rule for one target.
pub fn cone_check(rule: &EffectorRule, overrides: Option<&ConeOverride>, actor: &Pose, target: Vec3) -> bool {
    let min_radius = overrides.and_then(|o| o.min_radius).unwrap_or(rule.min_radius);
    let max_radius = overrides.and_then(|o| o.max_radius).unwrap_or(rule.max_radius);
    let horizontal_half = overrides
        .and_then(|o| o.horizontal_half_angle)
        .unwrap_or(rule.horizontal_half_angle);
    let vertical_half = overrides
        .and_then(|o| o.vertical_half_angle)
        .unwrap_or(rule.vertical_half_angle);

    let local = actor.inverse_transform_point(target) - rule.offset;
    let distance = local.length();
    if distance < min_radius || distance > max_radius {
        return false;
    }
    if distance < EPSILON {
        return true;
    }

    let planar = Vec3::new(local.x, 0.0, local.z);
    let horizontal = if planar.length_squared() < EPSILON {
        rule.horizontal_offset
    } else {
        signed_angle(Vec3::Z, planar, Vec3::Y)
    };
    let vertical = local.y.atan2(planar.length()).to_degrees();

    wrap_degrees(horizontal - rule.horizontal_offset).abs() <= horizontal_half
        && wrap_degrees(vertical - rule.vertical_offset).abs() <= vertical_half
}

/// Whether `target` lies inside the orbital reach envelope
///
/// Height and planar distance are each tested against their band widened by
/// the margin. Straight ahead the inner radius shrinks toward
/// `front_relax_factor` so targets close to the chest stay reachable.
pub fn orbital_check(config: &OrbitalConfig, actor: &Pose, target: Vec3) -> bool {
    let local = actor.inverse_transform_point(target);

    if local.y < config.min_height - config.margin || local.y > config.max_height + config.margin {
        return false;
    }

    let planar = (local.x * local.x + local.z * local.z).sqrt();
    let angle = (local.x.atan2(local.z) / std::f32::consts::PI).abs();
    let relax = if angle < config.front_relax_angle {
        lerp(
            config.front_relax_factor,
            1.0,
            inverse_lerp(0.0, config.front_relax_angle, angle),
        )
    } else {
        1.0
    };
    let inner = config.min_distance * relax - config.margin;
    let outer = config.max_distance + config.margin;

    planar >= inner && planar <= outer
}

/// Whether something other than an allowed collider blocks `from` → `to`
pub fn obstructed(
    sight: &dyn LineOfSight,
    from: Vec3,
    to: Vec3,
    layer_mask: u32,
    allowed: &[ColliderId],
) -> bool {
    let delta = to - from;
    let distance = delta.length();
    if distance < EPSILON {
        return false;
    }

    match sight.raycast(from, delta / distance, distance, layer_mask) {
        Some(hit) => !allowed.contains(&hit.collider),
        None => false,
    }
}

/// Probe direction for a re-aiming touch kind
pub fn touch_direction(kind: InteractionKind, actor: &Pose) -> Option<Vec3> {
    match kind {
        InteractionKind::TouchVertical => Some(actor.forward()),
        InteractionKind::TouchHorizontalUp => Some(actor.up()),
        InteractionKind::TouchHorizontalDown => Some(-actor.up()),
        _ => None,
    }
}

/// Cast the touch probe from an effector and return the surface hit
pub fn touch_probe(
    sight: &dyn LineOfSight,
    origin: Vec3,
    direction: Vec3,
    distance: f32,
    layer_mask: u32,
) -> Option<RayHit> {
    sight.raycast(origin, direction.normalize_or_zero(), distance, layer_mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::ClearSight;
    use crate::effector::EffectorType;

    struct Wall {
        collider: ColliderId,
        z: f32,
    }

    impl LineOfSight for Wall {
        fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, _mask: u32) -> Option<RayHit> {
            if direction.z <= EPSILON {
                return None;
            }
            let distance = (self.z - origin.z) / direction.z;
            (distance >= 0.0 && distance <= max_distance).then(|| RayHit {
                collider: self.collider,
                point: origin + direction * distance,
                distance,
            })
        }
    }

    fn hand_rule() -> EffectorRule {
        EffectorRule::new(EffectorType::RightHand, Vec3::ZERO)
            .with_horizontal(0.0, 45.0)
            .with_vertical(0.0, 45.0)
            .with_radius(0.5, 1.0)
    }

    #[test]
    fn test_radius_bounds_inclusive() {
        let rule = hand_rule();
        let actor = Pose::IDENTITY;
        assert!(cone_check(&rule, None, &actor, Vec3::new(0.0, 0.0, 1.0)));
        assert!(cone_check(&rule, None, &actor, Vec3::new(0.0, 0.0, 0.5)));
        assert!(!cone_check(&rule, None, &actor, Vec3::new(0.0, 0.0, 1.0001)));
        assert!(!cone_check(&rule, None, &actor, Vec3::new(0.0, 0.0, 0.4999)));
    }

    #[test]
    fn test_cone_angles() {
        let rule = hand_rule();
        let actor = Pose::IDENTITY;
        // 30 degrees right
        assert!(cone_check(&rule, None, &actor, Vec3::new(0.4, 0.0, 0.69282)));
        // 60 degrees right
        assert!(!cone_check(&rule, None, &actor, Vec3::new(0.69282, 0.0, 0.4)));
        // behind
        assert!(!cone_check(&rule, None, &actor, Vec3::new(0.0, 0.0, -0.8)));
        // 60 degrees up
        assert!(!cone_check(&rule, None, &actor, Vec3::new(0.0, 0.69282, 0.4)));
    }

    #[test]
    fn test_cone_offset_and_actor_rotation() {
        let rule = hand_rule().with_horizontal(90.0, 30.0);
        // Actor faces +X, so its right is -Z
        let actor = Pose::from_position_yaw(Vec3::ZERO, 90.0);
        assert!(cone_check(&rule, None, &actor, Vec3::new(0.0, 0.0, -0.8)));
        assert!(!cone_check(&rule, None, &actor, Vec3::new(0.8, 0.0, 0.0)));
    }

    #[test]
    fn test_per_target_override() {
        let rule = hand_rule();
        let actor = Pose::IDENTITY;
        let far = Vec3::new(0.0, 0.0, 1.5);
        assert!(!cone_check(&rule, None, &actor, far));

        let overrides = ConeOverride {
            max_radius: Some(2.0),
            ..Default::default()
        };
        assert!(cone_check(&rule, Some(&overrides), &actor, far));
    }

    #[test]
    fn test_orbital_bands() {
        let config = OrbitalConfig::default();
        let actor = Pose::IDENTITY;
        assert!(orbital_check(&config, &actor, Vec3::new(0.5, 1.1, 0.0)));
        assert!(!orbital_check(&config, &actor, Vec3::new(0.5, 2.5, 0.0)));
        assert!(!orbital_check(&config, &actor, Vec3::new(1.5, 1.1, 0.0)));
        // Margin widens the band
        assert!(orbital_check(&config, &actor, Vec3::new(0.78, 1.1, 0.0)));
    }

    #[test]
    fn test_orbital_front_relaxation() {
        let config = OrbitalConfig::default();
        let actor = Pose::IDENTITY;
        // Too close at the side, reachable straight ahead
        assert!(!orbital_check(&config, &actor, Vec3::new(0.15, 1.1, 0.0)));
        assert!(orbital_check(&config, &actor, Vec3::new(0.0, 1.1, 0.15)));
    }

    #[test]
    fn test_obstruction_allow_list() {
        let wall = Wall {
            collider: ColliderId(9),
            z: 0.5,
        };
        let from = Vec3::ZERO;
        let to = Vec3::new(0.0, 0.0, 1.0);

        assert!(obstructed(&wall, from, to, u32::MAX, &[]));
        assert!(!obstructed(&wall, from, to, u32::MAX, &[ColliderId(9)]));
        assert!(!obstructed(&ClearSight, from, to, u32::MAX, &[]));
        // Wall beyond the target
        assert!(!obstructed(&wall, from, Vec3::new(0.0, 0.0, 0.3), u32::MAX, &[]));
    }

    #[test]
    fn test_touch_probe_hits_wall() {
        let wall = Wall {
            collider: ColliderId(1),
            z: 0.6,
        };
        let actor = Pose::IDENTITY;
        let direction = touch_direction(InteractionKind::TouchVertical, &actor).unwrap();
        let hit = touch_probe(&wall, Vec3::new(0.2, 1.4, 0.0), direction, 1.0, u32::MAX).unwrap();
        assert!((hit.point.z - 0.6).abs() < 1e-5);
        assert!(touch_direction(InteractionKind::TouchStill, &actor).is_none());
    }
}
