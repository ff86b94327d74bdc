//! Capabilities consumed from the rest of the engine
//!
//! The interactor never owns animation, physics or look-at systems. Each
//! tick it borrows them through a [`Collaborators`] bundle.

use crate::effector::EffectorType;
use crate::object::ObjectId;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use void_orbital::{BlendTreeAnimator, Pose};

/// Collider handle as reported by the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColliderId(pub u64);

/// First hit of a line-of-sight ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The collider that was hit
    pub collider: ColliderId,
    /// Hit point in world space
    pub point: Vec3,
    /// Distance from ray origin
    pub distance: f32,
}

/// Physics ray queries
pub trait LineOfSight {
    /// Cast a ray and return the first hit within `max_distance`
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, layer_mask: u32) -> Option<RayHit>;
}

/// IK solver that moves an effector to a target and back
///
/// Progress runs 0 (idle) → (0, 1) approaching → 1 at target → (1, 2)
/// returning → 2 finished.
pub trait IkDriver {
    /// Begin (or retarget) the effector toward a target pose
    fn start_interaction(&mut self, effector: EffectorType, target: Pose, object: ObjectId);

    /// Leave a pause at the target and return
    fn resume_interaction(&mut self, effector: EffectorType);

    /// Turn an approach around
    fn reverse_interaction(&mut self, effector: EffectorType);

    /// Release the effector immediately
    fn stop_interaction(&mut self, effector: EffectorType);

    fn progress(&self, effector: EffectorType) -> f32;

    fn is_paused(&self, effector: EffectorType) -> bool;

    /// Current world pose of the effector bone
    fn bone(&self, effector: EffectorType) -> Pose;
}

/// When the actor should look at an object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookMode(pub u8);

impl LookMode {
    pub const NEVER: Self = Self(0);
    pub const ON_SELECTION: Self = Self(1);
    pub const BEFORE: Self = Self(1 << 1);
    pub const ON_PAUSE: Self = Self(1 << 2);
    pub const AFTER: Self = Self(1 << 3);
    pub const ALWAYS: Self = Self(0b1111);

    pub fn contains(self, other: LookMode) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn union(self, other: LookMode) -> Self {
        Self(self.0 | other.0)
    }
}

/// Head and eye look-at orders
pub trait LookController {
    fn new_look_order(&mut self, object: ObjectId, mode: LookMode);

    fn remove_look_targets(&mut self, object: ObjectId);
}

/// Line of sight that never hits, for scenes without physics
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearSight;

impl LineOfSight for ClearSight {
    fn raycast(&self, _origin: Vec3, _direction: Vec3, _max_distance: f32, _layer_mask: u32) -> Option<RayHit> {
        None
    }
}

/// Look controller that ignores every order
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLook;

impl LookController for NoLook {
    fn new_look_order(&mut self, _object: ObjectId, _mode: LookMode) {}

    fn remove_look_targets(&mut self, _object: ObjectId) {}
}

/// Engine systems borrowed for one call into the interactor
pub struct Collaborators<'a> {
    pub ik: &'a mut dyn IkDriver,
    pub line_of_sight: &'a dyn LineOfSight,
    pub look: &'a mut dyn LookController,
    /// Orbital blend-tree layer; without it orbital reach degrades to IK only
    pub animator: Option<&'a mut dyn BlendTreeAnimator>,
}

impl<'a> Collaborators<'a> {
    /// Bundle the required collaborators
    pub fn new(
        ik: &'a mut dyn IkDriver,
        line_of_sight: &'a dyn LineOfSight,
        look: &'a mut dyn LookController,
    ) -> Self {
        Self {
            ik,
            line_of_sight,
            look,
            animator: None,
        }
    }

    /// Attach the orbital animator
    pub fn with_animator(mut self, animator: &'a mut dyn BlendTreeAnimator) -> Self {
        self.animator = Some(animator);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_look_mode_bits() {
        let mode = LookMode::BEFORE.union(LookMode::AFTER);
        assert!(mode.contains(LookMode::BEFORE));
        assert!(mode.contains(LookMode::AFTER));
        assert!(!mode.contains(LookMode::ON_PAUSE));
        assert!(!mode.contains(LookMode::NEVER));
        assert!(LookMode::ALWAYS.contains(LookMode::ON_SELECTION));
    }
}
