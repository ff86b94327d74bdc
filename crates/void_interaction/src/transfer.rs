//! Interrupt-transfer blend
//!
//! When an effector switches objects mid-interaction, the new target is
//! first snapped onto the old target's world pose and then eased back to its
//! own local pose, so the effector never jumps through empty space.

use crate::object::ObjectId;
use void_orbital::pose::smoothstep;
use void_orbital::Pose;

/// Hand-off from one object to another, advanced once per frame
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    /// Object the effector left
    pub from: ObjectId,
    /// Object the effector is moving to
    pub to: ObjectId,
    /// Target index on `to`
    pub target: usize,
    snapshot: Pose,
    true_local: Pose,
    progress: f32,
}

impl Transfer {
    /// Start a transfer
    ///
    /// `snapshot` is the old target's world pose expressed relative to the
    /// new object; `true_local` is where the new target belongs.
    pub fn new(from: ObjectId, to: ObjectId, target: usize, snapshot: Pose, true_local: Pose) -> Self {
        Self {
            from,
            to,
            target,
            snapshot,
            true_local,
            progress: 0.0,
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn true_local(&self) -> Pose {
        self.true_local
    }

    /// Current local pose of the moving target
    pub fn current_local(&self) -> Pose {
        self.snapshot.lerp(&self.true_local, smoothstep(self.progress))
    }

    /// Advance by `rate * delta_time` and return the eased local pose
    pub fn advance(&mut self, delta_time: f32, rate: f32) -> Pose {
        self.progress = (self.progress + rate * delta_time).min(1.0);
        self.current_local()
    }

    pub fn is_complete(&self, threshold: f32) -> bool {
        self.progress > threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use glam::Vec3;

    fn transfer() -> Transfer {
        Transfer::new(
            ObjectId(0),
            ObjectId(1),
            0,
            Pose::from_position(Vec3::new(1.0, 0.0, 0.0)),
            Pose::from_position(Vec3::ZERO),
        )
    }

    #[test]
    fn test_starts_at_snapshot() {
        let transfer = transfer();
        assert_abs_diff_eq!(transfer.current_local().position.x, 1.0);
        assert!(!transfer.is_complete(0.98));
    }

    #[test]
    fn test_eased_midpoint() {
        let mut transfer = transfer();
        let pose = transfer.advance(0.125, 4.0);
        assert_abs_diff_eq!(transfer.progress(), 0.5);
        assert_abs_diff_eq!(pose.position.x, 0.5, epsilon = 1e-6);

        // Eased: slower than linear near the start
        let mut early = self::transfer();
        let pose = early.advance(0.025, 4.0);
        assert!(pose.position.x > 0.9);
    }

    #[test]
    fn test_completes_within_quarter_second() {
        let mut transfer = transfer();
        for _ in 0..15 {
            transfer.advance(1.0 / 60.0, 4.0);
        }
        assert!(transfer.is_complete(0.98));
        assert_abs_diff_eq!(transfer.current_local().position.x, 0.0, epsilon = 1e-6);
    }
}
