//! Effector slots and their placement rules

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of effector channels on a full humanoid
pub const EFFECTOR_COUNT: usize = 9;

/// Body part that can hold a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EffectorType {
    Body,
    LeftFoot,
    RightFoot,
    LeftHand,
    RightHand,
    LeftShoulder,
    RightShoulder,
    LeftThigh,
    RightThigh,
}

impl EffectorType {
    /// Every effector in slot order
    pub const ALL: [EffectorType; EFFECTOR_COUNT] = [
        EffectorType::Body,
        EffectorType::LeftFoot,
        EffectorType::RightFoot,
        EffectorType::LeftHand,
        EffectorType::RightHand,
        EffectorType::LeftShoulder,
        EffectorType::RightShoulder,
        EffectorType::LeftThigh,
        EffectorType::RightThigh,
    ];

    /// Stable index into actor-wide arrays
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn is_hand(self) -> bool {
        matches!(self, EffectorType::LeftHand | EffectorType::RightHand)
    }

    /// Left-side effectors play mirrored clips
    pub fn is_left(self) -> bool {
        matches!(
            self,
            EffectorType::LeftFoot
                | EffectorType::LeftHand
                | EffectorType::LeftShoulder
                | EffectorType::LeftThigh
        )
    }
}

impl fmt::Display for EffectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Set of effectors, one bit per [`EffectorType`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectorMask(pub u16);

impl EffectorMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self((1 << EFFECTOR_COUNT) - 1);

    /// Mask with a single effector
    pub const fn single(effector: EffectorType) -> Self {
        Self(1 << effector.index())
    }

    pub fn from_effectors(effectors: &[EffectorType]) -> Self {
        effectors.iter().fold(Self::NONE, |mask, e| mask.with(*e))
    }

    pub fn contains(self, effector: EffectorType) -> bool {
        self.0 & (1 << effector.index()) != 0
    }

    pub fn with(self, effector: EffectorType) -> Self {
        Self(self.0 | (1 << effector.index()))
    }

    pub fn without(self, effector: EffectorType) -> Self {
        Self(self.0 & !(1 << effector.index()))
    }

    pub fn set(&mut self, effector: EffectorType, value: bool) {
        *self = if value { self.with(effector) } else { self.without(effector) };
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = EffectorType> {
        EffectorType::ALL.into_iter().filter(move |e| self.contains(*e))
    }
}

/// Where an effector sits on the actor and what it can reach
///
/// Angles are in degrees measured in actor space: horizontal around the up
/// axis (positive to the right), vertical around the right axis (positive
/// up). The cone is centred on the offsets and spans the half-angles either
/// side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectorRule {
    /// Which effector this rule places
    pub effector: EffectorType,
    /// Effector origin in actor space
    pub offset: Vec3,
    /// Cone centre around the up axis
    pub horizontal_offset: f32,
    /// Cone half-angle around the up axis
    pub horizontal_half_angle: f32,
    /// Cone centre around the right axis
    pub vertical_offset: f32,
    /// Cone half-angle around the right axis
    pub vertical_half_angle: f32,
    /// Nearest reach (inclusive)
    pub min_radius: f32,
    /// Farthest reach (inclusive)
    pub max_radius: f32,
    /// Disabled slots never evaluate or connect
    pub enabled: bool,
}

impl EffectorRule {
    /// Create a rule with a forward cone of ±90° on both axes
    pub fn new(effector: EffectorType, offset: Vec3) -> Self {
        Self {
            effector,
            offset,
            horizontal_offset: 0.0,
            horizontal_half_angle: 90.0,
            vertical_offset: 0.0,
            vertical_half_angle: 90.0,
            min_radius: 0.0,
            max_radius: 1.0,
            enabled: true,
        }
    }

    /// Set the horizontal cone
    pub fn with_horizontal(mut self, offset: f32, half_angle: f32) -> Self {
        self.horizontal_offset = offset;
        self.horizontal_half_angle = half_angle;
        self
    }

    /// Set the vertical cone
    pub fn with_vertical(mut self, offset: f32, half_angle: f32) -> Self {
        self.vertical_offset = offset;
        self.vertical_half_angle = half_angle;
        self
    }

    /// Set the radius band
    pub fn with_radius(mut self, min: f32, max: f32) -> Self {
        self.min_radius = min;
        self.max_radius = max;
        self
    }

    /// Disable the slot
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Per-target replacement for parts of an [`EffectorRule`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConeOverride {
    pub horizontal_half_angle: Option<f32>,
    pub vertical_half_angle: Option<f32>,
    pub min_radius: Option<f32>,
    pub max_radius: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_match_order() {
        for (index, effector) in EffectorType::ALL.iter().enumerate() {
            assert_eq!(effector.index(), index);
            assert_eq!(EffectorType::from_index(index), Some(*effector));
        }
        assert_eq!(EffectorType::from_index(EFFECTOR_COUNT), None);
    }

    #[test]
    fn test_mask_operations() {
        let mut mask = EffectorMask::NONE;
        mask.set(EffectorType::LeftHand, true);
        mask.set(EffectorType::RightHand, true);
        assert_eq!(mask.count(), 2);
        assert!(mask.contains(EffectorType::LeftHand));

        mask.set(EffectorType::LeftHand, false);
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![EffectorType::RightHand]);
        assert_eq!(EffectorMask::ALL.count(), EFFECTOR_COUNT as u32);
    }

    #[test]
    fn test_sides() {
        assert!(EffectorType::LeftHand.is_left());
        assert!(!EffectorType::RightHand.is_left());
        assert!(EffectorType::RightHand.is_hand());
        assert!(!EffectorType::Body.is_hand());
    }
}
