//! Interactor configuration

use crate::effector::{EffectorMask, EffectorRule, EffectorType};
use crate::error::{InteractionError, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use void_orbital::OrbitalConfig;

/// Calibration of one actor's interaction engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractorConfig {
    /// One rule per effector slot
    pub effectors: Vec<EffectorRule>,
    /// Orbital reach envelope; `None` disables orbital reach for the actor
    pub orbital: Option<OrbitalConfig>,
    /// Interrupt-transfer blend rate (progress per second)
    pub transfer_rate: f32,
    /// Transfer progress past which the hand-off is complete
    pub transfer_complete: f32,
    /// IK approach progress past which an interrupt reverses the drive
    pub interrupt_reverse_threshold: f32,
    /// IK progress at which a target-and-back cycle is done
    pub completion_progress: f32,
    /// Layers tested by obstruction rays
    pub line_of_sight_mask: u32,
}

impl Default for InteractorConfig {
    fn default() -> Self {
        Self {
            effectors: Vec::new(),
            orbital: None,
            transfer_rate: 4.0,
            transfer_complete: 0.98,
            interrupt_reverse_threshold: 0.5,
            completion_progress: 2.0,
            line_of_sight_mask: u32::MAX,
        }
    }
}

impl InteractorConfig {
    /// Full humanoid rig with all nine slots and orbital reach enabled
    pub fn humanoid() -> Self {
        let effectors = vec![
            EffectorRule::new(EffectorType::Body, Vec3::new(0.0, 1.0, 0.0))
                .with_vertical(0.0, 60.0)
                .with_radius(0.0, 1.5),
            EffectorRule::new(EffectorType::LeftFoot, Vec3::new(-0.1, 0.1, 0.0))
                .with_horizontal(-15.0, 60.0)
                .with_vertical(-30.0, 45.0)
                .with_radius(0.0, 0.8),
            EffectorRule::new(EffectorType::RightFoot, Vec3::new(0.1, 0.1, 0.0))
                .with_horizontal(15.0, 60.0)
                .with_vertical(-30.0, 45.0)
                .with_radius(0.0, 0.8),
            EffectorRule::new(EffectorType::LeftHand, Vec3::new(-0.2, 1.4, 0.0))
                .with_horizontal(-30.0, 90.0)
                .with_radius(0.1, 0.9),
            EffectorRule::new(EffectorType::RightHand, Vec3::new(0.2, 1.4, 0.0))
                .with_horizontal(30.0, 90.0)
                .with_radius(0.1, 0.9),
            EffectorRule::new(EffectorType::LeftShoulder, Vec3::new(-0.2, 1.45, 0.0))
                .with_horizontal(-45.0, 60.0)
                .with_radius(0.0, 0.5),
            EffectorRule::new(EffectorType::RightShoulder, Vec3::new(0.2, 1.45, 0.0))
                .with_horizontal(45.0, 60.0)
                .with_radius(0.0, 0.5),
            EffectorRule::new(EffectorType::LeftThigh, Vec3::new(-0.1, 0.8, 0.0))
                .with_vertical(-20.0, 45.0)
                .with_radius(0.0, 0.6),
            EffectorRule::new(EffectorType::RightThigh, Vec3::new(0.1, 0.8, 0.0))
                .with_vertical(-20.0, 45.0)
                .with_radius(0.0, 0.6),
        ];

        Self {
            effectors,
            orbital: Some(OrbitalConfig::default()),
            ..Default::default()
        }
    }

    /// Add or replace the rule for an effector
    pub fn with_effector(mut self, rule: EffectorRule) -> Self {
        self.effectors.retain(|existing| existing.effector != rule.effector);
        self.effectors.push(rule);
        self
    }

    /// Set the orbital envelope
    pub fn with_orbital(mut self, orbital: Option<OrbitalConfig>) -> Self {
        self.orbital = orbital;
        self
    }

    /// Set the interrupt-transfer rate
    pub fn with_transfer_rate(mut self, rate: f32) -> Self {
        self.transfer_rate = rate;
        self
    }

    /// Set the obstruction layer mask
    pub fn with_line_of_sight_mask(mut self, mask: u32) -> Self {
        self.line_of_sight_mask = mask;
        self
    }

    /// Rule for an effector, if the slot exists
    pub fn rule(&self, effector: EffectorType) -> Option<&EffectorRule> {
        self.effectors.iter().find(|rule| rule.effector == effector)
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check slot uniqueness, cone angles, radius bands and timings
    pub fn validate(&self) -> Result<()> {
        let mut seen = EffectorMask::NONE;
        for rule in &self.effectors {
            if seen.contains(rule.effector) {
                return Err(InteractionError::InvalidConfig(format!(
                    "duplicate slot for {}",
                    rule.effector
                )));
            }
            seen = seen.with(rule.effector);

            if !(rule.min_radius >= 0.0 && rule.min_radius <= rule.max_radius) {
                return Err(InteractionError::InvalidConfig(format!(
                    "{} radius band must satisfy 0 <= min <= max (got {} / {})",
                    rule.effector, rule.min_radius, rule.max_radius
                )));
            }
            for half_angle in [rule.horizontal_half_angle, rule.vertical_half_angle] {
                if !(half_angle > 0.0 && half_angle <= 180.0) {
                    return Err(InteractionError::InvalidConfig(format!(
                        "{} half-angle {} outside (0, 180]",
                        rule.effector, half_angle
                    )));
                }
            }
        }

        if self.transfer_rate <= 0.0 {
            return Err(InteractionError::InvalidConfig("transfer_rate must be positive".into()));
        }
        if !(self.transfer_complete > 0.0 && self.transfer_complete <= 1.0) {
            return Err(InteractionError::InvalidConfig(
                "transfer_complete must be within (0, 1]".into(),
            ));
        }
        if !(1.0..=2.0).contains(&self.completion_progress) {
            return Err(InteractionError::InvalidConfig(
                "completion_progress must be within [1, 2]".into(),
            ));
        }

        if let Some(orbital) = &self.orbital {
            orbital.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanoid_is_valid() {
        let config = InteractorConfig::humanoid();
        assert_eq!(config.effectors.len(), crate::effector::EFFECTOR_COUNT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_slot_rejected() {
        let mut config = InteractorConfig::humanoid();
        config
            .effectors
            .push(EffectorRule::new(EffectorType::RightHand, Vec3::ZERO));
        assert!(matches!(config.validate(), Err(InteractionError::InvalidConfig(_))));
    }

    #[test]
    fn test_with_effector_replaces() {
        let config = InteractorConfig::humanoid()
            .with_effector(EffectorRule::new(EffectorType::RightHand, Vec3::ZERO).with_radius(0.0, 2.0));
        assert_eq!(config.effectors.len(), crate::effector::EFFECTOR_COUNT);
        assert_eq!(config.rule(EffectorType::RightHand).map(|r| r.max_radius), Some(2.0));
    }

    #[test]
    fn test_inverted_radius_rejected() {
        let config = InteractorConfig::default()
            .with_effector(EffectorRule::new(EffectorType::Body, Vec3::ZERO).with_radius(1.0, 0.5));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_orbital_rejected() {
        let config = InteractorConfig::humanoid()
            .with_orbital(Some(OrbitalConfig::default().with_heights(1.0, 0.5, 2.0)));
        assert!(matches!(config.validate(), Err(InteractionError::Orbital(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let config = InteractorConfig::humanoid().with_transfer_rate(6.0);
        let json = config.to_json().unwrap();
        let parsed = InteractorConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let parsed = InteractorConfig::from_json(r#"{ "transfer_rate": 2.0 }"#).unwrap();
        assert_eq!(parsed.transfer_rate, 2.0);
        assert_eq!(parsed.completion_progress, 2.0);
        assert!(parsed.orbital.is_none());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            InteractorConfig::from_json("{ not json"),
            Err(InteractionError::Parse(_))
        ));
    }
}
