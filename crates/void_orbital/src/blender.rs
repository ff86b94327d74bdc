//! Orbital blender: query, resolve, and a single active drive

use crate::animator::BlendTreeAnimator;
use crate::blend::{resolve_blend_weight, BlendResolution};
use crate::config::OrbitalConfig;
use crate::curves::CalibrationSet;
use crate::drive::{DriveEvent, DriveSignals, OrbitalDrive};
use crate::error::{OrbitalError, Result};
use crate::pose::Pose;
use crate::query::OrbitalQuery;
use glam::Vec3;

/// Owns the calibration and the one blend-tree layer it drives
///
/// `K` identifies who requested the active drive and is handed back with
/// every [`DriveEvent`].
#[derive(Debug, Clone)]
pub struct OrbitalBlender<K> {
    config: OrbitalConfig,
    calibration: CalibrationSet,
    active: Option<(K, OrbitalDrive)>,
}

impl<K: Copy + PartialEq> OrbitalBlender<K> {
    /// Create a blender with the default calibration
    pub fn new(config: OrbitalConfig) -> Self {
        Self {
            config,
            calibration: CalibrationSet::default(),
            active: None,
        }
    }

    /// Replace the calibration tables
    pub fn with_calibration(mut self, calibration: CalibrationSet) -> Self {
        self.calibration = calibration;
        self
    }

    pub fn config(&self) -> &OrbitalConfig {
        &self.config
    }

    pub fn calibration(&self) -> &CalibrationSet {
        &self.calibration
    }

    /// Project a target into the envelope of an actor
    pub fn query(&self, actor: &Pose, target: Vec3) -> OrbitalQuery {
        OrbitalQuery::from_poses(actor, target, &self.config)
    }

    /// Resolve weight and late-start for a query
    pub fn resolve(&self, query: &OrbitalQuery, mirrored: bool) -> BlendResolution {
        resolve_blend_weight(query, mirrored, &self.calibration, &self.config)
    }

    /// Key of the running drive, if any
    pub fn active_key(&self) -> Option<K> {
        self.active.as_ref().map(|(key, _)| *key)
    }

    pub fn is_driving(&self, key: &K) -> bool {
        self.active.as_ref().is_some_and(|(active, _)| active == key)
    }

    pub fn active_drive(&self) -> Option<&OrbitalDrive> {
        self.active.as_ref().map(|(_, drive)| drive)
    }

    /// Start a drive toward `query`
    ///
    /// Only one drive runs at a time; a second request fails with
    /// [`OrbitalError::Busy`] unless it comes from the same key, which
    /// replaces the running drive.
    pub fn drive(
        &mut self,
        key: K,
        query: OrbitalQuery,
        mirrored: bool,
        returning: bool,
        animator: &mut dyn BlendTreeAnimator,
    ) -> Result<BlendResolution> {
        if let Some((active, _)) = &self.active {
            if *active != key {
                return Err(OrbitalError::Busy);
            }
        }

        let resolution = self.resolve(&query, mirrored);
        let mut drive = OrbitalDrive::new(query, resolution, mirrored, returning);
        drive.begin(animator, &self.config);
        log::debug!(
            "Orbital drive started (angle {:.2}, height {:.2}, weight {:.2}, late {:.2}s)",
            query.angle,
            query.height,
            resolution.weight,
            resolution.late_start
        );
        self.active = Some((key, drive));
        Ok(resolution)
    }

    /// Advance the running drive; `signals` is evaluated for its key
    pub fn advance(
        &mut self,
        delta_time: f32,
        signals: impl FnOnce(&K) -> DriveSignals,
        animator: &mut dyn BlendTreeAnimator,
    ) -> Option<(K, DriveEvent)> {
        let (key, drive) = self.active.as_mut()?;
        let key = *key;
        let event = drive.advance(delta_time, signals(&key), animator, &self.config);
        if drive.is_finished() {
            self.active = None;
        }
        event.map(|event| (key, event))
    }

    /// Reverse the drive for `key` if it has not arrived yet
    pub fn reverse_early(&mut self, key: &K, animator: &mut dyn BlendTreeAnimator) -> bool {
        match self.active.as_mut() {
            Some((active, drive)) if active == key => drive.reverse_early(animator, &self.config),
            _ => false,
        }
    }

    /// Drop the drive for `key` without animating
    pub fn abort(&mut self, key: &K, animator: &mut dyn BlendTreeAnimator) -> bool {
        if self.is_driving(key) {
            animator.set_layer_weight(0.0);
            self.active = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::DrivePhase;
    use crate::testing::RecordingAnimator;

    #[test]
    fn test_single_active_drive() {
        let mut blender = OrbitalBlender::<u32>::new(OrbitalConfig::default());
        let mut animator = RecordingAnimator::default();
        let query = blender.query(&Pose::IDENTITY, Vec3::new(0.1, 1.1, 0.5));

        assert!(blender.drive(1, query, false, false, &mut animator).is_ok());
        assert_eq!(
            blender.drive(2, query, false, false, &mut animator),
            Err(OrbitalError::Busy)
        );
        assert!(blender.is_driving(&1));
        assert!(blender.drive(1, query, true, false, &mut animator).is_ok());
    }

    #[test]
    fn test_advance_reports_key_and_clears() {
        let mut blender = OrbitalBlender::<u32>::new(OrbitalConfig::default());
        let mut animator = RecordingAnimator::default();
        let query = blender.query(&Pose::IDENTITY, Vec3::new(0.1, 1.1, 0.5));
        blender.drive(7, query, false, false, &mut animator).unwrap();

        let gone = |_: &u32| DriveSignals::new(false, false, 0.0);
        assert_eq!(
            blender.advance(0.016, gone, &mut animator),
            Some((7, DriveEvent::Cancelled))
        );
        assert_eq!(blender.active_key(), None);
        assert_eq!(blender.advance(0.016, gone, &mut animator), None);
    }

    #[test]
    fn test_reverse_only_for_matching_key() {
        let mut blender = OrbitalBlender::<u32>::new(OrbitalConfig::default());
        let mut animator = RecordingAnimator::default();
        let query = blender.query(&Pose::IDENTITY, Vec3::new(0.1, 1.1, 0.5));
        blender.drive(3, query, false, false, &mut animator).unwrap();

        assert!(!blender.reverse_early(&4, &mut animator));
        assert!(blender.reverse_early(&3, &mut animator));
        assert!(matches!(
            blender.active_drive().map(|d| d.phase()),
            Some(DrivePhase::Reversing { .. })
        ));
    }
}
