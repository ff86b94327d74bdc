//! Orbital reach configuration

use crate::error::{OrbitalError, Result};
use serde::{Deserialize, Serialize};

/// Envelope and timing parameters for orbital reach
///
/// Heights and distances are measured in the actor's local space: heights
/// along the up axis from the actor root, distances on the ground plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitalConfig {
    /// Lowest reachable height
    pub min_height: f32,
    /// Height that maps to a normalized height of zero
    pub mid_height: f32,
    /// Highest reachable height
    pub max_height: f32,
    /// Nearest reachable planar distance
    pub min_distance: f32,
    /// Farthest reachable planar distance
    pub max_distance: f32,
    /// Tolerance added around the height and distance bands
    pub margin: f32,
    /// Below this height the crouch sub-state and band are used
    pub crouch_height: f32,
    /// Normalized half-width of the front cone where the inner radius relaxes
    pub front_relax_angle: f32,
    /// Inner radius multiplier straight ahead (1.0 disables the relaxation)
    pub front_relax_factor: f32,
    /// Natural duration of the blend tree in seconds
    pub blend_duration: f32,
    /// Cross-fade into the stand/crouch sub-state in seconds
    pub cross_fade: f32,
    /// Cycle offset applied when the blend is mirrored
    pub mirror_cycle_offset: f32,
    /// Longest hold at a paused target before the drive ramps out anyway
    pub max_pause: Option<f32>,
}

impl Default for OrbitalConfig {
    fn default() -> Self {
        Self {
            min_height: 0.2,
            mid_height: 1.1,
            max_height: 1.9,
            min_distance: 0.25,
            max_distance: 0.75,
            margin: 0.05,
            crouch_height: 0.6,
            front_relax_angle: 0.15,
            front_relax_factor: 0.5,
            blend_duration: 1.0,
            cross_fade: 0.15,
            mirror_cycle_offset: 0.5,
            max_pause: Some(30.0),
        }
    }
}

impl OrbitalConfig {
    /// Set the height band
    pub fn with_heights(mut self, min: f32, mid: f32, max: f32) -> Self {
        self.min_height = min;
        self.mid_height = mid;
        self.max_height = max;
        self
    }

    /// Set the planar distance band
    pub fn with_distances(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    /// Set the band margin
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    /// Set the crouch threshold
    pub fn with_crouch_height(mut self, height: f32) -> Self {
        self.crouch_height = height;
        self
    }

    /// Set or clear the pause fail-safe
    pub fn with_max_pause(mut self, seconds: Option<f32>) -> Self {
        self.max_pause = seconds;
        self
    }

    /// Check the bands are ordered and the timings positive
    pub fn validate(&self) -> Result<()> {
        if !(self.min_height < self.mid_height && self.mid_height < self.max_height) {
            return Err(OrbitalError::InvalidConfig(format!(
                "heights must satisfy min < mid < max (got {} / {} / {})",
                self.min_height, self.mid_height, self.max_height
            )));
        }
        if !(0.0 <= self.min_distance && self.min_distance < self.max_distance) {
            return Err(OrbitalError::InvalidConfig(format!(
                "distances must satisfy 0 <= min < max (got {} / {})",
                self.min_distance, self.max_distance
            )));
        }
        if self.margin < 0.0 {
            return Err(OrbitalError::InvalidConfig("margin must be non-negative".into()));
        }
        if !(0.0..=1.0).contains(&self.front_relax_factor) {
            return Err(OrbitalError::InvalidConfig(
                "front_relax_factor must be within [0, 1]".into(),
            ));
        }
        if self.blend_duration <= 0.0 {
            return Err(OrbitalError::InvalidConfig("blend_duration must be positive".into()));
        }
        if matches!(self.max_pause, Some(seconds) if seconds <= 0.0) {
            return Err(OrbitalError::InvalidConfig("max_pause must be positive".into()));
        }
        Ok(())
    }
}
