//! Blend-weight resolution
//!
//! The normalized angle picks one of four segments between five anchor
//! directions:
//!
//! ```text
//!   back_cross  cross   front   side   back_side
//!      -1       -0.5      0      0.5      1
//! ```
//!
//! Segments touching the front use a squared factor, segments reaching
//! behind use a cubed one. Every factor is 0 at the segment start and 1 at
//! its end, so neighbouring segments agree exactly at the seams.
//!
//! Angles +1 and -1 are the same direction. Both back segments therefore
//! end on the mean of the two back anchors, and the wrap seam holds for any
//! calibration.

use crate::config::OrbitalConfig;
use crate::curves::{AnchorCurves, CalibrationSet, HeightBands};
use crate::pose::{inverse_lerp, lerp};
use crate::query::OrbitalQuery;

/// Resolved animation drive for one query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendResolution {
    /// Target layer weight in [0, 1]
    pub weight: f32,
    /// Ramp duration in seconds (late-start, mirrored as late-end)
    pub late_start: f32,
}

/// Resolve the layer weight and late-start timing for a query
pub fn resolve_blend_weight(
    query: &OrbitalQuery,
    mirrored: bool,
    calibration: &CalibrationSet,
    config: &OrbitalConfig,
) -> BlendResolution {
    let angle = query.mirrored_angle(mirrored).clamp(-1.0, 1.0);

    // `behind` is the back anchor on the far side of the wrap seam
    let (from, to, behind, factor) = if angle >= 0.0 {
        if angle <= 0.5 {
            (&calibration.front, &calibration.side, None, (angle / 0.5).powi(2))
        } else {
            let factor = ((angle - 0.5) / 0.5).powi(3);
            (&calibration.side, &calibration.back_side, Some(&calibration.back_cross), factor)
        }
    } else if angle >= -0.5 {
        (&calibration.front, &calibration.cross, None, (-angle / 0.5).powi(2))
    } else {
        let factor = ((-angle - 0.5) / 0.5).powi(3);
        (&calibration.cross, &calibration.back_cross, Some(&calibration.back_side), factor)
    };

    let resolve = |channel: Channel| {
        let mut end = anchor_value(to, query, config, channel);
        if let Some(behind) = behind {
            end = lerp(end, anchor_value(behind, query, config, channel), 0.5 * factor);
        }
        lerp(anchor_value(from, query, config, channel), end, factor)
    };
    let weight = resolve(Channel::Weight);
    let late_start = resolve(Channel::LateStart);

    BlendResolution {
        weight: weight.clamp(0.0, 1.0),
        late_start: late_start.max(0.0),
    }
}

#[derive(Clone, Copy)]
enum Channel {
    Weight,
    LateStart,
}

fn anchor_value(anchor: &AnchorCurves, query: &OrbitalQuery, config: &OrbitalConfig, channel: Channel) -> f32 {
    let bands = match channel {
        Channel::Weight => &anchor.weight,
        Channel::LateStart => &anchor.late_start,
    };
    band_value(bands, query, config)
}

fn band_value(bands: &HeightBands, query: &OrbitalQuery, config: &OrbitalConfig) -> f32 {
    let d = query.distance;
    let mid = bands.mid.sample(d);
    let standing = if query.height >= 0.0 {
        lerp(mid, bands.high.sample(d), query.height)
    } else {
        lerp(mid, bands.low.sample(d), -query.height)
    };

    if query.is_crouched(config) {
        // Zero exactly at the threshold so crossing it does not jump
        let depth = inverse_lerp(config.crouch_height, config.min_height, query.raw_height);
        lerp(standing, bands.crouch.sample(d), depth)
    } else {
        standing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn query(angle: f32, height: f32) -> OrbitalQuery {
        OrbitalQuery {
            height,
            angle,
            distance: 0.5,
            raw_height: 1.1,
        }
    }

    #[test]
    fn test_seams_are_continuous() {
        let config = OrbitalConfig::default();
        let calibration = CalibrationSet::default();

        for seam in [-0.5f32, 0.0, 0.5] {
            let below = resolve_blend_weight(&query(seam - 1e-4, 0.3), false, &calibration, &config);
            let at = resolve_blend_weight(&query(seam, 0.3), false, &calibration, &config);
            let above = resolve_blend_weight(&query(seam + 1e-4, 0.3), false, &calibration, &config);

            assert_abs_diff_eq!(below.weight, at.weight, epsilon = 1e-3);
            assert_abs_diff_eq!(above.weight, at.weight, epsilon = 1e-3);
            assert_abs_diff_eq!(below.late_start, above.late_start, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_anchor_values_exact() {
        let config = OrbitalConfig::default();
        let calibration = CalibrationSet::default();
        let expected_side = calibration.side.weight.mid.sample(0.5);

        let at_side = resolve_blend_weight(&query(0.5, 0.0), false, &calibration, &config);
        assert_eq!(at_side.weight, expected_side);
    }

    #[test]
    fn test_mirroring_swaps_sides() {
        let config = OrbitalConfig::default();
        let calibration = CalibrationSet::default();

        let right = resolve_blend_weight(&query(0.3, 0.0), false, &calibration, &config);
        let mirrored_left = resolve_blend_weight(&query(-0.3, 0.0), true, &calibration, &config);
        assert_eq!(right, mirrored_left);
    }

    #[test]
    fn test_segment_exponents() {
        let config = OrbitalConfig::default();
        let calibration = CalibrationSet::default();
        let front = calibration.front.weight.mid.sample(0.5);
        let side = calibration.side.weight.mid.sample(0.5);
        let back = calibration.back_side.weight.mid.sample(0.5);

        // Halfway through the front segment the squared factor is 0.25
        let quarter = resolve_blend_weight(&query(0.25, 0.0), false, &calibration, &config);
        assert_abs_diff_eq!(quarter.weight, front + (side - front) * 0.25, epsilon = 1e-5);

        // Halfway through the back segment the cubed factor is 0.125
        let back_cross = calibration.back_cross.weight.mid.sample(0.5);
        let end = back + (back_cross - back) * 0.0625;
        let eighth = resolve_blend_weight(&query(0.75, 0.0), false, &calibration, &config);
        assert_abs_diff_eq!(eighth.weight, side + (end - side) * 0.125, epsilon = 1e-5);
    }

    #[test]
    fn test_back_seam_wraps() {
        let config = OrbitalConfig::default();
        let calibration = CalibrationSet::default();

        for height in [-0.6f32, 0.0, 0.4] {
            let right = resolve_blend_weight(&query(0.9999, height), false, &calibration, &config);
            let left = resolve_blend_weight(&query(-0.9999, height), false, &calibration, &config);
            assert_abs_diff_eq!(right.weight, left.weight, epsilon = 1e-3);
            assert_abs_diff_eq!(right.late_start, left.late_start, epsilon = 1e-3);
        }

        // Directly behind sits halfway between the two back anchors
        let behind = resolve_blend_weight(&query(1.0, 0.0), false, &calibration, &config);
        let back_side = calibration.back_side.weight.mid.sample(0.5);
        let back_cross = calibration.back_cross.weight.mid.sample(0.5);
        assert_abs_diff_eq!(behind.weight, (back_side + back_cross) * 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_crouch_band_continuous_at_threshold() {
        let config = OrbitalConfig::default();
        let calibration = CalibrationSet::default();

        let mut standing = query(0.1, -0.5);
        standing.raw_height = config.crouch_height;
        let mut crouched = standing;
        crouched.raw_height = config.crouch_height - 1e-4;

        let a = resolve_blend_weight(&standing, false, &calibration, &config);
        let b = resolve_blend_weight(&crouched, false, &calibration, &config);
        assert_abs_diff_eq!(a.weight, b.weight, epsilon = 1e-3);
    }
}
