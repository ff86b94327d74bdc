//! Calibration tables for orbital reach
//!
//! Each anchor direction (front, same-side, behind on the same side,
//! cross-body, behind across the body) owns one table per height band.
//! Tables are sampled at 25 evenly spaced normalized distances and looked up
//! by nearest sample.

use serde::{Deserialize, Serialize};

/// Samples per calibration curve
pub const CURVE_SAMPLES: usize = 25;

/// A distance-indexed table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationCurve {
    samples: [f32; CURVE_SAMPLES],
}

impl CalibrationCurve {
    /// Wrap explicit samples
    pub fn new(samples: [f32; CURVE_SAMPLES]) -> Self {
        Self { samples }
    }

    /// Same value at every distance
    pub fn constant(value: f32) -> Self {
        Self {
            samples: [value; CURVE_SAMPLES],
        }
    }

    /// Build from a function of normalized distance in [0, 1]
    pub fn from_fn(f: impl Fn(f32) -> f32) -> Self {
        let mut samples = [0.0; CURVE_SAMPLES];
        for (index, sample) in samples.iter_mut().enumerate() {
            *sample = f(index as f32 / (CURVE_SAMPLES - 1) as f32);
        }
        Self { samples }
    }

    /// Nearest-sample lookup
    pub fn sample(&self, distance: f32) -> f32 {
        let index = (distance.clamp(0.0, 1.0) * (CURVE_SAMPLES - 1) as f32).round() as usize;
        self.samples[index.min(CURVE_SAMPLES - 1)]
    }

    pub fn samples(&self) -> &[f32; CURVE_SAMPLES] {
        &self.samples
    }
}

/// One curve per height band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightBands {
    pub high: CalibrationCurve,
    pub mid: CalibrationCurve,
    pub low: CalibrationCurve,
    /// Used below the crouch threshold
    pub crouch: CalibrationCurve,
}

impl HeightBands {
    /// Build all four bands from one base function plus per-band offsets
    fn from_fn(f: impl Fn(f32) -> f32, high: f32, low: f32, crouch: f32, max: f32) -> Self {
        let band = |offset: f32| CalibrationCurve::from_fn(|d| (f(d) + offset).min(max));
        Self {
            high: band(high),
            mid: band(0.0),
            low: band(low),
            crouch: band(crouch),
        }
    }
}

/// Weight and late-start tables for one anchor direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorCurves {
    /// Blend-tree layer weight
    pub weight: HeightBands,
    /// Extra seconds before the reach arrives
    pub late_start: HeightBands,
}

impl AnchorCurves {
    fn linear(weight_base: f32, weight_gain: f32, late_base: f32) -> Self {
        Self {
            weight: HeightBands::from_fn(|d| weight_base + weight_gain * d, 0.05, 0.05, 0.1, 1.0),
            late_start: HeightBands::from_fn(|d| late_base + 0.2 * d, 0.05, 0.05, 0.15, f32::MAX),
        }
    }
}

/// Every anchor direction for the unmirrored hand
///
/// The mirrored hand reads the same tables with the angle negated, so
/// `side` always means the reaching hand's own side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSet {
    pub front: AnchorCurves,
    pub side: AnchorCurves,
    pub back_side: AnchorCurves,
    pub cross: AnchorCurves,
    pub back_cross: AnchorCurves,
}

impl Default for CalibrationSet {
    fn default() -> Self {
        Self {
            front: AnchorCurves::linear(0.55, 0.45, 0.2),
            side: AnchorCurves::linear(0.5, 0.5, 0.25),
            back_side: AnchorCurves::linear(0.7, 0.3, 0.4),
            cross: AnchorCurves::linear(0.75, 0.25, 0.35),
            back_cross: AnchorCurves::linear(0.9, 0.1, 0.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_sample_lookup() {
        let curve = CalibrationCurve::from_fn(|d| d);
        assert_eq!(curve.sample(0.0), 0.0);
        assert_eq!(curve.sample(1.0), 1.0);
        // 0.51 * 24 = 12.24 rounds to sample 12
        assert_eq!(curve.sample(0.51), 0.5);
        assert_eq!(curve.sample(-3.0), 0.0);
        assert_eq!(curve.sample(7.0), 1.0);
    }

    #[test]
    fn test_default_weights_bounded() {
        let set = CalibrationSet::default();
        for anchor in [&set.front, &set.side, &set.back_side, &set.cross, &set.back_cross] {
            for band in [&anchor.weight.high, &anchor.weight.mid, &anchor.weight.low, &anchor.weight.crouch] {
                assert!(band.samples().iter().all(|w| (0.0..=1.0).contains(w)));
            }
        }
    }
}
