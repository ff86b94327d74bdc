//! Void Orbital - Procedural Reach Blending
//!
//! Maps the position of a target around an actor onto a single blend tree so
//! one set of reach clips covers any point inside a bounded height, angle and
//! distance envelope.
//!
//! # Features
//!
//! - Normalized target queries (height, angle, planar distance)
//! - Calibration tables per anchor direction and height band
//! - Seam-continuous blend weight and late-start resolution
//! - Resumable drive lifecycle with early reversal
//!
//! # Example
//!
//! ```ignore
//! use void_orbital::prelude::*;
//!
//! let mut blender = OrbitalBlender::new(OrbitalConfig::default());
//! let query = blender.query(&actor_pose, target_position);
//! blender.drive(hand, query, false, false, &mut animator)?;
//!
//! // Each frame
//! if let Some((hand, DriveEvent::Reached { .. })) =
//!     blender.advance(dt, |_| DriveSignals::new(true, paused, progress), &mut animator)
//! {
//!     start_interaction(hand);
//! }
//! ```

pub mod animator;
pub mod blend;
pub mod blender;
pub mod config;
pub mod curves;
pub mod drive;
pub mod error;
pub mod pose;
pub mod query;

#[cfg(test)]
mod testing;

pub mod prelude {
    pub use crate::animator::{BlendState, BlendTreeAnimator, OrbitalParameters};
    pub use crate::blend::{resolve_blend_weight, BlendResolution};
    pub use crate::blender::OrbitalBlender;
    pub use crate::config::OrbitalConfig;
    pub use crate::curves::{AnchorCurves, CalibrationCurve, CalibrationSet, HeightBands, CURVE_SAMPLES};
    pub use crate::drive::{DriveEvent, DrivePhase, DriveSignals, OrbitalDrive};
    pub use crate::error::{OrbitalError, Result};
    pub use crate::pose::Pose;
    pub use crate::query::OrbitalQuery;
}

pub use prelude::*;
