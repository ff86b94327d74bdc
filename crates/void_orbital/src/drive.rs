//! Resumable orbital drive
//!
//! A drive is advanced once per frame and suspends between calls:
//!
//! ```text
//! Delay ──▶ RampIn ──▶ Holding ──▶ RampOut ──▶ Finished
//!   │          │
//!   └──────────┴──▶ Reversing ──▶ Finished      (reverse_early)
//! ```
//!
//! `Reached` is reported when the ramp-in completes. Every resumption checks
//! [`DriveSignals::valid`] so a drive whose object vanished winds down on
//! the next call instead of being torn down from outside.

use crate::animator::{BlendState, BlendTreeAnimator, OrbitalParameters};
use crate::blend::BlendResolution;
use crate::config::OrbitalConfig;
use crate::pose::inverse_lerp;
use crate::query::OrbitalQuery;

/// Drive phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrivePhase {
    /// Waiting out the first tick after parameters were written
    Delay,
    /// Raising the layer weight toward the resolved weight
    RampIn { elapsed: f32 },
    /// Full weight; waiting for the interaction to pass its target
    Holding { paused_for: f32 },
    /// Lowering the layer weight to zero
    RampOut { elapsed: f32, from: f32 },
    /// Cancelled early; playing backwards to idle
    Reversing { elapsed: f32, duration: f32, from: f32, base_rate: f32 },
    /// Done; the drive can be dropped
    Finished,
}

/// Outside state read at every resumption
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveSignals {
    /// Object and target still enabled and registered
    pub valid: bool,
    /// The interaction is paused at its target
    pub paused: bool,
    /// Interaction progress: (0, 1) approaching, 1 at target, (1, 2) returning
    pub progress: f32,
}

impl DriveSignals {
    pub fn new(valid: bool, paused: bool, progress: f32) -> Self {
        Self { valid, paused, progress }
    }
}

/// Notable transitions reported by [`OrbitalDrive::advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveEvent {
    /// Full weight reached; the interaction should start (or resume when returning)
    Reached { returning: bool },
    /// The hold outlived `max_pause` and the drive ramped out regardless
    PauseTimedOut,
    /// Ramp-out done
    Completed,
    /// Reversed early or invalidated
    Cancelled,
}

/// One orbital reach in flight
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalDrive {
    phase: DrivePhase,
    query: OrbitalQuery,
    resolution: BlendResolution,
    mirrored: bool,
    returning: bool,
    current_weight: f32,
}

impl OrbitalDrive {
    /// Create a drive; nothing is written to the animator until [`begin`](Self::begin)
    pub fn new(query: OrbitalQuery, resolution: BlendResolution, mirrored: bool, returning: bool) -> Self {
        Self {
            phase: DrivePhase::Delay,
            query,
            resolution,
            mirrored,
            returning,
            current_weight: 0.0,
        }
    }

    pub fn phase(&self) -> DrivePhase {
        self.phase
    }

    pub fn weight(&self) -> f32 {
        self.current_weight
    }

    pub fn resolution(&self) -> BlendResolution {
        self.resolution
    }

    pub fn is_returning(&self) -> bool {
        self.returning
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, DrivePhase::Finished)
    }

    /// Write the blend parameters and cross-fade into stand or crouch
    pub fn begin(&mut self, animator: &mut dyn BlendTreeAnimator, config: &OrbitalConfig) {
        let parameters = OrbitalParameters {
            angle: self.query.mirrored_angle(self.mirrored),
            height: self.query.height,
            mirror: self.mirrored,
            cycle_offset: if self.mirrored {
                config.mirror_cycle_offset
            } else {
                0.0
            },
        };
        animator.set_parameters(&parameters);

        let state = if self.query.is_crouched(config) {
            BlendState::Crouch
        } else {
            BlendState::Stand
        };
        animator.cross_fade(state, config.cross_fade);
        animator.set_layer_weight(0.0);
        self.current_weight = 0.0;
        self.phase = DrivePhase::Delay;
    }

    /// Resume the drive for one frame
    pub fn advance(
        &mut self,
        delta_time: f32,
        signals: DriveSignals,
        animator: &mut dyn BlendTreeAnimator,
        config: &OrbitalConfig,
    ) -> Option<DriveEvent> {
        if self.is_finished() {
            return None;
        }

        if !signals.valid && !matches!(self.phase, DrivePhase::Reversing { .. }) {
            self.set_weight(animator, 0.0);
            animator.cross_fade(BlendState::Idle, config.cross_fade);
            self.phase = DrivePhase::Finished;
            return Some(DriveEvent::Cancelled);
        }

        let late = self.resolution.late_start;
        match self.phase {
            DrivePhase::Delay => {
                self.phase = DrivePhase::RampIn { elapsed: 0.0 };
                None
            }
            DrivePhase::RampIn { elapsed } => {
                let elapsed = elapsed + delta_time;
                let t = if late <= 0.0 { 1.0 } else { inverse_lerp(0.0, late, elapsed) };
                self.set_weight(animator, self.resolution.weight * t);

                if t >= 1.0 {
                    self.phase = DrivePhase::Holding { paused_for: 0.0 };
                    Some(DriveEvent::Reached {
                        returning: self.returning,
                    })
                } else {
                    self.phase = DrivePhase::RampIn { elapsed };
                    None
                }
            }
            DrivePhase::Holding { paused_for } => {
                if signals.paused {
                    let paused_for = paused_for + delta_time;
                    if config.max_pause.is_some_and(|limit| paused_for >= limit) {
                        log::warn!(
                            "Orbital hold paused for {:.1}s without resuming, ramping out",
                            paused_for
                        );
                        self.phase = DrivePhase::RampOut {
                            elapsed: 0.0,
                            from: self.current_weight,
                        };
                        return Some(DriveEvent::PauseTimedOut);
                    }
                    self.phase = DrivePhase::Holding { paused_for };
                } else if signals.progress >= 1.0 {
                    self.phase = DrivePhase::RampOut {
                        elapsed: 0.0,
                        from: self.current_weight,
                    };
                }
                None
            }
            DrivePhase::RampOut { elapsed, from } => {
                let elapsed = elapsed + delta_time;
                let t = if late <= 0.0 { 1.0 } else { inverse_lerp(0.0, late, elapsed) };
                self.set_weight(animator, from * (1.0 - t));

                if t >= 1.0 {
                    animator.cross_fade(BlendState::Idle, config.cross_fade);
                    self.phase = DrivePhase::Finished;
                    Some(DriveEvent::Completed)
                } else {
                    self.phase = DrivePhase::RampOut { elapsed, from };
                    None
                }
            }
            DrivePhase::Reversing {
                elapsed,
                duration,
                from,
                base_rate,
            } => {
                let elapsed = elapsed + delta_time;
                let t = inverse_lerp(0.0, duration, elapsed);
                self.set_weight(animator, from * (1.0 - t));

                if t >= 1.0 {
                    animator.set_playback_rate(base_rate);
                    animator.cross_fade(BlendState::Idle, config.cross_fade);
                    self.phase = DrivePhase::Finished;
                    Some(DriveEvent::Cancelled)
                } else {
                    self.phase = DrivePhase::Reversing {
                        elapsed,
                        duration,
                        from,
                        base_rate,
                    };
                    None
                }
            }
            DrivePhase::Finished => None,
        }
    }

    /// Play the reach backwards to idle if it has not arrived yet
    ///
    /// Returns `false` once the drive is past its ramp-in.
    pub fn reverse_early(&mut self, animator: &mut dyn BlendTreeAnimator, config: &OrbitalConfig) -> bool {
        if !matches!(self.phase, DrivePhase::Delay | DrivePhase::RampIn { .. }) {
            return false;
        }

        let base_rate = animator.playback_rate();
        animator.set_playback_rate(-2.0 * base_rate);
        self.phase = DrivePhase::Reversing {
            elapsed: 0.0,
            duration: config.blend_duration * 0.25,
            from: self.current_weight,
            base_rate,
        };
        true
    }

    fn set_weight(&mut self, animator: &mut dyn BlendTreeAnimator, weight: f32) {
        self.current_weight = weight;
        animator.set_layer_weight(weight);
    }
}
