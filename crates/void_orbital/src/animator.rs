//! Blend-tree animator seam
//!
//! The skeletal animation runtime is not part of this crate; drives talk to
//! it through [`BlendTreeAnimator`].

/// Sub-state of the orbital blend tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendState {
    /// Default pose, layer inactive
    Idle,
    /// Standing reach
    Stand,
    /// Crouched reach
    Crouch,
}

/// Parameters written into the blend tree when a drive begins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalParameters {
    /// Signed normalized angle, already mirrored for the reaching hand
    pub angle: f32,
    /// Normalized height
    pub height: f32,
    /// Whether the mirrored clip set plays
    pub mirror: bool,
    /// Cycle offset, non-zero only when mirrored
    pub cycle_offset: f32,
}

/// Animation runtime driving the orbital layer
pub trait BlendTreeAnimator {
    /// Write the reach parameters
    fn set_parameters(&mut self, parameters: &OrbitalParameters);

    /// Cross-fade into a sub-state
    fn cross_fade(&mut self, state: BlendState, duration: f32);

    /// Set the orbital layer weight
    fn set_layer_weight(&mut self, weight: f32);

    /// Current orbital layer weight
    fn layer_weight(&self) -> f32;

    /// Set the playback rate of the orbital layer
    fn set_playback_rate(&mut self, rate: f32);

    /// Current playback rate of the orbital layer
    fn playback_rate(&self) -> f32;
}
