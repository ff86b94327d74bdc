//! Test doubles

use crate::animator::{BlendState, BlendTreeAnimator, OrbitalParameters};

/// Animator that records the last value of everything written to it
#[derive(Debug, Default)]
pub struct RecordingAnimator {
    pub parameters: Option<OrbitalParameters>,
    pub state: Option<BlendState>,
    pub weight: f32,
    pub rate: f32,
}

impl BlendTreeAnimator for RecordingAnimator {
    fn set_parameters(&mut self, parameters: &OrbitalParameters) {
        self.parameters = Some(*parameters);
    }

    fn cross_fade(&mut self, state: BlendState, _duration: f32) {
        self.state = Some(state);
    }

    fn set_layer_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    fn layer_weight(&self) -> f32 {
        self.weight
    }

    fn set_playback_rate(&mut self, rate: f32) {
        self.rate = rate;
    }

    fn playback_rate(&self) -> f32 {
        self.rate
    }
}
