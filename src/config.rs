//! Tunable parameters for the classifier, filters, and simulation.
//!
//! Every threshold that shapes gesture recognition lives here with its
//! calibrated default, so hosts can retune without touching the
//! classification code.

use serde::{Deserialize, Serialize};

/// One Euro filter coefficients for a single channel.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FilterTuning {
    /// Minimum cutoff frequency in Hz. Lower means smoother at rest.
    pub min_cutoff: f32,
    /// Speed coefficient. Higher means less lag during fast motion.
    pub beta: f32,
    /// Cutoff frequency for the derivative estimate, in Hz.
    pub derivative_cutoff: f32,
}

impl FilterTuning {
    /// Openness favors stability: the scale of the whole field follows
    /// this channel, so jitter reads as flicker.
    pub fn openness() -> Self {
        Self {
            min_cutoff: 1.0,
            beta: 0.3,
            derivative_cutoff: 1.0,
        }
    }

    /// Pinch favors responsiveness: a late pinch edge feels broken.
    pub fn pinch() -> Self {
        Self {
            min_cutoff: 1.8,
            beta: 0.9,
            derivative_cutoff: 1.0,
        }
    }
}

/// Gesture classification thresholds.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GestureThresholds {
    /// `is_pinching` flips on above this filtered pinch value.
    pub pinch_on: f32,
    /// Thumb–index distance over the wrist→index-MCP reference maps from
    /// this range down to pinch [1, 0].
    pub pinch_near: f32,
    pub pinch_far: f32,

    pub thumbs_up_thumb_max: f32,
    pub thumbs_up_fingers_min: f32,
    pub peace_thumb_min: f32,
    pub peace_straight_max: f32,
    pub peace_folded_min: f32,
    pub fist_thumb_min: f32,
    pub fist_fingers_min: f32,
    pub open_index_middle_max: f32,
    pub open_ring_pinky_max: f32,

    pub thumbs_up_confidence: f32,
    pub peace_confidence: f32,
    pub fist_confidence: f32,
    pub open_confidence: f32,

    /// Frame-to-frame delta of the palm distance is scaled by this to
    /// produce the signed two-hand spread.
    pub spread_gain: f32,
    /// Per-tick blend toward neutral while no hand is tracked.
    pub relax_rate: f32,
}

impl GestureThresholds {
    /// Where openness settles with no hand in view.
    pub const NEUTRAL_OPENNESS: f32 = 0.5;

    /// Openness weights for index/middle/ring/pinky. The thumb is left
    /// out: its curl says little about how open the hand is.
    pub const OPENNESS_WEIGHTS: [f32; 4] = [0.35, 0.30, 0.20, 0.15];
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            pinch_on: 0.7,
            pinch_near: 0.1,
            pinch_far: 0.8,
            thumbs_up_thumb_max: 0.4,
            thumbs_up_fingers_min: 0.7,
            peace_thumb_min: 0.5,
            peace_straight_max: 0.3,
            peace_folded_min: 0.6,
            fist_thumb_min: 0.5,
            fist_fingers_min: 0.7,
            open_index_middle_max: 0.3,
            open_ring_pinky_max: 0.4,
            thumbs_up_confidence: 0.9,
            peace_confidence: 0.9,
            fist_confidence: 0.85,
            open_confidence: 0.8,
            spread_gain: 10.0,
            relax_rate: 0.1,
        }
    }
}

/// Particle simulation coefficients.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SimulationTuning {
    /// Velocity multiplier per tick. Must stay below 1.0 or the
    /// accumulated forces diverge.
    pub damping: f32,
    /// Pull toward the scaled pattern target, in (0, 1).
    pub morph_force: f32,
    /// Radial force multiplier applied to the smoothed explosion scalar.
    pub explosion_multiplier: f32,
    /// Field scale at openness 0 and openness 1.
    pub scale_min: f32,
    pub scale_max: f32,
    /// Per-tick blend of each smoothed scalar toward its target.
    pub scalar_smoothing: f32,
    /// Hand speed → turbulence conversion.
    pub turbulence_gain: f32,
    pub turbulence_max: f32,
    /// Implosion strength while pinching.
    pub pinch_implosion: f32,
    /// Audio displacement multiplier.
    pub audio_gain: f32,
    /// Idle floating amplitude and angular speed.
    pub idle_amplitude: f32,
    pub idle_speed: f32,
    /// Frame-rate target for the level-of-detail controller.
    pub target_fps: f32,
    pub lod_min: f32,
}

impl Default for SimulationTuning {
    fn default() -> Self {
        Self {
            damping: 0.95,
            morph_force: 0.05,
            explosion_multiplier: 5.0,
            scale_min: 0.3,
            scale_max: 1.7,
            scalar_smoothing: 0.1,
            turbulence_gain: 0.02,
            turbulence_max: 0.05,
            pinch_implosion: 0.03,
            audio_gain: 2.0,
            idle_amplitude: 0.02,
            idle_speed: 1.5,
            target_fps: 60.0,
            lod_min: 0.25,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openness_weights_sum_to_one() {
        let sum: f32 = GestureThresholds::OPENNESS_WEIGHTS.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn default_damping_is_contractive() {
        let tuning = SimulationTuning::default();
        assert!(tuning.damping < 1.0);
        assert!(tuning.morph_force > 0.0 && tuning.morph_force < 1.0);
    }
}
