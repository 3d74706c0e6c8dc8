//! A scripted landmark source for demos and tests.
//!
//! Real deployments plug a camera-backed tracker into `LandmarkSource`;
//! this module supplies the same stream from synthetic hand geometry so
//! the full pipeline runs headless. The `poses` module doubles as the
//! ground-truth fixture set for the classifier tests.

use std::{thread, time::Duration};

use rand::Rng;

use crate::{
    pipeline::LandmarkSource,
    types::{FrameSample, LandmarkFrame},
};

/// Synthetic hand geometry with known classifier readings.
///
/// Each hand is built from a wrist anchor, four finger chains bent in
/// the y-z plane, and a thumb chain bent in the x-y plane. Bending a
/// chain by `b` degrees per segment makes every consecutive segment
/// pair meet at exactly `b`, so the resulting curl is `b / 180`.
pub mod poses {
    use crate::types::{LandmarkFrame, joint};

    const SEGMENTS: [f32; 3] = [0.07, 0.05, 0.04];
    const FINGER_X_OFFSETS: [f32; 4] = [-0.06, -0.02, 0.02, 0.06];
    const FINGER_MCP_DROP: f32 = 0.25;
    const THUMB_CMC_OFFSET: [f32; 2] = [-0.08, -0.04];
    const FRAC_1_SQRT_2: f32 = std::f32::consts::FRAC_1_SQRT_2;

    /// All fingers extended. Reads as fully open.
    pub fn open_hand() -> LandmarkFrame {
        open_hand_at([0.0, 0.0])
    }

    /// Open hand translated by `offset` in the image plane. Useful for
    /// two-hand scenes and palm-motion scripts.
    pub fn open_hand_at(offset: [f32; 2]) -> LandmarkFrame {
        hand(offset, 0.0, [0.0; 4])
    }

    /// All four fingers folded hard, thumb wrapped over them.
    pub fn fist() -> LandmarkFrame {
        hand([0.0, 0.0], 120.0, [170.0; 4])
    }

    /// Fingers folded, thumb extended straight.
    pub fn thumbs_up() -> LandmarkFrame {
        hand([0.0, 0.0], 0.0, [150.0; 4])
    }

    /// Index and middle extended, ring and pinky folded, thumb tucked.
    pub fn peace() -> LandmarkFrame {
        hand([0.0, 0.0], 100.0, [0.0, 0.0, 140.0, 140.0])
    }

    /// Thumb tip touching the index tip, other fingers half bent.
    pub fn pinch() -> LandmarkFrame {
        let mut frame = hand([0.0, 0.0], 0.0, [60.0; 4]);
        let index_tip = frame.points[joint::INDEX_TIP];
        let target = [index_tip[0] + 0.005, index_tip[1], index_tip[2]];
        // Re-lay the thumb as a straight chain ending at the index tip.
        let chain = joint::FINGER_CHAINS[0];
        let base = frame.points[chain[0]];
        for (step, &idx) in chain.iter().enumerate().skip(1) {
            let t = step as f32 / 3.0;
            frame.points[idx] = [
                base[0] + (target[0] - base[0]) * t,
                base[1] + (target[1] - base[1]) * t,
                base[2] + (target[2] - base[2]) * t,
            ];
        }
        frame
    }

    fn hand(
        offset: [f32; 2],
        thumb_bend_deg: f32,
        finger_bends_deg: [f32; 4],
    ) -> LandmarkFrame {
        let wrist = [0.5 + offset[0], 0.85 + offset[1], 0.0];
        let mut points = vec![[0.0_f32; 3]; crate::types::LANDMARK_COUNT];
        points[joint::WRIST] = wrist;

        let thumb_base = [
            wrist[0] + THUMB_CMC_OFFSET[0],
            wrist[1] + THUMB_CMC_OFFSET[1],
            0.0,
        ];
        lay_thumb(&mut points, thumb_base, thumb_bend_deg.to_radians());

        for (f, &bend) in finger_bends_deg.iter().enumerate() {
            let mcp = [
                wrist[0] + FINGER_X_OFFSETS[f],
                wrist[1] - FINGER_MCP_DROP,
                0.0,
            ];
            lay_finger(&mut points, joint::FINGER_CHAINS[f + 1], mcp, bend.to_radians());
        }

        LandmarkFrame::new(points)
    }

    /// Finger segments start pointing toward -y and rotate into +z by
    /// `bend` per segment.
    fn lay_finger(points: &mut [[f32; 3]], chain: [usize; 4], mcp: [f32; 3], bend: f32) {
        points[chain[0]] = mcp;
        let mut cursor = mcp;
        for (k, len) in SEGMENTS.iter().enumerate() {
            let angle = bend * k as f32;
            let dir = [0.0, -angle.cos(), angle.sin()];
            cursor = [
                cursor[0] + dir[0] * len,
                cursor[1] + dir[1] * len,
                cursor[2] + dir[2] * len,
            ];
            points[chain[k + 1]] = cursor;
        }
    }

    /// The thumb points down-left across the palm and bends in the
    /// image plane.
    fn lay_thumb(points: &mut [[f32; 3]], base: [f32; 3], bend: f32) {
        let chain = joint::FINGER_CHAINS[0];
        points[chain[0]] = base;
        let base_angle = (-FRAC_1_SQRT_2).atan2(-FRAC_1_SQRT_2);
        let mut cursor = base;
        for (k, len) in SEGMENTS.iter().enumerate() {
            let angle = base_angle + bend * k as f32;
            let dir = [angle.cos(), angle.sin(), 0.0];
            cursor = [
                cursor[0] + dir[0] * len,
                cursor[1] + dir[1] * len,
                cursor[2] + dir[2] * len,
            ];
            points[chain[k + 1]] = cursor;
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Scene {
    Absent,
    Open,
    Fist,
    Pinch,
    Peace,
    ThumbsUp,
    TwoHands,
}

const SCRIPT: [(Scene, u32); 8] = [
    (Scene::Absent, 15),
    (Scene::Open, 60),
    (Scene::Fist, 45),
    (Scene::Open, 30),
    (Scene::Pinch, 45),
    (Scene::Peace, 45),
    (Scene::ThumbsUp, 45),
    (Scene::TwoHands, 60),
];

/// Plays a fixed gesture script at camera cadence, with a little
/// positional noise so the filters have something to do.
pub struct SyntheticSource {
    frame_interval_ms: f64,
    loops: u32,
    tick: u32,
    t_ms: f64,
}

impl SyntheticSource {
    pub fn new(loops: u32) -> Self {
        Self {
            frame_interval_ms: 33.0,
            loops,
            tick: 0,
            t_ms: 0.0,
        }
    }

    fn script_len() -> u32 {
        SCRIPT.iter().map(|(_, frames)| frames).sum()
    }

    fn scene_at(tick: u32) -> Scene {
        let mut cursor = tick % Self::script_len();
        for (scene, frames) in SCRIPT {
            if cursor < frames {
                return scene;
            }
            cursor -= frames;
        }
        Scene::Absent
    }

    fn hands_for(&self, scene: Scene) -> Vec<LandmarkFrame> {
        let mut rng = rand::thread_rng();
        let wobble = [rng.gen_range(-0.004..0.004), rng.gen_range(-0.004..0.004)];
        match scene {
            Scene::Absent => Vec::new(),
            Scene::Open => vec![poses::open_hand_at(wobble)],
            Scene::Fist => vec![jittered(poses::fist(), wobble)],
            Scene::Pinch => vec![jittered(poses::pinch(), wobble)],
            Scene::Peace => vec![jittered(poses::peace(), wobble)],
            Scene::ThumbsUp => vec![jittered(poses::thumbs_up(), wobble)],
            Scene::TwoHands => {
                // Palms drift apart and back so spread oscillates.
                let phase = (self.t_ms / 1000.0).sin() as f32 * 0.05;
                vec![
                    poses::open_hand_at([-0.15 - phase, 0.0]),
                    poses::open_hand_at([0.15 + phase, 0.0]),
                ]
            }
        }
    }
}

fn jittered(mut frame: LandmarkFrame, offset: [f32; 2]) -> LandmarkFrame {
    for p in &mut frame.points {
        p[0] += offset[0];
        p[1] += offset[1];
    }
    frame
}

impl LandmarkSource for SyntheticSource {
    fn next_sample(&mut self) -> anyhow::Result<Option<FrameSample>> {
        if self.tick >= Self::script_len() * self.loops {
            return Ok(None);
        }

        thread::sleep(Duration::from_millis(self.frame_interval_ms as u64));
        self.t_ms += self.frame_interval_ms;
        let scene = Self::scene_at(self.tick);
        self.tick += 1;

        Ok(Some(FrameSample {
            hands: self.hands_for(scene),
            timestamp_ms: self.t_ms,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LANDMARK_COUNT;

    #[test]
    fn every_pose_is_a_valid_frame() {
        for frame in [
            poses::open_hand(),
            poses::fist(),
            poses::thumbs_up(),
            poses::peace(),
            poses::pinch(),
        ] {
            assert!(frame.is_valid());
            assert_eq!(frame.points.len(), LANDMARK_COUNT);
        }
    }

    #[test]
    fn script_ends_after_requested_loops() {
        let mut source = SyntheticSource::new(1);
        source.frame_interval_ms = 0.0;
        let mut frames = 0;
        while let Some(_sample) = source.next_sample().unwrap() {
            frames += 1;
        }
        assert_eq!(frames, SyntheticSource::script_len());
    }

    #[test]
    fn script_covers_empty_one_hand_and_two_hand_scenes() {
        let mut source = SyntheticSource::new(1);
        source.frame_interval_ms = 0.0;
        let mut empty = 0;
        let mut single = 0;
        let mut double = 0;
        while let Some(sample) = source.next_sample().unwrap() {
            match sample.hands.len() {
                0 => empty += 1,
                1 => single += 1,
                _ => double += 1,
            }
        }
        assert!(empty > 0);
        assert!(single > 0);
        assert!(double > 0);
    }
}
