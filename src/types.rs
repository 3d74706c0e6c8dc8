use crate::config::GestureThresholds;

/// Anatomical landmark indices for a 21-point hand frame.
pub mod joint {
    pub const WRIST: usize = 0;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const RING_MCP: usize = 13;
    pub const PINKY_MCP: usize = 17;

    /// Joint chains per finger, thumb first (CMC→MCP→IP→TIP, then
    /// MCP→PIP→DIP→TIP for the four fingers).
    pub const FINGER_CHAINS: [[usize; 4]; 5] = [
        [1, 2, 3, 4],
        [5, 6, 7, 8],
        [9, 10, 11, 12],
        [13, 14, 15, 16],
        [17, 18, 19, 20],
    ];
}

pub const LANDMARK_COUNT: usize = 21;

/// One tracked hand for one camera frame: 21 normalized 3D points
/// (x, y in [0, 1], z relative depth). The capture timestamp lives on
/// the enclosing `FrameSample`, never per hand.
#[derive(Clone, Debug)]
pub struct LandmarkFrame {
    pub points: Vec<[f32; 3]>,
}

impl LandmarkFrame {
    pub fn new(points: Vec<[f32; 3]>) -> Self {
        Self { points }
    }

    /// A frame is usable only with a full, finite landmark set. Anything
    /// else reads as "no hand" upstream.
    pub fn is_valid(&self) -> bool {
        self.points.len() >= LANDMARK_COUNT
            && self.points.iter().all(|p| p.iter().all(|c| c.is_finite()))
    }
}

/// Zero, one, or two hands delivered for a single camera frame.
/// `timestamp_ms` is the one clock for the sample; every filter and
/// tracker downstream runs on it.
#[derive(Clone, Debug, Default)]
pub struct FrameSample {
    pub hands: Vec<LandmarkFrame>,
    pub timestamp_ms: f64,
}

/// Per-finger bend in [0, 1]: 0 straight, 1 fully folded.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FingerCurls {
    pub thumb: f32,
    pub index: f32,
    pub middle: f32,
    pub ring: f32,
    pub pinky: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureKind {
    None,
    ThumbsUp,
    Peace,
    Fist,
    Open,
    Pinch,
}

impl GestureKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            GestureKind::None => "none",
            GestureKind::ThumbsUp => "thumbs up",
            GestureKind::Peace => "peace",
            GestureKind::Fist => "fist",
            GestureKind::Open => "open palm",
            GestureKind::Pinch => "pinch",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VelocityVector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub magnitude: f32,
}

impl VelocityVector {
    pub const ZERO: VelocityVector = VelocityVector {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        magnitude: 0.0,
    };
}

/// Classifier output for one processed frame (or one "no hand" tick).
/// Consumed immediately by the simulation and the presentation shell.
#[derive(Clone, Debug)]
pub struct GestureSnapshot {
    pub openness: f32,
    pub pinch: f32,
    pub is_pinching: bool,
    pub finger_curls: FingerCurls,
    pub rotation: f32,
    pub velocity: VelocityVector,
    pub is_hand_detected: bool,
    pub landmarks: Option<Vec<[f32; 3]>>,
    pub two_hands_detected: bool,
    pub hand_distance: f32,
    pub hand_spread: f32,
    pub two_hand_rotation: f32,
    pub gesture: GestureKind,
    pub gesture_confidence: f32,
    pub timestamp_ms: f64,
}

impl GestureSnapshot {
    /// The resting state the simulation relaxes into while no hand is
    /// tracked.
    pub fn neutral(timestamp_ms: f64) -> Self {
        Self {
            openness: GestureThresholds::NEUTRAL_OPENNESS,
            pinch: 0.0,
            is_pinching: false,
            finger_curls: FingerCurls::default(),
            rotation: 0.0,
            velocity: VelocityVector::ZERO,
            is_hand_detected: false,
            landmarks: None,
            two_hands_detected: false,
            hand_distance: 0.0,
            hand_spread: 0.0,
            two_hand_rotation: 0.0,
            gesture: GestureKind::None,
            gesture_confidence: 0.0,
            timestamp_ms,
        }
    }
}

pub fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn distance3(a: [f32; 3], b: [f32; 3]) -> f32 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
}

pub fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn length3(v: [f32; 3]) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

pub fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = length3(v);
    if len < 1e-5 {
        [0.0, 0.0, 0.0]
    } else {
        [v[0] / len, v[1] / len, v[2] / len]
    }
}

/// Angle in radians between two direction vectors. Zero-length input is
/// reported as a full fold (pi) so pathological poses read as maximal
/// curl instead of failing.
pub fn angle_between(a: [f32; 3], b: [f32; 3]) -> f32 {
    let la = length3(a);
    let lb = length3(b);
    if la < 1e-5 || lb < 1e-5 {
        return std::f32::consts::PI;
    }
    (dot(a, b) / (la * lb)).clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_between_colinear_is_zero() {
        assert!(angle_between([0.0, 1.0, 0.0], [0.0, 2.0, 0.0]) < 1e-4);
    }

    #[test]
    fn angle_between_opposed_is_pi() {
        let angle = angle_between([1.0, 0.0, 0.0], [-3.0, 0.0, 0.0]);
        assert!((angle - std::f32::consts::PI).abs() < 1e-4);
    }

    #[test]
    fn angle_between_degenerate_reads_as_full_fold() {
        let angle = angle_between([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        assert!((angle - std::f32::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn short_frame_is_invalid() {
        let frame = LandmarkFrame::new(vec![[0.5, 0.5, 0.0]; 10]);
        assert!(!frame.is_valid());
    }

    #[test]
    fn non_finite_frame_is_invalid() {
        let mut points = vec![[0.5, 0.5, 0.0]; LANDMARK_COUNT];
        points[3][1] = f32::NAN;
        let frame = LandmarkFrame::new(points);
        assert!(!frame.is_valid());
    }
}
