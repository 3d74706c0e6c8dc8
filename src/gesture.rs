//! Per-frame gesture classification over raw hand landmarks.
//!
//! Converts a noisy 21-point landmark stream into filtered continuous
//! channels (openness, pinch, rotation, palm velocity), two-hand
//! metrics, and a priority-ordered discrete gesture label with
//! edge-triggered events.

use crossbeam_channel::Receiver;

use crate::{
    config::{FilterTuning, GestureThresholds},
    events::{EventBus, GestureEvent},
    filter::OneEuroFilter,
    types::{
        FingerCurls, FrameSample, GestureKind, GestureSnapshot, LandmarkFrame, angle_between, joint,
        sub,
    },
    velocity::VelocityTracker,
};

pub struct GestureClassifier {
    thresholds: GestureThresholds,
    openness_filter: OneEuroFilter,
    pinch_filter: OneEuroFilter,
    palm_tracker: VelocityTracker,
    bus: EventBus,

    openness: f32,
    pinch: f32,
    is_pinching: bool,
    hand_detected: bool,
    two_hands_detected: bool,
    hand_distance: f32,
    gesture: GestureKind,
}

impl GestureClassifier {
    pub fn new(thresholds: GestureThresholds) -> Self {
        Self {
            thresholds,
            openness_filter: OneEuroFilter::new(FilterTuning::openness()),
            pinch_filter: OneEuroFilter::new(FilterTuning::pinch()),
            palm_tracker: VelocityTracker::new(),
            bus: EventBus::new(),
            openness: GestureThresholds::NEUTRAL_OPENNESS,
            pinch: 0.0,
            is_pinching: false,
            hand_detected: false,
            two_hands_detected: false,
            hand_distance: 0.0,
            gesture: GestureKind::None,
        }
    }

    /// Register a consumer for edge-triggered events.
    pub fn subscribe(&mut self) -> Receiver<GestureEvent> {
        self.bus.subscribe()
    }

    /// Process one camera tick. Malformed frames count as absent hands;
    /// this never fails.
    pub fn process(&mut self, sample: &FrameSample) -> GestureSnapshot {
        let hands: Vec<&LandmarkFrame> =
            sample.hands.iter().filter(|h| h.is_valid()).collect();

        match hands.first() {
            Some(primary) => {
                self.process_hand(primary, hands.get(1).copied(), sample.timestamp_ms)
            }
            None => self.process_no_hand(sample.timestamp_ms),
        }
    }

    fn process_hand(
        &mut self,
        hand: &LandmarkFrame,
        second: Option<&LandmarkFrame>,
        t_ms: f64,
    ) -> GestureSnapshot {
        if !self.hand_detected {
            self.hand_detected = true;
            self.bus.publish(GestureEvent::HandDetected);
        }

        let points = &hand.points;
        let curls = finger_curls(points);

        let raw_openness = openness_from_curls(&curls);
        self.openness = self
            .openness_filter
            .filter(raw_openness, t_ms)
            .clamp(0.0, 1.0);

        let raw_pinch = pinch_strength(points, &self.thresholds);
        self.pinch = self.pinch_filter.filter(raw_pinch, t_ms).clamp(0.0, 1.0);
        self.update_pinch_edge();

        let rotation = hand_roll(points);

        let palm = palm_center(points);
        self.palm_tracker.update(palm, t_ms);
        let velocity = self.palm_tracker.velocity();

        let (gesture, confidence) = classify_gesture(&curls, self.is_pinching, self.pinch, &self.thresholds);
        if gesture != self.gesture && gesture != GestureKind::None {
            self.bus.publish(GestureEvent::GestureChanged {
                gesture,
                confidence,
            });
        }
        self.gesture = gesture;

        let (two_hands, hand_distance, hand_spread, two_hand_rotation) =
            self.update_two_hand_state(palm, second);

        GestureSnapshot {
            openness: self.openness,
            pinch: self.pinch,
            is_pinching: self.is_pinching,
            finger_curls: curls,
            rotation,
            velocity,
            is_hand_detected: true,
            landmarks: Some(points.clone()),
            two_hands_detected: two_hands,
            hand_distance,
            hand_spread,
            two_hand_rotation,
            gesture,
            gesture_confidence: confidence,
            timestamp_ms: t_ms,
        }
    }

    /// A tick with no usable hand. The filtered channels relax toward
    /// neutral instead of freezing, so the field settles rather than
    /// jump-cuts; filters and trackers reset so the next detection
    /// re-seeds from fresh data.
    fn process_no_hand(&mut self, t_ms: f64) -> GestureSnapshot {
        if self.hand_detected {
            self.hand_detected = false;
            self.bus.publish(GestureEvent::HandLost);
            self.openness_filter.reset();
            self.pinch_filter.reset();
            self.palm_tracker.reset();
        }
        self.drop_second_hand();

        let relax = self.thresholds.relax_rate;
        self.openness += (GestureThresholds::NEUTRAL_OPENNESS - self.openness) * relax;
        self.pinch += (0.0 - self.pinch) * relax;
        self.update_pinch_edge();
        self.gesture = GestureKind::None;

        GestureSnapshot {
            openness: self.openness,
            pinch: self.pinch,
            ..GestureSnapshot::neutral(t_ms)
        }
    }

    fn update_pinch_edge(&mut self) {
        let now_pinching = self.pinch > self.thresholds.pinch_on;
        if now_pinching && !self.is_pinching {
            self.bus.publish(GestureEvent::PinchStarted);
        } else if !now_pinching && self.is_pinching {
            self.bus.publish(GestureEvent::PinchEnded);
        }
        self.is_pinching = now_pinching;
    }

    fn update_two_hand_state(
        &mut self,
        primary_palm: [f32; 3],
        second: Option<&LandmarkFrame>,
    ) -> (bool, f32, f32, f32) {
        let Some(second) = second else {
            self.drop_second_hand();
            return (false, 0.0, 0.0, 0.0);
        };

        let other_palm = palm_center(&second.points);
        let delta = sub(other_palm, primary_palm);
        let distance = (crate::types::length3(delta) * 2.0).clamp(0.0, 1.0);

        let spread = if self.two_hands_detected {
            (distance - self.hand_distance) * self.thresholds.spread_gain
        } else {
            self.two_hands_detected = true;
            self.bus.publish(GestureEvent::TwoHandsDetected);
            0.0
        };
        self.hand_distance = distance;

        let rotation = delta[1].atan2(delta[0]);
        (true, distance, spread, rotation)
    }

    fn drop_second_hand(&mut self) {
        if self.two_hands_detected {
            self.two_hands_detected = false;
            self.hand_distance = 0.0;
            self.bus.publish(GestureEvent::TwoHandsLost);
        }
    }
}

/// Curl per finger from the angles between consecutive joint-to-joint
/// direction vectors: colinear segments read 0, a fully folded chain
/// reads 1. Purely angular, so invariant to scale and translation.
pub fn finger_curls(points: &[[f32; 3]]) -> FingerCurls {
    let mut curls = [0.0_f32; 5];
    for (slot, chain) in curls.iter_mut().zip(joint::FINGER_CHAINS) {
        let v1 = sub(points[chain[1]], points[chain[0]]);
        let v2 = sub(points[chain[2]], points[chain[1]]);
        let v3 = sub(points[chain[3]], points[chain[2]]);
        let mean_angle = (angle_between(v1, v2) + angle_between(v2, v3)) / 2.0;
        *slot = (mean_angle / std::f32::consts::PI).clamp(0.0, 1.0);
    }
    FingerCurls {
        thumb: curls[0],
        index: curls[1],
        middle: curls[2],
        ring: curls[3],
        pinky: curls[4],
    }
}

fn openness_from_curls(curls: &FingerCurls) -> f32 {
    let [wi, wm, wr, wp] = GestureThresholds::OPENNESS_WEIGHTS;
    let sum = wi * (1.0 - curls.index)
        + wm * (1.0 - curls.middle)
        + wr * (1.0 - curls.ring)
        + wp * (1.0 - curls.pinky);
    sum.clamp(0.0, 1.0)
}

/// Thumb-tip to index-tip proximity normalized by the wrist→index-MCP
/// span, mapped inversely so closer reads higher. A degenerate reference
/// span reads as no pinch.
fn pinch_strength(points: &[[f32; 3]], thresholds: &GestureThresholds) -> f32 {
    let reference = crate::types::distance3(points[joint::INDEX_MCP], points[joint::WRIST]);
    if reference < 1e-5 {
        return 0.0;
    }
    let gap = crate::types::distance3(points[joint::THUMB_TIP], points[joint::INDEX_TIP]);
    let normalized = gap / reference;
    let span = thresholds.pinch_far - thresholds.pinch_near;
    ((thresholds.pinch_far - normalized) / span).clamp(0.0, 1.0)
}

/// Roll estimate from the knuckle line: atan2 of index-MCP → pinky-MCP.
/// A 2D approximation, not a full orientation.
fn hand_roll(points: &[[f32; 3]]) -> f32 {
    let index = points[joint::INDEX_MCP];
    let pinky = points[joint::PINKY_MCP];
    (pinky[1] - index[1]).atan2(pinky[0] - index[0])
}

fn palm_center(points: &[[f32; 3]]) -> [f32; 3] {
    let mcps = [
        points[joint::INDEX_MCP],
        points[joint::MIDDLE_MCP],
        points[joint::RING_MCP],
        points[joint::PINKY_MCP],
    ];
    let mut center = [0.0_f32; 3];
    for p in mcps {
        center[0] += p[0];
        center[1] += p[1];
        center[2] += p[2];
    }
    center.map(|c| c / 4.0)
}

/// First match wins: pinch > thumbs-up > peace > fist > open > none.
fn classify_gesture(
    curls: &FingerCurls,
    is_pinching: bool,
    pinch: f32,
    t: &GestureThresholds,
) -> (GestureKind, f32) {
    if is_pinching {
        return (GestureKind::Pinch, pinch);
    }

    let fingers = [curls.index, curls.middle, curls.ring, curls.pinky];

    let thumbs_up = curls.thumb < t.thumbs_up_thumb_max
        && fingers.iter().all(|&c| c > t.thumbs_up_fingers_min);
    if thumbs_up {
        return (GestureKind::ThumbsUp, t.thumbs_up_confidence);
    }

    let peace = curls.thumb > t.peace_thumb_min
        && curls.index < t.peace_straight_max
        && curls.middle < t.peace_straight_max
        && curls.ring > t.peace_folded_min
        && curls.pinky > t.peace_folded_min;
    if peace {
        return (GestureKind::Peace, t.peace_confidence);
    }

    let fist =
        curls.thumb > t.fist_thumb_min && fingers.iter().all(|&c| c > t.fist_fingers_min);
    if fist {
        return (GestureKind::Fist, t.fist_confidence);
    }

    let open = curls.index < t.open_index_middle_max
        && curls.middle < t.open_index_middle_max
        && curls.ring < t.open_ring_pinky_max
        && curls.pinky < t.open_ring_pinky_max;
    if open {
        return (GestureKind::Open, t.open_confidence);
    }

    (GestureKind::None, 0.0)
}
