//! Windowed velocity estimation over a jittery position stream.
//!
//! A short history window trades a little lag for far less sensitivity
//! to single-frame detection noise than a frame-to-frame derivative.

use std::collections::VecDeque;

use crate::types::VelocityVector;

pub const DEFAULT_WINDOW: usize = 6;

pub struct VelocityTracker {
    history: VecDeque<([f32; 3], f64)>,
    window: usize,
}

impl VelocityTracker {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }

    pub fn with_window(window: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(window + 1),
            window: window.max(2),
        }
    }

    pub fn update(&mut self, position: [f32; 3], timestamp_ms: f64) {
        self.history.push_back((position, timestamp_ms));
        while self.history.len() > self.window {
            self.history.pop_front();
        }
    }

    /// Velocity in units per second across the retained window. Zero when
    /// fewer than two samples exist or elapsed time is not positive.
    pub fn velocity(&self) -> VelocityVector {
        let (Some(&(oldest, t0)), Some(&(newest, t1))) =
            (self.history.front(), self.history.back())
        else {
            return VelocityVector::ZERO;
        };
        if self.history.len() < 2 {
            return VelocityVector::ZERO;
        }

        let elapsed_s = ((t1 - t0) / 1_000.0) as f32;
        if elapsed_s <= 0.0 {
            return VelocityVector::ZERO;
        }

        let x = (newest[0] - oldest[0]) / elapsed_s;
        let y = (newest[1] - oldest[1]) / elapsed_s;
        let z = (newest[2] - oldest[2]) / elapsed_s;
        VelocityVector {
            x,
            y,
            z,
            magnitude: (x * x + y * y + z * z).sqrt(),
        }
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

impl Default for VelocityTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_single_sample_report_zero() {
        let mut tracker = VelocityTracker::new();
        assert_eq!(tracker.velocity(), VelocityVector::ZERO);
        tracker.update([0.1, 0.2, 0.3], 100.0);
        assert_eq!(tracker.velocity(), VelocityVector::ZERO);
    }

    #[test]
    fn two_samples_give_exact_finite_difference() {
        let mut tracker = VelocityTracker::new();
        tracker.update([0.0, 0.0, 0.0], 1_000.0);
        tracker.update([0.3, -0.1, 0.2], 1_500.0);
        let v = tracker.velocity();
        assert!((v.x - 0.6).abs() < 1e-6);
        assert!((v.y + 0.2).abs() < 1e-6);
        assert!((v.z - 0.4).abs() < 1e-6);
        let expected_mag = (0.6_f32 * 0.6 + 0.2 * 0.2 + 0.4 * 0.4).sqrt();
        assert!((v.magnitude - expected_mag).abs() < 1e-6);
    }

    #[test]
    fn zero_elapsed_time_reports_zero() {
        let mut tracker = VelocityTracker::new();
        tracker.update([0.0, 0.0, 0.0], 1_000.0);
        tracker.update([1.0, 1.0, 1.0], 1_000.0);
        assert_eq!(tracker.velocity(), VelocityVector::ZERO);
    }

    #[test]
    fn window_keeps_only_recent_samples() {
        let mut tracker = VelocityTracker::with_window(3);
        for i in 0..10 {
            tracker.update([i as f32, 0.0, 0.0], i as f64 * 100.0);
        }
        // Window holds samples 7..=9: delta 2.0 over 0.2 s.
        let v = tracker.velocity();
        assert!((v.x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn reset_clears_history() {
        let mut tracker = VelocityTracker::new();
        tracker.update([0.0, 0.0, 0.0], 0.0);
        tracker.update([1.0, 0.0, 0.0], 100.0);
        tracker.reset();
        assert_eq!(tracker.velocity(), VelocityVector::ZERO);
    }
}
