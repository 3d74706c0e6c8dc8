//! Adaptive low-pass filtering for noisy gesture channels.
//!
//! One Euro filter: heavy smoothing while the signal is slow (kills
//! jitter), light smoothing while it moves fast (keeps latency low).

use std::f32::consts::TAU;

use crate::config::FilterTuning;

pub struct OneEuroFilter {
    tuning: FilterTuning,
    x_prev: f32,
    dx_prev: f32,
    t_prev_ms: f64,
    initialized: bool,
}

impl OneEuroFilter {
    pub fn new(tuning: FilterTuning) -> Self {
        Self {
            tuning,
            x_prev: 0.0,
            dx_prev: 0.0,
            t_prev_ms: 0.0,
            initialized: false,
        }
    }

    fn smoothing_factor(dt: f32, cutoff: f32) -> f32 {
        let tau = 1.0 / (TAU * cutoff);
        1.0 / (1.0 + tau / dt)
    }

    /// Filter one sample. The first call seeds the state and returns the
    /// raw value; a non-monotonic or duplicate timestamp returns the
    /// previous output unchanged.
    pub fn filter(&mut self, x: f32, timestamp_ms: f64) -> f32 {
        if !self.initialized {
            self.x_prev = x;
            self.t_prev_ms = timestamp_ms;
            self.initialized = true;
            return x;
        }

        let dt = ((timestamp_ms - self.t_prev_ms) / 1_000.0) as f32;
        if dt <= 0.0 {
            return self.x_prev;
        }

        let a_d = Self::smoothing_factor(dt, self.tuning.derivative_cutoff);
        let dx = (x - self.x_prev) / dt;
        let dx_hat = a_d * dx + (1.0 - a_d) * self.dx_prev;

        let cutoff = self.tuning.min_cutoff + self.tuning.beta * dx_hat.abs();
        let a = Self::smoothing_factor(dt, cutoff);
        let x_hat = a * x + (1.0 - a) * self.x_prev;

        self.x_prev = x_hat;
        self.dx_prev = dx_hat;
        self.t_prev_ms = timestamp_ms;

        x_hat
    }

    /// Clear all state; the next `filter` call re-seeds.
    pub fn reset(&mut self) {
        self.initialized = false;
        self.x_prev = 0.0;
        self.dx_prev = 0.0;
        self.t_prev_ms = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> OneEuroFilter {
        OneEuroFilter::new(FilterTuning::openness())
    }

    #[test]
    fn first_call_returns_raw_value() {
        let mut f = filter();
        assert_eq!(f.filter(0.37, 0.0), 0.37);
    }

    #[test]
    fn non_monotonic_timestamp_returns_previous() {
        let mut f = filter();
        f.filter(0.5, 100.0);
        let second = f.filter(0.8, 133.0);
        assert_eq!(f.filter(0.2, 133.0), second);
        assert_eq!(f.filter(0.2, 50.0), second);
    }

    #[test]
    fn converges_to_constant_input() {
        let mut f = filter();
        f.filter(0.0, 0.0);
        let mut prev_err = 1.0_f32;
        let mut t = 0.0;
        for _ in 0..200 {
            t += 16.0;
            let out = f.filter(1.0, t);
            let err = (1.0 - out).abs();
            assert!(err <= prev_err + 1e-6, "distance to target grew: {err} > {prev_err}");
            prev_err = err;
        }
        assert!(prev_err < 1e-3, "filter did not converge: err {prev_err}");
    }

    #[test]
    fn fast_motion_tracks_closer_than_slow_tuning() {
        let mut stable = OneEuroFilter::new(FilterTuning::openness());
        let mut responsive = OneEuroFilter::new(FilterTuning::pinch());
        stable.filter(0.0, 0.0);
        responsive.filter(0.0, 0.0);
        // One large step; the responsive tuning should land nearer the
        // new value on the same tick.
        let s = stable.filter(1.0, 16.0);
        let r = responsive.filter(1.0, 16.0);
        assert!(r >= s);
    }

    #[test]
    fn reset_reseeds_on_next_sample() {
        let mut f = filter();
        f.filter(0.9, 0.0);
        f.filter(0.9, 16.0);
        f.reset();
        assert_eq!(f.filter(0.1, 32.0), 0.1);
    }
}
