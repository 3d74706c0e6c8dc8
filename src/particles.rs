//! Per-particle force integration driving the visible field.
//!
//! Every tick blends a morph pull toward the active pattern, a radial
//! explosion/implosion term, per-axis turbulence, and optional audio
//! displacement into a damped Euler step. Gesture signals arrive as
//! smoothed scalar targets so an abrupt classifier change never lands as
//! a visual jump-cut.

use std::time::Instant;

use rand::Rng;
use rayon::prelude::*;

use crate::{
    config::SimulationTuning,
    patterns::{self, PatternKind},
    types::GestureSnapshot,
};

/// Pass-through display parameters owned here so the presentation shell
/// has one place to read the full render contract from.
#[derive(Clone, Copy, Debug)]
pub struct RenderSettings {
    pub color: [f32; 3],
    pub particle_size: f32,
    pub glow_intensity: f32,
    pub rotation_speed: f32,
    pub idle_amplitude: f32,
    pub connections: bool,
    pub trails: bool,
    pub bloom: bool,
    pub auto_rotate: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            color: [0.39, 0.78, 1.0],
            particle_size: 2.0,
            glow_intensity: 0.6,
            rotation_speed: 1.0,
            idle_amplitude: 1.0,
            connections: false,
            trails: false,
            bloom: true,
            auto_rotate: true,
        }
    }
}

/// A scalar that chases an externally-set target each tick.
#[derive(Clone, Copy, Debug)]
struct Smoothed {
    current: f32,
    target: f32,
}

impl Smoothed {
    fn new(value: f32) -> Self {
        Self {
            current: value,
            target: value,
        }
    }

    fn set(&mut self, target: f32) {
        self.target = target;
    }

    fn tick(&mut self, blend: f32) {
        self.current += (self.target - self.current) * blend;
    }
}

pub struct ParticleField {
    tuning: SimulationTuning,
    settings: RenderSettings,
    pattern: PatternKind,

    base: Vec<[f32; 3]>,
    positions: Vec<[f32; 3]>,
    velocities: Vec<[f32; 3]>,
    display: Vec<[f32; 3]>,

    scale: Smoothed,
    explosion: Smoothed,
    turbulence: Smoothed,
    rotation: Smoothed,
    morph_speed: f32,

    audio_enabled: bool,
    audio_level: f32,

    time: f32,
    last_tick: Option<Instant>,
    fps: f32,
    lod: f32,
}

impl ParticleField {
    pub fn new(
        tuning: SimulationTuning,
        pattern: PatternKind,
        count: usize,
        rng: &mut impl Rng,
    ) -> Self {
        let count = count.max(1);
        let base = patterns::generate(pattern, count, rng);
        Self {
            tuning,
            settings: RenderSettings::default(),
            pattern,
            positions: base.clone(),
            velocities: vec![[0.0; 3]; count],
            display: base.clone(),
            base,
            scale: Smoothed::new(1.0),
            explosion: Smoothed::new(0.0),
            turbulence: Smoothed::new(0.0),
            rotation: Smoothed::new(0.0),
            morph_speed: 1.0,
            audio_enabled: false,
            audio_level: 0.0,
            time: 0.0,
            last_tick: None,
            fps: 0.0,
            lod: 1.0,
        }
    }

    pub fn particle_count(&self) -> usize {
        self.positions.len()
    }

    pub fn pattern(&self) -> PatternKind {
        self.pattern
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn lod(&self) -> f32 {
        self.lod
    }

    /// Smoothed hand-roll angle in radians, read by the presentation
    /// shell to spin the camera.
    pub fn rotation(&self) -> f32 {
        self.rotation.current
    }

    /// Positions with the idle-float offset applied: the per-tick output
    /// contract for the renderer.
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.display
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Replace the target pattern. Velocities reset; the morph force
    /// alone carries the visual transition over the following ticks.
    pub fn set_pattern(&mut self, pattern: PatternKind, rng: &mut impl Rng) {
        self.pattern = pattern;
        self.base = patterns::generate(pattern, self.positions.len(), rng);
        self.velocities.iter_mut().for_each(|v| *v = [0.0; 3]);
    }

    pub fn set_pattern_name(&mut self, name: &str, rng: &mut impl Rng) {
        self.set_pattern(PatternKind::from_name(name), rng);
    }

    /// Resize the field. All per-particle buffers are recreated at the
    /// new count with zeroed velocities.
    pub fn set_particle_count(&mut self, count: usize, rng: &mut impl Rng) {
        let count = count.max(1);
        self.base = patterns::generate(self.pattern, count, rng);
        self.positions = self.base.clone();
        self.velocities = vec![[0.0; 3]; count];
        self.display = self.base.clone();
    }

    /// Map the latest gesture snapshot onto the smoothed force targets.
    pub fn apply_gesture(&mut self, snapshot: &GestureSnapshot) {
        let t = &self.tuning;
        self.scale
            .set(t.scale_min + snapshot.openness * (t.scale_max - t.scale_min));
        self.explosion.set(if snapshot.is_pinching {
            -snapshot.pinch * t.pinch_implosion
        } else {
            0.0
        });
        self.turbulence.set(
            (snapshot.velocity.magnitude * t.turbulence_gain).clamp(0.0, t.turbulence_max),
        );
        self.rotation.set(snapshot.rotation);
    }

    pub fn set_audio_enabled(&mut self, enabled: bool) {
        self.audio_enabled = enabled;
        if !enabled {
            self.audio_level = 0.0;
        }
    }

    /// Latest analyser amplitude in [0, 1]; polled once per render tick.
    pub fn set_audio_level(&mut self, level: f32) {
        if self.audio_enabled {
            self.audio_level = level.clamp(0.0, 1.0);
        }
    }

    /// Radial burst target: positive pushes the field outward, negative
    /// implodes it. The next gesture snapshot takes the channel back.
    pub fn set_explosion_force(&mut self, target: f32) {
        self.explosion.set(target);
    }

    pub fn set_color(&mut self, color: [f32; 3]) {
        self.settings.color = color;
    }

    pub fn set_particle_size(&mut self, size: f32) {
        self.settings.particle_size = size.max(0.1);
    }

    pub fn set_glow_intensity(&mut self, glow: f32) {
        self.settings.glow_intensity = glow.clamp(0.0, 1.0);
    }

    pub fn set_rotation_speed(&mut self, speed: f32) {
        self.settings.rotation_speed = speed;
    }

    pub fn set_morph_speed(&mut self, speed: f32) {
        self.morph_speed = speed.clamp(0.1, 4.0);
    }

    pub fn set_idle_amplitude(&mut self, amplitude: f32) {
        self.settings.idle_amplitude = amplitude.max(0.0);
    }

    pub fn set_connections(&mut self, enabled: bool) {
        self.settings.connections = enabled;
    }

    pub fn set_trails(&mut self, enabled: bool) {
        self.settings.trails = enabled;
    }

    pub fn set_bloom(&mut self, enabled: bool) {
        self.settings.bloom = enabled;
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.settings.auto_rotate = enabled;
    }

    /// Advance the simulation by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.time += dt;
        let blend = self.tuning.scalar_smoothing;
        self.scale.tick(blend);
        self.explosion.tick(blend);
        self.turbulence.tick(blend);
        self.rotation.tick(blend);
        self.update_frame_rate();

        let t = self.tuning;
        let scale = self.scale.current;
        let explosion = self.explosion.current * t.explosion_multiplier;
        let turbulence = self.turbulence.current;
        let morph = (t.morph_force * self.morph_speed).clamp(0.0, 0.99);
        let audio_level = if self.audio_enabled {
            self.audio_level
        } else {
            0.0
        };
        let idle_amp = t.idle_amplitude * self.settings.idle_amplitude;
        let idle_suppression = if t.turbulence_max > 0.0 {
            1.0 - (turbulence / t.turbulence_max).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let time = self.time;
        let idle_speed = t.idle_speed;
        let active = ((self.positions.len() as f32 * self.lod).round() as usize)
            .clamp(1, self.positions.len());

        let base = &self.base;
        self.positions
            .par_iter_mut()
            .zip(self.velocities.par_iter_mut())
            .zip(self.display.par_iter_mut())
            .enumerate()
            .for_each(|(i, ((pos, vel), out))| {
                if i < active {
                    let mut rng = rand::thread_rng();
                    let target = base[i].map(|c| c * scale);
                    let dir = crate::types::normalize(*pos);
                    let phase = (time * 5.0 + i as f32 * 0.1).sin();

                    for axis in 0..3 {
                        let morph_force = (target[axis] - pos[axis]) * morph;
                        let explosion_force = dir[axis] * explosion;
                        let turbulence_force =
                            (rng.r#gen::<f32>() - 0.5) * turbulence * 2.0;
                        let audio_force = audio_level * dir[axis] * phase * t.audio_gain;

                        vel[axis] = (vel[axis]
                            + morph_force
                            + explosion_force
                            + turbulence_force
                            + audio_force)
                            * t.damping;
                        pos[axis] += vel[axis];
                    }
                }

                // Idle floating rides on top of the integrated position
                // without feeding back into velocity.
                let idle_phase = time * idle_speed + i as f32 * 0.37;
                let offset = [
                    idle_phase.sin(),
                    (idle_phase * 1.3 + 1.7).cos(),
                    (idle_phase * 0.8 + 0.5).sin(),
                ];
                for axis in 0..3 {
                    out[axis] = pos[axis] + offset[axis] * idle_amp * idle_suppression;
                }
            });
    }

    /// Exponential FPS estimate plus the level-of-detail controller:
    /// shrink the simulated fraction when the tick rate sags, recover it
    /// when there is headroom.
    fn update_frame_rate(&mut self) {
        const SLOWDOWN_FACTOR: f32 = 0.85;
        const RECOVERY_FACTOR: f32 = 1.25;

        let now = Instant::now();
        if let Some(last) = self.last_tick {
            let elapsed = now.duration_since(last).as_secs_f32();
            if elapsed > 0.0 {
                let instantaneous = 1.0 / elapsed;
                self.fps = if self.fps == 0.0 {
                    instantaneous
                } else {
                    self.fps * 0.9 + instantaneous * 0.1
                };
            }
        }
        self.last_tick = Some(now);

        if self.fps > 0.0 {
            if self.fps < self.tuning.target_fps * 0.9 {
                self.lod = (self.lod * SLOWDOWN_FACTOR).max(self.tuning.lod_min);
            } else if self.fps > self.tuning.target_fps * 1.1 {
                self.lod = (self.lod * RECOVERY_FACTOR).min(1.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GestureKind, GestureSnapshot, distance3};
    use rand::{SeedableRng, rngs::StdRng};

    fn field(count: usize) -> ParticleField {
        let mut rng = StdRng::seed_from_u64(3);
        ParticleField::new(
            SimulationTuning::default(),
            PatternKind::Sphere,
            count,
            &mut rng,
        )
    }

    fn open_snapshot(openness: f32) -> GestureSnapshot {
        GestureSnapshot {
            openness,
            gesture: GestureKind::Open,
            is_hand_detected: true,
            ..GestureSnapshot::neutral(0.0)
        }
    }

    fn mean_target_distance(f: &ParticleField, scale: f32) -> f32 {
        let n = f.positions.len() as f32;
        f.positions
            .iter()
            .zip(&f.base)
            .map(|(p, b)| distance3(*p, b.map(|c| c * scale)))
            .sum::<f32>()
            / n
    }

    #[test]
    fn converges_toward_scaled_target_without_forcing() {
        let mut f = field(64);
        f.apply_gesture(&open_snapshot(1.0));
        // Let the smoothed scale settle so the target is constant.
        for _ in 0..200 {
            f.tick(1.0 / 60.0);
        }
        let scale = f.scale.current;
        assert!((scale - f.tuning.scale_max).abs() < 1e-3);

        // Displace the field from its settled state with zero velocity
        // so the approach starts clean.
        for p in &mut f.positions {
            for c in p.iter_mut() {
                *c += 0.5;
            }
        }
        for v in &mut f.velocities {
            *v = [0.0; 3];
        }

        let initial = mean_target_distance(&f, scale);
        let mut prev = initial;
        for i in 0..300 {
            f.tick(1.0 / 60.0);
            let d = mean_target_distance(&f, scale);
            assert!(
                d <= initial + 1e-4,
                "distance exceeded start at tick {i}: {d} > {initial}"
            );
            if i < 5 {
                assert!(d <= prev + 1e-5, "early distance grew at tick {i}");
            }
            prev = d;
        }
        assert!(prev < 1e-3, "field did not settle: {prev}");
    }

    #[test]
    fn pinch_drives_implosion() {
        let mut f = field(128);
        let snapshot = GestureSnapshot {
            pinch: 1.0,
            is_pinching: true,
            gesture: GestureKind::Pinch,
            is_hand_detected: true,
            ..GestureSnapshot::neutral(0.0)
        };
        f.apply_gesture(&snapshot);

        let initial: f32 = f
            .positions
            .iter()
            .map(|p| crate::types::length3(*p))
            .sum::<f32>()
            / 128.0;
        for _ in 0..60 {
            f.tick(1.0 / 60.0);
        }
        let after: f32 = f
            .positions
            .iter()
            .map(|p| crate::types::length3(*p))
            .sum::<f32>()
            / 128.0;
        assert!(after < initial, "field did not contract: {after} >= {initial}");
    }

    #[test]
    fn rotation_chases_the_hand_roll_target() {
        let mut f = field(8);
        let snapshot = GestureSnapshot {
            rotation: 1.2,
            is_hand_detected: true,
            ..GestureSnapshot::neutral(0.0)
        };
        f.apply_gesture(&snapshot);
        assert_eq!(f.rotation(), 0.0);
        for _ in 0..200 {
            f.tick(1.0 / 60.0);
        }
        assert!((f.rotation() - 1.2).abs() < 1e-3, "rotation {}", f.rotation());
    }

    #[test]
    fn manual_explosion_force_bursts_outward() {
        let mut f = field(128);
        f.set_explosion_force(0.05);

        let mean_radius = |f: &ParticleField| {
            f.positions
                .iter()
                .map(|p| crate::types::length3(*p))
                .sum::<f32>()
                / f.positions.len() as f32
        };
        let initial = mean_radius(&f);
        for _ in 0..30 {
            f.tick(1.0 / 60.0);
        }
        let after = mean_radius(&f);
        assert!(after > initial, "field did not expand: {after} <= {initial}");
    }

    #[test]
    fn count_change_resizes_buffers_and_zeroes_velocities() {
        let mut f = field(32);
        f.apply_gesture(&open_snapshot(1.0));
        for _ in 0..10 {
            f.tick(1.0 / 60.0);
        }
        assert!(f.velocities.iter().any(|v| v != &[0.0; 3]));

        let mut rng = StdRng::seed_from_u64(9);
        f.set_particle_count(77, &mut rng);
        assert_eq!(f.particle_count(), 77);
        assert_eq!(f.base.len(), 77);
        assert_eq!(f.velocities.len(), 77);
        assert_eq!(f.display.len(), 77);
        assert!(f.velocities.iter().all(|v| v == &[0.0; 3]));
    }

    #[test]
    fn pattern_switch_keeps_positions_but_zeroes_velocities() {
        let mut f = field(32);
        f.apply_gesture(&open_snapshot(0.9));
        for _ in 0..10 {
            f.tick(1.0 / 60.0);
        }
        let positions_before = f.positions.clone();

        let mut rng = StdRng::seed_from_u64(5);
        f.set_pattern(PatternKind::Torus, &mut rng);
        assert_eq!(f.pattern(), PatternKind::Torus);
        assert_eq!(f.positions, positions_before);
        assert!(f.velocities.iter().all(|v| v == &[0.0; 3]));
    }

    #[test]
    fn unknown_pattern_name_falls_back_to_sphere() {
        let mut f = field(16);
        let mut rng = StdRng::seed_from_u64(5);
        f.set_pattern_name("wobble", &mut rng);
        assert_eq!(f.pattern(), PatternKind::Sphere);
    }

    #[test]
    fn audio_level_ignored_while_disabled() {
        let mut f = field(8);
        f.set_audio_level(0.8);
        assert_eq!(f.audio_level, 0.0);
        f.set_audio_enabled(true);
        f.set_audio_level(0.8);
        assert_eq!(f.audio_level, 0.8);
        f.set_audio_enabled(false);
        assert_eq!(f.audio_level, 0.0);
    }

    #[test]
    fn idle_float_affects_display_not_integration() {
        let mut f = field(8);
        f.tick(1.0 / 60.0);
        // With neutral targets the integrated positions barely move, but
        // the display buffer carries the idle offset.
        let differs = f
            .positions
            .iter()
            .zip(f.positions())
            .any(|(p, d)| distance3(*p, *d) > 1e-4);
        assert!(differs);
    }
}
