//! Procedural point-cloud generators for the particle field.
//!
//! Every generator maps `(count, rng)` to exactly `count` positions.
//! Downstream buffers are allocated against that count, so length
//! correctness is the one absolute invariant here; jitter keeps the
//! structured shapes from looking like a rigid lattice.

use std::f32::consts::{PI, TAU};

use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternKind {
    Sphere,
    Cube,
    Heart,
    Galaxy,
    Helix,
    Torus,
    Saturn,
    Star,
    Wave,
    Pyramid,
    Infinity,
    Firework,
    Tornado,
}

impl PatternKind {
    pub const ALL: [PatternKind; 13] = [
        PatternKind::Sphere,
        PatternKind::Cube,
        PatternKind::Heart,
        PatternKind::Galaxy,
        PatternKind::Helix,
        PatternKind::Torus,
        PatternKind::Saturn,
        PatternKind::Star,
        PatternKind::Wave,
        PatternKind::Pyramid,
        PatternKind::Infinity,
        PatternKind::Firework,
        PatternKind::Tornado,
    ];

    /// Resolve a shape name. Unknown names fall back to the sphere so a
    /// stale preset can never break the draw loop.
    pub fn from_name(name: &str) -> PatternKind {
        match name.to_ascii_lowercase().as_str() {
            "cube" => PatternKind::Cube,
            "heart" => PatternKind::Heart,
            "galaxy" => PatternKind::Galaxy,
            "dna" | "helix" => PatternKind::Helix,
            "torus" => PatternKind::Torus,
            "saturn" => PatternKind::Saturn,
            "star" => PatternKind::Star,
            "wave" => PatternKind::Wave,
            "pyramid" => PatternKind::Pyramid,
            "infinity" => PatternKind::Infinity,
            "firework" => PatternKind::Firework,
            "tornado" => PatternKind::Tornado,
            _ => PatternKind::Sphere,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PatternKind::Sphere => "sphere",
            PatternKind::Cube => "cube",
            PatternKind::Heart => "heart",
            PatternKind::Galaxy => "galaxy",
            PatternKind::Helix => "helix",
            PatternKind::Torus => "torus",
            PatternKind::Saturn => "saturn",
            PatternKind::Star => "star",
            PatternKind::Wave => "wave",
            PatternKind::Pyramid => "pyramid",
            PatternKind::Infinity => "infinity",
            PatternKind::Firework => "firework",
            PatternKind::Tornado => "tornado",
        }
    }
}

pub fn generate(kind: PatternKind, count: usize, rng: &mut impl Rng) -> Vec<[f32; 3]> {
    let positions = match kind {
        PatternKind::Sphere => sphere(count, rng),
        PatternKind::Cube => cube(count, rng),
        PatternKind::Heart => heart(count, rng),
        PatternKind::Galaxy => galaxy(count, rng),
        PatternKind::Helix => helix(count, rng),
        PatternKind::Torus => torus(count, rng),
        PatternKind::Saturn => saturn(count, rng),
        PatternKind::Star => star(count, rng),
        PatternKind::Wave => wave(count, rng),
        PatternKind::Pyramid => pyramid(count, rng),
        PatternKind::Infinity => infinity(count, rng),
        PatternKind::Firework => firework(count, rng),
        PatternKind::Tornado => tornado(count, rng),
    };
    debug_assert_eq!(positions.len(), count);
    positions
}

fn jitter(rng: &mut impl Rng, amount: f32) -> f32 {
    (rng.r#gen::<f32>() - 0.5) * amount
}

/// UV parameters for point `i` of `count`, traversed as a near-square
/// grid. Excess grid cells are never visited, so the caller always gets
/// an exact-length output whatever `count` is.
fn grid_uv(i: usize, count: usize) -> (f32, f32) {
    let cols = (count as f32).sqrt().ceil().max(1.0) as usize;
    let rows = count.div_ceil(cols);
    let u = (i % cols) as f32 / cols as f32;
    let v = (i / cols) as f32 / rows.max(1) as f32;
    (u, v)
}

fn sphere(count: usize, rng: &mut impl Rng) -> Vec<[f32; 3]> {
    (0..count)
        .map(|i| {
            let (u, v) = grid_uv(i, count);
            let theta = u * TAU;
            let phi = (v + 0.5 / count.max(1) as f32) * PI;
            let r = 1.0 + jitter(rng, 0.08);
            [
                r * phi.sin() * theta.cos(),
                r * phi.cos(),
                r * phi.sin() * theta.sin(),
            ]
        })
        .collect()
}

fn cube(count: usize, rng: &mut impl Rng) -> Vec<[f32; 3]> {
    let half = 0.7;
    (0..count)
        .map(|i| {
            let (u, v) = grid_uv(i, count);
            let a = (u - 0.5) * 2.0 * half + jitter(rng, 0.04);
            let b = (v - 0.5) * 2.0 * half + jitter(rng, 0.04);
            match i % 6 {
                0 => [half, a, b],
                1 => [-half, a, b],
                2 => [a, half, b],
                3 => [a, -half, b],
                4 => [a, b, half],
                _ => [a, b, -half],
            }
        })
        .collect()
}

fn heart(count: usize, rng: &mut impl Rng) -> Vec<[f32; 3]> {
    (0..count)
        .map(|i| {
            let (u, v) = grid_uv(i, count);
            let t = u * TAU;
            // Classic parametric heart, scaled to roughly unit size.
            let x = 16.0 * t.sin().powi(3) / 17.0;
            let y = (13.0 * t.cos()
                - 5.0 * (2.0 * t).cos()
                - 2.0 * (3.0 * t).cos()
                - (4.0 * t).cos())
                / 17.0;
            let shell = 0.55 + 0.45 * v;
            [
                x * shell + jitter(rng, 0.05),
                y * shell + jitter(rng, 0.05),
                jitter(rng, 0.25),
            ]
        })
        .collect()
}

fn galaxy(count: usize, rng: &mut impl Rng) -> Vec<[f32; 3]> {
    const ARMS: usize = 3;
    // Roughly one point in seven lands in the central bulge; the rest
    // trace the spiral arms.
    (0..count)
        .map(|i| {
            if i % 7 == 0 {
                let r = rng.r#gen::<f32>().powi(2) * 0.3;
                let theta = rng.r#gen::<f32>() * TAU;
                [
                    r * theta.cos(),
                    jitter(rng, 0.12),
                    r * theta.sin(),
                ]
            } else {
                let arm = i % ARMS;
                let t = i as f32 / count.max(1) as f32;
                let radius = 0.15 + t * 1.1;
                let angle =
                    t * 2.5 * TAU + arm as f32 * TAU / ARMS as f32 + jitter(rng, 0.35);
                [
                    radius * angle.cos() + jitter(rng, 0.05),
                    jitter(rng, 0.08) * (1.2 - t),
                    radius * angle.sin() + jitter(rng, 0.05),
                ]
            }
        })
        .collect()
}

fn helix(count: usize, rng: &mut impl Rng) -> Vec<[f32; 3]> {
    const TURNS: f32 = 2.5;
    (0..count)
        .map(|i| {
            let strand = (i % 2) as f32;
            let t = i as f32 / count.max(1) as f32;
            let angle = t * TURNS * TAU + strand * PI;
            [
                0.5 * angle.cos() + jitter(rng, 0.04),
                t * 2.0 - 1.0,
                0.5 * angle.sin() + jitter(rng, 0.04),
            ]
        })
        .collect()
}

fn torus(count: usize, rng: &mut impl Rng) -> Vec<[f32; 3]> {
    const MAJOR: f32 = 0.75;
    const MINOR: f32 = 0.3;
    (0..count)
        .map(|i| {
            let (u, v) = grid_uv(i, count);
            let theta = u * TAU;
            let phi = v * TAU;
            let ring = MAJOR + MINOR * phi.cos() + jitter(rng, 0.03);
            [
                ring * theta.cos(),
                MINOR * phi.sin() + jitter(rng, 0.03),
                ring * theta.sin(),
            ]
        })
        .collect()
}

fn saturn(count: usize, rng: &mut impl Rng) -> Vec<[f32; 3]> {
    let body = count * 7 / 10;
    (0..count)
        .map(|i| {
            if i < body {
                let (u, v) = grid_uv(i, body.max(1));
                let theta = u * TAU;
                let phi = v * PI;
                let r = 0.6 + jitter(rng, 0.05);
                [
                    r * phi.sin() * theta.cos(),
                    r * phi.cos(),
                    r * phi.sin() * theta.sin(),
                ]
            } else {
                let theta = rng.r#gen::<f32>() * TAU;
                let radius = 0.85 + rng.r#gen::<f32>() * 0.45;
                [
                    radius * theta.cos(),
                    jitter(rng, 0.04),
                    radius * theta.sin(),
                ]
            }
        })
        .collect()
}

fn star(count: usize, rng: &mut impl Rng) -> Vec<[f32; 3]> {
    const POINTS: f32 = 5.0;
    (0..count)
        .map(|i| {
            let (u, v) = grid_uv(i, count);
            let t = u * TAU;
            // Blend between outer and inner radius across each point of
            // the star for a straight-edged outline.
            let phase = (t * POINTS / TAU).fract();
            let edge = (phase * 2.0 - 1.0).abs();
            let radius = (0.45 + 0.55 * edge) * (0.65 + 0.35 * v);
            [
                radius * t.cos() + jitter(rng, 0.03),
                radius * t.sin() + jitter(rng, 0.03),
                jitter(rng, 0.15),
            ]
        })
        .collect()
}

fn wave(count: usize, rng: &mut impl Rng) -> Vec<[f32; 3]> {
    (0..count)
        .map(|i| {
            let (u, v) = grid_uv(i, count);
            let x = (u - 0.5) * 2.4;
            let z = (v - 0.5) * 2.4;
            let y = (x * 3.0).sin() * 0.25 + (z * 2.5 + x).sin() * 0.15;
            [
                x + jitter(rng, 0.02),
                y + jitter(rng, 0.02),
                z + jitter(rng, 0.02),
            ]
        })
        .collect()
}

fn pyramid(count: usize, rng: &mut impl Rng) -> Vec<[f32; 3]> {
    let apex = [0.0_f32, 0.8, 0.0];
    let base = [
        [-0.7_f32, -0.5, -0.7],
        [0.7, -0.5, -0.7],
        [0.7, -0.5, 0.7],
        [-0.7, -0.5, 0.7],
    ];
    (0..count)
        .map(|i| {
            let (mut u, mut v) = grid_uv(i, count);
            let face = i % 5;
            if face < 4 {
                // Triangular side: fold the square sample into the
                // triangle spanned by two base corners and the apex.
                if u + v > 1.0 {
                    u = 1.0 - u;
                    v = 1.0 - v;
                }
                let a = base[face];
                let b = base[(face + 1) % 4];
                let mut p = [0.0_f32; 3];
                for axis in 0..3 {
                    p[axis] = a[axis]
                        + (b[axis] - a[axis]) * u
                        + (apex[axis] - a[axis]) * v
                        + jitter(rng, 0.03);
                }
                p
            } else {
                [
                    (u - 0.5) * 1.4 + jitter(rng, 0.03),
                    -0.5 + jitter(rng, 0.02),
                    (v - 0.5) * 1.4 + jitter(rng, 0.03),
                ]
            }
        })
        .collect()
}

fn infinity(count: usize, rng: &mut impl Rng) -> Vec<[f32; 3]> {
    (0..count)
        .map(|i| {
            let (u, v) = grid_uv(i, count);
            let t = u * TAU;
            // Lemniscate of Bernoulli in the x–z plane.
            let denom = 1.0 + t.sin().powi(2);
            let scale = 1.3 * (0.8 + 0.2 * v);
            [
                scale * t.cos() / denom + jitter(rng, 0.03),
                jitter(rng, 0.12),
                scale * t.sin() * t.cos() / denom + jitter(rng, 0.03),
            ]
        })
        .collect()
}

fn firework(count: usize, rng: &mut impl Rng) -> Vec<[f32; 3]> {
    const RAYS: usize = 32;
    const GOLDEN_ANGLE: f32 = 2.399_963;
    (0..count)
        .map(|i| {
            let ray = i % RAYS;
            // Fibonacci-sphere direction per ray, points biased outward
            // along it like a burst trail.
            let y = 1.0 - 2.0 * (ray as f32 + 0.5) / RAYS as f32;
            let ring = (1.0 - y * y).sqrt();
            let theta = ray as f32 * GOLDEN_ANGLE;
            let reach = 0.25 + 0.75 * rng.r#gen::<f32>().sqrt();
            [
                ring * theta.cos() * reach + jitter(rng, 0.04),
                y * reach + jitter(rng, 0.04),
                ring * theta.sin() * reach + jitter(rng, 0.04),
            ]
        })
        .collect()
}

fn tornado(count: usize, rng: &mut impl Rng) -> Vec<[f32; 3]> {
    (0..count)
        .map(|i| {
            let t = i as f32 / count.max(1) as f32;
            let radius = 0.12 + 0.85 * t * t + jitter(rng, 0.06);
            let angle = t * 5.0 * TAU + jitter(rng, 0.3);
            [
                radius * angle.cos(),
                t * 2.0 - 1.0 + jitter(rng, 0.03),
                radius * angle.sin(),
            ]
        })
        .collect()
}
