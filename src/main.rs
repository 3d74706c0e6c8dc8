mod config;
mod events;
mod filter;
mod gesture;
mod particles;
mod patterns;
mod pipeline;
mod presets;
mod types;
mod velocity;

use std::time::{Duration, Instant};

use anyhow::Result;
use log::info;
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    config::{GestureThresholds, SimulationTuning},
    events::GestureEvent,
    gesture::GestureClassifier,
    particles::ParticleField,
    patterns::PatternKind,
    pipeline::source::SyntheticSource,
    types::GestureKind,
};

const PARTICLE_COUNT: usize = 15_000;
const TICK: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut classifier = GestureClassifier::new(GestureThresholds::default());
    let events = classifier.subscribe();

    let tracker = pipeline::start_tracker(SyntheticSource::new(2), classifier)?;

    let mut rng = StdRng::from_entropy();
    let mut field = ParticleField::new(
        SimulationTuning::default(),
        PatternKind::Sphere,
        PARTICLE_COUNT,
        &mut rng,
    );

    info!(
        "particle field up: {} particles, pattern {}",
        field.particle_count(),
        field.pattern().name()
    );

    let mut last_report = Instant::now();
    let mut idle_ticks = 0_u32;
    loop {
        let tick_start = Instant::now();

        match tracker.latest_snapshot() {
            Some(snapshot) => {
                idle_ticks = 0;
                field.apply_gesture(&snapshot);
            }
            None => {
                // The script is finite; a quiet stretch means the worker
                // is done and the field has nothing left to react to.
                idle_ticks += 1;
                if idle_ticks > 120 {
                    break;
                }
            }
        }

        for event in events.try_iter() {
            handle_event(&mut field, &mut rng, event);
        }

        field.tick(TICK.as_secs_f32());

        if last_report.elapsed() >= Duration::from_secs(2) {
            info!(
                "fps {:.1}, lod {:.2}, pattern {}",
                field.fps(),
                field.lod(),
                field.pattern().name()
            );
            last_report = Instant::now();
        }

        let elapsed = tick_start.elapsed();
        if elapsed < TICK {
            std::thread::sleep(TICK - elapsed);
        }
    }

    tracker.stop();
    info!("demo script finished");
    Ok(())
}

/// Map edge-triggered gesture events onto field reactions, the same
/// bindings the presentation shell exposes.
fn handle_event(field: &mut ParticleField, rng: &mut StdRng, event: GestureEvent) {
    match event {
        GestureEvent::GestureChanged {
            gesture,
            confidence,
        } => {
            info!(
                "gesture: {} (confidence {confidence:.2})",
                gesture.display_name()
            );
            match gesture {
                GestureKind::Peace => field.set_pattern(PatternKind::Heart, rng),
                GestureKind::ThumbsUp => field.set_pattern(PatternKind::Galaxy, rng),
                GestureKind::Fist => field.set_pattern(PatternKind::Sphere, rng),
                _ => {}
            }
        }
        GestureEvent::PinchStarted => info!("pinch started"),
        GestureEvent::PinchEnded => info!("pinch ended"),
        GestureEvent::HandDetected => info!("hand detected"),
        GestureEvent::HandLost => info!("hand lost"),
        GestureEvent::TwoHandsDetected => info!("two hands detected"),
        GestureEvent::TwoHandsLost => info!("two hands lost"),
    }
}
