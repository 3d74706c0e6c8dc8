//! Worker wiring between a landmark source and its consumers.
//!
//! The hand tracker is an external collaborator behind `LandmarkSource`;
//! a worker thread drains it, classifies every tick, and publishes
//! snapshots over a bounded channel. Consumers read last-writer-wins: a
//! slow render loop just sees the newest snapshot and skips the rest.

pub mod source;

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use crossbeam_channel::{Receiver, Sender, bounded};
use thiserror::Error;

use crate::{
    gesture::GestureClassifier,
    types::{FrameSample, GestureSnapshot},
};

/// Why a capture device could not be acquired. Surfaced once so the host
/// can fall back to an alternative control scheme; the simulation keeps
/// running either way.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture permission denied")]
    PermissionDenied,
    #[error("capture device not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A per-frame producer of zero, one, or two hand landmark sets.
pub trait LandmarkSource: Send + 'static {
    /// Acquire the underlying capture resource. Called once before the
    /// worker thread spawns so acquisition failures surface immediately.
    fn open(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }

    /// Block until the next camera tick. `Ok(None)` ends the stream.
    fn next_sample(&mut self) -> anyhow::Result<Option<FrameSample>>;
}

const SNAPSHOT_CAPACITY: usize = 4;

#[derive(Debug)]
pub struct TrackerHandle {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
    snapshot_rx: Receiver<GestureSnapshot>,
}

impl TrackerHandle {
    /// Newest published snapshot, if any arrived since the last read.
    pub fn latest_snapshot(&self) -> Option<GestureSnapshot> {
        let mut latest = None;
        while let Ok(snapshot) = self.snapshot_rx.try_recv() {
            latest = Some(snapshot);
        }
        latest
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TrackerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Spawn the gesture worker. Subscribe to the classifier's event bus
/// before calling this; the classifier moves into the worker thread.
pub fn start_tracker(
    mut source: impl LandmarkSource,
    mut classifier: GestureClassifier,
) -> Result<TrackerHandle, CaptureError> {
    source.open()?;

    let (snapshot_tx, snapshot_rx) = bounded(SNAPSHOT_CAPACITY);
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();

    let handle = thread::spawn(move || {
        run_worker_loop(&mut source, &mut classifier, snapshot_tx, stop_flag);
        log::info!("gesture worker stopped");
    });

    Ok(TrackerHandle {
        stop,
        handle: Some(handle),
        snapshot_rx,
    })
}

fn run_worker_loop(
    source: &mut impl LandmarkSource,
    classifier: &mut GestureClassifier,
    snapshot_tx: Sender<GestureSnapshot>,
    stop: Arc<AtomicBool>,
) {
    while !stop.load(Ordering::Relaxed) {
        match source.next_sample() {
            Ok(Some(sample)) => {
                let snapshot = classifier.process(&sample);
                // Drop if the consumer is behind; it drains to the
                // newest snapshot anyway.
                let _ = snapshot_tx.try_send(snapshot);
            }
            Ok(None) => break,
            Err(err) => {
                log::warn!("landmark source failed for one frame: {err:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GestureThresholds;
    use crate::pipeline::source::poses;

    struct ScriptedSource {
        frames: Vec<FrameSample>,
        cursor: usize,
    }

    impl LandmarkSource for ScriptedSource {
        fn next_sample(&mut self) -> anyhow::Result<Option<FrameSample>> {
            let sample = self.frames.get(self.cursor).cloned();
            self.cursor += 1;
            Ok(sample)
        }
    }

    struct DeniedSource;

    impl LandmarkSource for DeniedSource {
        fn open(&mut self) -> Result<(), CaptureError> {
            Err(CaptureError::PermissionDenied)
        }

        fn next_sample(&mut self) -> anyhow::Result<Option<FrameSample>> {
            Ok(None)
        }
    }

    #[test]
    fn worker_publishes_snapshots_until_stream_ends() {
        let frames = (0..10)
            .map(|i| FrameSample {
                hands: vec![poses::open_hand()],
                timestamp_ms: i as f64 * 33.0,
            })
            .collect();
        let source = ScriptedSource { frames, cursor: 0 };
        let classifier = GestureClassifier::new(GestureThresholds::default());

        let tracker = start_tracker(source, classifier).unwrap();
        // The stream is finite; join the worker and read what it left.
        std::thread::sleep(std::time::Duration::from_millis(50));
        let snapshot = tracker.latest_snapshot().expect("no snapshot published");
        assert!(snapshot.is_hand_detected);
        tracker.stop();
    }

    #[test]
    fn acquisition_failure_surfaces_before_spawn() {
        let classifier = GestureClassifier::new(GestureThresholds::default());
        let err = start_tracker(DeniedSource, classifier).unwrap_err();
        assert!(matches!(err, CaptureError::PermissionDenied));
    }

    #[test]
    fn capture_error_categories_render_distinctly() {
        let denied = CaptureError::PermissionDenied.to_string();
        let missing = CaptureError::NotFound.to_string();
        let other = CaptureError::Other(anyhow::anyhow!("backend exploded")).to_string();
        assert_ne!(denied, missing);
        assert!(other.contains("backend exploded"));
    }
}
