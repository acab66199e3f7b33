//! Simulated face-observation source.
//!
//! Camera capture and the detection model live outside this crate; this
//! source stands in for them so the full pipeline can run end to end. It
//! synthesizes a slow approach/retreat area curve with per-frame jitter and
//! intermittent face loss.

use crate::source::types::{FaceDetection, Observation};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Configuration for the simulated source.
#[derive(Debug, Clone)]
pub struct SimulatedSourceConfig {
    /// Milliseconds between synthetic frames
    pub frame_interval_ms: u64,
    /// Area the curve oscillates around (the user's "comfortable" distance)
    pub baseline_area: f64,
    /// Peak-to-baseline ratio of the approach swing
    pub approach_factor: f64,
    /// Confidence floor applied before publishing
    pub detection_threshold: f64,
    /// One out of every N frames reports no face (0 disables dropouts)
    pub dropout_every: u64,
}

impl Default for SimulatedSourceConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 100,
            baseline_area: 0.10,
            approach_factor: 2.5,
            detection_threshold: 0.5,
            dropout_every: 40,
        }
    }
}

/// Errors that can occur while driving the source.
#[derive(Debug)]
pub enum SourceError {
    AlreadyRunning,
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::AlreadyRunning => write!(f, "Source is already running"),
        }
    }
}

impl std::error::Error for SourceError {}

/// A synthetic observation producer.
///
/// The channel is bounded to a single slot: when the pipeline is still
/// processing the previous observation, a newly produced frame is dropped at
/// the source rather than queued. Bounded staleness beats unbounded buffering.
pub struct SimulatedSource {
    config: SimulatedSourceConfig,
    sender: Sender<Observation>,
    receiver: Receiver<Observation>,
    running: Arc<AtomicBool>,
    dropped: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl SimulatedSource {
    /// Create a new simulated source.
    pub fn new(config: SimulatedSourceConfig) -> Self {
        let (sender, receiver) = bounded(1);
        Self {
            config,
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            dropped: Arc::new(AtomicU64::new(0)),
            handle: None,
        }
    }

    /// Start producing observations on a background thread.
    pub fn start(&mut self) -> Result<(), SourceError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(SourceError::AlreadyRunning);
        }
        self.running.store(true, Ordering::SeqCst);

        let running = self.running.clone();
        let dropped = self.dropped.clone();
        let sender = self.sender.clone();
        let config = self.config.clone();

        self.handle = Some(thread::spawn(move || {
            let interval = Duration::from_millis(config.frame_interval_ms.max(1));
            let mut frame: u64 = 0;

            while running.load(Ordering::SeqCst) {
                let obs = synthesize(&config, frame);
                match sender.try_send(obs) {
                    Ok(()) => {}
                    // Slot occupied: the previous frame is still in flight.
                    Err(TrySendError::Full(_)) => {
                        dropped.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(TrySendError::Disconnected(_)) => break,
                }
                frame = frame.wrapping_add(1);
                thread::sleep(interval);
            }
        }));

        Ok(())
    }

    /// Stop producing observations.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Check if the producer thread is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the receiver for observations.
    pub fn receiver(&self) -> &Receiver<Observation> {
        &self.receiver
    }

    /// Number of frames dropped because the pipeline was busy.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for SimulatedSource {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Build the synthetic observation for a given frame number.
fn synthesize(config: &SimulatedSourceConfig, frame: u64) -> Observation {
    if config.dropout_every > 0 && frame % config.dropout_every == config.dropout_every - 1 {
        return Observation::no_face();
    }

    // Slow sinusoidal swing between baseline and baseline * approach_factor,
    // with small deterministic jitter standing in for detector noise.
    let period = 200.0;
    let phase = (frame as f64 / period) * std::f64::consts::TAU;
    let swing = (phase.sin() + 1.0) / 2.0;
    let area = config.baseline_area * (1.0 + swing * (config.approach_factor - 1.0));
    let jitter = ((frame as f64 * 0.7).sin()) * config.baseline_area * 0.02;

    let detection = FaceDetection::new(area + jitter, 0.85);
    Observation::from_detection(Some(detection), config.detection_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesize_stays_in_range() {
        let config = SimulatedSourceConfig::default();
        for frame in 0..500 {
            let obs = synthesize(&config, frame);
            assert!((0.0..=1.0).contains(&obs.normalized_area));
        }
    }

    #[test]
    fn test_dropouts_report_no_face() {
        let config = SimulatedSourceConfig {
            dropout_every: 10,
            ..Default::default()
        };
        let obs = synthesize(&config, 9);
        assert!(!obs.face_detected);
        assert_eq!(obs.normalized_area, 0.0);
    }

    #[test]
    fn test_start_twice_fails() {
        let mut source = SimulatedSource::new(SimulatedSourceConfig::default());
        source.start().unwrap();
        assert!(source.start().is_err());
        source.stop();
        assert!(!source.is_running());
    }

    #[test]
    fn test_single_slot_drops_when_busy() {
        let mut source = SimulatedSource::new(SimulatedSourceConfig {
            frame_interval_ms: 1,
            ..Default::default()
        });
        source.start().unwrap();

        // Never drain the channel: after the first frame fills the slot,
        // every further frame must be dropped at the source.
        thread::sleep(Duration::from_millis(50));
        source.stop();

        assert!(source.dropped_frames() > 0);
        assert!(source.receiver().len() <= 1);
    }
}
