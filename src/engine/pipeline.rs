//! The observation-to-intent pipeline.
//!
//! Exactly one observation is in flight at a time: sampler, smoother, state
//! machine and corrector are mutated only from this path, and each cycle
//! runs to completion synchronously. The upstream producer guarantees
//! at-most-one frame is handed over (bounded channel, drop on full).

use crate::config::{ProtectionConfig, SamplingConfig};
use crate::engine::baseline::SharedBaseline;
use crate::engine::corrector::BaselineCorrector;
use crate::engine::sampler::AdaptiveSampler;
use crate::engine::smoothing::SmoothingFilter;
use crate::engine::state_machine::{Intent, ProtectionState, ProtectionStateMachine};
use crate::source::types::Observation;
use std::time::{Duration, Instant};

/// Stateful pipeline turning raw face-area observations into protection
/// intents.
pub struct ProximityEngine {
    sampler: AdaptiveSampler,
    smoother: SmoothingFilter,
    state_machine: ProtectionStateMachine,
    corrector: BaselineCorrector,
    baseline: SharedBaseline,
    accepted: u64,
}

impl ProximityEngine {
    pub fn new(
        protection: &ProtectionConfig,
        sampling: &SamplingConfig,
        smoothing_window: usize,
        baseline: SharedBaseline,
        now: Instant,
    ) -> Self {
        Self {
            sampler: AdaptiveSampler::new(
                sampling.frame_skip_count,
                sampling.stability_threshold,
                sampling.stable_count_for_slowdown,
            ),
            smoother: SmoothingFilter::new(smoothing_window),
            state_machine: ProtectionStateMachine::new(
                protection.threshold_factor,
                protection.hysteresis_gap,
                Duration::from_secs(protection.warning_time_secs),
                protection.haptics_enabled,
            ),
            corrector: BaselineCorrector::new(now),
            baseline,
            accepted: 0,
        }
    }

    /// Process one observation opportunity. Returns the cycle's intents;
    /// empty when the sampler discards the frame.
    pub fn process(&mut self, observation: &Observation, now: Instant) -> Vec<Intent> {
        if !self.sampler.accept(observation) {
            return Vec::new();
        }
        self.accepted += 1;

        let smoothed = self.smoother.ingest(observation);
        // Stability is judged on the same signal the state machine sees.
        self.sampler.update_stability(smoothed);

        // Re-read the baseline every cycle; the corrector may have swapped it.
        let baseline = self.baseline.area();
        let mut intents =
            self.state_machine
                .evaluate(smoothed, observation.face_detected, baseline, now);

        self.corrector
            .observe(self.state_machine.state(), smoothed, observation.face_detected);

        // Correction only applies while Safe; Warning/Blocked never move the
        // baseline, even off stale samples.
        if self.state_machine.state() == ProtectionState::Safe {
            if let Some(corrected) = self.corrector.maybe_correct(now, baseline) {
                self.baseline.set_area(corrected);
                intents.push(Intent::PersistBaseline(corrected));
            }
        }

        intents
    }

    pub fn state(&self) -> ProtectionState {
        self.state_machine.state()
    }

    /// Human-readable status for the last known face flag.
    pub fn status_line(&self, face_detected: bool) -> String {
        self.state_machine.status_line(face_detected)
    }

    /// Observations handed to the sampler so far.
    pub fn frames_seen(&self) -> u64 {
        self.sampler.frames_seen()
    }

    /// Observations that passed the sampler.
    pub fn frames_accepted(&self) -> u64 {
        self.accepted
    }

    /// Current effective skip count (base skip times the slowdown multiplier).
    pub fn effective_skip(&self) -> u64 {
        self.sampler.effective_skip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::baseline::create_shared_baseline;

    fn test_engine(baseline: f64) -> (ProximityEngine, Instant) {
        let t0 = Instant::now();
        let protection = ProtectionConfig {
            baseline_area: baseline,
            threshold_factor: 2.0,
            hysteresis_gap: 0.3,
            warning_time_secs: 3,
            detection_threshold: 0.5,
            haptics_enabled: true,
        };
        // Accept every frame and skip smoothing lag so tests drive the state
        // machine directly.
        let sampling = SamplingConfig {
            frame_skip_count: 1,
            stability_threshold: 0.05,
            stable_count_for_slowdown: 10,
        };
        let engine = ProximityEngine::new(
            &protection,
            &sampling,
            1,
            create_shared_baseline(baseline),
            t0,
        );
        (engine, t0)
    }

    #[test]
    fn test_discarded_frames_emit_nothing() {
        let t0 = Instant::now();
        let protection = ProtectionConfig::default();
        let sampling = SamplingConfig::default();
        let mut engine = ProximityEngine::new(
            &protection,
            &sampling,
            5,
            create_shared_baseline(0.1),
            t0,
        );

        // Default skip count 2: the first frame is discarded.
        let intents = engine.process(&Observation::face(0.5), t0);
        assert!(intents.is_empty());
        assert_eq!(engine.frames_seen(), 1);
        assert_eq!(engine.frames_accepted(), 0);
    }

    #[test]
    fn test_escalation_through_pipeline() {
        let (mut engine, t0) = test_engine(0.1);

        engine.process(&Observation::face(0.25), t0);
        assert_eq!(engine.state(), ProtectionState::Warning);

        let intents = engine.process(&Observation::face(0.25), t0 + Duration::from_secs(3));
        assert_eq!(engine.state(), ProtectionState::Blocked);
        assert!(intents.contains(&Intent::ShowOverlay));
    }

    #[test]
    fn test_correction_flows_back_to_baseline_store() {
        let (mut engine, t0) = test_engine(0.1);

        // Stable usage at twice the baseline, still below enter (0.2).
        for i in 0..12 {
            engine.process(
                &Observation::face(0.19),
                t0 + Duration::from_millis(100 * i),
            );
        }
        assert_eq!(engine.state(), ProtectionState::Safe);

        // The stable stream doubled the effective skip, so offer frames
        // until the sampler accepts one for the 31 s check.
        let mut t = t0 + Duration::from_secs(31);
        let intents = loop {
            let before = engine.frames_accepted();
            let intents = engine.process(&Observation::face(0.19), t);
            t += Duration::from_millis(100);
            if engine.frames_accepted() > before {
                break intents;
            }
        };
        let persisted: Vec<_> = intents
            .iter()
            .filter_map(|i| match i {
                Intent::PersistBaseline(v) => Some(*v),
                _ => None,
            })
            .collect();
        assert_eq!(persisted.len(), 1);
        assert!((persisted[0] - 0.145).abs() < 1e-12);
        assert!((engine.baseline.area() - 0.145).abs() < 1e-12);
    }

    #[test]
    fn test_sampler_slows_down_on_stable_stream() {
        let (mut engine, t0) = test_engine(0.1);
        assert_eq!(engine.effective_skip(), 1);

        // Constant area: first accepted frame is unstable (last_area == 0),
        // the following ten stable readings trigger the slowdown.
        for i in 0..11 {
            engine.process(
                &Observation::face(0.1),
                t0 + Duration::from_millis(100 * i),
            );
        }
        assert_eq!(engine.effective_skip(), 2);

        // Face loss reads as unstable and restores the base rate.
        engine.process(&Observation::no_face(), t0 + Duration::from_secs(2));
        assert_eq!(engine.effective_skip(), 1);
    }
}
