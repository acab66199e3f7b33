//! Long-running baseline drift correction.
//!
//! Posture shifts after calibration: the chair moves, the laptop gets
//! propped up, the baseline slowly stops matching reality. The corrector
//! watches stable usage and periodically nudges the baseline toward the
//! observed median - a damped half-step, never a snap, so one noisy window
//! cannot destabilize the state machine it feeds.

use crate::engine::state_machine::ProtectionState;
use statrs::statistics::{Data, OrderStatistics};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Samples buffered before a correction check may run.
const MIN_SAMPLES: usize = 10;

/// Rolling buffer capacity.
const MAX_SAMPLES: usize = 20;

/// Relative drift that must be exceeded before the baseline moves.
const DRIFT_THRESHOLD: f64 = 0.5;

/// Interval between correction checks.
const CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Passive observer of stable samples that periodically proposes a corrected
/// baseline.
#[derive(Debug)]
pub struct BaselineCorrector {
    observed_areas: VecDeque<f64>,
    last_check: Instant,
}

impl BaselineCorrector {
    pub fn new(now: Instant) -> Self {
        Self {
            observed_areas: VecDeque::with_capacity(MAX_SAMPLES),
            last_check: now,
        }
    }

    /// Record one cycle's smoothed area. Only Safe-with-face samples qualify;
    /// Warning/Blocked samples are close-up readings that would contaminate
    /// the baseline.
    pub fn observe(&mut self, state: ProtectionState, smoothed_area: f64, face_detected: bool) {
        if state != ProtectionState::Safe || !face_detected {
            return;
        }
        self.observed_areas.push_back(smoothed_area);
        if self.observed_areas.len() > MAX_SAMPLES {
            self.observed_areas.pop_front();
        }
    }

    /// Check whether the baseline should be corrected, returning the new
    /// value if so.
    ///
    /// A check runs once the interval has elapsed and enough samples are
    /// buffered; with fewer samples the check stays pending until the buffer
    /// fills. The correction is the damped half-step
    /// `(baseline + median) / 2`.
    pub fn maybe_correct(&mut self, now: Instant, baseline: f64) -> Option<f64> {
        if now.duration_since(self.last_check) < CHECK_INTERVAL {
            return None;
        }
        if self.observed_areas.len() < MIN_SAMPLES {
            return None;
        }
        self.last_check = now;

        let median = self.median();
        let drift = if baseline > 0.0 {
            (median - baseline).abs() / baseline
        } else if median > 0.0 {
            // Uncalibrated baseline: any observed usage counts as full drift.
            1.0
        } else {
            0.0
        };

        if drift > DRIFT_THRESHOLD {
            Some((baseline + median) / 2.0)
        } else {
            None
        }
    }

    /// Number of buffered samples.
    pub fn sample_count(&self) -> usize {
        self.observed_areas.len()
    }

    fn median(&self) -> f64 {
        let mut data = Data::new(self.observed_areas.iter().copied().collect::<Vec<_>>());
        data.median()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(now: Instant, value: f64, count: usize) -> BaselineCorrector {
        let mut corrector = BaselineCorrector::new(now);
        for _ in 0..count {
            corrector.observe(ProtectionState::Safe, value, true);
        }
        corrector
    }

    #[test]
    fn test_only_safe_face_samples_buffered() {
        let mut corrector = BaselineCorrector::new(Instant::now());
        corrector.observe(ProtectionState::Warning, 0.3, true);
        corrector.observe(ProtectionState::Blocked, 0.3, true);
        corrector.observe(ProtectionState::Safe, 0.3, false);
        assert_eq!(corrector.sample_count(), 0);

        corrector.observe(ProtectionState::Safe, 0.1, true);
        assert_eq!(corrector.sample_count(), 1);
    }

    #[test]
    fn test_buffer_bounded_at_capacity() {
        let corrector = filled(Instant::now(), 0.1, 50);
        assert_eq!(corrector.sample_count(), MAX_SAMPLES);
    }

    #[test]
    fn test_no_check_before_interval() {
        let t0 = Instant::now();
        let mut corrector = filled(t0, 0.2, 10);
        assert_eq!(corrector.maybe_correct(t0 + Duration::from_secs(29), 0.1), None);
    }

    #[test]
    fn test_no_check_with_few_samples() {
        let t0 = Instant::now();
        let mut corrector = filled(t0, 0.2, 9);
        assert_eq!(corrector.maybe_correct(t0 + Duration::from_secs(31), 0.1), None);
    }

    #[test]
    fn test_stable_median_leaves_baseline_alone() {
        let t0 = Instant::now();
        // Median 0.13 against baseline 0.10: 30% drift, under the threshold.
        let mut corrector = filled(t0, 0.13, 10);
        assert_eq!(corrector.maybe_correct(t0 + Duration::from_secs(31), 0.1), None);
    }

    #[test]
    fn test_damped_half_step_convergence() {
        let t0 = Instant::now();
        // Median 0.20 against baseline 0.10: 100% drift. One cycle yields
        // 0.15, not a snap to 0.20.
        let mut corrector = filled(t0, 0.2, 10);
        let corrected = corrector
            .maybe_correct(t0 + Duration::from_secs(31), 0.1)
            .expect("drift above threshold must correct");
        assert!((corrected - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_check_rearms_after_interval() {
        let t0 = Instant::now();
        let mut corrector = filled(t0, 0.2, 10);

        let first = corrector.maybe_correct(t0 + Duration::from_secs(31), 0.1);
        assert!(first.is_some());

        // Interval restarts from the check that just ran.
        assert_eq!(corrector.maybe_correct(t0 + Duration::from_secs(40), 0.15), None);
        let second = corrector.maybe_correct(t0 + Duration::from_secs(62), 0.15);
        // Median 0.2 vs 0.15 is ~33% drift: no further correction.
        assert_eq!(second, None);
    }

    #[test]
    fn test_zero_baseline_bootstraps_toward_median() {
        let t0 = Instant::now();
        let mut corrector = filled(t0, 0.2, 10);
        let corrected = corrector.maybe_correct(t0 + Duration::from_secs(31), 0.0);
        assert_eq!(corrected, Some(0.1));
    }

    #[test]
    fn test_zero_baseline_zero_median_is_noop() {
        let t0 = Instant::now();
        let mut corrector = filled(t0, 0.0, 10);
        assert_eq!(corrector.maybe_correct(t0 + Duration::from_secs(31), 0.0), None);
    }
}
