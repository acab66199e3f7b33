//! Adaptive frame sampling for battery efficiency.
//!
//! When recent readings are stable the sampler doubles its skip count, so a
//! user sitting still costs half the inference work. Any unstable reading
//! restores the base rate immediately.

use crate::source::types::Observation;

/// Decides, per observation opportunity, whether the pipeline processes the
/// frame or discards it.
#[derive(Debug)]
pub struct AdaptiveSampler {
    /// Every call increments this, accepted or not
    frame_counter: u64,
    /// Consecutive readings within the stability threshold
    consecutive_stable: u32,
    /// Previous area fed to `update_stability`
    last_area: f64,
    /// 1 at base rate, 2 when slowed down
    skip_multiplier: u64,
    /// Base skip count: accept one frame out of this many
    frame_skip_count: u64,
    /// Relative change below which a reading counts as stable
    stability_threshold: f64,
    /// Stable readings required before slowing down
    stable_count_for_slowdown: u32,
}

impl AdaptiveSampler {
    pub fn new(
        frame_skip_count: u64,
        stability_threshold: f64,
        stable_count_for_slowdown: u32,
    ) -> Self {
        Self {
            frame_counter: 0,
            consecutive_stable: 0,
            last_area: 0.0,
            skip_multiplier: 1,
            frame_skip_count: frame_skip_count.max(1),
            stability_threshold,
            stable_count_for_slowdown,
        }
    }

    /// Whether to process this observation. Advisory for polling cadence,
    /// never a correctness gate.
    pub fn accept(&mut self, _observation: &Observation) -> bool {
        self.frame_counter += 1;
        let effective_skip = self.frame_skip_count * self.skip_multiplier;
        self.frame_counter % effective_skip == 0
    }

    /// Feed the smoothed area back in after the decision cycle. Stability is
    /// measured on the same signal the state machine sees, not raw per-frame
    /// noise.
    pub fn update_stability(&mut self, area: f64) {
        // A zero previous reading (startup, face loss) counts as unstable.
        let relative_change = if self.last_area == 0.0 {
            1.0
        } else {
            (area - self.last_area).abs() / self.last_area
        };

        if relative_change < self.stability_threshold {
            self.consecutive_stable += 1;
            if self.consecutive_stable >= self.stable_count_for_slowdown {
                self.skip_multiplier = 2;
            }
        } else {
            self.consecutive_stable = 0;
            self.skip_multiplier = 1;
        }

        self.last_area = area;
    }

    /// Current skip multiplier (1 or 2).
    pub fn skip_multiplier(&self) -> u64 {
        self.skip_multiplier
    }

    /// Frames handed to `accept` so far, including discarded ones.
    pub fn frames_seen(&self) -> u64 {
        self.frame_counter
    }

    /// Effective skip count right now.
    pub fn effective_skip(&self) -> u64 {
        self.frame_skip_count * self.skip_multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs() -> Observation {
        Observation::face(0.1)
    }

    #[test]
    fn test_accepts_every_nth_frame() {
        let mut sampler = AdaptiveSampler::new(2, 0.05, 10);

        let accepted: Vec<bool> = (0..6).map(|_| sampler.accept(&obs())).collect();
        assert_eq!(accepted, vec![false, true, false, true, false, true]);
        assert_eq!(sampler.frames_seen(), 6);
    }

    #[test]
    fn test_skip_count_of_one_accepts_all() {
        let mut sampler = AdaptiveSampler::new(1, 0.05, 10);
        for _ in 0..10 {
            assert!(sampler.accept(&obs()));
        }
    }

    #[test]
    fn test_slowdown_after_stable_streak() {
        let mut sampler = AdaptiveSampler::new(2, 0.05, 10);

        // First reading is unstable by definition (last_area == 0).
        sampler.update_stability(0.10);
        assert_eq!(sampler.skip_multiplier(), 1);

        // Ten readings within 5% of the previous one.
        for _ in 0..10 {
            sampler.update_stability(0.10);
        }
        assert_eq!(sampler.skip_multiplier(), 2);
        assert_eq!(sampler.effective_skip(), 4);
    }

    #[test]
    fn test_unstable_reading_resets() {
        let mut sampler = AdaptiveSampler::new(2, 0.05, 10);
        sampler.update_stability(0.10);
        for _ in 0..10 {
            sampler.update_stability(0.10);
        }
        assert_eq!(sampler.skip_multiplier(), 2);

        // >5% jump drops straight back to base rate.
        sampler.update_stability(0.12);
        assert_eq!(sampler.skip_multiplier(), 1);
        assert_eq!(sampler.effective_skip(), 2);

        // The streak restarts from zero.
        for _ in 0..9 {
            sampler.update_stability(0.12);
        }
        assert_eq!(sampler.skip_multiplier(), 1);
        sampler.update_stability(0.12);
        assert_eq!(sampler.skip_multiplier(), 2);
    }

    #[test]
    fn test_zero_last_area_counts_as_unstable() {
        let mut sampler = AdaptiveSampler::new(2, 0.05, 1);
        sampler.update_stability(0.0);
        assert_eq!(sampler.skip_multiplier(), 1);
        sampler.update_stability(0.1);
        assert_eq!(sampler.skip_multiplier(), 1);
    }
}
