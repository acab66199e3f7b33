//! Moving-average smoothing over raw face areas.
//!
//! Raw per-frame area is noisy (detector jitter, micro-movement); a short
//! moving average trades about a frame of latency for materially fewer
//! spurious state transitions downstream.

use crate::source::types::Observation;
use std::collections::VecDeque;

/// Fixed-size moving-average window over accepted raw areas.
#[derive(Debug)]
pub struct SmoothingFilter {
    window: VecDeque<f64>,
    window_size: usize,
}

impl SmoothingFilter {
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            window: VecDeque::with_capacity(window_size),
            window_size,
        }
    }

    /// Ingest one observation and return the smoothed area.
    ///
    /// A no-face observation clears the window entirely and yields 0.0, so a
    /// stale average can never linger across a face loss.
    pub fn ingest(&mut self, observation: &Observation) -> f64 {
        if !observation.face_detected {
            self.window.clear();
            return 0.0;
        }

        self.window.push_back(observation.normalized_area);
        if self.window.len() > self.window_size {
            self.window.pop_front();
        }

        self.window.iter().sum::<f64>() / self.window.len() as f64
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }
}
