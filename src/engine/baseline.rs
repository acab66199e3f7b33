//! Shared baseline cell.
//!
//! The state machine reads the baseline every decision cycle and the
//! corrector occasionally rewrites it. The value is swapped whole through an
//! atomic bit pattern - replace, not mutate - so a reader can never see a
//! partially written float.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Holds the calibrated baseline area for the session.
#[derive(Debug)]
pub struct BaselineStore {
    area_bits: AtomicU64,
}

impl BaselineStore {
    pub fn new(baseline_area: f64) -> Self {
        Self {
            area_bits: AtomicU64::new(baseline_area.max(0.0).to_bits()),
        }
    }

    /// Current baseline area. Callers re-read this each cycle; caching across
    /// cycles would miss corrector updates.
    pub fn area(&self) -> f64 {
        f64::from_bits(self.area_bits.load(Ordering::Relaxed))
    }

    /// Replace the baseline with a new value.
    pub fn set_area(&self, baseline_area: f64) {
        self.area_bits
            .store(baseline_area.max(0.0).to_bits(), Ordering::Relaxed);
    }
}

/// Thread-safe shared baseline store.
pub type SharedBaseline = Arc<BaselineStore>;

/// Create a new shared baseline store.
pub fn create_shared_baseline(baseline_area: f64) -> SharedBaseline {
    Arc::new(BaselineStore::new(baseline_area))
}
