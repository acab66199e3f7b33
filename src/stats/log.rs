//! Protection statistics log.
//!
//! Counts discrete protection events and duration deltas without retaining
//! anything about the observations themselves. The core increments; readers
//! consume. Persistence is a plain JSON file so `status` can report
//! cumulative numbers across sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Statistics sink for protection events.
#[derive(Debug)]
pub struct ProtectionLog {
    /// Observations offered to the pipeline
    observations_received: AtomicU64,
    /// Observations that passed the adaptive sampler
    observations_accepted: AtomicU64,
    /// Warning-state entries
    warning_events: AtomicU64,
    /// Blocked-state entries
    block_events: AtomicU64,
    /// Total seconds spent blocked
    blocked_seconds: AtomicU64,
    /// Baseline corrections applied by the drift corrector
    baseline_corrections: AtomicU64,
    /// Session identity
    session_id: Uuid,
    /// Session start time
    session_start: DateTime<Utc>,
    /// Path for persisting stats
    persist_path: Option<PathBuf>,
}

impl ProtectionLog {
    /// Create a new log for a fresh session.
    pub fn new() -> Self {
        Self {
            observations_received: AtomicU64::new(0),
            observations_accepted: AtomicU64::new(0),
            warning_events: AtomicU64::new(0),
            block_events: AtomicU64::new(0),
            blocked_seconds: AtomicU64::new(0),
            baseline_corrections: AtomicU64::new(0),
            session_id: Uuid::new_v4(),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create a log with persistence, seeded from any previous totals.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut log = Self::new();
        log.persist_path = Some(path);

        if let Err(e) = log.load() {
            eprintln!("Note: Could not load previous protection stats: {e}");
        }

        log
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn record_observation_received(&self) {
        self.observations_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_observation_accepted(&self) {
        self.observations_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Called once per Warning entry; the state machine guarantees at most
    /// one per episode.
    pub fn record_warning_event(&self) {
        self.warning_events.fetch_add(1, Ordering::Relaxed);
    }

    /// Called once per Blocked entry.
    pub fn record_block_event(&self) {
        self.block_events.fetch_add(1, Ordering::Relaxed);
    }

    /// Accumulate time spent blocked, recorded on release.
    pub fn record_blocked_seconds(&self, seconds: u64) {
        self.blocked_seconds.fetch_add(seconds, Ordering::Relaxed);
    }

    pub fn record_baseline_correction(&self) {
        self.baseline_corrections.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> ProtectionStats {
        ProtectionStats {
            observations_received: self.observations_received.load(Ordering::Relaxed),
            observations_accepted: self.observations_accepted.load(Ordering::Relaxed),
            warning_events: self.warning_events.load(Ordering::Relaxed),
            block_events: self.block_events.load(Ordering::Relaxed),
            blocked_seconds: self.blocked_seconds.load(Ordering::Relaxed),
            baseline_corrections: self.baseline_corrections.load(Ordering::Relaxed),
            session_id: self.session_id,
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Session Statistics:\n\
             - Observations received: {}\n\
             - Observations accepted: {}\n\
             - Warnings issued: {}\n\
             - Screen blocks: {}\n\
             - Time spent blocked: {} seconds\n\
             - Baseline corrections: {}\n\
             - Session duration: {} seconds\n\
             \n\
             Privacy Guarantee:\n\
             - No imagery stored or transmitted\n\
             - Only normalized face-box areas processed",
            stats.observations_received,
            stats.observations_accepted,
            stats.warning_events,
            stats.block_events,
            stats.blocked_seconds,
            stats.baseline_corrections,
            stats.session_duration_secs
        )
    }

    /// Save stats to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.stats();
            let persisted = PersistedStats {
                observations_received: stats.observations_received,
                observations_accepted: stats.observations_accepted,
                warning_events: stats.warning_events,
                block_events: stats.block_events,
                blocked_seconds: stats.blocked_seconds,
                baseline_corrections: stats.baseline_corrections,
                last_session_id: stats.session_id,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;

            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Load stats from disk.
    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.observations_received
                    .store(persisted.observations_received, Ordering::Relaxed);
                self.observations_accepted
                    .store(persisted.observations_accepted, Ordering::Relaxed);
                self.warning_events
                    .store(persisted.warning_events, Ordering::Relaxed);
                self.block_events
                    .store(persisted.block_events, Ordering::Relaxed);
                self.blocked_seconds
                    .store(persisted.blocked_seconds, Ordering::Relaxed);
                self.baseline_corrections
                    .store(persisted.baseline_corrections, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.observations_received.store(0, Ordering::Relaxed);
        self.observations_accepted.store(0, Ordering::Relaxed);
        self.warning_events.store(0, Ordering::Relaxed);
        self.block_events.store(0, Ordering::Relaxed);
        self.blocked_seconds.store(0, Ordering::Relaxed);
        self.baseline_corrections.store(0, Ordering::Relaxed);
    }
}

impl Default for ProtectionLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of protection statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectionStats {
    pub observations_received: u64,
    pub observations_accepted: u64,
    pub warning_events: u64,
    pub block_events: u64,
    pub blocked_seconds: u64,
    pub baseline_corrections: u64,
    pub session_id: Uuid,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Stats format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    observations_received: u64,
    observations_accepted: u64,
    warning_events: u64,
    block_events: u64,
    blocked_seconds: u64,
    baseline_corrections: u64,
    last_session_id: Uuid,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared protection log.
pub type SharedProtectionLog = Arc<ProtectionLog>;

/// Create a new shared protection log with persistence.
pub fn create_shared_log_with_persistence(path: PathBuf) -> SharedProtectionLog {
    Arc::new(ProtectionLog::with_persistence(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_counting() {
        let log = ProtectionLog::new();

        log.record_warning_event();
        log.record_warning_event();
        log.record_block_event();
        log.record_blocked_seconds(12);

        let stats = log.stats();
        assert_eq!(stats.warning_events, 2);
        assert_eq!(stats.block_events, 1);
        assert_eq!(stats.blocked_seconds, 12);
    }

    #[test]
    fn test_reset() {
        let log = ProtectionLog::new();
        log.record_warning_event();
        log.record_block_event();
        log.record_baseline_correction();
        log.reset();

        let stats = log.stats();
        assert_eq!(stats.warning_events, 0);
        assert_eq!(stats.block_events, 0);
        assert_eq!(stats.baseline_corrections, 0);
    }

    #[test]
    fn test_distinct_session_ids() {
        let a = ProtectionLog::new();
        let b = ProtectionLog::new();
        assert_ne!(a.session_id(), b.session_id());
    }

    #[test]
    fn test_summary_format() {
        let log = ProtectionLog::new();
        let summary = log.summary();

        assert!(summary.contains("Warnings issued"));
        assert!(summary.contains("Screen blocks"));
        assert!(summary.contains("Privacy Guarantee"));
        assert!(summary.contains("No imagery stored"));
    }
}
