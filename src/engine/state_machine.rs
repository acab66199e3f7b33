//! Hysteretic warn/block state machine.
//!
//! Transitions are driven exclusively by the smoothed area against derived
//! thresholds and by wall-clock warning duration. The only cycle is
//! `Safe -> Warning -> Blocked -> Safe`; a block always releases through
//! Safe, never back to Warning.

use std::time::{Duration, Instant};

/// Protection state for the current session.
///
/// `Safe` covers both "no face" and "face at a safe distance" - behaviorally
/// identical, distinguished only for status messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectionState {
    Safe,
    Warning,
    Blocked,
}

/// Fire-and-forget side-effect intents emitted by a decision cycle.
///
/// The core decides *when*; external collaborators decide *how*. Each
/// record-event intent is emitted at most once per state entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    ShowOverlay,
    HideOverlay,
    TriggerHapticFeedback,
    RecordWarningEvent,
    RecordBlockEvent,
    UpdateStatusMessage(String),
    PersistBaseline(f64),
}

/// The central decision component: consumes smoothed area + baseline +
/// configuration, emits state transitions and intents.
#[derive(Debug)]
pub struct ProtectionStateMachine {
    state: ProtectionState,
    warning_started: Option<Instant>,
    threshold_factor: f64,
    hysteresis_gap: f64,
    warning_time: Duration,
    haptics_enabled: bool,
}

impl ProtectionStateMachine {
    pub fn new(
        threshold_factor: f64,
        hysteresis_gap: f64,
        warning_time: Duration,
        haptics_enabled: bool,
    ) -> Self {
        Self {
            state: ProtectionState::Safe,
            warning_started: None,
            threshold_factor,
            hysteresis_gap,
            warning_time,
            haptics_enabled,
        }
    }

    pub fn state(&self) -> ProtectionState {
        self.state
    }

    /// Derived (enter, exit) thresholds for the given baseline.
    ///
    /// The 1.0 floor on the exit factor guarantees exit <= enter and both
    /// >= baseline, so the band can never invert.
    pub fn thresholds(&self, baseline: f64) -> (f64, f64) {
        let enter = baseline * self.threshold_factor;
        let exit = baseline * (self.threshold_factor - self.hysteresis_gap).max(1.0);
        (enter, exit)
    }

    /// Run one decision cycle.
    ///
    /// The baseline is re-read by the caller each cycle; a zero baseline is
    /// degenerate-but-defined (any face immediately exceeds threshold).
    pub fn evaluate(
        &mut self,
        smoothed_area: f64,
        face_detected: bool,
        baseline: f64,
        now: Instant,
    ) -> Vec<Intent> {
        let (enter, exit) = self.thresholds(baseline);
        let mut intents = Vec::new();

        match self.state {
            ProtectionState::Safe => {
                if face_detected && smoothed_area > enter {
                    self.state = ProtectionState::Warning;
                    self.warning_started = Some(now);
                    intents.push(Intent::RecordWarningEvent);
                    intents.push(Intent::UpdateStatusMessage(warning_message(
                        smoothed_area,
                        baseline,
                    )));
                }
            }
            ProtectionState::Warning => {
                if !face_detected || smoothed_area < exit {
                    // Warning cancelled; no block occurred.
                    self.state = ProtectionState::Safe;
                    self.warning_started = None;
                    intents.push(Intent::UpdateStatusMessage(
                        "Monitoring: safe distance restored".to_string(),
                    ));
                } else if smoothed_area > enter && self.warning_elapsed(now) {
                    self.state = ProtectionState::Blocked;
                    self.warning_started = None;
                    intents.push(Intent::ShowOverlay);
                    if self.haptics_enabled {
                        intents.push(Intent::TriggerHapticFeedback);
                    }
                    intents.push(Intent::RecordBlockEvent);
                    intents.push(Intent::UpdateStatusMessage(
                        "Too close! Screen blocked until you move back.".to_string(),
                    ));
                }
                // Between exit and enter, or above enter with the timer still
                // running: remain in Warning without resetting the timer.
            }
            ProtectionState::Blocked => {
                if !face_detected || smoothed_area < exit {
                    self.state = ProtectionState::Safe;
                    intents.push(Intent::HideOverlay);
                    intents.push(Intent::UpdateStatusMessage(
                        "Monitoring: safe distance restored".to_string(),
                    ));
                }
            }
        }

        intents
    }

    /// Human-readable status line for the current state.
    pub fn status_line(&self, face_detected: bool) -> String {
        match self.state {
            ProtectionState::Safe if face_detected => "Monitoring: face at safe distance".into(),
            ProtectionState::Safe => "Monitoring: no face detected".into(),
            ProtectionState::Warning => "Warning: too close to the screen".into(),
            ProtectionState::Blocked => "Blocked: move back to release".into(),
        }
    }

    fn warning_elapsed(&self, now: Instant) -> bool {
        match self.warning_started {
            Some(started) => now.duration_since(started) >= self.warning_time,
            None => false,
        }
    }
}

fn warning_message(smoothed_area: f64, baseline: f64) -> String {
    if baseline > 0.0 {
        let pct = (smoothed_area / baseline - 1.0) * 100.0;
        format!("Warning: Face {pct:.0}% closer than baseline!")
    } else {
        "Warning: face detected with no calibrated baseline".to_string()
    }
}
