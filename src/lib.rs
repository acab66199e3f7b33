//! Proximity Guard - screen-distance protection from face-area observations.
//!
//! This library infers how close a user sits to their screen from a proxy
//! signal - the normalized area of a detected face bounding box - and turns
//! that noisy, variable-rate signal into a stable protective decision:
//! warn, then block, then release.
//!
//! # Privacy Guarantees
//!
//! - **No imagery**: frames never enter this crate; only normalized areas do
//! - **No identity**: no recognition, no landmarks, no biometrics
//! - **No retention**: an observation lives only as long as the smoothing
//!   window
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Proximity Guard                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌─────────┐   ┌──────────┐   ┌──────────────┐  │
//! │  │  Source  │──▶│ Sampler │──▶│ Smoother │──▶│ State Machine│  │
//! │  │ (camera) │   │ (skip)  │   │ (mean 5) │   │ (warn/block) │  │
//! │  └──────────┘   └─────────┘   └──────────┘   └──────┬───────┘  │
//! │                                     │               │          │
//! │                                     ▼               ▼          │
//! │                              ┌───────────┐   ┌────────────┐    │
//! │                              │ Corrector │   │  Intents   │    │
//! │                              │ (baseline)│   │ (overlay…) │    │
//! │                              └───────────┘   └────────────┘    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::time::Instant;
//! use proximity_guard::{
//!     config::Config,
//!     engine::{create_shared_baseline, ProximityEngine},
//!     source::Observation,
//! };
//!
//! let config = Config::default();
//! let baseline = create_shared_baseline(0.1);
//! let mut engine = ProximityEngine::new(
//!     &config.protection,
//!     &config.sampling,
//!     config.smoothing_window,
//!     baseline,
//!     Instant::now(),
//! );
//!
//! let intents = engine.process(&Observation::face(0.15), Instant::now());
//! for intent in intents {
//!     println!("{intent:?}");
//! }
//! ```

pub mod config;
pub mod engine;
pub mod source;
pub mod stats;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError, ProtectionConfig, SamplingConfig};
pub use engine::{
    create_shared_baseline, AdaptiveSampler, BaselineCorrector, BaselineStore, Intent,
    ProtectionState, ProtectionStateMachine, ProximityEngine, SharedBaseline, SmoothingFilter,
};
pub use source::{FaceDetection, Observation, SimulatedSource, SimulatedSourceConfig};
pub use stats::{create_shared_log_with_persistence, ProtectionLog, ProtectionStats};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Privacy declaration that can be displayed to users.
pub const PRIVACY_DECLARATION: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║            PROXIMITY GUARD - PRIVACY DECLARATION                 ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  This guard watches how close you sit to the screen.             ║
║                                                                  ║
║  ✓ WHAT WE PROCESS:                                              ║
║    • The size of a detected face box relative to the frame       ║
║    • Whether a face is currently visible                         ║
║                                                                  ║
║  ✗ WHAT WE NEVER DO:                                             ║
║    • Store or transmit camera frames                             ║
║    • Recognize or identify faces                                 ║
║    • Keep any reading beyond a five-frame smoothing window       ║
║                                                                  ║
║  All processing happens locally. Statistics are event counts     ║
║  only (warnings, blocks, time blocked).                          ║
║                                                                  ║
║  You can view protection statistics anytime with:                ║
║    proximity-guard status                                        ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privacy_declaration_contents() {
        assert!(PRIVACY_DECLARATION.contains("PRIVACY"));
        assert!(PRIVACY_DECLARATION.contains("NEVER"));
        assert!(PRIVACY_DECLARATION.contains("camera frames"));
    }
}
