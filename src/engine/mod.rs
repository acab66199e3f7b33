//! Core protection engine: sampling, smoothing, decision, correction.

pub mod baseline;
pub mod corrector;
pub mod pipeline;
pub mod sampler;
pub mod smoothing;
pub mod state_machine;

pub use baseline::{create_shared_baseline, BaselineStore, SharedBaseline};
pub use corrector::BaselineCorrector;
pub use pipeline::ProximityEngine;
pub use sampler::AdaptiveSampler;
pub use smoothing::SmoothingFilter;
pub use state_machine::{Intent, ProtectionState, ProtectionStateMachine};
