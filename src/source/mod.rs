//! Face-observation sources for the protection pipeline.
//!
//! Real deployments plug a camera + detector in here; this crate ships a
//! simulated source so the pipeline can be exercised without either.

pub mod simulated;
pub mod types;

// Re-export commonly used types
pub use simulated::{SimulatedSource, SimulatedSourceConfig, SourceError};
pub use types::{FaceDetection, Observation};
