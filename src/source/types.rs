//! Observation types consumed by the protection pipeline.
//!
//! An observation carries ONLY a normalized bounding-box area - never pixels,
//! landmarks, or anything that could identify a face.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw detector output for a single frame: the primary face's bounding-box
/// area relative to frame area, plus the detector's confidence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FaceDetection {
    /// Bounding-box area divided by frame area, in [0, 1]
    pub normalized_area: f64,
    /// Detector confidence in [0, 1]
    pub confidence: f64,
}

impl FaceDetection {
    pub fn new(normalized_area: f64, confidence: f64) -> Self {
        Self {
            normalized_area: normalized_area.clamp(0.0, 1.0),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// A single per-frame observation fed into the pipeline.
///
/// Privacy guarantee: no imagery is retained. An observation is a boolean
/// and one float, discarded once it leaves the smoothing window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Observation {
    /// Timestamp when the frame was observed
    pub timestamp: DateTime<Utc>,
    /// Whether a face passed the detection confidence floor
    pub face_detected: bool,
    /// Normalized face area in [0, 1]; 0.0 when no face was detected
    pub normalized_area: f64,
}

impl Observation {
    /// Create an observation for a detected face.
    pub fn face(normalized_area: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            face_detected: true,
            normalized_area: normalized_area.clamp(0.0, 1.0),
        }
    }

    /// Create an observation for a frame without a usable face.
    pub fn no_face() -> Self {
        Self {
            timestamp: Utc::now(),
            face_detected: false,
            normalized_area: 0.0,
        }
    }

    /// Convert a raw detector result into an observation, applying the
    /// confidence floor. A detection below the floor counts as no face.
    pub fn from_detection(detection: Option<FaceDetection>, detection_threshold: f64) -> Self {
        match detection {
            Some(d) if d.confidence >= detection_threshold => Self::face(d.normalized_area),
            _ => Self::no_face(),
        }
    }
}
