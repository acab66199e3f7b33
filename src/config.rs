//! Configuration for the proximity guard.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Protection thresholds supplied at session start.
///
/// Immutable for the life of a session, except `baseline_area`, which the
/// drift corrector may rewrite (and persist back here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectionConfig {
    /// Calibrated normalized face area at a comfortable distance
    pub baseline_area: f64,
    /// Area multiple that signals "too close" (must be > 1)
    pub threshold_factor: f64,
    /// Shrinks the exit threshold below the enter threshold
    pub hysteresis_gap: f64,
    /// Seconds a warning must persist before the screen blocks
    pub warning_time_secs: u64,
    /// Detector confidence floor applied upstream
    pub detection_threshold: f64,
    /// Whether block entry triggers haptic feedback
    pub haptics_enabled: bool,
}

impl Default for ProtectionConfig {
    fn default() -> Self {
        Self {
            baseline_area: 0.0, // uncalibrated until `calibrate` runs
            threshold_factor: 1.8,
            hysteresis_gap: 0.2,
            warning_time_secs: 3,
            detection_threshold: 0.5,
            haptics_enabled: true,
        }
    }
}

/// Adaptive sampling knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Accept one frame out of this many at the base rate
    pub frame_skip_count: u64,
    /// Relative area change below which a reading counts as stable
    pub stability_threshold: f64,
    /// Consecutive stable readings before the skip count doubles
    pub stable_count_for_slowdown: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            frame_skip_count: 2,
            stability_threshold: 0.05,
            stable_count_for_slowdown: 10,
        }
    }
}

/// Main configuration for the proximity guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub protection: ProtectionConfig,
    pub sampling: SamplingConfig,
    /// Moving-average window over accepted raw areas
    pub smoothing_window: usize,
    /// Path for storing state and statistics
    pub data_path: PathBuf,
    /// Whether protection is currently paused
    pub paused: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("proximity-guard");

        Self {
            protection: ProtectionConfig::default(),
            sampling: SamplingConfig::default(),
            smoothing_window: 5,
            data_path: data_dir,
            paused: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("proximity-guard")
            .join("config.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Validate the configuration at session start. The hot path assumes a
    /// valid configuration once running.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.protection;
        if p.threshold_factor <= 1.0 {
            return Err(ConfigError::Invalid(format!(
                "threshold_factor must be > 1.0, got {}",
                p.threshold_factor
            )));
        }
        if p.hysteresis_gap < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "hysteresis_gap must be >= 0, got {}",
                p.hysteresis_gap
            )));
        }
        if p.baseline_area < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "baseline_area must be >= 0, got {}",
                p.baseline_area
            )));
        }
        if !(0.0..=1.0).contains(&p.detection_threshold) {
            return Err(ConfigError::Invalid(format!(
                "detection_threshold must be in [0, 1], got {}",
                p.detection_threshold
            )));
        }
        if self.sampling.frame_skip_count == 0 {
            return Err(ConfigError::Invalid(
                "frame_skip_count must be >= 1".to_string(),
            ));
        }
        if self.sampling.stability_threshold <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "stability_threshold must be > 0, got {}",
                self.sampling.stability_threshold
            )));
        }
        if self.smoothing_window == 0 {
            return Err(ConfigError::Invalid(
                "smoothing_window must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.smoothing_window, 5);
        assert_eq!(config.sampling.frame_skip_count, 2);
        assert!(!config.paused);
    }

    #[test]
    fn test_degenerate_threshold_factor_rejected() {
        let mut config = Config::default();
        config.protection.threshold_factor = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_hysteresis_rejected() {
        let mut config = Config::default();
        config.protection.hysteresis_gap = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_frame_skip_rejected() {
        let mut config = Config::default();
        config.sampling.frame_skip_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed.protection.threshold_factor,
            config.protection.threshold_factor
        );
        assert_eq!(parsed.smoothing_window, config.smoothing_window);
    }
}
