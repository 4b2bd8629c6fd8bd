//! Scan configuration.
//!
//! Frame rate, decode region and cooldown have fixed defaults taken from
//! the check-in product; callers rarely need to change them.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for a capture+decode session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Target frames analyzed per second.
    pub fps: u32,
    /// Side length of the centered decode region of interest, in logical
    /// pixels.
    pub roi_size: u32,
    /// Aspect ratio of the decode region (width / height).
    pub aspect_ratio: f32,
    /// Cooldown window after a forwarded scan, in milliseconds.
    pub cooldown_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            fps: 10,
            roi_size: 250,
            aspect_ratio: 1.0,
            cooldown_ms: 2000,
        }
    }
}

impl ScanConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 || self.fps > 120 {
            return Err(ConfigError::InvalidFrameRate);
        }
        if self.roi_size == 0 {
            return Err(ConfigError::InvalidRegion);
        }
        if !self.aspect_ratio.is_finite() || self.aspect_ratio <= 0.0 {
            return Err(ConfigError::InvalidAspectRatio);
        }
        Ok(())
    }

    /// Returns the pacing interval between analyzed frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps))
    }

    /// Returns the cooldown window duration.
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid frame rate (must be 1-120 fps)")]
    InvalidFrameRate,
    #[error("invalid decode region size")]
    InvalidRegion,
    #[error("invalid aspect ratio")]
    InvalidAspectRatio,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub exporter: ExporterConfig,
}

/// Metrics exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Metrics server port (0 to disable).
    pub metrics_port: u16,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self { metrics_port: 9090 }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: FileConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.scan.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = ScanConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fps, 10);
        assert_eq!(config.roi_size, 250);
        assert_eq!(config.cooldown_ms, 2000);
    }

    #[test]
    fn test_zero_fps_invalid() {
        let mut config = ScanConfig::default();
        config.fps = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFrameRate)
        ));
    }

    #[test]
    fn test_zero_roi_invalid() {
        let mut config = ScanConfig::default();
        config.roi_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRegion)));
    }

    #[test]
    fn test_negative_aspect_invalid() {
        let mut config = ScanConfig::default();
        config.aspect_ratio = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAspectRatio)
        ));
    }

    #[test]
    fn test_frame_interval() {
        let config = ScanConfig::default();
        assert_eq!(config.frame_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_file_config_parses() {
        let toml_text = r#"
            [scan]
            fps = 15
            roi_size = 300
            aspect_ratio = 1.0
            cooldown_ms = 1500

            [exporter]
            metrics_port = 0
        "#;
        let config: FileConfig = toml::from_str(toml_text).unwrap();
        assert_eq!(config.scan.fps, 15);
        assert_eq!(config.scan.cooldown_ms, 1500);
        assert_eq!(config.exporter.metrics_port, 0);
    }

    #[test]
    fn test_file_config_defaults_missing_sections() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.scan.fps, 10);
        assert_eq!(config.exporter.metrics_port, 9090);
    }
}
