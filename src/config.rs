//! Configuration management for head-tilt tracking

use crate::constants::{
    DEFAULT_ANGLE_THRESHOLD, DEFAULT_CALIBRATION_SAMPLES, DEFAULT_COOLDOWN_MS, DEFAULT_DEAD_ZONE,
    DEFAULT_HOLD_DURATION_MS, DEFAULT_LEFT_KEYPOINT, DEFAULT_MIN_KEYPOINT_SCORE, DEFAULT_MOVING_AVERAGE_WINDOW,
    DEFAULT_NO_POSE_HINT_AFTER, DEFAULT_RIGHT_KEYPOINT, DEFAULT_TARGET_FPS,
};
use crate::gesture::GestureParams;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gesture thresholds and timing
    pub gesture: GestureConfig,

    /// Angle smoothing configuration
    pub smoothing: SmoothingConfig,

    /// Neutral calibration configuration
    pub calibration: CalibrationConfig,

    /// Detection loop configuration
    pub detection: DetectionConfig,
}

/// Gesture thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Deviation (degrees) a tilt must exceed
    pub angle_threshold: f64,

    /// Deviation (degrees) at or below which a pending tilt is cancelled
    pub dead_zone: f64,

    /// Milliseconds a tilt must be held before it fires
    pub hold_duration_ms: u64,

    /// Minimum milliseconds between two page turns
    pub cooldown_ms: u64,
}

/// Smoothing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Filter type (`moving_average` or `none`)
    pub method: String,

    /// Moving average window size
    pub window: usize,
}

/// Calibration configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Smoothed samples averaged into the neutral angle
    pub samples: usize,
}

/// Detection loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Target detection cycles per second
    pub target_fps: u32,

    /// Minimum keypoint confidence (0.0-1.0)
    pub min_keypoint_score: f64,

    /// Name of the left roll reference keypoint
    pub left_keypoint: String,

    /// Name of the right roll reference keypoint
    pub right_keypoint: String,

    /// Consecutive ticks without usable keypoints before hinting "no pose"
    pub no_pose_hint_after: u32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            angle_threshold: DEFAULT_ANGLE_THRESHOLD,
            dead_zone: DEFAULT_DEAD_ZONE,
            hold_duration_ms: DEFAULT_HOLD_DURATION_MS,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            method: "moving_average".to_string(),
            window: DEFAULT_MOVING_AVERAGE_WINDOW,
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_CALIBRATION_SAMPLES,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            min_keypoint_score: DEFAULT_MIN_KEYPOINT_SCORE,
            left_keypoint: DEFAULT_LEFT_KEYPOINT.to_string(),
            right_keypoint: DEFAULT_RIGHT_KEYPOINT.to_string(),
            no_pose_hint_after: DEFAULT_NO_POSE_HINT_AFTER,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Gesture state machine parameters
    #[must_use]
    pub const fn gesture_params(&self) -> GestureParams {
        GestureParams {
            angle_threshold: self.gesture.angle_threshold,
            dead_zone: self.gesture.dead_zone,
            hold_duration_ms: self.gesture.hold_duration_ms,
            cooldown_ms: self.gesture.cooldown_ms,
        }
    }

    /// Create the smoothing filter from configuration
    pub fn create_filter(&self) -> Result<Box<dyn crate::filters::AngleFilter>> {
        use crate::filters::{create_filter, moving_average::MovingAverageFilter};

        match self.smoothing.method.as_str() {
            "moving_average" if self.smoothing.window > 0 => {
                Ok(Box::new(MovingAverageFilter::new(self.smoothing.window)))
            }
            name => create_filter(name),
        }
    }

    /// Milliseconds between detection ticks
    #[must_use]
    pub fn tick_interval_ms(&self) -> u64 {
        (1000 / u64::from(self.detection.target_fps.max(1))).max(1)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Validate gesture thresholds
        self.gesture_params().validate()?;

        // Validate smoothing
        if self.smoothing.window == 0 {
            return Err(Error::ConfigError(
                "Smoothing window size must be greater than 0".to_string(),
            ));
        }
        if !matches!(self.smoothing.method.as_str(), "moving_average" | "none") {
            return Err(Error::ConfigError(format!(
                "Unknown smoothing method: {}",
                self.smoothing.method
            )));
        }

        // Validate calibration
        if self.calibration.samples == 0 {
            return Err(Error::ConfigError(
                "Calibration sample count must be greater than 0".to_string(),
            ));
        }

        // Validate detection settings
        if self.detection.target_fps == 0 {
            return Err(Error::ConfigError("Target FPS must be greater than 0".to_string()));
        }
        if self.detection.no_pose_hint_after == 0 {
            return Err(Error::ConfigError(
                "No-pose hint threshold must be at least 1 tick".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.detection.min_keypoint_score) {
            return Err(Error::ConfigError(
                "Minimum keypoint score must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.detection.left_keypoint.is_empty() || self.detection.right_keypoint.is_empty() {
            return Err(Error::ConfigError("Reference keypoint names must not be empty".to_string()));
        }
        if self.detection.left_keypoint == self.detection.right_keypoint {
            return Err(Error::ConfigError(
                "Left and right reference keypoints must differ".to_string(),
            ));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# nodturn configuration

# Gesture thresholds
gesture:
  angle_threshold: 45.0
  dead_zone: 15.0
  hold_duration_ms: 800
  cooldown_ms: 1500

# Roll angle smoothing
smoothing:
  method: "moving_average"
  window: 5

# Neutral posture calibration
calibration:
  samples: 30

# Detection loop
detection:
  target_fps: 30
  min_keypoint_score: 0.3
  left_keypoint: "left_ear"
  right_keypoint: "right_ear"
  no_pose_hint_after: 30
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_matches_defaults() {
        let parsed = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
        assert_eq!(parsed, Config::default());
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed = Config::from_yaml("gesture:\n  hold_duration_ms: 400\n").unwrap();
        assert_eq!(parsed.gesture.hold_duration_ms, 400);
        assert_eq!(parsed.gesture.angle_threshold, DEFAULT_ANGLE_THRESHOLD);
        assert_eq!(parsed.calibration.samples, DEFAULT_CALIBRATION_SAMPLES);
    }

    #[test]
    fn test_dead_zone_must_be_below_threshold() {
        let mut config = Config::default();
        config.gesture.dead_zone = config.gesture.angle_threshold;
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        config.smoothing.window = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.calibration.samples = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.detection.min_keypoint_score = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.detection.target_fps = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.smoothing.method = "kalman".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.detection.right_keypoint = config.detection.left_keypoint.clone();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.detection.no_pose_hint_after = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(Config::from_yaml("gesture: [1, 2").is_err());
        assert!(Config::from_yaml("gesture:\n  cooldown_ms: -5\n").is_err());
    }

    #[test]
    fn test_tick_interval() {
        let mut config = Config::default();
        assert_eq!(config.tick_interval_ms(), 33);
        config.detection.target_fps = 2000;
        assert_eq!(config.tick_interval_ms(), 1);
    }

    #[test]
    fn test_create_filter_from_config() {
        let mut config = Config::default();
        config.smoothing.window = 2;
        let mut filter = config.create_filter().unwrap();
        assert_eq!(filter.name(), "MovingAverageFilter");
        filter.apply(2.0);
        assert_eq!(filter.apply(4.0), 3.0);

        config.smoothing.method = "none".to_string();
        assert_eq!(config.create_filter().unwrap().name(), "NoFilter");
    }
}
