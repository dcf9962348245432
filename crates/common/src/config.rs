//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use swingphase_pose_model::JointConfig;

use crate::error::{SwingError, SwingResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Tracked joints and their pose-estimator indices.
    pub joints: JointConfig,

    /// Adaptive smoothing of buffered pixel coordinates.
    pub smoother: SmootherConfig,

    /// Phase classifier thresholds.
    pub classifier: ClassifierConfig,

    /// Per-session limits and timing.
    pub session: SessionConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Adaptive EMA parameters.
///
/// `alpha = alpha_base + min(alpha_cap_excess, speed / speed_threshold)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmootherConfig {
    /// Whether smoothing runs at all once a swing is under way.
    pub enabled: bool,

    /// Weight of the new sample when the joint is not moving.
    pub alpha_base: f64,

    /// Largest amount speed may add to `alpha_base`.
    pub alpha_cap_excess: f64,

    /// Speed (pixels/frame) at which the excess weight saturates linearly.
    pub speed_threshold: f64,
}

/// Phase classifier thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Lower bound of the shoulder-to-hip angle at address (degrees).
    pub spine_angle_min: f64,

    /// Upper bound of the shoulder-to-hip angle at address (degrees).
    pub spine_angle_max: f64,

    /// Consecutive qualifying frames needed to commit an address.
    pub address_frames: u32,

    /// Largest relative wrist movement still counted as stationary.
    pub stationary_tolerance: f64,
}

/// Per-session settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Frame rate the input was normalized to.
    pub fps: u32,

    /// Frames after which a session is abandoned as too long.
    pub max_frames: Option<usize>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "swingphase_engine=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            alpha_base: 0.2,
            alpha_cap_excess: 0.3,
            speed_threshold: 10.0,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            spine_angle_min: 10.0,
            spine_angle_max: 70.0,
            address_frames: 3,
            stationary_tolerance: 0.01,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            fps: 20,
            max_frames: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path. Errors are reported, not defaulted.
    pub fn load_from(path: impl AsRef<Path>) -> SwingResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SwingError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config as pretty JSON at `path`, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> SwingResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> SwingResult<()> {
        self.joints.validate()?;

        let s = &self.smoother;
        if !(0.0..=1.0).contains(&(s.alpha_base + s.alpha_cap_excess)) || s.alpha_base < 0.0 {
            return Err(SwingError::config(format!(
                "smoother alpha range [{}, {}] must lie within [0, 1]",
                s.alpha_base,
                s.alpha_base + s.alpha_cap_excess
            )));
        }
        if s.speed_threshold <= 0.0 {
            return Err(SwingError::config("smoother speed_threshold must be positive"));
        }

        let c = &self.classifier;
        if c.spine_angle_min > c.spine_angle_max {
            return Err(SwingError::config(format!(
                "spine angle range [{}, {}] is empty",
                c.spine_angle_min, c.spine_angle_max
            )));
        }
        if c.address_frames == 0 {
            return Err(SwingError::config("address_frames must be at least 1"));
        }

        if self.session.fps == 0 {
            return Err(SwingError::config("session fps must be positive"));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("swingphase").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_engine_constants() {
        let config = AppConfig::default();
        assert_eq!(config.smoother.alpha_base, 0.2);
        assert_eq!(config.smoother.alpha_cap_excess, 0.3);
        assert_eq!(config.smoother.speed_threshold, 10.0);
        assert_eq!(config.classifier.address_frames, 3);
        assert_eq!(config.session.fps, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"classifier": {"address_frames": 5}}"#).unwrap();
        assert_eq!(config.classifier.address_frames, 5);
        assert_eq!(config.classifier.spine_angle_max, 70.0);
        assert_eq!(config.joints, JointConfig::default());
    }

    #[test]
    fn test_mismatched_joints_fail_validation() {
        let mut config = AppConfig::default();
        config.joints.indices.truncate(3);
        assert!(matches!(
            config.validate(),
            Err(SwingError::Config { .. })
        ));
    }

    #[test]
    fn test_alpha_above_one_is_rejected() {
        let mut config = AppConfig::default();
        config.smoother.alpha_cap_excess = 0.9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join("swingphase_test_config");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.session.max_frames = Some(1200);
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = AppConfig::load_from("/nonexistent/swingphase.json").unwrap_err();
        assert!(matches!(err, SwingError::FileNotFound { .. }));
    }
}
