//! Error types shared across SwingPhase crates.

use std::path::PathBuf;

use swingphase_pose_model::{Joint, ModelError, SwingPhase};

/// Top-level error type for SwingPhase operations.
#[derive(Debug, thiserror::Error)]
pub enum SwingError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Out of range: {joint} history from frame {frame} requested, {len} frame(s) recorded")]
    OutOfRange {
        joint: Joint,
        frame: usize,
        len: usize,
    },

    #[error("Classifier state error in '{phase}': {message}")]
    State { phase: SwingPhase, message: String },

    #[error("Input error: {message}")]
    Input { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using SwingError.
pub type SwingResult<T> = Result<T, SwingError>;

impl SwingError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn state(phase: SwingPhase, msg: impl Into<String>) -> Self {
        Self::State {
            phase,
            message: msg.into(),
        }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input {
            message: msg.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }
}

impl From<ModelError> for SwingError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::InvalidJointConfig { .. } => Self::config(err.to_string()),
            ModelError::MissingJoint { .. } | ModelError::LandmarkIndexOutOfBounds { .. } => {
                Self::input(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_config_errors_map_to_config() {
        let err: SwingError = ModelError::InvalidJointConfig {
            message: "2 joint names but 1 landmark indices".to_string(),
        }
        .into();
        assert!(matches!(err, SwingError::Config { .. }));
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_missing_joint_maps_to_input() {
        let err: SwingError = ModelError::MissingJoint {
            frame: 4,
            joint: Joint::RightHip,
        }
        .into();
        assert!(matches!(err, SwingError::Input { .. }));
        assert!(err.to_string().contains("right_hip"));
    }

    #[test]
    fn test_out_of_range_message() {
        let err = SwingError::OutOfRange {
            joint: Joint::RightWrist,
            frame: 12,
            len: 10,
        };
        assert_eq!(
            err.to_string(),
            "Out of range: right_wrist history from frame 12 requested, 10 frame(s) recorded"
        );
    }
}
