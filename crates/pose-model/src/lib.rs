//! SwingPhase Pose Model
//!
//! Defines the core data contracts shared by the engine and its hosts:
//! - **Joints:** Named body landmarks and their mapping to pose-estimator indices
//! - **Frames:** Per-frame landmark records as produced by a pose estimator
//! - **Phases:** The nine swing phases and the step map recorded for them
//! - **Results:** Session status and the report a host keeps per task
//!
//! Landmark `x`/`y` in frame records are fractional `[0.0, 1.0]` values relative
//! to the frame; the engine scales them to pixels with the frame dimensions.

pub mod frame;
pub mod joint;
pub mod phase;
pub mod point;

pub use frame::*;
pub use joint::*;
pub use phase::*;
pub use point::*;

/// Errors raised while interpreting model data.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid joint configuration: {message}")]
    InvalidJointConfig { message: String },

    #[error("Frame {frame}: detection has no landmark for joint '{joint}'")]
    MissingJoint { frame: usize, joint: Joint },

    #[error("Frame {frame}: landmark index {index} for joint '{joint}' is out of bounds (len {len})")]
    LandmarkIndexOutOfBounds {
        frame: usize,
        joint: Joint,
        index: usize,
        len: usize,
    },
}
