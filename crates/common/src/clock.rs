//! Clock and timing utilities.
//!
//! Frames reaching the engine have been normalized to a fixed rate, so frame
//! indices map directly onto video time. This module provides:
//! - Frame index to seconds conversion at the normalized rate
//! - A wall-clock anchored timer for measuring host-side analysis runs

use std::collections::BTreeMap;
use std::time::Instant;

use swingphase_pose_model::{SwingPhase, SwingStep};

/// Converts frame indices to video time at a fixed frame rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    fps: f64,
}

impl FrameClock {
    /// Create a clock for the given frame rate. A rate of zero is treated as 1.
    pub fn new(fps: u32) -> Self {
        Self {
            fps: fps.max(1) as f64,
        }
    }

    /// Start time of `frame` in seconds.
    pub fn frame_to_secs(&self, frame: usize) -> f64 {
        frame as f64 / self.fps
    }

    /// Start time of every recorded phase.
    pub fn phase_times(&self, step: &SwingStep) -> BTreeMap<SwingPhase, f64> {
        step.iter()
            .map(|(phase, frame)| (phase, self.frame_to_secs(frame)))
            .collect()
    }
}

/// A run timer anchored to a wall-clock start time.
#[derive(Debug, Clone)]
pub struct AnalysisClock {
    /// The instant the run started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl AnalysisClock {
    /// Create a clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Get seconds elapsed since the run started.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at run start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}
