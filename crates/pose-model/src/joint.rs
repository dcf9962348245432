//! Body joints and their mapping to pose-estimator landmark indices.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// A named body landmark tracked across frames.
///
/// Ordering follows declaration order, which keeps map output stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    Nose,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
}

impl Joint {
    /// Joints read by the phase classifier. A joint configuration must
    /// include all of them.
    pub const CLASSIFIER_JOINTS: [Joint; 10] = [
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftWrist,
        Joint::RightWrist,
        Joint::LeftHip,
        Joint::RightHip,
        Joint::LeftKnee,
        Joint::RightKnee,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Joint::Nose => "nose",
            Joint::LeftShoulder => "left_shoulder",
            Joint::RightShoulder => "right_shoulder",
            Joint::LeftElbow => "left_elbow",
            Joint::RightElbow => "right_elbow",
            Joint::LeftWrist => "left_wrist",
            Joint::RightWrist => "right_wrist",
            Joint::LeftHip => "left_hip",
            Joint::RightHip => "right_hip",
            Joint::LeftKnee => "left_knee",
            Joint::RightKnee => "right_knee",
        }
    }

    /// The same landmark on the opposite side of the body.
    ///
    /// Used when mirroring a left-handed recording into right-handed space.
    pub fn opposite_side(&self) -> Joint {
        match self {
            Joint::Nose => Joint::Nose,
            Joint::LeftShoulder => Joint::RightShoulder,
            Joint::RightShoulder => Joint::LeftShoulder,
            Joint::LeftElbow => Joint::RightElbow,
            Joint::RightElbow => Joint::LeftElbow,
            Joint::LeftWrist => Joint::RightWrist,
            Joint::RightWrist => Joint::LeftWrist,
            Joint::LeftHip => Joint::RightHip,
            Joint::RightHip => Joint::LeftHip,
            Joint::LeftKnee => Joint::RightKnee,
            Joint::RightKnee => Joint::LeftKnee,
        }
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered joint names with a parallel list of pose-estimator landmark indices.
///
/// The lists are kept separate on disk so the indexing scheme of the pose
/// estimator can be swapped without touching the joint names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointConfig {
    /// Joint names, in buffer order.
    pub names: Vec<Joint>,

    /// Landmark index of each joint in the estimator output.
    pub indices: Vec<usize>,
}

impl Default for JointConfig {
    /// The classifier joints with MediaPipe Pose (33-landmark) indices.
    fn default() -> Self {
        Self {
            names: Joint::CLASSIFIER_JOINTS.to_vec(),
            indices: vec![11, 12, 13, 14, 15, 16, 23, 24, 25, 26],
        }
    }
}

impl JointConfig {
    /// Check that the configuration can drive a landmark buffer.
    ///
    /// Fails when the two lists differ in length, a joint is repeated, or a
    /// joint the classifier reads is missing.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.names.len() != self.indices.len() {
            return Err(ModelError::InvalidJointConfig {
                message: format!(
                    "{} joint names but {} landmark indices",
                    self.names.len(),
                    self.indices.len()
                ),
            });
        }

        let mut seen = BTreeSet::new();
        for joint in &self.names {
            if !seen.insert(*joint) {
                return Err(ModelError::InvalidJointConfig {
                    message: format!("joint '{joint}' is listed more than once"),
                });
            }
        }

        let missing: Vec<&str> = Joint::CLASSIFIER_JOINTS
            .iter()
            .filter(|j| !seen.contains(j))
            .map(Joint::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(ModelError::InvalidJointConfig {
                message: format!("missing required joints: {}", missing.join(", ")),
            });
        }

        Ok(())
    }

    /// Iterate `(joint, landmark_index)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (Joint, usize)> + '_ {
        self.names.iter().copied().zip(self.indices.iter().copied())
    }

    /// The same landmark indices read as the opposite body side.
    ///
    /// Used with horizontally mirrored frames: the estimator's left shoulder
    /// becomes the mirrored golfer's right shoulder.
    pub fn mirrored(&self) -> Self {
        Self {
            names: self.names.iter().map(Joint::opposite_side).collect(),
            indices: self.indices.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
