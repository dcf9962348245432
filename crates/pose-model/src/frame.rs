//! Per-frame landmark records produced by a pose estimator.
//!
//! Frames are exchanged as JSONL: one [`FrameRecord`] per line, lines starting
//! with `#` are comments. A frame with no detected person carries
//! `"landmarks": null`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::joint::{Joint, JointConfig};
use crate::ModelError;

/// One landmark as emitted by the pose estimator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawLandmark {
    /// Fractional X in `[0.0, 1.0]` of the frame width.
    pub x: f64,
    /// Fractional Y in `[0.0, 1.0]` of the frame height.
    pub y: f64,
    /// World-space Z (camera-independent, meters around the hip center).
    #[serde(default)]
    pub z_norm: f64,
    /// World-space X.
    #[serde(default)]
    pub x_norm: f64,
}

impl RawLandmark {
    pub fn new(x: f64, y: f64, z_norm: f64, x_norm: f64) -> Self {
        Self {
            x,
            y,
            z_norm,
            x_norm,
        }
    }

    /// Horizontal mirror image of this landmark.
    pub fn mirrored(&self) -> Self {
        Self {
            x: 1.0 - self.x,
            y: self.y,
            z_norm: self.z_norm,
            x_norm: -self.x_norm,
        }
    }
}

/// Landmarks of one frame keyed by joint.
pub type FrameLandmarks = BTreeMap<Joint, RawLandmark>;

/// Landmarks of a detected person, in either of the shapes estimators emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Detection {
    /// Landmarks already keyed by joint name.
    Named(FrameLandmarks),
    /// The estimator's full landmark list, addressed through
    /// [`JointConfig::indices`].
    Indexed(Vec<RawLandmark>),
}

impl Detection {
    /// Resolve the configured joints of this detection.
    pub fn select(&self, config: &JointConfig, frame: usize) -> Result<FrameLandmarks, ModelError> {
        let mut out = FrameLandmarks::new();
        for (joint, index) in config.pairs() {
            let landmark = match self {
                Detection::Named(map) => *map
                    .get(&joint)
                    .ok_or(ModelError::MissingJoint { frame, joint })?,
                Detection::Indexed(list) => {
                    *list
                        .get(index)
                        .ok_or(ModelError::LandmarkIndexOutOfBounds {
                            frame,
                            joint,
                            index,
                            len: list.len(),
                        })?
                }
            };
            out.insert(joint, landmark);
        }
        Ok(out)
    }
}

/// A single frame of pose-estimator output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Dense, zero-based frame index.
    pub frame: usize,

    /// Frame dimensions in pixels.
    pub width: u32,
    pub height: u32,

    /// `None` when the estimator found no person in this frame.
    #[serde(default)]
    pub landmarks: Option<Detection>,
}

impl FrameRecord {
    /// Whether the estimator detected a person.
    pub fn has_detection(&self) -> bool {
        self.landmarks.is_some()
    }

    /// Mirror this frame horizontally.
    ///
    /// Named landmarks also swap body sides, so the record looks as if the
    /// estimator had run on a flipped image. Indexed landmarks only have their
    /// coordinates mirrored; the side swap is left to the joint configuration.
    pub fn mirrored(&self) -> Self {
        let landmarks = self.landmarks.as_ref().map(|detection| match detection {
            Detection::Named(map) => Detection::Named(
                map.iter()
                    .map(|(joint, lm)| (joint.opposite_side(), lm.mirrored()))
                    .collect(),
            ),
            Detection::Indexed(list) => {
                Detection::Indexed(list.iter().map(RawLandmark::mirrored).collect())
            }
        });

        Self {
            frame: self.frame,
            width: self.width,
            height: self.height,
            landmarks,
        }
    }
}

/// Which hand leads the swing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HandType {
    /// Right-handed golfer; frames are analyzed as-is.
    #[default]
    #[serde(rename = "R")]
    Right,
    /// Left-handed golfer; frames must be mirrored before analysis.
    #[serde(rename = "L")]
    Left,
}

impl fmt::Display for HandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandType::Right => f.write_str("R"),
            HandType::Left => f.write_str("L"),
        }
    }
}

impl FromStr for HandType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "R" | "r" => Ok(HandType::Right),
            "L" | "l" => Ok(HandType::Left),
            other => Err(format!("unknown hand type '{other}', expected R or L")),
        }
    }
}

/// Parse frame records from JSONL content (one JSON object per line).
pub fn parse_frames(jsonl: &str) -> Result<Vec<FrameRecord>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Serialize frame records to JSONL format.
pub fn serialize_frames(frames: &[FrameRecord]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for frame in frames {
        output.push_str(&serde_json::to_string(frame)?);
        output.push('\n');
    }
    Ok(output)
}
