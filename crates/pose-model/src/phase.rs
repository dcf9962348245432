//! Swing phases, the step map recorded for them, and session results.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::frame::HandType;
use crate::joint::Joint;

/// The nine recognized swing phases, in nominal forward order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwingPhase {
    Address,
    TakeAway,
    Half,
    Top,
    DownHalf,
    Impact,
    FollowThrough,
    FinishTop,
    Finish,
}

impl SwingPhase {
    pub const ALL: [SwingPhase; 9] = [
        SwingPhase::Address,
        SwingPhase::TakeAway,
        SwingPhase::Half,
        SwingPhase::Top,
        SwingPhase::DownHalf,
        SwingPhase::Impact,
        SwingPhase::FollowThrough,
        SwingPhase::FinishTop,
        SwingPhase::Finish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SwingPhase::Address => "address",
            SwingPhase::TakeAway => "take_away",
            SwingPhase::Half => "half",
            SwingPhase::Top => "top",
            SwingPhase::DownHalf => "down_half",
            SwingPhase::Impact => "impact",
            SwingPhase::FollowThrough => "follow_through",
            SwingPhase::FinishTop => "finish_top",
            SwingPhase::Finish => "finish",
        }
    }

    /// The phase that follows this one, `None` for the terminal phase.
    pub fn next(&self) -> Option<SwingPhase> {
        match self {
            SwingPhase::Address => Some(SwingPhase::TakeAway),
            SwingPhase::TakeAway => Some(SwingPhase::Half),
            SwingPhase::Half => Some(SwingPhase::Top),
            SwingPhase::Top => Some(SwingPhase::DownHalf),
            SwingPhase::DownHalf => Some(SwingPhase::Impact),
            SwingPhase::Impact => Some(SwingPhase::FollowThrough),
            SwingPhase::FollowThrough => Some(SwingPhase::FinishTop),
            SwingPhase::FinishTop => Some(SwingPhase::Finish),
            SwingPhase::Finish => None,
        }
    }
}

impl fmt::Display for SwingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frame index at which each phase was recorded.
///
/// Serializes as an ordered object `{"address": 2, "take_away": 10, ...}`
/// with absent phases omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SwingStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_away: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down_half: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_through: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_top: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish: Option<usize>,
}

impl SwingStep {
    /// Frame recorded for `phase`, if any.
    pub fn get(&self, phase: SwingPhase) -> Option<usize> {
        *self.slot(phase)
    }

    /// Record (or re-record) `phase` at `frame`.
    pub fn record(&mut self, phase: SwingPhase, frame: usize) {
        *self.slot_mut(phase) = Some(frame);
    }

    /// Forget every recorded phase.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Recorded phases in forward order.
    pub fn iter(&self) -> impl Iterator<Item = (SwingPhase, usize)> + '_ {
        SwingPhase::ALL
            .into_iter()
            .filter_map(move |phase| self.get(phase).map(|frame| (phase, frame)))
    }

    fn slot(&self, phase: SwingPhase) -> &Option<usize> {
        match phase {
            SwingPhase::Address => &self.address,
            SwingPhase::TakeAway => &self.take_away,
            SwingPhase::Half => &self.half,
            SwingPhase::Top => &self.top,
            SwingPhase::DownHalf => &self.down_half,
            SwingPhase::Impact => &self.impact,
            SwingPhase::FollowThrough => &self.follow_through,
            SwingPhase::FinishTop => &self.finish_top,
            SwingPhase::Finish => &self.finish,
        }
    }

    fn slot_mut(&mut self, phase: SwingPhase) -> &mut Option<usize> {
        match phase {
            SwingPhase::Address => &mut self.address,
            SwingPhase::TakeAway => &mut self.take_away,
            SwingPhase::Half => &mut self.half,
            SwingPhase::Top => &mut self.top,
            SwingPhase::DownHalf => &mut self.down_half,
            SwingPhase::Impact => &mut self.impact,
            SwingPhase::FollowThrough => &mut self.follow_through,
            SwingPhase::FinishTop => &mut self.finish_top,
            SwingPhase::Finish => &mut self.finish,
        }
    }
}

/// Status of one analysis session as seen by its host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionStatus {
    /// Frames are still being consumed.
    Processing,
    /// The session ended with a step map.
    StepCompleted { step: SwingStep },
    /// The session failed; other sessions are unaffected.
    Error { message: String },
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Processing)
    }
}

/// Buffered trajectory of one joint, one entry per frame in each channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JointSeries {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z_norm: Vec<f64>,
    pub x_norm: Vec<f64>,
}

impl JointSeries {
    pub fn with_capacity(frames: usize) -> Self {
        Self {
            x: Vec::with_capacity(frames),
            y: Vec::with_capacity(frames),
            z_norm: Vec::with_capacity(frames),
            x_norm: Vec::with_capacity(frames),
        }
    }

    pub fn push(&mut self, x: f64, y: f64, z_norm: f64, x_norm: f64) {
        self.x.push(x);
        self.y.push(y);
        self.z_norm.push(z_norm);
        self.x_norm.push(x_norm);
    }

    /// Frames in the series.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Per-joint trajectories of a session, keyed by joint name.
pub type PoseSeries = BTreeMap<Joint, JointSeries>;

/// Everything a host keeps about a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Host-assigned task identifier (e.g. the input path).
    pub task_id: String,

    /// Hand orientation the frames were analyzed with.
    pub hand: HandType,

    #[serde(flatten)]
    pub status: SessionStatus,

    /// Number of frames fed to the session.
    pub frames_processed: usize,

    /// Frames where the estimator found nobody.
    pub none_frames: Vec<usize>,

    /// Start time of every recorded phase, in seconds.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub phase_times_secs: BTreeMap<SwingPhase, f64>,

    /// Smoothed landmark trajectories, when the host asked for them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose: Option<PoseSeries>,
}

impl SessionReport {
    /// Report for a task that failed before any frame reached a session.
    pub fn failed(task_id: impl Into<String>, hand: HandType, message: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            hand,
            status: SessionStatus::Error {
                message: message.into(),
            },
            frames_processed: 0,
            none_frames: Vec::new(),
            phase_times_secs: BTreeMap::new(),
            pose: None,
        }
    }

    /// Whether the session produced a step map.
    pub fn is_completed(&self) -> bool {
        matches!(self.status, SessionStatus::StepCompleted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order_matches_next() {
        for pair in SwingPhase::ALL.windows(2) {
            assert_eq!(pair[0].next(), Some(pair[1]));
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(SwingPhase::Finish.next(), None);
    }

    #[test]
    fn test_step_record_and_clear() {
        let mut step = SwingStep::default();
        assert!(step.is_empty());

        step.record(SwingPhase::Address, 2);
        step.record(SwingPhase::Top, 16);
        step.record(SwingPhase::Top, 18);
        assert_eq!(step.get(SwingPhase::Top), Some(18));
        assert_eq!(step.get(SwingPhase::Half), None);
        assert_eq!(
            step.iter().collect::<Vec<_>>(),
            vec![(SwingPhase::Address, 2), (SwingPhase::Top, 18)]
        );

        step.clear();
        assert!(step.is_empty());
    }

    #[test]
    fn test_step_serializes_in_phase_order_without_gaps() {
        let mut step = SwingStep::default();
        step.record(SwingPhase::Impact, 28);
        step.record(SwingPhase::Address, 2);
        let json = serde_json::to_string(&step).unwrap();
        assert_eq!(json, r#"{"address":2,"impact":28}"#);
    }

    #[test]
    fn test_session_status_tagging() {
        let json = serde_json::to_value(SessionStatus::Error {
            message: "boom".to_string(),
        })
        .unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "boom");

        let json = serde_json::to_value(SessionStatus::Processing).unwrap();
        assert_eq!(json, serde_json::json!({"status": "processing"}));
    }

    #[test]
    fn test_report_flattens_status() {
        let mut step = SwingStep::default();
        step.record(SwingPhase::Address, 2);
        let report = SessionReport {
            task_id: "swing.jsonl".to_string(),
            hand: HandType::Right,
            status: SessionStatus::StepCompleted { step },
            frames_processed: 10,
            none_frames: vec![4],
            phase_times_secs: BTreeMap::from([(SwingPhase::Address, 0.1)]),
            pose: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "step_completed");
        assert_eq!(json["step"]["address"], 2);
        assert_eq!(json["phase_times_secs"]["address"], 0.1);
        assert_eq!(json["hand"], "R");
        assert!(json.get("pose").is_none());
    }

    #[test]
    fn test_pose_series_serializes_by_joint_and_channel() {
        let mut wrist = JointSeries::with_capacity(2);
        wrist.push(380.0, 600.0, 0.1, -0.12);
        wrist.push(381.0, 598.0, 0.1, -0.11);
        assert_eq!(wrist.len(), 2);

        let report = SessionReport {
            pose: Some(PoseSeries::from([(Joint::RightWrist, wrist)])),
            ..SessionReport::failed("swing.jsonl", HandType::Right, "boom")
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["pose"]["right_wrist"]["y"], serde_json::json!([600.0, 598.0]));
        assert_eq!(json["pose"]["right_wrist"]["x_norm"][1], -0.11);

        let back: SessionReport = serde_json::from_value(json).unwrap();
        assert_eq!(back.pose.unwrap()[&Joint::RightWrist].len(), 2);
    }

    #[test]
    fn test_failed_report_has_no_phases() {
        let report = SessionReport::failed("missing.jsonl", HandType::Left, "File not found");
        assert!(!report.is_completed());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["frames_processed"], 0);
        assert!(json.get("phase_times_secs").is_none());
    }
}
