//! Swing phase classification.
//!
//! # State machine
//!
//! The classifier always *seeks* one phase. Each frame it evaluates that
//! phase's predicate once and produces a [`Transition`]: the next phase to
//! seek plus a [`StepEffect`] on the step map.
//!
//! | Seeking | Fires when | Then seeks |
//! |---|---|---|
//! | address | address pose held for `address_frames` consecutive frames | take_away |
//! | take_away | right wrist at or above both hips | half |
//! | half | two of the four arm landmarks at or above the higher shoulder | top |
//! | top | right wrist at its highest point since `half` (re-recorded while it holds) | down_half, once it fails |
//! | down_half | right wrist below the right shoulder | impact |
//! | impact | right wrist at its lowest point since `down_half` (re-recorded) | follow_through, once it fails |
//! | follow_through | right wrist above the line one third from hips to shoulders | finish_top |
//! | finish_top | right wrist at its highest point since `follow_through` (re-recorded) | finish, once it fails |
//! | finish | right wrist below the point one third from left shoulder to left wrist, both taken at `finish_top` | terminal |
//!
//! Address stays armed after the swing starts: whenever the address pose is
//! held again for `address_frames` frames, the step map is cleared and the
//! sequence restarts from that frame. Only the last attempt survives.
//!
//! Pixel `y` grows downward, so "higher" on screen means a *smaller* `y`.

use swingphase_common::config::ClassifierConfig;
use swingphase_common::error::{SwingError, SwingResult};
use swingphase_pose_model::{Joint, Point2D, SwingPhase, SwingStep};
use tracing::{debug, warn};

use crate::buffer::{CurrentFrameLandmarks, LandmarkBuffer};
use crate::geometry::{angle_to_horizontal, lerp, midpoint};

/// Side effect of one classifier step on the step map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEffect {
    /// Nothing changed.
    None,
    /// The phase was recorded (or re-recorded) at this frame.
    Record(SwingPhase),
    /// An extremum run ended; the classifier now seeks the given phase.
    Advance(SwingPhase),
    /// The step map was cleared and `address` recorded at this frame.
    Restart,
}

/// Next phase to seek plus the effect on the step map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Transition {
    next: SwingPhase,
    effect: StepEffect,
}

impl Transition {
    fn stay(phase: SwingPhase) -> Self {
        Self {
            next: phase,
            effect: StepEffect::None,
        }
    }

    /// Record `phase` and move on to the one after it.
    fn record(phase: SwingPhase) -> Self {
        Self {
            next: phase.next().unwrap_or(phase),
            effect: StepEffect::Record(phase),
        }
    }

    /// Record `phase` and keep seeking it.
    fn rerecord(phase: SwingPhase) -> Self {
        Self {
            next: phase,
            effect: StepEffect::Record(phase),
        }
    }

    fn advance(next: SwingPhase) -> Self {
        Self {
            next,
            effect: StepEffect::Advance(next),
        }
    }

    fn restart() -> Self {
        Self {
            next: SwingPhase::TakeAway,
            effect: StepEffect::Restart,
        }
    }
}

/// Direction of a running extremum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Min,
    Max,
}

/// Whether the last value is the extremum of the whole window (ties count).
///
/// An empty window has no extremum.
pub fn is_running_extremum(window: &[f64], kind: Extremum) -> bool {
    let Some((&current, earlier)) = window.split_last() else {
        return false;
    };
    match kind {
        Extremum::Min => earlier.iter().all(|&v| current <= v),
        Extremum::Max => earlier.iter().all(|&v| current >= v),
    }
}

/// Nine-state swing phase classifier.
#[derive(Debug, Clone)]
pub struct PhaseClassifier {
    config: ClassifierConfig,
    seeking: SwingPhase,
    step: SwingStep,
    address_streak: u32,
    swinging: bool,
    finished: bool,
}

impl PhaseClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            seeking: SwingPhase::Address,
            step: SwingStep::default(),
            address_streak: 0,
            swinging: false,
            finished: false,
        }
    }

    /// Classify the latest buffered frame.
    ///
    /// `frame` must be the index of the last frame in `buffer`. Once `finish`
    /// has been recorded every further call is a no-op.
    pub fn step(&mut self, frame: usize, buffer: &LandmarkBuffer) -> SwingResult<StepEffect> {
        if self.finished {
            return Ok(StepEffect::None);
        }

        let view = buffer.current_view();
        if self.is_address_pose(&view, buffer)? {
            self.address_streak += 1;
        } else {
            self.address_streak = 0;
        }

        let transition = self.transition(&view, buffer)?;
        self.apply(transition, frame);
        Ok(transition.effect)
    }

    /// The phase currently sought.
    pub fn seeking(&self) -> SwingPhase {
        self.seeking
    }

    /// Phases recorded so far.
    pub fn step_map(&self) -> &SwingStep {
        &self.step
    }

    /// Whether an address has been committed, i.e. smoothing should run.
    pub fn is_swinging(&self) -> bool {
        self.swinging
    }

    /// Whether `finish` has been recorded.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The step map to report when input ends.
    ///
    /// A swing that reached `finish_top` but never satisfied the finish
    /// predicate reports its `finish_top` frame as `finish`.
    pub fn completed_step(&self) -> SwingStep {
        let mut step = self.step;
        if step.finish.is_none() {
            if let Some(frame) = step.finish_top {
                step.finish = Some(frame);
            }
        }
        step
    }

    fn transition(
        &self,
        view: &CurrentFrameLandmarks,
        buffer: &LandmarkBuffer,
    ) -> SwingResult<Transition> {
        let armed = self.address_streak >= self.config.address_frames;

        let forward = match self.seeking {
            SwingPhase::Address => {
                return Ok(if armed {
                    Transition::record(SwingPhase::Address)
                } else {
                    Transition::stay(SwingPhase::Address)
                });
            }
            SwingPhase::TakeAway => {
                let wrist = point(view, Joint::RightWrist)?;
                let left_hip = point(view, Joint::LeftHip)?;
                let right_hip = point(view, Joint::RightHip)?;
                if wrist.y <= left_hip.y && wrist.y <= right_hip.y {
                    Transition::record(SwingPhase::TakeAway)
                } else {
                    Transition::stay(SwingPhase::TakeAway)
                }
            }
            SwingPhase::Half => {
                let shoulder_line = point(view, Joint::LeftShoulder)?
                    .y
                    .min(point(view, Joint::RightShoulder)?.y);
                let mut raised = 0;
                for joint in [
                    Joint::RightWrist,
                    Joint::LeftWrist,
                    Joint::RightElbow,
                    Joint::LeftElbow,
                ] {
                    if point(view, joint)?.y <= shoulder_line {
                        raised += 1;
                    }
                }
                if raised >= 2 {
                    Transition::record(SwingPhase::Half)
                } else {
                    Transition::stay(SwingPhase::Half)
                }
            }
            SwingPhase::Top => self.extremum(
                buffer,
                SwingPhase::Half,
                SwingPhase::Top,
                Extremum::Min,
            )?,
            SwingPhase::DownHalf => {
                let wrist = point(view, Joint::RightWrist)?;
                if wrist.y > point(view, Joint::RightShoulder)?.y {
                    Transition::record(SwingPhase::DownHalf)
                } else {
                    Transition::stay(SwingPhase::DownHalf)
                }
            }
            SwingPhase::Impact => self.extremum(
                buffer,
                SwingPhase::DownHalf,
                SwingPhase::Impact,
                Extremum::Max,
            )?,
            SwingPhase::FollowThrough => {
                let hips = midpoint(point(view, Joint::LeftHip)?, point(view, Joint::RightHip)?);
                let shoulders = midpoint(
                    point(view, Joint::LeftShoulder)?,
                    point(view, Joint::RightShoulder)?,
                );
                let line = hips.y - (hips.y - shoulders.y) / 3.0;
                if point(view, Joint::RightWrist)?.y < line {
                    Transition::record(SwingPhase::FollowThrough)
                } else {
                    Transition::stay(SwingPhase::FollowThrough)
                }
            }
            SwingPhase::FinishTop => self.extremum(
                buffer,
                SwingPhase::FollowThrough,
                SwingPhase::FinishTop,
                Extremum::Min,
            )?,
            SwingPhase::Finish => {
                let anchor = self.anchor(SwingPhase::FinishTop, SwingPhase::Finish)?;
                let shoulder = buffer.at(Joint::LeftShoulder, anchor)?.point();
                let wrist = buffer.at(Joint::LeftWrist, anchor)?.point();
                let reference = lerp(shoulder, wrist, 1.0 / 3.0);
                if point(view, Joint::RightWrist)?.y > reference.y {
                    Transition::record(SwingPhase::Finish)
                } else {
                    Transition::stay(SwingPhase::Finish)
                }
            }
        };

        if armed && forward.effect != StepEffect::Record(SwingPhase::Finish) {
            return Ok(Transition::restart());
        }
        Ok(forward)
    }

    /// Record `phase` while the right wrist stays at its extremum since
    /// `anchor_phase`; seek the following phase on the first frame it doesn't.
    fn extremum(
        &self,
        buffer: &LandmarkBuffer,
        anchor_phase: SwingPhase,
        phase: SwingPhase,
        kind: Extremum,
    ) -> SwingResult<Transition> {
        let anchor = self.anchor(anchor_phase, phase)?;
        let window: Vec<f64> = buffer
            .slice_from(Joint::RightWrist, anchor)?
            .iter()
            .map(|s| s.y)
            .collect();

        if is_running_extremum(&window, kind) {
            Ok(Transition::rerecord(phase))
        } else {
            Ok(Transition::advance(phase.next().unwrap_or(phase)))
        }
    }

    /// Address posture: a forward-tilted spine, the right wrist hanging
    /// between hip and knee, and the wrist holding still.
    fn is_address_pose(
        &self,
        view: &CurrentFrameLandmarks,
        buffer: &LandmarkBuffer,
    ) -> SwingResult<bool> {
        let shoulder = point(view, Joint::RightShoulder)?;
        let hip = point(view, Joint::RightHip)?;
        let knee = point(view, Joint::RightKnee)?;
        let wrist = point(view, Joint::RightWrist)?;

        let spine = angle_to_horizontal(shoulder, hip);
        if !(self.config.spine_angle_min..=self.config.spine_angle_max).contains(&spine) {
            return Ok(false);
        }

        if !(hip.y < wrist.y && wrist.y < knee.y) {
            return Ok(false);
        }

        // Compared against whatever of the two previous frames exists.
        let recent = buffer.last_n(Joint::RightWrist, 3)?;
        let Some((current, earlier)) = recent.split_last() else {
            return Ok(false);
        };
        let tol = self.config.stationary_tolerance;
        Ok(earlier.iter().all(|prev| {
            (prev.x - current.x).abs() <= tol * current.x.abs()
                && (prev.y - current.y).abs() <= tol * current.y.abs()
        }))
    }

    fn anchor(&self, anchor_phase: SwingPhase, needed_by: SwingPhase) -> SwingResult<usize> {
        self.step.get(anchor_phase).ok_or_else(|| {
            SwingError::state(
                needed_by,
                format!("anchor phase '{anchor_phase}' was never recorded"),
            )
        })
    }

    fn apply(&mut self, transition: Transition, frame: usize) {
        match transition.effect {
            StepEffect::None => {}
            StepEffect::Record(phase) => {
                self.step.record(phase, frame);
                debug!(frame, phase = %phase, "phase recorded");
                match phase {
                    SwingPhase::Address => self.swinging = true,
                    SwingPhase::Finish => self.finished = true,
                    _ => {}
                }
            }
            StepEffect::Advance(next) => {
                debug!(frame, seeking = %next, "extremum run ended");
            }
            StepEffect::Restart => {
                warn!(
                    frame,
                    discarded = ?self.step,
                    "address detected again, restarting swing"
                );
                self.step.clear();
                self.step.record(SwingPhase::Address, frame);
                self.swinging = true;
            }
        }
        self.seeking = transition.next;
    }
}

impl Default for PhaseClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

fn point(view: &CurrentFrameLandmarks, joint: Joint) -> SwingResult<Point2D> {
    view.get(&joint)
        .copied()
        .ok_or_else(|| SwingError::config(format!("joint '{joint}' is not tracked")))
}
