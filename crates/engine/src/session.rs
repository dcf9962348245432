//! Per-video swing session.
//!
//! A [`SwingSession`] owns the landmark buffer and classifier for one video.
//! Frames are pushed in order; every failure is caught here and turned into
//! [`SessionStatus::Error`] so one bad video never takes down its host.

use swingphase_common::clock::FrameClock;
use swingphase_common::config::AppConfig;
use swingphase_common::error::{SwingError, SwingResult};
use swingphase_pose_model::{
    FrameRecord, HandType, JointConfig, SessionReport, SessionStatus, SwingPhase, SwingStep,
};
use tracing::{debug, info, warn};

use crate::buffer::LandmarkBuffer;
use crate::classifier::PhaseClassifier;
use crate::smooth::AdaptiveSmoother;

/// Swing detection state for a single video.
#[derive(Debug, Clone)]
pub struct SwingSession {
    joints: JointConfig,
    buffer: LandmarkBuffer,
    smoother: Option<AdaptiveSmoother>,
    classifier: PhaseClassifier,
    clock: FrameClock,
    max_frames: Option<usize>,
    status: SessionStatus,
}

impl SwingSession {
    /// Start a session. Invalid configuration is fatal here, not per frame.
    pub fn new(config: &AppConfig) -> SwingResult<Self> {
        config.validate()?;
        let buffer = LandmarkBuffer::new(&config.joints)?;

        Ok(Self {
            joints: config.joints.clone(),
            buffer,
            smoother: config
                .smoother
                .enabled
                .then(|| AdaptiveSmoother::new(config.smoother)),
            classifier: PhaseClassifier::new(config.classifier),
            clock: FrameClock::new(config.session.fps),
            max_frames: config.session.max_frames,
            status: SessionStatus::Processing,
        })
    }

    /// Feed the next frame. Frames arriving after a terminal status are ignored.
    pub fn push_frame(&mut self, record: &FrameRecord) -> &SessionStatus {
        if self.status.is_terminal() {
            debug!(frame = record.frame, "session already terminal, frame ignored");
            return &self.status;
        }

        if let Err(e) = self.process(record) {
            self.fail(e.to_string());
        }
        &self.status
    }

    /// Signal end of input.
    ///
    /// A swing still in progress reports the phases it reached. A video in
    /// which no address was ever committed is an error.
    pub fn finish(&mut self) -> &SessionStatus {
        if self.status.is_terminal() {
            return &self.status;
        }

        let step = self.classifier.completed_step();
        if step.is_empty() {
            self.fail("no address detected");
        } else {
            if step.finish != self.classifier.step_map().finish {
                debug!(frame = ?step.finish, "finish not reached, using finish_top");
            }
            self.complete(step);
        }
        &self.status
    }

    /// Cancel the session into an error status (timeouts, host shutdown).
    pub fn abort(&mut self, reason: impl Into<String>) -> &SessionStatus {
        if !self.status.is_terminal() {
            self.fail(format!("aborted: {}", reason.into()));
        }
        &self.status
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// Phases recorded so far (before any end-of-input promotion).
    pub fn step(&self) -> &SwingStep {
        self.classifier.step_map()
    }

    /// Phase the classifier is currently looking for.
    pub fn current_phase(&self) -> SwingPhase {
        self.classifier.seeking()
    }

    pub fn frames_processed(&self) -> usize {
        self.buffer.len()
    }

    /// Frames that had no detection.
    pub fn none_frames(&self) -> &[usize] {
        self.buffer.none_frames()
    }

    /// Summary of this session for output.
    pub fn report(&self, task_id: impl Into<String>, hand: HandType) -> SessionReport {
        let step = match &self.status {
            SessionStatus::StepCompleted { step } => *step,
            _ => *self.classifier.step_map(),
        };

        SessionReport {
            task_id: task_id.into(),
            hand,
            status: self.status.clone(),
            frames_processed: self.frames_processed(),
            none_frames: self.none_frames().to_vec(),
            phase_times_secs: self.clock.phase_times(&step),
            pose: None,
        }
    }

    /// [`report`](Self::report) with the buffered landmark trajectories attached.
    pub fn report_with_pose(&self, task_id: impl Into<String>, hand: HandType) -> SessionReport {
        SessionReport {
            pose: Some(self.buffer.pose_series()),
            ..self.report(task_id, hand)
        }
    }

    fn process(&mut self, record: &FrameRecord) -> SwingResult<()> {
        if let Some(max) = self.max_frames {
            if self.buffer.len() >= max {
                return Err(SwingError::session(format!(
                    "video too long: more than {max} frames"
                )));
            }
        }

        let detection = record
            .landmarks
            .as_ref()
            .map(|d| d.select(&self.joints, record.frame))
            .transpose()?;

        // Smoothing only starts once the swing has begun, so the address
        // check sees raw positions.
        let swinging = self.classifier.is_swinging();
        let slot =
            self.buffer
                .append(record.frame, detection.as_ref(), record.width, record.height)?;
        if swinging {
            if let Some(smoother) = &self.smoother {
                smoother.apply(&mut self.buffer, slot);
            }
        }

        // A carried-forward frame only pads the buffer; it never counts
        // toward the address streak or records a phase.
        if !slot.detected {
            debug!(frame = record.frame, "no detection, classification skipped");
            return Ok(());
        }

        self.classifier.step(record.frame, &self.buffer)?;

        if self.classifier.is_finished() {
            self.complete(*self.classifier.step_map());
        }
        Ok(())
    }

    fn complete(&mut self, step: SwingStep) {
        let none_frames = self.buffer.none_frames();
        if !none_frames.is_empty() {
            warn!(
                count = none_frames.len(),
                frames = ?none_frames,
                "frames without detection were carried forward"
            );
        }
        info!(
            frames = self.buffer.len(),
            address = ?step.address,
            finish = ?step.finish,
            "swing phases detected"
        );
        self.status = SessionStatus::StepCompleted { step };
    }

    fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(frames = self.buffer.len(), %message, "session failed");
        self.status = SessionStatus::Error { message };
    }
}
