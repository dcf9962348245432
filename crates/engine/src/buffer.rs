//! Per-joint landmark history.
//!
//! One sample is appended per frame for every configured joint, so all series
//! always have the same length. Frames without a detection repeat the previous
//! sample (or zeros on the very first frame).

use std::collections::BTreeMap;

use swingphase_common::error::{SwingError, SwingResult};
use swingphase_pose_model::{FrameLandmarks, Joint, JointConfig, JointSeries, Point2D, PoseSeries};

/// One buffered frame of one joint.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LandmarkSample {
    /// Pixel X.
    pub x: f64,
    /// Pixel Y (grows downward).
    pub y: f64,
    /// World-space Z.
    pub z_norm: f64,
    /// World-space X.
    pub x_norm: f64,
}

impl LandmarkSample {
    /// Pixel-space position.
    pub fn point(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// Pixel position of every joint in the latest frame.
pub type CurrentFrameLandmarks = BTreeMap<Joint, Point2D>;

/// Handle to the samples written by one [`LandmarkBuffer::append`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendSlot {
    /// Frame index the slot belongs to.
    pub frame: usize,
    /// Whether the slot holds a fresh detection rather than a carried-forward one.
    pub detected: bool,
}

/// Append-only per-joint time series.
#[derive(Debug, Clone)]
pub struct LandmarkBuffer {
    joints: Vec<Joint>,
    series: BTreeMap<Joint, Vec<LandmarkSample>>,
    len: usize,
    none_frames: Vec<usize>,
}

impl LandmarkBuffer {
    /// Create an empty buffer for the configured joints.
    pub fn new(config: &JointConfig) -> SwingResult<Self> {
        config.validate()?;
        Ok(Self {
            joints: config.names.clone(),
            series: config.names.iter().map(|j| (*j, Vec::new())).collect(),
            len: 0,
            none_frames: Vec::new(),
        })
    }

    /// Append frame `frame_index`.
    ///
    /// With a detection, every configured joint gets its pixel-scaled position
    /// and world coordinates. Without one, every joint repeats its previous
    /// sample and the frame is noted in [`none_frames`](Self::none_frames).
    pub fn append(
        &mut self,
        frame_index: usize,
        detection: Option<&FrameLandmarks>,
        width: u32,
        height: u32,
    ) -> SwingResult<AppendSlot> {
        if frame_index != self.len {
            return Err(SwingError::input(format!(
                "expected frame {}, got frame {frame_index}",
                self.len
            )));
        }

        let Some(landmarks) = detection else {
            for series in self.series.values_mut() {
                let held = series.last().copied().unwrap_or_default();
                series.push(held);
            }
            self.none_frames.push(frame_index);
            self.len += 1;
            return Ok(AppendSlot {
                frame: frame_index,
                detected: false,
            });
        };

        // Resolve every joint before touching the series so a bad frame
        // cannot leave them with unequal lengths.
        let (w, h) = (width as f64, height as f64);
        let samples = self
            .joints
            .iter()
            .map(|joint| {
                landmarks
                    .get(joint)
                    .map(|lm| {
                        (
                            *joint,
                            LandmarkSample {
                                x: lm.x * w,
                                y: lm.y * h,
                                z_norm: lm.z_norm,
                                x_norm: lm.x_norm,
                            },
                        )
                    })
                    .ok_or_else(|| {
                        SwingError::input(format!(
                            "frame {frame_index}: detection has no landmark for '{joint}'"
                        ))
                    })
            })
            .collect::<SwingResult<Vec<_>>>()?;

        for (joint, sample) in samples {
            if let Some(series) = self.series.get_mut(&joint) {
                series.push(sample);
            }
        }
        self.len += 1;

        Ok(AppendSlot {
            frame: frame_index,
            detected: true,
        })
    }

    /// The sample before `slot` and a mutable reference to the sample in it.
    ///
    /// `None` for the first frame, which has nothing to compare against.
    pub fn slot_pair_mut(
        &mut self,
        joint: Joint,
        slot: AppendSlot,
    ) -> Option<(&LandmarkSample, &mut LandmarkSample)> {
        let series = self.series.get_mut(&joint)?;
        if slot.frame == 0 || slot.frame >= series.len() {
            return None;
        }
        let (before, from) = series.split_at_mut(slot.frame);
        Some((&before[slot.frame - 1], &mut from[0]))
    }

    /// Latest sample of `joint`.
    pub fn last(&self, joint: Joint) -> SwingResult<LandmarkSample> {
        let series = self.series(joint)?;
        series.last().copied().ok_or(SwingError::OutOfRange {
            joint,
            frame: 0,
            len: 0,
        })
    }

    /// Up to `n` most recent samples of `joint`, oldest first.
    pub fn last_n(&self, joint: Joint, n: usize) -> SwingResult<&[LandmarkSample]> {
        let series = self.series(joint)?;
        Ok(&series[series.len().saturating_sub(n)..])
    }

    /// Samples of `joint` from `start_frame` through the latest frame.
    pub fn slice_from(&self, joint: Joint, start_frame: usize) -> SwingResult<&[LandmarkSample]> {
        let series = self.series(joint)?;
        series.get(start_frame..).ok_or(SwingError::OutOfRange {
            joint,
            frame: start_frame,
            len: series.len(),
        })
    }

    /// Sample of `joint` at `frame`.
    pub fn at(&self, joint: Joint, frame: usize) -> SwingResult<LandmarkSample> {
        let series = self.series(joint)?;
        series.get(frame).copied().ok_or(SwingError::OutOfRange {
            joint,
            frame,
            len: series.len(),
        })
    }

    /// Pixel position of every joint in the latest frame.
    ///
    /// Empty until the first frame is appended.
    pub fn current_view(&self) -> CurrentFrameLandmarks {
        self.joints
            .iter()
            .filter_map(|joint| self.last(*joint).ok().map(|s| (*joint, s.point())))
            .collect()
    }

    /// Every buffered sample, split into per-joint channel series.
    ///
    /// Samples are exported as stored, so carried-forward frames repeat the
    /// held values and swing frames carry the smoothed pixel positions.
    pub fn pose_series(&self) -> PoseSeries {
        self.series
            .iter()
            .map(|(joint, samples)| {
                let mut out = JointSeries::with_capacity(samples.len());
                for s in samples {
                    out.push(s.x, s.y, s.z_norm, s.x_norm);
                }
                (*joint, out)
            })
            .collect()
    }

    /// Frames appended so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Configured joints, in configuration order.
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Frames that were carried forward because nothing was detected.
    pub fn none_frames(&self) -> &[usize] {
        &self.none_frames
    }

    fn series(&self, joint: Joint) -> SwingResult<&[LandmarkSample]> {
        self.series
            .get(&joint)
            .map(Vec::as_slice)
            .ok_or_else(|| SwingError::config(format!("joint '{joint}' is not tracked")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swingphase_pose_model::RawLandmark;

    fn detection(x: f64, y: f64) -> FrameLandmarks {
        JointConfig::default()
            .names
            .iter()
            .enumerate()
            .map(|(i, joint)| (*joint, RawLandmark::new(x, y + i as f64 * 0.01, 0.5, -0.5)))
            .collect()
    }

    #[test]
    fn test_mismatched_config_is_fatal() {
        let mut config = JointConfig::default();
        config.indices.push(0);
        assert!(matches!(
            LandmarkBuffer::new(&config),
            Err(SwingError::Config { .. })
        ));
    }

    #[test]
    fn test_append_scales_to_pixels() {
        let mut buffer = LandmarkBuffer::new(&JointConfig::default()).unwrap();
        let slot = buffer.append(0, Some(&detection(0.5, 0.25)), 640, 480).unwrap();
        assert!(slot.detected);

        let sample = buffer.at(Joint::LeftShoulder, 0).unwrap();
        assert_eq!(sample.x, 320.0);
        assert_eq!(sample.y, 120.0);
        assert_eq!(sample.z_norm, 0.5);
        assert_eq!(sample.x_norm, -0.5);
    }

    #[test]
    fn test_missing_detection_on_first_frame_is_zero() {
        let mut buffer = LandmarkBuffer::new(&JointConfig::default()).unwrap();
        let slot = buffer.append(0, None, 640, 480).unwrap();
        assert!(!slot.detected);

        for joint in buffer.joints().to_vec() {
            assert_eq!(buffer.at(joint, 0).unwrap(), LandmarkSample::default());
        }
        assert_eq!(buffer.none_frames(), &[0]);
    }

    #[test]
    fn test_missing_detection_holds_last_on_all_channels() {
        let mut buffer = LandmarkBuffer::new(&JointConfig::default()).unwrap();
        buffer.append(0, Some(&detection(0.1, 0.2)), 100, 100).unwrap();
        buffer.append(1, Some(&detection(0.3, 0.4)), 100, 100).unwrap();
        buffer.append(2, None, 100, 100).unwrap();
        buffer.append(3, None, 100, 100).unwrap();

        for joint in buffer.joints().to_vec() {
            let before = buffer.at(joint, 1).unwrap();
            assert_eq!(buffer.at(joint, 2).unwrap(), before);
            assert_eq!(buffer.at(joint, 3).unwrap(), before);
        }
        assert_eq!(buffer.none_frames(), &[2, 3]);
        assert_eq!(buffer.len(), 4);
    }

    #[test]
    fn test_out_of_order_frame_is_rejected() {
        let mut buffer = LandmarkBuffer::new(&JointConfig::default()).unwrap();
        buffer.append(0, None, 10, 10).unwrap();
        let err = buffer.append(2, None, 10, 10).unwrap_err();
        assert!(matches!(err, SwingError::Input { .. }));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_incomplete_detection_leaves_lengths_equal() {
        let mut buffer = LandmarkBuffer::new(&JointConfig::default()).unwrap();
        let mut partial = detection(0.1, 0.1);
        partial.remove(&Joint::RightKnee);

        assert!(buffer.append(0, Some(&partial), 10, 10).is_err());
        assert!(buffer.is_empty());
        for joint in buffer.joints().to_vec() {
            assert!(buffer.last_n(joint, 5).unwrap().is_empty());
        }
    }

    #[test]
    fn test_range_reads() {
        let mut buffer = LandmarkBuffer::new(&JointConfig::default()).unwrap();
        for frame in 0..5 {
            let d = detection(0.1 * frame as f64, 0.0);
            buffer.append(frame, Some(&d), 10, 10).unwrap();
        }

        let tail = buffer.last_n(Joint::LeftShoulder, 2).unwrap();
        assert_eq!(tail.len(), 2);
        assert!((tail[0].x - 3.0).abs() < 1e-9);
        assert!((tail[1].x - 4.0).abs() < 1e-9);
        assert_eq!(buffer.last_n(Joint::LeftShoulder, 99).unwrap().len(), 5);

        assert_eq!(buffer.slice_from(Joint::LeftShoulder, 3).unwrap().len(), 2);
        assert!(buffer.slice_from(Joint::LeftShoulder, 5).unwrap().is_empty());
        assert!(matches!(
            buffer.slice_from(Joint::LeftShoulder, 6),
            Err(SwingError::OutOfRange {
                frame: 6,
                len: 5,
                ..
            })
        ));
        assert!(matches!(
            buffer.at(Joint::RightWrist, 5),
            Err(SwingError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_untracked_joint_is_reported() {
        let buffer = LandmarkBuffer::new(&JointConfig::default()).unwrap();
        assert!(matches!(
            buffer.last(Joint::Nose),
            Err(SwingError::Config { .. })
        ));
    }

    #[test]
    fn test_current_view_projects_latest_pixels() {
        let mut buffer = LandmarkBuffer::new(&JointConfig::default()).unwrap();
        assert!(buffer.current_view().is_empty());

        assert!(matches!(
            buffer.last(Joint::LeftShoulder),
            Err(SwingError::OutOfRange { len: 0, .. })
        ));

        buffer.append(0, Some(&detection(0.5, 0.5)), 200, 100).unwrap();
        let view = buffer.current_view();
        assert_eq!(view.len(), 10);
        assert_eq!(view[&Joint::LeftShoulder], Point2D::new(100.0, 50.0));
    }

    #[test]
    fn test_pose_series_exports_every_frame() {
        let mut buffer = LandmarkBuffer::new(&JointConfig::default()).unwrap();
        assert!(buffer.pose_series().values().all(JointSeries::is_empty));

        buffer.append(0, Some(&detection(0.1, 0.2)), 100, 100).unwrap();
        buffer.append(1, None, 100, 100).unwrap();
        buffer.append(2, Some(&detection(0.3, 0.2)), 100, 100).unwrap();

        let pose = buffer.pose_series();
        assert_eq!(pose.len(), 10);
        assert!(pose.values().all(|series| series.len() == 3));

        let shoulder = &pose[&Joint::LeftShoulder];
        assert!((shoulder.x[0] - 10.0).abs() < 1e-9);
        assert_eq!(shoulder.x[1], shoulder.x[0]);
        assert!((shoulder.x[2] - 30.0).abs() < 1e-9);
        assert_eq!(shoulder.z_norm, vec![0.5; 3]);
        assert_eq!(shoulder.x_norm, vec![-0.5; 3]);
    }

    #[test]
    fn test_slot_pair_mut_edits_only_the_new_sample() {
        let mut buffer = LandmarkBuffer::new(&JointConfig::default()).unwrap();
        let first = buffer.append(0, Some(&detection(0.1, 0.1)), 100, 100).unwrap();
        assert!(buffer.slot_pair_mut(Joint::RightWrist, first).is_none());

        let second = buffer.append(1, Some(&detection(0.2, 0.1)), 100, 100).unwrap();
        let (prev, current) = buffer.slot_pair_mut(Joint::RightWrist, second).unwrap();
        assert!((prev.x - 10.0).abs() < 1e-9);
        current.x = 15.0;

        assert_eq!(buffer.at(Joint::RightWrist, 1).unwrap().x, 15.0);
        assert!((buffer.at(Joint::RightWrist, 0).unwrap().x - 10.0).abs() < 1e-9);
    }
}
