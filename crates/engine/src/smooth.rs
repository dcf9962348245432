//! Adaptive EMA smoothing of buffered pixel coordinates.
//!
//! The filter runs online: each freshly appended sample is blended with the
//! sample before it, and the blend weight grows with how far the joint moved.
//! Fast motion keeps most of the new sample (little lag); slow motion keeps
//! most of the old one (more smoothing).

use swingphase_common::config::SmootherConfig;

use crate::buffer::{AppendSlot, LandmarkBuffer};

/// Velocity-aware exponential moving average.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveSmoother {
    config: SmootherConfig,
}

impl AdaptiveSmoother {
    /// Create a smoother with the given parameters.
    pub fn new(config: SmootherConfig) -> Self {
        Self { config }
    }

    /// Blend weight of the new sample for a per-frame speed (pixels/frame).
    ///
    /// Always within `[alpha_base, alpha_base + alpha_cap_excess]`.
    pub fn alpha(&self, speed: f64) -> f64 {
        let excess = (speed.abs() / self.config.speed_threshold).min(self.config.alpha_cap_excess);
        self.config.alpha_base + excess
    }

    /// Smooth one channel given the previous and the raw current value.
    pub fn smooth_value(&self, previous: f64, current: f64) -> f64 {
        let alpha = self.alpha(current - previous);
        // Same as `alpha * current + (1 - alpha) * previous`, but exact when
        // the two are equal.
        previous + alpha * (current - previous)
    }

    /// Smooth pixel x/y of every joint in `slot`, in place.
    ///
    /// World coordinates are left untouched. Returns the number of joints
    /// adjusted, which is zero for the first frame of a buffer.
    pub fn apply(&self, buffer: &mut LandmarkBuffer, slot: AppendSlot) -> usize {
        let mut adjusted = 0;
        for joint in buffer.joints().to_vec() {
            if let Some((previous, current)) = buffer.slot_pair_mut(joint, slot) {
                current.x = self.smooth_value(previous.x, current.x);
                current.y = self.smooth_value(previous.y, current.y);
                adjusted += 1;
            }
        }
        adjusted
    }
}

impl Default for AdaptiveSmoother {
    fn default() -> Self {
        Self::new(SmootherConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use swingphase_pose_model::{FrameLandmarks, Joint, JointConfig, RawLandmark};

    fn frame(x: f64, y: f64) -> FrameLandmarks {
        Joint::CLASSIFIER_JOINTS
            .iter()
            .map(|j| (*j, RawLandmark::new(x, y, 0.7, 0.1)))
            .collect()
    }

    #[test]
    fn test_alpha_bounds() {
        let smoother = AdaptiveSmoother::default();
        assert!((smoother.alpha(0.0) - 0.2).abs() < 1e-12);
        assert!((smoother.alpha(1.0) - 0.3).abs() < 1e-12);
        assert!((smoother.alpha(3.0) - 0.5).abs() < 1e-12);
        assert!((smoother.alpha(250.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_slow_motion_favors_previous() {
        let smoother = AdaptiveSmoother::default();
        // speed 1 -> alpha 0.3
        assert!((smoother.smooth_value(100.0, 101.0) - 100.3).abs() < 1e-9);
    }

    #[test]
    fn test_fast_motion_caps_at_half() {
        let smoother = AdaptiveSmoother::default();
        assert!((smoother.smooth_value(600.0, 380.0) - 490.0).abs() < 1e-9);
    }

    #[test]
    fn test_apply_touches_pixels_only() {
        let mut buffer = LandmarkBuffer::new(&JointConfig::default()).unwrap();
        let first = buffer.append(0, Some(&frame(0.5, 0.5)), 1000, 1000).unwrap();

        let smoother = AdaptiveSmoother::default();
        assert_eq!(smoother.apply(&mut buffer, first), 0);

        let mut moved = frame(0.28, 0.5);
        moved.insert(Joint::RightWrist, RawLandmark::new(0.28, 0.5, -0.3, 0.9));
        let second = buffer.append(1, Some(&moved), 1000, 1000).unwrap();
        assert_eq!(smoother.apply(&mut buffer, second), 10);

        let wrist = buffer.at(Joint::RightWrist, 1).unwrap();
        assert!((wrist.x - 390.0).abs() < 1e-9);
        assert_eq!(wrist.y, 500.0);
        assert_eq!(wrist.z_norm, -0.3);
        assert_eq!(wrist.x_norm, 0.9);
        // the reference sample is never rewritten
        assert_eq!(buffer.at(Joint::RightWrist, 0).unwrap().x, 500.0);
    }

    proptest! {
        #[test]
        fn prop_constant_input_is_unchanged(value in -5000.0f64..5000.0) {
            let smoother = AdaptiveSmoother::default();
            prop_assert_eq!(smoother.smooth_value(value, value), value);
        }

        #[test]
        fn prop_output_lies_between_inputs(p in -5000.0f64..5000.0, c in -5000.0f64..5000.0) {
            let smoother = AdaptiveSmoother::default();
            let s = smoother.smooth_value(p, c);
            prop_assert!(s >= p.min(c) - 1e-9 && s <= p.max(c) + 1e-9);
            // alpha <= 0.5, so the result never passes the midpoint
            prop_assert!((s - p).abs() <= (c - p).abs() * 0.5 + 1e-9);
        }

        #[test]
        fn prop_constant_stream_stays_constant(v in 0.0f64..1.0, frames in 2usize..20) {
            let mut buffer = LandmarkBuffer::new(&JointConfig::default()).unwrap();
            let smoother = AdaptiveSmoother::default();
            for i in 0..frames {
                let slot = buffer.append(i, Some(&frame(v, v)), 1920, 1080).unwrap();
                smoother.apply(&mut buffer, slot);
            }
            let expected = buffer.at(Joint::LeftHip, 0).unwrap();
            for s in buffer.slice_from(Joint::LeftHip, 0).unwrap() {
                prop_assert_eq!(*s, expected);
            }
        }
    }
}
