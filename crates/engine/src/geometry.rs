//! Geometry helpers for the phase predicates.
//!
//! All points are in image space: `y` grows downward and is never inverted.
//! An angle of 90° therefore points straight *down* the frame.

use swingphase_pose_model::Point2D;

/// Angle of the segment `p1 → p2` against the horizontal axis, in `[0, 360)`.
///
/// A zero-length segment yields `0.0`.
pub fn angle_to_horizontal(p1: Point2D, p2: Point2D) -> f64 {
    let degrees = (p2.y - p1.y).atan2(p2.x - p1.x).to_degrees();
    let degrees = if degrees < 0.0 {
        degrees + 360.0
    } else {
        degrees
    };
    // A tiny negative angle rounds up to exactly 360 after the shift.
    if degrees >= 360.0 {
        0.0
    } else {
        degrees
    }
}

/// Arithmetic mean of two points.
pub fn midpoint(p1: Point2D, p2: Point2D) -> Point2D {
    Point2D::new((p1.x + p2.x) / 2.0, (p1.y + p2.y) / 2.0)
}

/// Point at fraction `t` of the way from `p1` to `p2` (unclamped).
pub fn lerp(p1: Point2D, p2: Point2D, t: f64) -> Point2D {
    Point2D::new(p1.x + (p2.x - p1.x) * t, p1.y + (p2.y - p1.y) * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn p(x: f64, y: f64) -> Point2D {
        Point2D::new(x, y)
    }

    #[test]
    fn test_degenerate_segment_is_zero() {
        assert_eq!(angle_to_horizontal(p(3.0, 4.0), p(3.0, 4.0)), 0.0);
        assert_eq!(angle_to_horizontal(p(0.0, 0.0), p(0.0, 0.0)), 0.0);
    }

    #[test]
    fn test_image_space_axes() {
        assert!((angle_to_horizontal(p(0.0, 0.0), p(1.0, 0.0)) - 0.0).abs() < 1e-9);
        // y grows downward: a point below is at 90 degrees.
        assert!((angle_to_horizontal(p(0.0, 0.0), p(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((angle_to_horizontal(p(0.0, 0.0), p(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((angle_to_horizontal(p(0.0, 0.0), p(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_spine_angle_fixture() {
        // Shoulder up-left of the hip, as in an address posture.
        let shoulder = p(300.0, 300.0);
        let hip = p(400.0, 500.0);
        let angle = angle_to_horizontal(shoulder, hip);
        assert!((angle - 63.434_948_822_922).abs() < 1e-9);

        // Reversing the segment lands on the opposite half-plane.
        assert!((angle_to_horizontal(hip, shoulder) - (angle + 180.0)).abs() < 1e-9);
    }

    #[test]
    fn test_midpoint_and_lerp() {
        assert_eq!(midpoint(p(0.0, 10.0), p(4.0, 20.0)), p(2.0, 15.0));
        let third = lerp(p(380.0, 290.0), p(430.0, 150.0), 1.0 / 3.0);
        assert!((third.x - 396.666_666_666_666_7).abs() < 1e-9);
        assert!((third.y - 243.333_333_333_333_3).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_angle_is_in_range(
            x1 in -1e4f64..1e4, y1 in -1e4f64..1e4,
            x2 in -1e4f64..1e4, y2 in -1e4f64..1e4,
        ) {
            let angle = angle_to_horizontal(p(x1, y1), p(x2, y2));
            prop_assert!((0.0..360.0).contains(&angle), "angle {} out of range", angle);
        }
    }
}
