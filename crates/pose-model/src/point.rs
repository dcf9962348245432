//! 2D points in pixel space.

use serde::{Deserialize, Serialize};

/// A 2D point in pixel coordinates.
///
/// Image convention: `(0, 0)` is the top-left corner and `y` grows downward,
/// so a larger `y` is lower on screen.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}
