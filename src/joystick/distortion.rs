//! Visual distortion of the indicator dot near the edge of its range

use serde::Serialize;
use std::f64::consts::FRAC_PI_4;

/// Fraction of max range beyond which the dot is drawn distorted
pub const DISTORTION_THRESHOLD: f64 = 0.7;

/// Rotation applied while the dot is round
pub const RESTING_ROTATION: f64 = FRAC_PI_4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Round,
    Distorted,
}

impl Shape {
    /// CSS border radius a browser surface renders this shape with
    pub fn border_radius(&self) -> &'static str {
        match self {
            Shape::Round => "50%",
            Shape::Distorted => "70% 80% 70% 15%",
        }
    }
}

/// Visual state of the indicator dot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distortion {
    pub shape: Shape,
    /// Rotation in radians
    pub rotation: f64,
}

impl Distortion {
    pub const RESTING: Distortion = Distortion {
        shape: Shape::Round,
        rotation: RESTING_ROTATION,
    };
}

/// Derive the dot's visual state from the current distance and angle
///
/// The resting rotation is a fixed constant and does not track the last angle.
pub fn distort(distance: f64, angle: f64, max_range: f64) -> Distortion {
    if distance > max_range * DISTORTION_THRESHOLD {
        Distortion {
            shape: Shape::Distorted,
            rotation: angle + FRAC_PI_4,
        }
    } else {
        Distortion::RESTING
    }
}
