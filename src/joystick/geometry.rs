//! Pointer-to-joystick coordinate transform
//!
//! Converts an absolute pointer position and the joystick center into the
//! normalized [`Reading`] delivered to consumers.
//!
//! # Conventions
//!
//! - Screen y grows downward; joystick y is up-positive, so `y` is negated.
//! - Integer outputs use round-half-up (`floor(v + 0.5)`): `-2.5` rounds to `-2`.
//! - `angle` and `distance` are rounded to 4 decimal places.

use serde::{Deserialize, Serialize};

use crate::input::Point;

/// Normalized joystick output
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    /// Horizontal offset from center in pixels, clamped to max range
    pub x: i32,
    /// Vertical offset from center in pixels (up is positive)
    pub y: i32,
    /// `x` quantized to an integer step in `[-level, level]`
    pub leveled_x: i32,
    /// `y` quantized to an integer step in `[-level, level]`
    pub leveled_y: i32,
    /// Angle of the pointer around the center, radians in (-π, π]
    pub angle: f64,
    /// Unclamped distance of the pointer from the center
    pub distance: f64,
}

impl Reading {
    /// Resting reading that keeps the given angle
    ///
    /// Only offsets and distance return to zero on release; the angle stays.
    pub const fn rest(angle: f64) -> Self {
        Self {
            x: 0,
            y: 0,
            leveled_x: 0,
            leveled_y: 0,
            angle,
            distance: 0.0,
        }
    }

    pub fn is_rest(&self) -> bool {
        self.x == 0
            && self.y == 0
            && self.leveled_x == 0
            && self.leveled_y == 0
            && self.distance == 0.0
    }

    /// Carry `previous_angle` over when the pointer sits exactly on the center
    pub fn holding_angle_at_rest(mut self, previous_angle: f64) -> Self {
        if self.distance == 0.0 {
            self.angle = previous_angle;
        }
        self
    }
}

/// Round half toward positive infinity
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Transform a pointer position into a [`Reading`]
///
/// `max_range` must be positive; configuration normalization guarantees it.
/// At the exact center the angle is `atan2(0, 0) = 0`; callers holding a
/// previous reading use [`Reading::holding_angle_at_rest`].
pub fn transform(pointer: Point, center: Point, max_range: f64, level: u32) -> Reading {
    debug_assert!(max_range > 0.0, "max_range must be positive");

    let dx = pointer.x - center.x;
    let dy = pointer.y - center.y;

    let distance = round_to((dx * dx + dy * dy).sqrt(), 4);
    let angle = round_to(dy.atan2(dx), 4);
    let clamped = distance.min(max_range);

    let x = round_half_up(angle.cos() * clamped);
    let y = -round_half_up(angle.sin() * clamped);

    let level = level as f64;
    let leveled_x = round_half_up(x / max_range * level).clamp(-level, level);
    let leveled_y = round_half_up(y / max_range * level).clamp(-level, level);

    Reading {
        x: x as i32,
        y: y as i32,
        leveled_x: leveled_x as i32,
        leveled_y: leveled_y as i32,
        angle,
        distance,
    }
}
