//! Per-instance joystick options and their validated form
//!
//! [`JoystickOptions`] is what callers and scene files provide: every field is
//! optional. [`JoystickConfig`] is the normalized, complete configuration an
//! instance runs with. Invalid values never fail; they are replaced by the
//! nearest valid value (logged at debug level).

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::debug;

use super::anchor::Anchor;
use crate::input::{ElementId, ListenTarget};

const DEFAULT_MAX_RANGE: f64 = 100.0;
const DEFAULT_LEVEL: u32 = 10;
const DEFAULT_RADIUS: f64 = 50.0;
const DEFAULT_INNER_RADIUS: f64 = 30.0;
const DEFAULT_OPACITY: f64 = 0.8;

/// Which mouse button starts a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButton {
    #[default]
    All,
    Left,
    Middle,
    Right,
    /// Raw button code 3..=5 (back, forward, ...)
    Other(i16),
}

impl MouseButton {
    /// Map a DOM button code; codes outside -1..=5 are rejected
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            -1 => Some(MouseButton::All),
            0 => Some(MouseButton::Left),
            1 => Some(MouseButton::Middle),
            2 => Some(MouseButton::Right),
            3..=5 => Some(MouseButton::Other(code as i16)),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "ALL" => Some(MouseButton::All),
            "LEFT" => Some(MouseButton::Left),
            "MIDDLE" => Some(MouseButton::Middle),
            "RIGHT" => Some(MouseButton::Right),
            _ => None,
        }
    }

    pub fn code(&self) -> i16 {
        match self {
            MouseButton::All => -1,
            MouseButton::Left => 0,
            MouseButton::Middle => 1,
            MouseButton::Right => 2,
            MouseButton::Other(code) => *code,
        }
    }

    /// Whether a press of `button` qualifies
    pub fn accepts(&self, button: i16) -> bool {
        *self == MouseButton::All || self.code() == button
    }
}

/// Mouse button as written in options: a name, a raw code, or anything else
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MouseButtonSetting {
    Code(i64),
    Name(String),
    /// Unrecognized value; integral numbers still map to a code
    Other(Value),
}

impl MouseButtonSetting {
    /// Resolve, falling back to [`MouseButton::All`] for unknown values
    pub fn resolve(&self) -> MouseButton {
        let resolved = match self {
            MouseButtonSetting::Code(code) => MouseButton::from_code(*code),
            MouseButtonSetting::Name(name) => MouseButton::from_name(name),
            MouseButtonSetting::Other(value) => value
                .as_f64()
                .filter(|code| code.fract() == 0.0)
                .and_then(|code| MouseButton::from_code(code as i64)),
        };
        resolved.unwrap_or_else(|| {
            debug!("Ignoring invalid mouse button {:?}, listening on all buttons", self);
            MouseButton::All
        })
    }
}

impl From<MouseButton> for MouseButtonSetting {
    fn from(button: MouseButton) -> Self {
        MouseButtonSetting::Code(button.code() as i64)
    }
}

/// Partial joystick options; unset fields take their defaults
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct JoystickOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_range: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Rounded to the nearest integer step count
    pub level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_to_right: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom_to_up: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<Anchor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Anchor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distortion: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_position: Option<bool>,
    /// Name of the listening element; absent means the whole document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_position_target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mouse_button: Option<MouseButtonSetting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_context_menu: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joystick_class: Option<String>,
}

/// Complete, normalized configuration of one joystick
#[derive(Debug, Clone, PartialEq)]
pub struct JoystickConfig {
    /// Maximum travel of the dot in pixels (>= 1)
    pub max_range: f64,
    /// Number of quantization steps per direction (>= 1)
    pub level: u32,
    /// Radius of the outer ring in pixels
    pub radius: f64,
    /// Radius of the inner dot in pixels
    pub inner_radius: f64,
    pub opacity: f64,
    /// Measure `x` from the left edge (otherwise from the right)
    pub left_to_right: bool,
    /// Measure `y` from the bottom edge (otherwise from the top)
    pub bottom_to_up: bool,
    pub x: Anchor,
    pub y: Anchor,
    pub distortion: bool,
    pub dynamic_position: bool,
    pub dynamic_position_target: Option<ElementId>,
    pub mouse_button: MouseButton,
    pub hide_context_menu: bool,
    pub container_class: String,
    pub controller_class: String,
    pub joystick_class: String,
}

impl Default for JoystickConfig {
    fn default() -> Self {
        Self {
            max_range: DEFAULT_MAX_RANGE,
            level: DEFAULT_LEVEL,
            radius: DEFAULT_RADIUS,
            inner_radius: DEFAULT_INNER_RADIUS,
            opacity: DEFAULT_OPACITY,
            left_to_right: true,
            bottom_to_up: true,
            x: Anchor::default(),
            y: Anchor::default(),
            distortion: false,
            dynamic_position: false,
            dynamic_position_target: None,
            mouse_button: MouseButton::All,
            hide_context_menu: false,
            container_class: String::new(),
            controller_class: String::new(),
            joystick_class: String::new(),
        }
    }
}

impl JoystickConfig {
    /// Merge options over the defaults and normalize
    pub fn from_options(options: &JoystickOptions) -> Self {
        let defaults = Self::default();

        let level = match options.level {
            None => defaults.level,
            Some(level) if !level.is_finite() => {
                debug!("Level {} is not finite, using {}", level, DEFAULT_LEVEL);
                DEFAULT_LEVEL
            }
            Some(level) => {
                let rounded = level.round();
                if rounded < 1.0 {
                    debug!("Level {} is not positive, using 1", level);
                    1
                } else {
                    if rounded != level {
                        debug!("Level {} is not an integer, using {}", level, rounded);
                    }
                    // Float-to-int casts saturate at u32::MAX
                    rounded as u32
                }
            }
        };

        Self {
            max_range: options.max_range.unwrap_or(defaults.max_range),
            level,
            radius: options.radius.unwrap_or(defaults.radius),
            inner_radius: options.inner_radius.unwrap_or(defaults.inner_radius),
            opacity: options.opacity.unwrap_or(defaults.opacity),
            left_to_right: options.left_to_right.unwrap_or(defaults.left_to_right),
            bottom_to_up: options.bottom_to_up.unwrap_or(defaults.bottom_to_up),
            x: options.x.unwrap_or(defaults.x),
            y: options.y.unwrap_or(defaults.y),
            distortion: options.distortion.unwrap_or(defaults.distortion),
            dynamic_position: options.dynamic_position.unwrap_or(defaults.dynamic_position),
            dynamic_position_target: options
                .dynamic_position_target
                .as_deref()
                .map(ElementId::new),
            mouse_button: options
                .mouse_button
                .as_ref()
                .map(MouseButtonSetting::resolve)
                .unwrap_or_default(),
            hide_context_menu: options.hide_context_menu.unwrap_or(defaults.hide_context_menu),
            container_class: options.container_class.clone().unwrap_or_default(),
            controller_class: options.controller_class.clone().unwrap_or_default(),
            joystick_class: options.joystick_class.clone().unwrap_or_default(),
        }
        .normalized()
    }

    /// Clamp numeric fields into their valid ranges
    pub fn normalized(mut self) -> Self {
        if !self.max_range.is_finite() {
            debug!("Max range {} is not finite, using {}", self.max_range, DEFAULT_MAX_RANGE);
            self.max_range = DEFAULT_MAX_RANGE;
        } else if self.max_range < 1.0 {
            debug!("Max range {} below minimum, using 1", self.max_range);
            self.max_range = 1.0;
        }

        if self.level == 0 {
            debug!("Level 0 is not positive, using 1");
            self.level = 1;
        }

        self.radius = positive_or(self.radius, DEFAULT_RADIUS, "radius");
        self.inner_radius = positive_or(self.inner_radius, DEFAULT_INNER_RADIUS, "inner radius");

        self.opacity = if self.opacity.is_finite() {
            self.opacity.clamp(0.0, 1.0)
        } else {
            DEFAULT_OPACITY
        };

        self
    }

    /// Surface that receives pointer-downs in dynamic mode
    pub fn listen_target(&self) -> ListenTarget {
        self.dynamic_position_target
            .clone()
            .map(ListenTarget::Element)
            .unwrap_or_default()
    }

    /// Options that reproduce this configuration
    pub fn to_options(&self) -> JoystickOptions {
        JoystickOptions {
            max_range: Some(self.max_range),
            level: Some(f64::from(self.level)),
            radius: Some(self.radius),
            inner_radius: Some(self.inner_radius),
            opacity: Some(self.opacity),
            left_to_right: Some(self.left_to_right),
            bottom_to_up: Some(self.bottom_to_up),
            x: Some(self.x),
            y: Some(self.y),
            distortion: Some(self.distortion),
            dynamic_position: Some(self.dynamic_position),
            dynamic_position_target: self
                .dynamic_position_target
                .as_ref()
                .map(|id| id.as_str().to_string()),
            mouse_button: Some(self.mouse_button.into()),
            hide_context_menu: Some(self.hide_context_menu),
            container_class: non_empty(&self.container_class),
            controller_class: non_empty(&self.controller_class),
            joystick_class: non_empty(&self.joystick_class),
        }
    }
}

fn positive_or(value: f64, default: f64, what: &str) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        debug!("Invalid {} {}, using {}", what, value, default);
        default
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = JoystickConfig::from_options(&JoystickOptions::default());
        assert_eq!(config, JoystickConfig::default());
        assert_eq!(config.max_range, 100.0);
        assert_eq!(config.level, 10);
        assert_eq!(config.radius, 50.0);
        assert_eq!(config.inner_radius, 30.0);
        assert_eq!(config.opacity, 0.8);
        assert_eq!(config.x, Anchor::Percent(50.0));
        assert_eq!(config.mouse_button, MouseButton::All);
        assert_eq!(config.listen_target(), ListenTarget::Document);
    }

    #[test]
    fn test_invalid_numbers_are_normalized() {
        let options = JoystickOptions {
            max_range: Some(0.0),
            level: Some(-3.0),
            radius: Some(-10.0),
            inner_radius: Some(f64::NAN),
            opacity: Some(4.0),
            ..Default::default()
        };
        let config = JoystickConfig::from_options(&options);

        assert_eq!(config.max_range, 1.0);
        assert_eq!(config.level, 1);
        assert_eq!(config.radius, 50.0);
        assert_eq!(config.inner_radius, 30.0);
        assert_eq!(config.opacity, 1.0);
    }

    #[test]
    fn test_non_finite_max_range_uses_default() {
        let config = JoystickConfig {
            max_range: f64::INFINITY,
            level: 0,
            ..Default::default()
        }
        .normalized();
        assert_eq!(config.max_range, 100.0);
        assert_eq!(config.level, 1);
    }

    #[test]
    fn test_mouse_button_resolution() {
        assert_eq!(MouseButtonSetting::Name("RIGHT".into()).resolve(), MouseButton::Right);
        assert_eq!(MouseButtonSetting::Name("left".into()).resolve(), MouseButton::Left);
        assert_eq!(MouseButtonSetting::Code(1).resolve(), MouseButton::Middle);
        assert_eq!(MouseButtonSetting::Code(4).resolve(), MouseButton::Other(4));
        assert_eq!(MouseButtonSetting::Code(6).resolve(), MouseButton::All);
        assert_eq!(MouseButtonSetting::Code(-2).resolve(), MouseButton::All);
        assert_eq!(MouseButtonSetting::Name("THUMB".into()).resolve(), MouseButton::All);
    }

    #[test]
    fn test_fractional_values_are_normalized() {
        let yaml = "level: 2.5\nmouse_button: 1.5\n";
        let options: JoystickOptions = serde_yaml::from_str(yaml).unwrap();
        let config = JoystickConfig::from_options(&options);

        assert_eq!(config.level, 3);
        assert_eq!(config.mouse_button, MouseButton::All);
    }

    #[test]
    fn test_unusual_mouse_button_values() {
        let options: JoystickOptions = serde_yaml::from_str("mouse_button: 2.0").unwrap();
        assert_eq!(
            JoystickConfig::from_options(&options).mouse_button,
            MouseButton::Right
        );

        let options: JoystickOptions = serde_yaml::from_str("mouse_button: [1, 2]").unwrap();
        assert_eq!(
            JoystickConfig::from_options(&options).mouse_button,
            MouseButton::All
        );
    }

    #[test]
    fn test_level_edge_values() {
        let level_of = |level: f64| {
            JoystickConfig::from_options(&JoystickOptions {
                level: Some(level),
                ..Default::default()
            })
            .level
        };
        assert_eq!(level_of(0.4), 1);
        assert_eq!(level_of(7.0), 7);
        assert_eq!(level_of(f64::NAN), 10);
        assert_eq!(level_of(1e12), u32::MAX);
    }

    #[test]
    fn test_mouse_button_accepts() {
        assert!(MouseButton::All.accepts(0));
        assert!(MouseButton::All.accepts(2));
        assert!(MouseButton::Right.accepts(2));
        assert!(!MouseButton::Right.accepts(0));
    }

    #[test]
    fn test_options_from_yaml() {
        let yaml = r#"
max_range: 80
level: 4
x: "20%"
y: 120
dynamic_position: true
dynamic_position_target: left-half
mouse_button: RIGHT
hide_context_menu: true
"#;
        let options: JoystickOptions = serde_yaml::from_str(yaml).unwrap();
        let config = JoystickConfig::from_options(&options);

        assert_eq!(config.max_range, 80.0);
        assert_eq!(config.level, 4);
        assert_eq!(config.x, Anchor::Percent(20.0));
        assert_eq!(config.y, Anchor::Pixels(120.0));
        assert!(config.dynamic_position);
        assert_eq!(
            config.listen_target(),
            ListenTarget::Element(ElementId::new("left-half"))
        );
        assert_eq!(config.mouse_button, MouseButton::Right);
        assert!(config.hide_context_menu);
    }

    #[test]
    fn test_to_options_reproduces_config() {
        let config = JoystickConfig {
            max_range: 64.0,
            mouse_button: MouseButton::Middle,
            dynamic_position_target: Some(ElementId::new("pad")),
            joystick_class: "knob".into(),
            ..Default::default()
        };
        assert_eq!(JoystickConfig::from_options(&config.to_options()), config);
    }
}
