//! Visual surfaces for joystick instances
//!
//! The engine never draws anything itself. A [`JoystickSurface`] owns the three
//! visual layers (anchor container, ring, inner dot) and reports their layout
//! back so the engine can compute the center.

pub mod headless;

use serde::Serialize;

use crate::config::{Anchor, JoystickConfig};
use crate::input::Point;
use crate::joystick::distortion::Distortion;
use crate::registry::{JoystickId, LayerIds};

pub use headless::{HeadlessSurface, SurfaceView, SurfaceState, Viewport};

/// Axis-aligned rectangle in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// Square of side `2 * radius` centered on `center`
    pub fn around(center: Point, radius: f64) -> Self {
        Self::new(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0)
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.left + self.width
            && point.y >= self.top
            && point.y <= self.top + self.height
    }
}

/// Where the container is placed when attached
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Placement {
    /// Pinned at the configured anchor offsets
    Anchored,
    /// Centered on a pointer position (dynamic positioning)
    At(Point),
}

/// Cursor affordance of the inner dot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Affordance {
    /// Idle: "grab" cursor, dot eases back to center
    #[default]
    Grab,
    /// Dragging: "grabbing" cursor, no position transition
    Grabbing,
}

impl Affordance {
    pub fn cursor(&self) -> &'static str {
        match self {
            Affordance::Grab => "grab",
            Affordance::Grabbing => "grabbing",
        }
    }

    /// CSS transition applied to the dot in this state
    pub fn transition(&self) -> &'static str {
        match self {
            Affordance::Grab => "all 0.2s ease-in-out",
            Affordance::Grabbing => "border-radius 0.2s ease-in-out",
        }
    }
}

/// Everything a surface needs to build the visual layers
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSpec {
    pub id: JoystickId,
    pub layers: LayerIds,
    pub radius: f64,
    pub inner_radius: f64,
    pub opacity: f64,
    pub x: Anchor,
    pub y: Anchor,
    pub left_to_right: bool,
    pub bottom_to_up: bool,
    pub dynamic: bool,
    pub container_class: String,
    pub controller_class: String,
    pub joystick_class: String,
}

impl SurfaceSpec {
    pub fn new(id: JoystickId, config: &JoystickConfig) -> Self {
        Self {
            id,
            layers: id.layer_ids(),
            radius: config.radius,
            inner_radius: config.inner_radius,
            opacity: config.opacity,
            x: config.x,
            y: config.y,
            left_to_right: config.left_to_right,
            bottom_to_up: config.bottom_to_up,
            dynamic: config.dynamic_position,
            container_class: config.container_class.clone(),
            controller_class: config.controller_class.clone(),
            joystick_class: config.joystick_class.clone(),
        }
    }
}

/// Rendering collaborator of one joystick instance
pub trait JoystickSurface {
    /// Create the visual layers
    fn mount(&mut self, spec: &SurfaceSpec);

    /// Insert the container into the document
    fn attach(&mut self, placement: Placement);

    /// Remove the container from the document, keeping it for reattachment
    fn detach(&mut self);

    /// Layout box of the ring, `None` while not attached or not laid out
    fn bounds(&self) -> Option<Rect>;

    /// Offset the dot from the ring center (joystick coordinates, y up)
    fn move_indicator(&mut self, x: i32, y: i32);

    fn set_distortion(&mut self, distortion: Distortion);

    fn set_affordance(&mut self, affordance: Affordance);

    /// Tear down every visual layer
    fn unmount(&mut self);
}
