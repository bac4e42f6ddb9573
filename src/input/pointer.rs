//! Pointer event model shared by mouse and touch input
//!
//! Events are delivered by the host in temporal order per pointer
//! (down → moves → up). Every listener receiving the same physical event sees
//! the same sequence number, which is what mouse claims are keyed on.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::registry::JoystickId;

/// Native touch-point identifier from the input system
pub type TouchId = i64;

/// Screen position in CSS pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Physical source of a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pointer {
    /// The single mouse cursor; `button` is the DOM-style button code
    Mouse { button: i16 },
    /// One touch contact
    Touch { id: TouchId },
}

/// Identifier correlating one pointer's down/move/up lifecycle
///
/// Touches carry a native identifier. The mouse has none, so a mouse session
/// is keyed on the sequence number of the down event that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PointerId {
    Mouse(u64),
    Touch(TouchId),
}

impl fmt::Display for PointerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointerId::Mouse(seq) => write!(f, "mouse#{}", seq),
            PointerId::Touch(id) => write!(f, "touch#{}", id),
        }
    }
}

/// Name of a listening element registered with the host
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Something under the pointer, as reported by host hit-testing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HitTarget {
    /// The draggable inner dot of a joystick
    Indicator(JoystickId),
    /// The outer ring/container of a joystick
    Surface(JoystickId),
    /// A named listening element
    Element(ElementId),
}

/// Surface a dynamic joystick listens on for pointer-down events
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ListenTarget {
    /// The whole document: every event reaches it
    #[default]
    Document,
    Element(ElementId),
}

impl ListenTarget {
    /// Whether an event with this hit path propagates to the target
    pub fn receives(&self, path: &[HitTarget]) -> bool {
        match self {
            ListenTarget::Document => true,
            ListenTarget::Element(id) => path
                .iter()
                .any(|hit| matches!(hit, HitTarget::Element(e) if e == id)),
        }
    }
}

impl fmt::Display for ListenTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenTarget::Document => f.write_str("document"),
            ListenTarget::Element(id) => write!(f, "element '{}'", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// A single pointer event as delivered by the host
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    /// Host-assigned, monotonically increasing event number
    pub seq: u64,
    pub phase: PointerPhase,
    pub pointer: Pointer,
    pub position: Point,
    /// Hit targets under the pointer, innermost first
    pub path: Vec<HitTarget>,
}

impl PointerEvent {
    pub fn new(seq: u64, phase: PointerPhase, pointer: Pointer, position: Point) -> Self {
        Self {
            seq,
            phase,
            pointer,
            position,
            path: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: Vec<HitTarget>) -> Self {
        self.path = path;
        self
    }

    /// Identifier a session started by this event is keyed on
    pub fn pointer_id(&self) -> PointerId {
        match self.pointer {
            Pointer::Mouse { .. } => PointerId::Mouse(self.seq),
            Pointer::Touch { id } => PointerId::Touch(id),
        }
    }

    pub fn hits(&self, target: &HitTarget) -> bool {
        self.path.contains(target)
    }
}

/// Everything a joystick instance subscribes to
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Pointer(PointerEvent),
    ContextMenu { path: Vec<HitTarget> },
    /// Layout changed (window resize, reflow)
    Resize,
}

impl From<PointerEvent> for InputEvent {
    fn from(event: PointerEvent) -> Self {
        InputEvent::Pointer(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_pointer_id_uses_sequence() {
        let event = PointerEvent::new(
            42,
            PointerPhase::Down,
            Pointer::Mouse { button: 0 },
            Point::new(10.0, 20.0),
        );
        assert_eq!(event.pointer_id(), PointerId::Mouse(42));
    }

    #[test]
    fn test_touch_pointer_id_uses_native_identifier() {
        let event = PointerEvent::new(
            42,
            PointerPhase::Down,
            Pointer::Touch { id: 7 },
            Point::new(10.0, 20.0),
        );
        assert_eq!(event.pointer_id(), PointerId::Touch(7));
        assert_eq!(event.pointer_id().to_string(), "touch#7");
    }

    #[test]
    fn test_listen_target_receives() {
        let left = ElementId::new("left");
        let path = vec![HitTarget::Element(left.clone())];

        assert!(ListenTarget::Document.receives(&[]));
        assert!(ListenTarget::Element(left).receives(&path));
        assert!(!ListenTarget::Element(ElementId::new("right")).receives(&path));
    }
}
