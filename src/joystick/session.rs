//! Per-instance pointer session state machine
//!
//! ```text
//!   Idle ──begin(owner)──▶ Armed ──track()──▶ Dragging
//!    ▲                       │                   │
//!    └────────── end() ──────┴───────────────────┘
//! ```
//!
//! Armed and Dragging both accept geometry updates; the distinction only
//! records whether the owner has moved yet.

use serde::Serialize;
use tracing::{debug, trace};

use super::geometry::{self, Reading};
use crate::input::{Point, Pointer, PointerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Armed,
    Dragging,
}

/// Drag state owned exclusively by one joystick instance
#[derive(Debug, Clone)]
pub struct PointerSession {
    phase: SessionPhase,
    owner: Option<PointerId>,
    center: Option<Point>,
    last: Reading,
}

impl PointerSession {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            owner: None,
            center: None,
            last: Reading::rest(0.0),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != SessionPhase::Idle
    }

    pub fn owner(&self) -> Option<PointerId> {
        self.owner
    }

    /// Center in screen coordinates, `None` until the surface has been laid out
    pub fn center(&self) -> Option<Point> {
        self.center
    }

    pub fn last_output(&self) -> &Reading {
        &self.last
    }

    /// Replace the center after a layout pass; ownership is untouched
    pub fn recenter(&mut self, center: Option<Point>) {
        trace!("Recentered to {:?}", center);
        self.center = center;
    }

    /// Idle → Armed
    ///
    /// Returns `false` (and changes nothing) when a session is already active.
    pub fn begin(&mut self, owner: PointerId) -> bool {
        if self.is_active() {
            trace!("Ignoring start from {} while owned by {:?}", owner, self.owner);
            return false;
        }
        debug!("Session started by {}", owner);
        self.owner = Some(owner);
        self.phase = SessionPhase::Armed;
        true
    }

    /// Whether `pointer` is the one driving this session
    ///
    /// Touches must match by identifier. There is only one mouse cursor, so any
    /// mouse event belongs to a mouse-owned session.
    pub fn owns(&self, pointer: &Pointer) -> bool {
        match (self.owner, pointer) {
            (Some(PointerId::Touch(owner)), Pointer::Touch { id }) => owner == *id,
            (Some(PointerId::Mouse(_)), Pointer::Mouse { .. }) => true,
            _ => false,
        }
    }

    /// Feed a move from the owning pointer
    ///
    /// Returns the new reading, or `None` when the move is not ours or no
    /// center is known yet. In both cases no state changes.
    pub fn track(
        &mut self,
        pointer: &Pointer,
        position: Point,
        max_range: f64,
        level: u32,
    ) -> Option<Reading> {
        if !self.is_active() || !self.owns(pointer) {
            return None;
        }
        let center = self.center?;

        let reading = geometry::transform(position, center, max_range, level)
            .holding_angle_at_rest(self.last.angle);
        self.last = reading;
        self.phase = SessionPhase::Dragging;
        Some(reading)
    }

    /// Active → Idle
    ///
    /// Returns the owner that was released together with the rest reading, or
    /// `None` when already idle.
    pub fn end(&mut self) -> Option<(PointerId, Reading)> {
        if !self.is_active() {
            return None;
        }
        let owner = self.owner.take()?;
        self.phase = SessionPhase::Idle;
        self.last = Reading::rest(self.last.angle);
        debug!("Session ended by {}", owner);
        Some((owner, self.last))
    }
}

impl Default for PointerSession {
    fn default() -> Self {
        Self::new()
    }
}
