//! Host input model
//!
//! Pointer, touch and layout events as delivered to joystick instances.

pub mod pointer;

pub use pointer::{
    ElementId, HitTarget, InputEvent, ListenTarget, Point, Pointer, PointerEvent, PointerId,
    PointerPhase, TouchId,
};
