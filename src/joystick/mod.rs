//! Joystick engine: geometry, visual distortion, pointer sessions and the
//! controller that ties them to a surface.

pub mod controller;
pub mod distortion;
pub mod geometry;
pub mod session;

pub use controller::{JoystickController, MoveHandler, Response};
pub use distortion::{distort, Distortion, Shape};
pub use geometry::{transform, Reading};
pub use session::{PointerSession, SessionPhase};
