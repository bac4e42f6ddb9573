//! On-screen virtual joystick engine
//!
//! Turns pointer drags (mouse or touch) into normalized joystick readings.
//! Multiple instances share one [`JoystickContext`]; in dynamic mode they
//! arbitrate pointer ownership through its claim registry.

pub mod config;
pub mod context;
pub mod input;
pub mod joystick;
pub mod placement;
pub mod registry;
pub mod scene;
pub mod surface;

pub use config::{JoystickConfig, JoystickOptions, SceneConfig};
pub use context::JoystickContext;
pub use joystick::{JoystickController, Reading, Response};
pub use registry::{ConfigConflict, JoystickId};
pub use scene::{Scene, SceneError};
