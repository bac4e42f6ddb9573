//! Headless surface - records visual state instead of drawing it
//!
//! Lays the joystick out against a shared [`Viewport`] the same way the CSS
//! of a browser surface would: the anchor offsets locate the ring center,
//! measured from the left/right and bottom/top edges per the orientation
//! flags; a dynamic placement centers the ring on the pointer.

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;
use tracing::trace;

use super::{Affordance, JoystickSurface, Placement, Rect, SurfaceSpec};
use crate::input::Point;
use crate::joystick::distortion::Distortion;

/// Shared size of the hosting window
#[derive(Debug, Clone)]
pub struct Viewport {
    size: Arc<RwLock<(f64, f64)>>,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Arc::new(RwLock::new((width, height))),
        }
    }

    pub fn size(&self) -> (f64, f64) {
        *self.size.read()
    }

    pub fn resize(&self, width: f64, height: f64) {
        *self.size.write() = (width, height);
    }
}

/// Observable visual state of a headless surface
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SurfaceState {
    pub mounted: bool,
    /// `None` while detached
    pub placement: Option<Placement>,
    /// Dot offset from the ring center (y up)
    pub indicator: (i32, i32),
    pub distortion: Option<Distortion>,
    pub affordance: Affordance,
}

/// Read-only handle onto a [`HeadlessSurface`]'s state
#[derive(Debug, Clone)]
pub struct SurfaceView {
    state: Arc<Mutex<SurfaceState>>,
}

impl SurfaceView {
    pub fn snapshot(&self) -> SurfaceState {
        self.state.lock().clone()
    }

    pub fn is_attached(&self) -> bool {
        self.state.lock().placement.is_some()
    }
}

#[derive(Debug)]
pub struct HeadlessSurface {
    viewport: Viewport,
    spec: Option<SurfaceSpec>,
    state: Arc<Mutex<SurfaceState>>,
}

impl HeadlessSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            spec: None,
            state: Arc::new(Mutex::new(SurfaceState::default())),
        }
    }

    pub fn view(&self) -> SurfaceView {
        SurfaceView {
            state: Arc::clone(&self.state),
        }
    }

    fn anchored_center(&self, spec: &SurfaceSpec) -> Point {
        let (width, height) = self.viewport.size();

        let x = spec.x.resolve(width);
        let y = spec.y.resolve(height);

        Point::new(
            if spec.left_to_right { x } else { width - x },
            if spec.bottom_to_up { height - y } else { y },
        )
    }
}

impl JoystickSurface for HeadlessSurface {
    fn mount(&mut self, spec: &SurfaceSpec) {
        trace!("Mounting surface {}", spec.layers.container);
        self.spec = Some(spec.clone());
        let mut state = self.state.lock();
        state.mounted = true;
        state.affordance = Affordance::Grab;
    }

    fn attach(&mut self, placement: Placement) {
        self.state.lock().placement = Some(placement);
    }

    fn detach(&mut self) {
        self.state.lock().placement = None;
    }

    fn bounds(&self) -> Option<Rect> {
        let spec = self.spec.as_ref()?;
        let state = self.state.lock();
        if !state.mounted {
            return None;
        }

        let center = match state.placement? {
            Placement::Anchored => self.anchored_center(spec),
            Placement::At(point) => point,
        };
        Some(Rect::around(center, spec.radius))
    }

    fn move_indicator(&mut self, x: i32, y: i32) {
        self.state.lock().indicator = (x, y);
    }

    fn set_distortion(&mut self, distortion: Distortion) {
        self.state.lock().distortion = Some(distortion);
    }

    fn set_affordance(&mut self, affordance: Affordance) {
        self.state.lock().affordance = affordance;
    }

    fn unmount(&mut self) {
        let mut state = self.state.lock();
        state.mounted = false;
        state.placement = None;
    }
}
