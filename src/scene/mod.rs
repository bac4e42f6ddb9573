//! Scene module - in-process host for joystick instances
//!
//! The Scene stands in for the document a joystick lives in:
//! - Owns the shared context, the viewport and named listening elements
//! - Assigns event sequence numbers and hit-tests positions into paths
//! - Dispatches every event to every live instance in creation order
//! - Destroys instances, after which they receive nothing

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::config::{JoystickConfig, JoystickOptions, SceneConfig};
use crate::context::JoystickContext;
use crate::input::{
    ElementId, HitTarget, InputEvent, Point, Pointer, PointerEvent, PointerId, PointerPhase,
    TouchId,
};
use crate::joystick::{JoystickController, MoveHandler, Reading, Response, SessionPhase};
use crate::registry::JoystickId;
use crate::surface::{HeadlessSurface, Rect, SurfaceView, Viewport};


#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("Unknown element: {0}")]
    UnknownElement(String),
    #[error("Duplicate element name: {0}")]
    DuplicateElement(String),
    #[error("Unknown joystick: {0}")]
    UnknownJoystick(String),
    #[error("Duplicate joystick name: {0}")]
    DuplicateJoystick(String),
}

/// Named rectangular listening surface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub id: ElementId,
    pub rect: Rect,
}

/// Point-in-time view of one joystick, for display
#[derive(Debug, Clone, Serialize)]
pub struct JoystickStatus {
    pub name: String,
    pub id: JoystickId,
    pub dynamic: bool,
    pub phase: SessionPhase,
    pub owner: Option<PointerId>,
    pub center: Option<Point>,
    pub reading: Reading,
}

struct Mounted {
    name: String,
    controller: JoystickController,
    view: SurfaceView,
}

pub struct Scene {
    ctx: JoystickContext,
    viewport: Viewport,
    /// Bottom to top
    elements: Vec<Element>,
    /// Creation order
    joysticks: Vec<Mounted>,
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_context(JoystickContext::new(), width, height)
    }

    /// Scene sharing registries with other hosts
    pub fn with_context(ctx: JoystickContext, width: f64, height: f64) -> Self {
        Self {
            ctx,
            viewport: Viewport::new(width, height),
            elements: Vec::new(),
            joysticks: Vec::new(),
        }
    }

    /// Build a scene from a validated config
    ///
    /// `handler_for` is asked for one move handler per joystick, by name.
    pub fn from_config<F>(config: &SceneConfig, mut handler_for: F) -> Result<Self, SceneError>
    where
        F: FnMut(&str) -> MoveHandler,
    {
        let mut scene = Self::new(config.viewport.width, config.viewport.height);

        for element in &config.elements {
            scene.add_element(
                &element.name,
                Rect::new(element.left, element.top, element.width, element.height),
            )?;
        }
        for entry in &config.joysticks {
            scene.spawn(&entry.name, &entry.options, handler_for(&entry.name))?;
        }

        info!(
            "Scene ready: {} element(s), {} joystick(s)",
            scene.elements.len(),
            scene.joysticks.len()
        );
        Ok(scene)
    }

    pub fn context(&self) -> &JoystickContext {
        &self.ctx
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Add a listening element on top of the existing ones
    pub fn add_element(&mut self, name: &str, rect: Rect) -> Result<(), SceneError> {
        if self.element(name).is_some() {
            return Err(SceneError::DuplicateElement(name.to_string()));
        }
        debug!("Added element '{}' at {:?}", name, rect);
        self.elements.push(Element {
            id: ElementId::new(name),
            rect,
        });
        Ok(())
    }

    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id.as_str() == name)
    }

    /// Create a joystick from partial options
    pub fn spawn<F>(
        &mut self,
        name: &str,
        options: &JoystickOptions,
        on_move: F,
    ) -> Result<JoystickId, SceneError>
    where
        F: FnMut(&Reading) + Send + 'static,
    {
        self.spawn_with_config(name, JoystickConfig::from_options(options), on_move)
    }

    /// Create a joystick from a complete configuration
    pub fn spawn_with_config<F>(
        &mut self,
        name: &str,
        config: JoystickConfig,
        on_move: F,
    ) -> Result<JoystickId, SceneError>
    where
        F: FnMut(&Reading) + Send + 'static,
    {
        if self.joysticks.iter().any(|j| j.name == name) {
            return Err(SceneError::DuplicateJoystick(name.to_string()));
        }
        if let Some(target) = &config.dynamic_position_target {
            if self.element(target.as_str()).is_none() {
                return Err(SceneError::UnknownElement(target.to_string()));
            }
        }

        let surface = HeadlessSurface::new(self.viewport.clone());
        let view = surface.view();
        let controller = JoystickController::new(config, Box::new(surface), &self.ctx, on_move);
        let id = controller.id();

        self.joysticks.push(Mounted {
            name: name.to_string(),
            controller,
            view,
        });
        Ok(id)
    }

    /// Destroy a joystick; it receives no further events
    pub fn destroy(&mut self, id: JoystickId) -> Result<(), SceneError> {
        let index = self
            .joysticks
            .iter()
            .position(|j| j.controller.id() == id)
            .ok_or_else(|| SceneError::UnknownJoystick(id.to_string()))?;
        let mounted = self.joysticks.remove(index);
        mounted.controller.destroy();
        Ok(())
    }

    pub fn destroy_named(&mut self, name: &str) -> Result<(), SceneError> {
        let id = self
            .id_of(name)
            .ok_or_else(|| SceneError::UnknownJoystick(name.to_string()))?;
        self.destroy(id)
    }

    pub fn id_of(&self, name: &str) -> Option<JoystickId> {
        self.joysticks
            .iter()
            .find(|j| j.name == name)
            .map(|j| j.controller.id())
    }

    pub fn joystick(&self, id: JoystickId) -> Option<&JoystickController> {
        self.mounted(id).map(|j| &j.controller)
    }

    pub fn view(&self, id: JoystickId) -> Option<SurfaceView> {
        self.mounted(id).map(|j| j.view.clone())
    }

    pub fn name_of(&self, id: JoystickId) -> Option<&str> {
        self.mounted(id).map(|j| j.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.joysticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joysticks.is_empty()
    }

    pub fn status(&self) -> Vec<JoystickStatus> {
        self.joysticks
            .iter()
            .map(|j| JoystickStatus {
                name: j.name.clone(),
                id: j.controller.id(),
                dynamic: j.controller.config().dynamic_position,
                phase: j.controller.phase(),
                owner: j.controller.owner(),
                center: j.controller.center(),
                reading: *j.controller.reading(),
            })
            .collect()
    }

    fn mounted(&self, id: JoystickId) -> Option<&Mounted> {
        self.joysticks.iter().find(|j| j.controller.id() == id)
    }

    /// Targets under `point`, innermost first
    ///
    /// Joystick containers sit directly in the document, so a hit on one never
    /// reaches the elements beneath it.
    pub fn hit_path(&self, point: Point) -> Vec<HitTarget> {
        for mounted in self.joysticks.iter().rev() {
            let controller = &mounted.controller;
            let Some(center) = controller.center() else {
                continue;
            };
            let config = controller.config();
            let id = controller.id();

            if let Some(dot) = controller.indicator_position() {
                if dot.distance_to(point) <= config.inner_radius {
                    return vec![HitTarget::Indicator(id), HitTarget::Surface(id)];
                }
            }
            if center.distance_to(point) <= config.radius {
                return vec![HitTarget::Surface(id)];
            }
        }

        self.elements
            .iter()
            .rev()
            .filter(|e| e.rect.contains(point))
            .map(|e| HitTarget::Element(e.id.clone()))
            .collect()
    }

    /// Deliver one event to every live instance in creation order
    pub fn dispatch(&mut self, event: &InputEvent) -> Response {
        let response = self
            .joysticks
            .iter_mut()
            .fold(Response::Ignored, |acc, j| acc.merge(j.controller.handle_event(event)));
        trace!("Dispatched {:?} -> {:?}", event, response);
        response
    }

    fn pointer(&mut self, phase: PointerPhase, pointer: Pointer, x: f64, y: f64) -> Response {
        let position = Point::new(x, y);
        let path = self.hit_path(position);
        let seq = self.ctx.next_event_seq();
        let event = PointerEvent::new(seq, phase, pointer, position).with_path(path);
        self.dispatch(&event.into())
    }

    pub fn mouse_down(&mut self, x: f64, y: f64, button: i16) -> Response {
        self.pointer(PointerPhase::Down, Pointer::Mouse { button }, x, y)
    }

    pub fn mouse_move(&mut self, x: f64, y: f64) -> Response {
        self.pointer(PointerPhase::Move, Pointer::Mouse { button: 0 }, x, y)
    }

    pub fn mouse_up(&mut self, x: f64, y: f64, button: i16) -> Response {
        self.pointer(PointerPhase::Up, Pointer::Mouse { button }, x, y)
    }

    pub fn touch_start(&mut self, id: TouchId, x: f64, y: f64) -> Response {
        self.pointer(PointerPhase::Down, Pointer::Touch { id }, x, y)
    }

    pub fn touch_move(&mut self, id: TouchId, x: f64, y: f64) -> Response {
        self.pointer(PointerPhase::Move, Pointer::Touch { id }, x, y)
    }

    pub fn touch_end(&mut self, id: TouchId, x: f64, y: f64) -> Response {
        self.pointer(PointerPhase::Up, Pointer::Touch { id }, x, y)
    }

    pub fn context_menu(&mut self, x: f64, y: f64) -> Response {
        let path = self.hit_path(Point::new(x, y));
        self.dispatch(&InputEvent::ContextMenu { path })
    }

    /// Resize the viewport and let every instance recompute its center
    pub fn resize(&mut self, width: f64, height: f64) -> Response {
        debug!("Viewport resized to {}x{}", width, height);
        self.viewport.resize(width, height);
        self.dispatch(&InputEvent::Resize)
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("viewport", &self.viewport.size())
            .field("elements", &self.elements)
            .field("joysticks", &self.joysticks.len())
            .finish()
    }
}
