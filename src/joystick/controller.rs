//! Joystick controller - one on-screen joystick instance
//!
//! Wires a [`PointerSession`] to its surface, the shared claim set and the
//! consumer callback. Event handling is synchronous: every transition caused
//! by one event completes before `handle_event` returns.

use tracing::{debug, info, trace, warn};

use super::distortion::{self, Distortion};
use super::geometry::Reading;
use super::session::{PointerSession, SessionPhase};
use crate::config::JoystickConfig;
use crate::context::JoystickContext;
use crate::input::{
    HitTarget, InputEvent, ListenTarget, Point, Pointer, PointerEvent, PointerId, PointerPhase,
};
use crate::registry::{ConfigConflict, InstanceRecord, JoystickId};
use crate::surface::{Affordance, JoystickSurface, Placement, SurfaceSpec};

/// Consumer callback receiving every reading
pub type MoveHandler = Box<dyn FnMut(&Reading) + Send>;

/// What the host should do with an event after dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Response {
    /// Not for this instance
    Ignored,
    Handled,
    /// Handled, and the host's default action must be prevented
    Suppressed,
}

impl Response {
    pub fn prevent_default(self) -> bool {
        self == Response::Suppressed
    }

    /// Combine responses of several listeners of the same event
    pub fn merge(self, other: Response) -> Response {
        self.max(other)
    }
}

pub struct JoystickController {
    id: JoystickId,
    config: JoystickConfig,
    target: ListenTarget,
    session: PointerSession,
    surface: Box<dyn JoystickSurface + Send>,
    ctx: JoystickContext,
    on_move: MoveHandler,
    conflict: Option<ConfigConflict>,
}

impl JoystickController {
    /// Create, register and lay out a joystick
    ///
    /// The callback is invoked once with the initial rest reading before this
    /// returns. A shared dynamic target is reported as a warning only.
    pub fn new<F>(
        config: JoystickConfig,
        mut surface: Box<dyn JoystickSurface + Send>,
        ctx: &JoystickContext,
        on_move: F,
    ) -> Self
    where
        F: FnMut(&Reading) + Send + 'static,
    {
        let config = config.normalized();
        let id = ctx.instances().allocate_id();
        let target = config.listen_target();

        let conflict = ctx.instances().register(InstanceRecord {
            id,
            dynamic: config.dynamic_position,
            target: target.clone(),
        });

        surface.mount(&SurfaceSpec::new(id, &config));
        if !config.dynamic_position {
            surface.attach(Placement::Anchored);
        }

        let mut controller = Self {
            id,
            config,
            target,
            session: PointerSession::new(),
            surface,
            ctx: ctx.clone(),
            on_move: Box::new(on_move),
            conflict,
        };

        controller.recenter();
        controller.reset();

        info!(
            "Joystick {} created ({}, max range {}, level {})",
            id,
            if controller.config.dynamic_position { "dynamic" } else { "anchored" },
            controller.config.max_range,
            controller.config.level
        );

        controller
    }

    pub fn id(&self) -> JoystickId {
        self.id
    }

    pub fn config(&self) -> &JoystickConfig {
        &self.config
    }

    /// Shared-target diagnostic raised at registration, if any
    pub fn conflict(&self) -> Option<&ConfigConflict> {
        self.conflict.as_ref()
    }

    /// Most recent reading delivered to the callback
    pub fn reading(&self) -> &Reading {
        self.session.last_output()
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    pub fn owner(&self) -> Option<PointerId> {
        self.session.owner()
    }

    pub fn center(&self) -> Option<Point> {
        self.session.center()
    }

    /// Screen position of the inner dot, if laid out
    pub fn indicator_position(&self) -> Option<Point> {
        let center = self.center()?;
        let reading = self.reading();
        Some(Point::new(
            center.x + reading.x as f64,
            center.y - reading.y as f64,
        ))
    }

    /// Dispatch one host event to this instance
    pub fn handle_event(&mut self, event: &InputEvent) -> Response {
        match event {
            InputEvent::Pointer(pointer) => match pointer.phase {
                PointerPhase::Down if self.config.dynamic_position => self.on_dynamic_down(pointer),
                PointerPhase::Down => self.on_down(pointer),
                PointerPhase::Move => self.on_move(pointer),
                PointerPhase::Up => self.on_up(pointer),
            },
            InputEvent::ContextMenu { path } => self.on_context_menu(path),
            InputEvent::Resize => {
                self.recenter();
                Response::Handled
            }
        }
    }

    /// Recompute the center from the surface layout
    pub fn recenter(&mut self) {
        let radius = self.config.radius;
        let center = self
            .surface
            .bounds()
            .map(|rect| Point::new(rect.left + radius, rect.top + radius));
        self.session.recenter(center);
    }

    /// Remove the joystick: release any claim, drop visuals, deregister
    ///
    /// Consumes the instance, so no later event can reach it.
    pub fn destroy(self) {
        drop(self);
    }

    fn qualifies(&self, pointer: &Pointer) -> bool {
        match pointer {
            Pointer::Mouse { button } => self.config.mouse_button.accepts(*button),
            Pointer::Touch { .. } => true,
        }
    }

    fn on_down(&mut self, event: &PointerEvent) -> Response {
        if !event.hits(&HitTarget::Indicator(self.id)) || !self.qualifies(&event.pointer) {
            return Response::Ignored;
        }
        if !self.session.begin(event.pointer_id()) {
            return Response::Ignored;
        }
        self.surface.set_affordance(Affordance::Grabbing);
        Response::Handled
    }

    fn on_dynamic_down(&mut self, event: &PointerEvent) -> Response {
        if self.session.is_active()
            || !self.target.receives(&event.path)
            || !self.qualifies(&event.pointer)
        {
            return Response::Ignored;
        }

        let pointer_id = event.pointer_id();
        if !self.ctx.claims().try_claim(pointer_id, self.id) {
            trace!("Joystick {} lost claim for {}", self.id, pointer_id);
            return Response::Ignored;
        }

        self.surface.attach(Placement::At(event.position));
        self.recenter();
        self.session.begin(pointer_id);
        self.surface.set_affordance(Affordance::Grabbing);
        debug!(
            "Joystick {} placed at ({}, {}) for {}",
            self.id, event.position.x, event.position.y, pointer_id
        );
        Response::Handled
    }

    fn on_move(&mut self, event: &PointerEvent) -> Response {
        let Some(reading) = self.session.track(
            &event.pointer,
            event.position,
            self.config.max_range,
            self.config.level,
        ) else {
            return Response::Ignored;
        };

        trace!("Joystick {} moved: {:?}", self.id, reading);
        self.render(&reading);
        (self.on_move)(&reading);
        Response::Suppressed
    }

    fn on_up(&mut self, event: &PointerEvent) -> Response {
        if !self.session.is_active() || !self.session.owns(&event.pointer) {
            return Response::Ignored;
        }
        if let Pointer::Mouse { button } = event.pointer {
            if !self.config.mouse_button.accepts(button) {
                return Response::Ignored;
            }
        }

        let Some((owner, _)) = self.session.end() else {
            return Response::Ignored;
        };

        if self.config.dynamic_position {
            self.ctx.claims().release(owner);
        }
        self.reset();
        if self.config.dynamic_position {
            self.surface.detach();
            self.recenter();
        }
        Response::Handled
    }

    fn on_context_menu(&mut self, path: &[HitTarget]) -> Response {
        if !self.config.hide_context_menu {
            return Response::Ignored;
        }
        let on_own_surface = path.iter().any(|hit| {
            matches!(hit, HitTarget::Indicator(id) | HitTarget::Surface(id) if *id == self.id)
        });
        let on_target = self.config.dynamic_position && self.target.receives(path);

        if on_own_surface || on_target {
            Response::Suppressed
        } else {
            Response::Ignored
        }
    }

    /// Return the dot to center and emit the rest reading
    fn reset(&mut self) {
        let rest = *self.session.last_output();
        self.surface.set_affordance(Affordance::Grab);
        self.render(&rest);
        (self.on_move)(&rest);
    }

    fn render(&mut self, reading: &Reading) {
        self.surface.move_indicator(reading.x, reading.y);
        if self.config.distortion {
            self.surface.set_distortion(self.distortion_for(reading));
        }
    }

    fn distortion_for(&self, reading: &Reading) -> Distortion {
        distortion::distort(reading.distance, reading.angle, self.config.max_range)
    }
}

impl Drop for JoystickController {
    fn drop(&mut self) {
        if let Some(owner) = self.session.owner() {
            if self.config.dynamic_position && self.ctx.claims().release(owner) {
                warn!("Joystick {} destroyed mid-drag, released {}", self.id, owner);
            }
        }
        // Stray claims must never outlive the instance
        self.ctx.claims().release_all_for(self.id);

        self.surface.unmount();
        self.ctx.instances().deregister(self.id);
        info!("Joystick {} destroyed", self.id);
    }
}

impl std::fmt::Debug for JoystickController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoystickController")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JoystickOptions, MouseButton};
    use crate::input::ElementId;
    use crate::joystick::distortion::Shape;
    use crate::surface::{HeadlessSurface, SurfaceView, Viewport};
    use parking_lot::Mutex;
    use std::sync::Arc;

    type Log = Arc<Mutex<Vec<Reading>>>;

    /// Controller centered at (400, 300) on an 800x600 viewport
    fn spawn(config: JoystickConfig, ctx: &JoystickContext) -> (JoystickController, Log, SurfaceView) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let surface = HeadlessSurface::new(Viewport::new(800.0, 600.0));
        let view = surface.view();
        let controller = JoystickController::new(config, Box::new(surface), ctx, move |r| {
            sink.lock().push(*r)
        });
        (controller, log, view)
    }

    fn event(seq: u64, phase: PointerPhase, pointer: Pointer, x: f64, y: f64) -> PointerEvent {
        PointerEvent::new(seq, phase, pointer, Point::new(x, y))
    }

    fn down_on(c: &JoystickController, seq: u64, pointer: Pointer) -> InputEvent {
        let center = c.center().unwrap();
        event(seq, PointerPhase::Down, pointer, center.x, center.y)
            .with_path(vec![HitTarget::Indicator(c.id()), HitTarget::Surface(c.id())])
            .into()
    }

    const LEFT: Pointer = Pointer::Mouse { button: 0 };
    const RIGHT: Pointer = Pointer::Mouse { button: 2 };

    #[test]
    fn test_construction_emits_rest_reading() {
        let ctx = JoystickContext::new();
        let (c, log, view) = spawn(JoystickConfig::default(), &ctx);

        assert_eq!(log.lock().as_slice(), &[Reading::rest(0.0)]);
        assert_eq!(c.center(), Some(Point::new(400.0, 300.0)));
        assert!(view.is_attached());
        assert!(ctx.instances().contains(c.id()));
        assert!(c.conflict().is_none());
    }

    #[test]
    fn test_shared_dynamic_target_reports_conflict() {
        let ctx = JoystickContext::new();
        let dynamic = JoystickConfig {
            dynamic_position: true,
            ..Default::default()
        };
        let (first, _, _) = spawn(dynamic.clone(), &ctx);
        let (second, _, _) = spawn(dynamic, &ctx);

        let conflict = second.conflict().unwrap();
        assert_eq!(conflict.existing, first.id());
        assert_eq!(conflict.new, second.id());
    }

    #[test]
    fn test_anchored_joystick_on_dynamic_target_reports_conflict() {
        let ctx = JoystickContext::new();
        let dynamic = JoystickConfig {
            dynamic_position: true,
            ..Default::default()
        };
        let (floating, _, _) = spawn(dynamic, &ctx);
        let (fixed, _, _) = spawn(JoystickConfig::default(), &ctx);

        assert_eq!(fixed.conflict().unwrap().existing, floating.id());
    }

    #[test]
    fn test_mouse_drag_cycle() {
        let ctx = JoystickContext::new();
        let (mut c, log, view) = spawn(JoystickConfig::default(), &ctx);

        assert_eq!(c.handle_event(&down_on(&c, 1, LEFT)), Response::Handled);
        assert_eq!(c.phase(), SessionPhase::Armed);
        assert_eq!(view.snapshot().affordance, Affordance::Grabbing);

        let moved = event(2, PointerPhase::Move, LEFT, 450.0, 300.0).into();
        assert_eq!(c.handle_event(&moved), Response::Suppressed);
        assert_eq!(c.phase(), SessionPhase::Dragging);
        assert_eq!(c.reading().x, 50);
        assert_eq!(view.snapshot().indicator, (50, 0));

        let up = event(3, PointerPhase::Up, LEFT, 450.0, 300.0).into();
        assert_eq!(c.handle_event(&up), Response::Handled);
        assert!(!c.is_active());
        assert_eq!(view.snapshot().affordance, Affordance::Grab);
        assert_eq!(view.snapshot().indicator, (0, 0));

        let log = log.lock();
        assert_eq!(log.len(), 3);
        assert!(log[2].is_rest());
    }

    #[test]
    fn test_down_elsewhere_is_ignored() {
        let ctx = JoystickContext::new();
        let (mut c, log, _) = spawn(JoystickConfig::default(), &ctx);

        let miss = event(1, PointerPhase::Down, LEFT, 10.0, 10.0).into();
        assert_eq!(c.handle_event(&miss), Response::Ignored);
        let moved = event(2, PointerPhase::Move, LEFT, 450.0, 300.0).into();
        assert_eq!(c.handle_event(&moved), Response::Ignored);
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn test_mouse_button_filter() {
        let ctx = JoystickContext::new();
        let config = JoystickConfig {
            mouse_button: MouseButton::Right,
            ..Default::default()
        };
        let (mut c, _, _) = spawn(config, &ctx);

        assert_eq!(c.handle_event(&down_on(&c, 1, LEFT)), Response::Ignored);
        assert_eq!(c.handle_event(&down_on(&c, 2, RIGHT)), Response::Handled);

        // Releasing another button keeps the drag alive
        let up_left = event(3, PointerPhase::Up, LEFT, 0.0, 0.0).into();
        assert_eq!(c.handle_event(&up_left), Response::Ignored);
        assert!(c.is_active());

        let up_right = event(4, PointerPhase::Up, RIGHT, 0.0, 0.0).into();
        assert_eq!(c.handle_event(&up_right), Response::Handled);
        assert!(!c.is_active());
    }

    #[test]
    fn test_redundant_down_does_not_rearm() {
        let ctx = JoystickContext::new();
        let (mut c, _, _) = spawn(JoystickConfig::default(), &ctx);

        c.handle_event(&down_on(&c, 1, Pointer::Touch { id: 4 }));
        assert_eq!(
            c.handle_event(&down_on(&c, 2, Pointer::Touch { id: 5 })),
            Response::Ignored
        );
        assert_eq!(c.owner(), Some(PointerId::Touch(4)));
    }

    #[test]
    fn test_foreign_touch_is_ignored() {
        let ctx = JoystickContext::new();
        let (mut c, log, _) = spawn(JoystickConfig::default(), &ctx);
        c.handle_event(&down_on(&c, 1, Pointer::Touch { id: 1 }));

        let foreign = event(2, PointerPhase::Move, Pointer::Touch { id: 2 }, 500.0, 300.0).into();
        assert_eq!(c.handle_event(&foreign), Response::Ignored);
        let foreign_up = event(3, PointerPhase::Up, Pointer::Touch { id: 2 }, 500.0, 300.0).into();
        assert_eq!(c.handle_event(&foreign_up), Response::Ignored);

        assert!(c.is_active());
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn test_up_while_idle_is_noop() {
        let ctx = JoystickContext::new();
        let (mut c, log, _) = spawn(JoystickConfig::default(), &ctx);
        let up = event(1, PointerPhase::Up, LEFT, 0.0, 0.0).into();
        assert_eq!(c.handle_event(&up), Response::Ignored);
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn test_release_keeps_angle() {
        let ctx = JoystickContext::new();
        let (mut c, log, _) = spawn(JoystickConfig::default(), &ctx);

        c.handle_event(&down_on(&c, 1, LEFT));
        c.handle_event(&event(2, PointerPhase::Move, LEFT, 400.0, 500.0).into());
        c.handle_event(&event(3, PointerPhase::Up, LEFT, 400.0, 500.0).into());

        let last = *log.lock().last().unwrap();
        assert!(last.is_rest());
        assert_eq!(last.angle, 1.5708);
    }

    #[test]
    fn test_distortion_applied_and_reset() {
        let ctx = JoystickContext::new();
        let config = JoystickConfig {
            distortion: true,
            ..Default::default()
        };
        let (mut c, _, view) = spawn(config, &ctx);
        assert_eq!(view.snapshot().distortion, Some(Distortion::RESTING));

        c.handle_event(&down_on(&c, 1, LEFT));
        c.handle_event(&event(2, PointerPhase::Move, LEFT, 480.0, 300.0).into());
        assert_eq!(view.snapshot().distortion.unwrap().shape, Shape::Distorted);

        c.handle_event(&event(3, PointerPhase::Up, LEFT, 480.0, 300.0).into());
        assert_eq!(view.snapshot().distortion, Some(Distortion::RESTING));
    }

    #[test]
    fn test_resize_recenters_without_ending_drag() {
        let ctx = JoystickContext::new();
        let viewport = Viewport::new(800.0, 600.0);
        let surface = HeadlessSurface::new(viewport.clone());
        let mut c = JoystickController::new(
            JoystickConfig::default(),
            Box::new(surface),
            &ctx,
            |_| {},
        );
        c.handle_event(&down_on(&c, 1, Pointer::Touch { id: 3 }));

        viewport.resize(1000.0, 1000.0);
        assert_eq!(c.handle_event(&InputEvent::Resize), Response::Handled);
        assert_eq!(c.center(), Some(Point::new(500.0, 500.0)));
        assert_eq!(c.owner(), Some(PointerId::Touch(3)));
    }

    #[test]
    fn test_dynamic_down_places_surface() {
        let ctx = JoystickContext::new();
        let config = JoystickConfig {
            dynamic_position: true,
            ..Default::default()
        };
        let (mut c, log, view) = spawn(config, &ctx);
        assert!(!view.is_attached());
        assert_eq!(c.center(), None);

        let touch = Pointer::Touch { id: 7 };
        let down = event(1, PointerPhase::Down, touch, 120.0, 90.0).into();
        assert_eq!(c.handle_event(&down), Response::Handled);
        assert_eq!(c.center(), Some(Point::new(120.0, 90.0)));
        assert!(view.is_attached());
        assert_eq!(ctx.claims().holder(PointerId::Touch(7)), Some(c.id()));

        c.handle_event(&event(2, PointerPhase::Move, touch, 120.0, 60.0).into());
        assert_eq!(c.reading().y, 30);

        c.handle_event(&event(3, PointerPhase::Up, touch, 120.0, 60.0).into());
        assert!(!view.is_attached());
        assert!(ctx.claims().is_empty());
        assert_eq!(c.center(), None);
        assert!(log.lock().last().unwrap().is_rest());
    }

    #[test]
    fn test_dynamic_target_filters_downs() {
        let ctx = JoystickContext::new();
        let config = JoystickConfig::from_options(&JoystickOptions {
            dynamic_position: Some(true),
            dynamic_position_target: Some("pad".into()),
            ..Default::default()
        });
        let (mut c, _, _) = spawn(config, &ctx);

        let outside = event(1, PointerPhase::Down, LEFT, 10.0, 10.0).into();
        assert_eq!(c.handle_event(&outside), Response::Ignored);
        assert!(ctx.claims().is_empty());

        let inside = event(2, PointerPhase::Down, LEFT, 10.0, 10.0)
            .with_path(vec![HitTarget::Element(ElementId::new("pad"))])
            .into();
        assert_eq!(c.handle_event(&inside), Response::Handled);
        assert_eq!(c.owner(), Some(PointerId::Mouse(2)));
    }

    #[test]
    fn test_dynamic_down_lost_claim() {
        let ctx = JoystickContext::new();
        let other = ctx.instances().allocate_id();
        assert!(ctx.claims().try_claim(PointerId::Touch(7), other));

        let config = JoystickConfig {
            dynamic_position: true,
            ..Default::default()
        };
        let (mut c, log, view) = spawn(config, &ctx);

        let down = event(1, PointerPhase::Down, Pointer::Touch { id: 7 }, 50.0, 50.0).into();
        assert_eq!(c.handle_event(&down), Response::Ignored);
        assert!(!c.is_active());
        assert!(!view.is_attached());
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn test_destroy_mid_drag_releases_claim() {
        let ctx = JoystickContext::new();
        let config = JoystickConfig {
            dynamic_position: true,
            ..Default::default()
        };
        let (mut c, _, view) = spawn(config, &ctx);
        let id = c.id();

        c.handle_event(&event(1, PointerPhase::Down, Pointer::Touch { id: 2 }, 50.0, 50.0).into());
        assert!(ctx.claims().is_claimed(PointerId::Touch(2)));

        c.destroy();
        assert!(ctx.claims().is_empty());
        assert!(!ctx.instances().contains(id));
        assert!(!view.snapshot().mounted);
    }

    #[test]
    fn test_context_menu_suppression() {
        let ctx = JoystickContext::new();
        let config = JoystickConfig {
            hide_context_menu: true,
            ..Default::default()
        };
        let (mut hidden, _, _) = spawn(config, &ctx);
        let (mut shown, _, _) = spawn(JoystickConfig::default(), &ctx);

        let on_hidden = InputEvent::ContextMenu {
            path: vec![HitTarget::Surface(hidden.id())],
        };
        assert_eq!(hidden.handle_event(&on_hidden), Response::Suppressed);
        assert_eq!(shown.handle_event(&on_hidden), Response::Ignored);

        let elsewhere = InputEvent::ContextMenu { path: vec![] };
        assert_eq!(hidden.handle_event(&elsewhere), Response::Ignored);
    }

    #[test]
    fn test_response_merge() {
        assert_eq!(Response::Ignored.merge(Response::Handled), Response::Handled);
        assert_eq!(Response::Suppressed.merge(Response::Handled), Response::Suppressed);
        assert!(Response::Suppressed.prevent_default());
        assert!(!Response::Handled.prevent_default());
    }
}
