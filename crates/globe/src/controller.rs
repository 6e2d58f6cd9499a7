//! Explicit globe state machine.
//!
//! All mutable state of a mounted globe lives here and changes only through
//! `tick` (once per frame) and the pointer/resize handlers. Nothing is hidden
//! in host callbacks.

use foundation::math::Vec2;
use foundation::time::Time;
use runtime::{Event, EventBus, Frame, Metrics};

use crate::animator::MarkerAnimator;
use crate::config::GlobeConfig;
use crate::input::{InputEvent, InputSource};
use crate::model::{Connection, HeatmapPoint, Marker, Scene};
use crate::overlay::{OverlayFrame, OverlayRenderer};
use crate::picking::{HitOptions, MarkerHit, hit_test};
use crate::projection::View;
use crate::resize::{ContainerSize, RenderSurfaceState, ResizeManager, SurfaceSize};
use crate::rotation::{RotationPhysics, RotationState};
use crate::surface::{AnimatedMarker, SphereFrame};

/// Interaction events retained for inspection.
const EVENT_LOG_LIMIT: usize = 1024;

/// Invoked synchronously when a hovered marker is released on.
///
/// Handlers must not call back into the session that owns the controller.
pub type MarkerClickHandler = Box<dyn FnMut(&Marker)>;

/// Snapshot of the controller-owned state.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlobeState {
    pub rotation: RotationState,
    pub surface: RenderSurfaceState,
}

/// Output of one tick, ready for the two surfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub sphere: SphereFrame,
    pub overlay: OverlayFrame,
}

pub struct GlobeController {
    config: GlobeConfig,
    physics: RotationPhysics,
    rotation: RotationState,
    resize: ResizeManager,
    animator: MarkerAnimator,
    overlay: OverlayRenderer,
    hit_options: HitOptions,
    scene: Scene,
    hover: Option<MarkerHit>,
    /// Last pointer position over the surface (display space).
    pointer: Option<Vec2>,
    on_click: Option<MarkerClickHandler>,
    started_at: Option<Time>,
    events: EventBus,
    metrics: Metrics,
}

impl GlobeController {
    pub fn new(config: GlobeConfig) -> Self {
        Self::with_animator(config, MarkerAnimator::new())
    }

    /// Controller with reproducible marker phases.
    pub fn seeded(config: GlobeConfig, seed: u64) -> Self {
        Self::with_animator(config, MarkerAnimator::seeded(seed))
    }

    fn with_animator(config: GlobeConfig, animator: MarkerAnimator) -> Self {
        Self {
            physics: RotationPhysics::from_config(&config),
            rotation: RotationState::new(config.initial_phi, config.theta),
            resize: ResizeManager::new(&config),
            overlay: OverlayRenderer::from_config(&config),
            hit_options: HitOptions {
                min_radius_px: config.min_hit_radius_px,
                size_factor: config.hit_size_factor,
            },
            animator,
            config,
            scene: Scene::default(),
            hover: None,
            pointer: None,
            on_click: None,
            started_at: None,
            events: EventBus::bounded(EVENT_LOG_LIMIT),
            metrics: Metrics::new(),
        }
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    pub fn state(&self) -> GlobeState {
        GlobeState {
            rotation: self.rotation,
            surface: self.resize.state(),
        }
    }

    pub fn surface_size(&self) -> SurfaceSize {
        self.resize.size()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn hover(&self) -> Option<&MarkerHit> {
        self.hover.as_ref()
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn on_marker_click(&mut self, handler: MarkerClickHandler) {
        self.on_click = Some(handler);
    }

    // ---- external data ----

    pub fn set_scene(&mut self, scene: Scene) {
        self.scene = scene;
        self.refresh_hover();
    }

    pub fn set_markers(&mut self, markers: Vec<Marker>) {
        self.scene.markers = markers;
        self.refresh_hover();
    }

    pub fn set_connections(&mut self, connections: Vec<Connection>) {
        self.scene.connections = connections;
    }

    pub fn set_heatmap_points(&mut self, points: Vec<HeatmapPoint>) {
        self.scene.heatmap_points = points;
    }

    // ---- resize ----

    /// Container resize notification. Returns new sizes to propagate, if changed.
    pub fn on_resize(&mut self, container: ContainerSize, now: Time) -> Option<SurfaceSize> {
        let changed = self.resize.observe(container, now);
        if let Some(size) = changed {
            self.events.emit_now(
                "resize",
                format!("display={} render={}", size.display_width, size.render_width),
            );
        }
        changed
    }

    /// `true` once when the post-resize settle delay has elapsed.
    pub fn settle_due(&mut self, now: Time) -> bool {
        self.resize.take_settle_due(now)
    }

    /// Apply the settle re-measurement.
    pub fn settle(&mut self, container: ContainerSize, now: Time) -> Option<SurfaceSize> {
        let changed = self.resize.settle(container, now);
        if let Some(size) = changed {
            self.events.emit_now(
                "resize",
                format!(
                    "settled display={} render={}",
                    size.display_width, size.render_width
                ),
            );
        }
        changed
    }

    // ---- frame ----

    /// Advance physics by one tick and build both layers for `frame`.
    pub fn tick(&mut self, frame: Frame) -> FrameOutput {
        self.events.set_frame(frame);
        let started_at = *self.started_at.get_or_insert(frame.time);
        let elapsed_s = (frame.time.seconds() - started_at.seconds()).max(0.0);

        self.physics.tick(&mut self.rotation);

        let width = self.resize.size().render_width;
        let view = View::new(self.rotation.phi, self.rotation.theta, width);

        let markers = self
            .scene
            .markers
            .iter()
            .enumerate()
            .map(|(i, m)| AnimatedMarker {
                location: m.location,
                size: self.animator.effective_size(i, m.size, elapsed_s, m.pulse),
            })
            .collect();

        let overlay = self.overlay.render(
            view,
            &self.scene.connections,
            &self.scene.heatmap_points,
            elapsed_s * 1000.0,
        );
        self.record_frame(&overlay);

        FrameOutput {
            sphere: SphereFrame {
                phi: self.rotation.phi,
                theta: self.rotation.theta,
                width,
                markers,
            },
            overlay,
        }
    }

    fn record_frame(&mut self, overlay: &OverlayFrame) {
        let stats = overlay.stats;
        self.metrics.inc_counter("frames", 1);
        self.metrics.inc_counter("overlay.glows", stats.glows as u64);
        self.metrics.inc_counter("overlay.arcs", stats.arcs as u64);
        self.metrics
            .inc_counter("overlay.skipped_degenerate", stats.skipped_degenerate as u64);
        self.metrics
            .inc_counter("overlay.skipped_hidden", stats.skipped_hidden as u64);
        self.metrics
            .record("overlay.commands", overlay.commands.len() as u64);
        self.metrics.set_gauge("rotation.phi", self.rotation.phi);
        self.metrics
            .set_gauge("rotation.velocity", self.rotation.velocity);
    }

    // ---- input ----

    pub fn on_pointer_down(&mut self, pos: Vec2) {
        self.pointer = Some(pos);
        self.physics.drag_start(&mut self.rotation);
        self.events.emit_now("drag", "start");
    }

    pub fn on_pointer_move(&mut self, pos: Vec2) {
        let prev = self.pointer.replace(pos);
        if self.rotation.is_dragging {
            let dx = prev.map(|p| pos.x - p.x).unwrap_or(0.0);
            self.physics.drag_move(&mut self.rotation, dx);
            return;
        }
        self.update_hover(pos);
    }

    /// Release. Returns the marker under `pos`, if any, after ending a drag.
    pub fn on_pointer_up(&mut self, pos: Vec2) -> Option<Marker> {
        self.pointer = Some(pos);
        if self.rotation.is_dragging {
            self.physics.drag_end(&mut self.rotation);
            self.events
                .emit_now("drag", format!("end velocity={}", self.rotation.velocity));
        }
        // Resolve against the current rotation and marker set.
        self.update_hover(pos);
        let marker = self.hover.as_ref()?.marker.clone();
        self.metrics.inc_counter("clicks", 1);
        self.events.emit_now(
            "click",
            marker.tooltip.clone().unwrap_or_default(),
        );
        tracing::debug!(tooltip = ?marker.tooltip, "marker clicked");
        if let Some(handler) = self.on_click.as_mut() {
            handler(&marker);
        }
        Some(marker)
    }

    pub fn on_pointer_leave(&mut self) {
        self.pointer = None;
        if self.rotation.is_dragging {
            self.physics.drag_end(&mut self.rotation);
            self.events.emit_now("drag", "cancel");
        }
        self.set_hover(None);
    }

    /// Dispatch one input event. Returns the clicked marker, if any.
    pub fn handle_input(&mut self, event: InputEvent) -> Option<Marker> {
        match event {
            InputEvent::PointerDown(p) => {
                self.on_pointer_down(p);
                None
            }
            InputEvent::PointerMove(p) => {
                self.on_pointer_move(p);
                None
            }
            InputEvent::PointerUp(p) => self.on_pointer_up(p),
            InputEvent::PointerLeave => {
                self.on_pointer_leave();
                None
            }
        }
    }

    /// Drain `source`, returning every marker clicked along the way.
    pub fn drain_input(&mut self, source: &mut dyn InputSource) -> Vec<Marker> {
        let mut clicked = Vec::new();
        while let Some(event) = source.next_event() {
            clicked.extend(self.handle_input(event));
        }
        clicked
    }

    /// Hit-test at a display-space position with the current rotation.
    pub fn hit_test(&self, pos: Vec2) -> Option<MarkerHit> {
        hit_test(
            &self.scene.markers,
            pos,
            self.rotation.phi,
            self.rotation.theta,
            self.resize.size(),
            self.hit_options,
        )
    }

    fn update_hover(&mut self, pos: Vec2) {
        let hit = self.hit_test(pos);
        self.set_hover(hit);
    }

    /// Re-run the hover hit-test against freshly supplied markers.
    fn refresh_hover(&mut self) {
        match self.pointer {
            Some(pos) if !self.rotation.is_dragging => self.update_hover(pos),
            _ => {
                if self
                    .hover
                    .as_ref()
                    .is_some_and(|h| h.index >= self.scene.markers.len())
                {
                    self.set_hover(None);
                }
            }
        }
    }

    fn set_hover(&mut self, hit: Option<MarkerHit>) {
        let before = self.hover.as_ref().map(|h| h.index);
        let after = hit.as_ref().map(|h| h.index);
        if before != after {
            match &hit {
                Some(h) => self.events.emit_now("hover", format!("marker {}", h.index)),
                None => self.events.emit_now("hover", "none"),
            }
        }
        self.hover = hit;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::GlobeController;
    use crate::config::GlobeConfig;
    use crate::input::{InputEvent, QueuedInput};
    use crate::model::{Connection, HeatmapPoint, Marker};
    use crate::projection::project;
    use crate::resize::ContainerSize;
    use foundation::math::{LatLon, Vec2};
    use foundation::time::Time;
    use runtime::Frame;

    fn controller() -> GlobeController {
        let mut c = GlobeController::seeded(GlobeConfig::default().with_theta(0.4), 9);
        c.on_resize(ContainerSize::new(600.0, 600.0), Time::ZERO);
        c
    }

    fn center_marker() -> Marker {
        Marker::new(LatLon::new(0.0, 0.0), 0.05).with_tooltip("X")
    }

    fn marker_screen_pos(c: &GlobeController) -> Vec2 {
        let s = c.state();
        project(LatLon::new(0.0, 0.0), s.rotation.phi, s.rotation.theta, 600.0).point()
    }

    #[test]
    fn hover_then_release_clicks_marker() {
        let mut c = controller();
        c.set_markers(vec![center_marker()]);

        let clicks = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&clicks);
        c.on_marker_click(Box::new(move |m| sink.borrow_mut().push(m.tooltip.clone())));

        let at = marker_screen_pos(&c);
        c.on_pointer_move(at);
        assert_eq!(c.hover().map(|h| h.index), Some(0));

        let clicked = c.on_pointer_up(at);
        assert_eq!(clicked, Some(center_marker()));
        assert_eq!(*clicks.borrow(), vec![Some("X".to_string())]);
        assert_eq!(c.metrics().counter("clicks"), 1);
    }

    #[test]
    fn release_without_hover_does_not_click() {
        let mut c = controller();
        c.set_markers(vec![center_marker()]);
        c.on_pointer_move(Vec2::new(5.0, 5.0));
        assert!(c.hover().is_none());
        assert_eq!(c.on_pointer_up(Vec2::new(5.0, 5.0)), None);
    }

    #[test]
    fn drag_rotates_and_suspends_hover() {
        let mut c = controller();
        c.set_markers(vec![center_marker()]);
        let phi0 = c.state().rotation.phi;

        c.on_pointer_down(Vec2::new(100.0, 100.0));
        c.on_pointer_move(Vec2::new(120.0, 100.0));
        let s = c.state().rotation;
        assert!(s.is_dragging);
        assert!((s.velocity - 0.1).abs() < 1e-12);
        assert!((s.phi - (phi0 + 0.1)).abs() < 1e-12);

        // Moving over the marker while dragging does not hit-test.
        let at = marker_screen_pos(&c);
        c.on_pointer_move(at);
        assert!(c.hover().is_none());

        c.on_pointer_up(at);
        assert!(!c.state().rotation.is_dragging);
    }

    #[test]
    fn tick_coasts_after_release() {
        let mut c = controller();
        let mut input = QueuedInput::new();
        input.push_drag(Vec2::new(0.0, 0.0), Vec2::new(40.0, 0.0), 2);
        c.drain_input(&mut input);
        let v = c.state().rotation.velocity;
        assert!((v - 0.1).abs() < 1e-12);

        c.tick(Frame::new(0, 1.0 / 60.0));
        assert!((c.state().rotation.velocity - 0.1 * 0.95).abs() < 1e-12);
    }

    #[test]
    fn tick_reads_latest_scene() {
        let mut c = controller();
        let out = c.tick(Frame::new(0, 1.0 / 60.0));
        assert_eq!(out.overlay.stats.arcs, 0);
        assert!(out.sphere.markers.is_empty());

        c.set_connections(vec![Connection::new(
            LatLon::new(10.0, -10.0),
            LatLon::new(20.0, 15.0),
        )]);
        c.set_heatmap_points(vec![HeatmapPoint::new(5.0, 0.0, 0.7)]);
        c.set_markers(vec![center_marker()]);
        let out = c.tick(Frame::new(1, 1.0 / 60.0));
        assert_eq!(out.overlay.stats.arcs, 1);
        assert_eq!(out.overlay.stats.glows, 1);
        assert_eq!(out.sphere.markers.len(), 1);
        assert_eq!(c.metrics().counter("frames"), 2);
    }

    #[test]
    fn marker_size_is_modulated() {
        let mut c = controller();
        c.set_markers(vec![center_marker()]);
        for i in 0..120 {
            let out = c.tick(Frame::new(i, 1.0 / 60.0));
            let size = out.sphere.markers[0].size;
            assert!((0.05 * 0.7 - 1e-12..=0.05 * 1.3 + 1e-12).contains(&size));
        }
    }

    #[test]
    fn leave_clears_hover_and_ends_drag() {
        let mut c = controller();
        c.set_markers(vec![center_marker()]);
        c.on_pointer_move(marker_screen_pos(&c));
        assert!(c.hover().is_some());
        c.handle_input(InputEvent::PointerLeave);
        assert!(c.hover().is_none());

        c.on_pointer_down(Vec2::new(0.0, 0.0));
        c.on_pointer_leave();
        assert!(!c.state().rotation.is_dragging);
    }

    #[test]
    fn replacing_markers_refreshes_hover() {
        let mut c = controller();
        c.set_markers(vec![center_marker()]);
        let at = marker_screen_pos(&c);
        c.on_pointer_move(at);
        assert!(c.hover().is_some());

        c.set_markers(Vec::new());
        assert!(c.hover().is_none());

        c.set_markers(vec![
            Marker::new(LatLon::new(0.0, 0.0), 0.05).with_tooltip("updated"),
        ]);
        assert_eq!(
            c.hover().and_then(|h| h.marker.tooltip.as_deref()),
            Some("updated")
        );
    }

    #[test]
    fn click_during_press_uses_latest_markers() {
        let mut c = controller();
        c.set_markers(vec![
            Marker::new(LatLon::new(0.0, 0.0), 0.05).with_tooltip("old"),
        ]);
        let clicks = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&clicks);
        c.on_marker_click(Box::new(move |m| sink.borrow_mut().push(m.tooltip.clone())));

        let at = marker_screen_pos(&c);
        c.on_pointer_move(at);
        c.on_pointer_down(at);
        c.set_markers(vec![
            Marker::new(LatLon::new(0.0, 0.0), 0.05).with_tooltip("new"),
        ]);
        c.on_pointer_up(at);

        assert_eq!(*clicks.borrow(), vec![Some("new".to_string())]);
    }

    #[test]
    fn long_drag_from_marker_does_not_click() {
        let mut c = controller();
        c.set_markers(vec![center_marker()]);
        let at = marker_screen_pos(&c);
        c.on_pointer_move(at);
        assert!(c.hover().is_some());

        let end = Vec2::new(at.x + 200.0, at.y);
        c.on_pointer_down(at);
        c.on_pointer_move(end);
        assert_eq!(c.on_pointer_up(end), None);
        assert!(c.hover().is_none());
        assert_eq!(c.metrics().counter("clicks"), 0);
    }

    #[test]
    fn press_and_release_in_place_clicks() {
        let mut c = controller();
        c.set_markers(vec![center_marker()]);
        let at = marker_screen_pos(&c);
        c.on_pointer_move(at);
        c.on_pointer_down(at);
        assert_eq!(c.on_pointer_up(at), Some(center_marker()));
    }

    #[test]
    fn resize_events_are_traced() {
        let mut c = GlobeController::seeded(GlobeConfig::default(), 1);
        c.on_resize(ContainerSize::new(800.0, 500.0), Time(0.5));
        assert!(c.events().iter().any(|e| e.kind == "resize"));
        assert_eq!(c.surface_size().display_width, 500.0);
    }
}
