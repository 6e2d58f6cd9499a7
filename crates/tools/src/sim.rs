//! Frame-stepped headless simulation of a mounted globe.

use foundation::math::{LatLon, Vec2};
use foundation::time::Time;
use globe::{
    ContainerSize, GlobeConfig, GlobeController, GlobeSession, InputEvent, InputSource,
    QueuedInput, RecordingSurface, Scene, StaticContainer, Surfaces,
};
use runtime::ManualScheduler;
use serde::Serialize;

use crate::heat::HeatField;

/// Pointer script applied after the first frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    /// Horizontal drag gesture `(from, to)`, played as one press/move/release.
    pub drag: Option<(Vec2, Vec2)>,
    /// Pointer rests at this display position after the drag.
    pub hover: Option<Vec2>,
    /// Release at the hover position.
    pub click: bool,
}

impl Script {
    fn queue(&self) -> QueuedInput {
        let mut input = QueuedInput::new();
        if let Some((from, to)) = self.drag {
            input.push_drag(from, to, 8);
        }
        if let Some(at) = self.hover {
            input.push(InputEvent::PointerMove(at));
            if self.click {
                input.push(InputEvent::PointerUp(at));
            }
        }
        input
    }
}

/// Data event feeding the heat field on a given frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatEvent {
    pub frame: usize,
    pub location: LatLon,
    pub amount: f64,
}

/// Transient heat driven by data events instead of the scene's static points.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatScript {
    /// Per-frame multiplier applied to every point.
    pub decay: f64,
    pub events: Vec<HeatEvent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimOptions {
    pub frames: usize,
    pub dt_s: f64,
    pub container: ContainerSize,
    /// Seed for marker animation phases.
    pub seed: u64,
    pub script: Script,
    pub heat: Option<HeatScript>,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            frames: 120,
            dt_s: 1.0 / 60.0,
            container: ContainerSize::new(600.0, 600.0),
            seed: 0,
            script: Script::default(),
            heat: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayTotals {
    pub glows: u64,
    pub arcs: u64,
    pub skipped_degenerate: u64,
    pub skipped_hidden: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimSummary {
    pub frames: u64,
    pub phi: f64,
    pub velocity: f64,
    pub display_width: f64,
    pub render_width: f64,
    pub overlay: OverlayTotals,
    /// Commands in the last presented overlay frame.
    pub last_overlay_commands: usize,
    pub hover: Option<String>,
    pub clicked: Vec<String>,
    pub events: usize,
    /// Glows drawn per frame while a heat script runs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub glow_trace: Vec<u32>,
    /// Heat points still alive at the end.
    pub heat_points: usize,
}

pub fn run(scene: Scene, config: GlobeConfig, opts: &SimOptions) -> SimSummary {
    let mut controller = GlobeController::seeded(config, opts.seed);
    controller.set_scene(scene);

    let sphere = RecordingSurface::new();
    let overlay = RecordingSurface::new();
    let mut session = GlobeSession::mount(
        controller,
        Surfaces::new(Box::new(sphere.clone()), Box::new(overlay.clone())),
        Box::new(StaticContainer::new(opts.container)),
        ManualScheduler::new(),
        Time::ZERO,
    );

    let mut clicked = Vec::new();
    let mut heat = opts
        .heat
        .as_ref()
        .map(|script| (script, HeatField::new(script.decay)));
    let mut glow_trace = Vec::new();
    for frame in 0..opts.frames {
        if let Some((script, field)) = heat.as_mut() {
            if frame > 0 {
                field.step();
            }
            for event in script.events.iter().filter(|e| e.frame == frame) {
                field.record(event.location, event.amount);
            }
            let points = field.points();
            session.with_controller(|c| c.set_heatmap_points(points));
        }
        session.scheduler_mut().advance(opts.dt_s);
        if heat.is_some() {
            glow_trace.push(overlay.log().last_overlay.map_or(0, |f| f.stats.glows));
        }
        if frame == 0 {
            let mut input = opts.script.queue();
            while let Some(event) = input.next_event() {
                if let Some(marker) = session.handle_input(event) {
                    clicked.push(marker.tooltip.unwrap_or_default());
                }
            }
        }
    }

    let summary = session.with_controller(|c| {
        let state = c.state();
        let m = c.metrics();
        SimSummary {
            frames: m.counter("frames"),
            phi: state.rotation.phi,
            velocity: state.rotation.velocity,
            display_width: state.surface.display_width,
            render_width: state.surface.render_width,
            overlay: OverlayTotals {
                glows: m.counter("overlay.glows"),
                arcs: m.counter("overlay.arcs"),
                skipped_degenerate: m.counter("overlay.skipped_degenerate"),
                skipped_hidden: m.counter("overlay.skipped_hidden"),
            },
            last_overlay_commands: overlay
                .log()
                .last_overlay
                .map(|f| f.commands.len())
                .unwrap_or(0),
            hover: c.hover().and_then(|h| h.marker.tooltip.clone()),
            clicked,
            events: c.events().len(),
            glow_trace,
            heat_points: c.scene().heatmap_points.len(),
        }
    });
    session.unmount();
    tracing::info!(
        frames = summary.frames,
        sphere_frames = sphere.log().sphere_frames,
        "simulation finished"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::{HeatEvent, HeatScript, Script, SimOptions, run};
    use foundation::math::{LatLon, Vec2};
    use globe::{Connection, GlobeConfig, HeatmapPoint, Marker, Scene, project};

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn idle_globe_auto_rotates() {
        let opts = SimOptions {
            frames: 10,
            ..SimOptions::default()
        };
        let summary = run(Scene::default(), GlobeConfig::default(), &opts);
        assert_eq!(summary.frames, 10);
        assert_close(summary.phi, 10.0 * 0.003);
        assert_close(summary.velocity, 0.003);
        // Empty scene still clears the overlay every frame.
        assert_eq!(summary.last_overlay_commands, 1);
    }

    #[test]
    fn drag_adds_inertia() {
        let opts = SimOptions {
            frames: 2,
            script: Script {
                drag: Some((Vec2::new(100.0, 300.0), Vec2::new(180.0, 300.0))),
                ..Script::default()
            },
            ..SimOptions::default()
        };
        let summary = run(Scene::default(), GlobeConfig::default(), &opts);
        // Each of the 8 moves is 10px: v = 0.05, then one coasting tick.
        assert_close(summary.velocity, 0.05 * 0.95);
    }

    #[test]
    fn click_on_marker_is_reported() {
        let config = GlobeConfig::default();
        let marker = Marker::new(LatLon::new(0.0, 0.0), 0.05).with_tooltip("center");
        let scene = Scene {
            markers: vec![marker],
            ..Scene::default()
        };
        // After the first tick the globe has turned by the auto-rotate floor.
        let at = project(LatLon::new(0.0, 0.0), 0.003, config.theta, 600.0).point();
        let opts = SimOptions {
            frames: 3,
            script: Script {
                hover: Some(at),
                click: true,
                ..Script::default()
            },
            ..SimOptions::default()
        };
        let summary = run(scene, config, &opts);
        assert_eq!(summary.clicked, vec!["center".to_string()]);
    }

    #[test]
    fn overlay_totals_accumulate() {
        let scene = Scene {
            connections: vec![
                Connection::new(LatLon::new(10.0, 0.0), LatLon::new(20.0, 20.0)),
                Connection::new(LatLon::new(5.0, 5.0), LatLon::new(5.0, 5.0)),
            ],
            heatmap_points: vec![HeatmapPoint::new(0.0, 0.0, 1.0)],
            ..Scene::default()
        };
        let opts = SimOptions {
            frames: 4,
            ..SimOptions::default()
        };
        let summary = run(scene, GlobeConfig::default(), &opts);
        assert_eq!(summary.overlay.arcs, 4);
        assert_eq!(summary.overlay.glows, 4);
        assert_eq!(summary.overlay.skipped_degenerate, 4);
    }

    #[test]
    fn heat_events_glow_then_fade_out() {
        let opts = SimOptions {
            frames: 12,
            heat: Some(HeatScript {
                decay: 0.5,
                events: vec![HeatEvent {
                    frame: 0,
                    location: LatLon::new(0.0, 0.0),
                    amount: 1.0,
                }],
            }),
            ..SimOptions::default()
        };
        let summary = run(Scene::default(), GlobeConfig::default(), &opts);

        let trace = &summary.glow_trace;
        assert_eq!(trace.len(), 12);
        assert_eq!(trace[0], 1);
        assert!(trace.windows(2).all(|w| w[1] <= w[0]), "{trace:?}");
        assert_eq!(trace[11], 0);
        // 0.5^10 falls under the floor and the point is dropped.
        assert_eq!(summary.heat_points, 0);
    }

    #[test]
    fn later_heat_event_reignites_glow() {
        let location = LatLon::new(10.0, 0.0);
        let opts = SimOptions {
            frames: 20,
            heat: Some(HeatScript {
                decay: 0.5,
                events: vec![
                    HeatEvent {
                        frame: 0,
                        location,
                        amount: 1.0,
                    },
                    HeatEvent {
                        frame: 15,
                        location,
                        amount: 1.0,
                    },
                ],
            }),
            ..SimOptions::default()
        };
        let summary = run(Scene::default(), GlobeConfig::default(), &opts);
        assert_eq!(summary.glow_trace[14], 0);
        assert_eq!(summary.glow_trace[15], 1);
        assert_eq!(summary.heat_points, 1);
    }
}
