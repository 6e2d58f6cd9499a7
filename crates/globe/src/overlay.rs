//! Transparent overlay layer: heat glows and animated connection arcs.
//!
//! Rendering produces an [`OverlayFrame`] command list; surfaces replay it.
//! The frame always starts with a clear, so an empty scene yields an empty
//! (cleared) overlay.

use foundation::math::Vec2;

use crate::config::{GlobeConfig, OverlayColors, Rgba};
use crate::model::{Connection, HeatmapPoint};
use crate::projection::View;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BlendMode {
    /// Normal painting.
    SourceOver,
    /// Additive; overlapping glows intensify.
    Lighter,
}

impl BlendMode {
    /// Canvas `globalCompositeOperation` name.
    pub fn composite_op(self) -> &'static str {
        match self {
            BlendMode::SourceOver => "source-over",
            BlendMode::Lighter => "lighter",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Rgba,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum OverlayCommand {
    /// Clear the whole `width x width` buffer.
    Clear { width: f64 },
    SetBlend(BlendMode),
    RadialGlow {
        center: Vec2,
        radius: f64,
        stops: [GradientStop; 3],
    },
    QuadraticArc {
        from: Vec2,
        control: Vec2,
        to: Vec2,
        color: Rgba,
        line_width: f64,
    },
    Particle {
        center: Vec2,
        radius: f64,
        color: Rgba,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct OverlayStats {
    pub glows: u32,
    pub arcs: u32,
    /// Zero-length chords and sub-pixel glows.
    pub skipped_degenerate: u32,
    /// Back-facing points and arcs with an endpoint behind the limb.
    pub skipped_hidden: u32,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct OverlayFrame {
    pub commands: Vec<OverlayCommand>,
    pub stats: OverlayStats,
}

/// Point at parameter `t` on the quadratic Bezier `from -> control -> to`.
pub fn quadratic_point(from: Vec2, control: Vec2, to: Vec2, t: f64) -> Vec2 {
    let u = 1.0 - t;
    Vec2::new(
        u * u * from.x + 2.0 * u * t * control.x + t * t * to.x,
        u * u * from.y + 2.0 * u * t * control.y + t * t * to.y,
    )
}

/// Control point bowed off the chord midpoint by `curvature * |chord|`.
///
/// `None` when the endpoints coincide.
pub fn arc_control_point(from: Vec2, to: Vec2, curvature: f64) -> Option<Vec2> {
    let chord = to - from;
    let normal = chord.unit_perp()?;
    Some(from.midpoint(to) + normal.scale(chord.length() * curvature))
}

/// Position of the traveling particle along an arc, in `[0, 1)`.
pub fn particle_progress(elapsed_ms: f64, index: usize, period_ms: f64, phase_step_ms: f64) -> f64 {
    if period_ms <= 0.0 {
        return 0.0;
    }
    let shifted = elapsed_ms + index as f64 * phase_step_ms;
    shifted.rem_euclid(period_ms) / period_ms
}

/// Tunables of the overlay passes.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayRenderer {
    pub colors: OverlayColors,
    pub heat_radius_factor: f64,
    pub arc_curvature: f64,
    pub limb_threshold: f64,
    pub particle_period_ms: f64,
    pub particle_phase_step_ms: f64,
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::from_config(&GlobeConfig::default())
    }
}

impl OverlayRenderer {
    pub fn from_config(cfg: &GlobeConfig) -> Self {
        Self {
            colors: cfg.colors.clone(),
            heat_radius_factor: cfg.heat_radius_factor,
            arc_curvature: cfg.arc_curvature,
            limb_threshold: cfg.limb_threshold,
            particle_period_ms: cfg.particle_period_ms,
            particle_phase_step_ms: cfg.particle_phase_step_ms,
        }
    }

    /// Build one overlay frame for `view` at `elapsed_ms` into the session.
    pub fn render(
        &self,
        view: View,
        connections: &[Connection],
        heatmap: &[HeatmapPoint],
        elapsed_ms: f64,
    ) -> OverlayFrame {
        let mut frame = OverlayFrame::default();
        frame.commands.push(OverlayCommand::Clear { width: view.width });
        self.heatmap_pass(&mut frame, view, heatmap);
        self.connection_pass(&mut frame, view, connections, elapsed_ms);
        frame
    }

    fn heatmap_pass(&self, frame: &mut OverlayFrame, view: View, points: &[HeatmapPoint]) {
        if points.is_empty() {
            return;
        }
        frame.commands.push(OverlayCommand::SetBlend(BlendMode::Lighter));
        for point in points {
            let p = view.project(point.location());
            if !p.is_front() {
                frame.stats.skipped_hidden += 1;
                continue;
            }
            let value = point.intensity();
            let radius = value * view.width * self.heat_radius_factor;
            if radius.round() < 1.0 {
                frame.stats.skipped_degenerate += 1;
                continue;
            }
            let core = self.colors.heat_core;
            let mid = self.colors.heat_mid;
            frame.commands.push(OverlayCommand::RadialGlow {
                center: p.point(),
                radius,
                stops: [
                    GradientStop {
                        offset: 0.0,
                        color: core.with_alpha(core.a * value),
                    },
                    GradientStop {
                        offset: 0.5,
                        color: mid.with_alpha(mid.a * value),
                    },
                    GradientStop {
                        offset: 1.0,
                        color: Rgba::TRANSPARENT,
                    },
                ],
            });
            frame.stats.glows += 1;
        }
        frame.commands.push(OverlayCommand::SetBlend(BlendMode::SourceOver));
    }

    fn connection_pass(
        &self,
        frame: &mut OverlayFrame,
        view: View,
        connections: &[Connection],
        elapsed_ms: f64,
    ) {
        for (index, conn) in connections.iter().enumerate() {
            let a = view.project(conn.start);
            let b = view.project(conn.end);
            if !a.is_near_front(self.limb_threshold) || !b.is_near_front(self.limb_threshold) {
                frame.stats.skipped_hidden += 1;
                continue;
            }
            let (from, to) = (a.point(), b.point());
            let Some(control) = arc_control_point(from, to, self.arc_curvature) else {
                frame.stats.skipped_degenerate += 1;
                continue;
            };

            frame.commands.push(OverlayCommand::QuadraticArc {
                from,
                control,
                to,
                color: self.colors.arc,
                line_width: self.colors.arc_width_px,
            });

            let t = particle_progress(
                elapsed_ms,
                index,
                self.particle_period_ms,
                self.particle_phase_step_ms,
            );
            frame.commands.push(OverlayCommand::Particle {
                center: quadratic_point(from, control, to, t),
                radius: self.colors.particle_radius_px,
                color: self.colors.particle,
            });
            frame.stats.arcs += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        OverlayCommand, OverlayRenderer, arc_control_point, particle_progress, quadratic_point,
    };
    use crate::model::{Connection, HeatmapPoint};
    use crate::projection::View;
    use foundation::math::{LatLon, Vec2};
    use pretty_assertions::assert_eq;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn empty_scene_only_clears() {
        let frame = OverlayRenderer::default().render(View::new(0.0, 0.3, 500.0), &[], &[], 0.0);
        assert_eq!(frame.commands, vec![OverlayCommand::Clear { width: 500.0 }]);
    }

    #[test]
    fn zero_length_connection_draws_nothing() {
        let c = Connection::new(LatLon::new(0.0, 0.0), LatLon::new(0.0, 0.0));
        let frame = OverlayRenderer::default().render(View::new(0.0, 0.0, 400.0), &[c], &[], 0.0);
        assert_eq!(frame.commands.len(), 1);
        assert_eq!(frame.stats.arcs, 0);
        assert_eq!(frame.stats.skipped_degenerate, 1);
    }

    #[test]
    fn visible_connection_draws_arc_and_particle() {
        let c = Connection::new(LatLon::new(10.0, -20.0), LatLon::new(30.0, 25.0));
        let frame = OverlayRenderer::default().render(View::new(0.0, 0.3, 400.0), &[c], &[], 500.0);
        assert_eq!(frame.stats.arcs, 1);
        assert!(matches!(frame.commands[1], OverlayCommand::QuadraticArc { .. }));
        assert!(matches!(frame.commands[2], OverlayCommand::Particle { .. }));
    }

    #[test]
    fn connection_behind_limb_is_skipped() {
        let c = Connection::new(LatLon::new(0.0, 0.0), LatLon::new(0.0, 180.0));
        let frame = OverlayRenderer::default().render(View::new(0.0, 0.0, 400.0), &[c], &[], 0.0);
        assert_eq!(frame.stats.arcs, 0);
        assert_eq!(frame.stats.skipped_hidden, 1);
    }

    #[test]
    fn connection_slightly_past_limb_is_kept() {
        // 100E has z ~ -0.17: still inside the arc tolerance.
        let c = Connection::new(LatLon::new(0.0, 0.0), LatLon::new(0.0, 100.0));
        let frame = OverlayRenderer::default().render(View::new(0.0, 0.0, 400.0), &[c], &[], 0.0);
        assert_eq!(frame.stats.arcs, 1);
    }

    #[test]
    fn heat_glows_blend_additively_and_skip_tiny_radii() {
        let points = [
            HeatmapPoint::new(0.0, 0.0, 0.9),
            HeatmapPoint::new(5.0, 5.0, 0.001),
            HeatmapPoint::new(0.0, 180.0, 1.0),
        ];
        let frame = OverlayRenderer::default().render(View::new(0.0, 0.0, 400.0), &[], &points, 0.0);
        assert_eq!(frame.stats.glows, 1);
        assert_eq!(frame.stats.skipped_degenerate, 1);
        assert_eq!(frame.stats.skipped_hidden, 1);

        let blends: Vec<_> = frame
            .commands
            .iter()
            .filter_map(|c| match c {
                OverlayCommand::SetBlend(b) => Some(b.composite_op()),
                _ => None,
            })
            .collect();
        assert_eq!(blends, vec!["lighter", "source-over"]);

        let Some(OverlayCommand::RadialGlow { radius, center, .. }) = frame.commands.get(2) else {
            panic!("expected glow, got {:?}", frame.commands);
        };
        assert_close(*radius, 0.9 * 400.0 * 0.1, 1e-9);
        assert_close(center.x, 200.0, 1e-9);
    }

    #[test]
    fn control_point_offset_scales_with_chord() {
        let short = arc_control_point(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), 0.3).expect("ctrl");
        let long = arc_control_point(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), 0.3).expect("ctrl");
        assert_close(short.y, 3.0, 1e-12);
        assert_close(long.y, 30.0, 1e-12);
        assert_close(long.x, 50.0, 1e-12);
        assert_eq!(arc_control_point(Vec2::new(4.0, 4.0), Vec2::new(4.0, 4.0), 0.3), None);
    }

    #[test]
    fn particle_phase_is_offset_per_connection() {
        assert_close(particle_progress(0.0, 0, 2000.0, 100.0), 0.0, 1e-12);
        assert_close(particle_progress(0.0, 3, 2000.0, 100.0), 0.15, 1e-12);
        assert_close(particle_progress(2500.0, 0, 2000.0, 100.0), 0.25, 1e-12);
        assert_close(particle_progress(1900.0, 1, 2000.0, 100.0), 0.0, 1e-12);
    }

    #[test]
    fn quadratic_endpoints_match() {
        let (a, c, b) = (Vec2::new(0.0, 0.0), Vec2::new(5.0, 10.0), Vec2::new(10.0, 0.0));
        assert_eq!(quadratic_point(a, c, b, 0.0), a);
        assert_eq!(quadratic_point(a, c, b, 1.0), b);
        assert_eq!(quadratic_point(a, c, b, 0.5), Vec2::new(5.0, 5.0));
    }
}
