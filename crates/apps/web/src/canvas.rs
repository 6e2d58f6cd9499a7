//! Canvas 2D surfaces for the sphere and the overlay.

use std::f64::consts::TAU;

use foundation::math::LatLon;
use globe::{
    DrawingSurface, OverlayCommand, OverlayFrame, OverlaySurface, Rgba, SphereFrame,
    SphereSurface, SurfaceSize, View,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

/// Grid spacing of the dot pattern on the sphere, in degrees.
const DOT_STEP_DEG: f64 = 4.0;

const SPHERE_FILL: Rgba = Rgba::new(14, 22, 38, 1.0);
const LIMB_STROKE: Rgba = Rgba::new(96, 200, 255, 0.35);
const DOT_COLOR: Rgba = Rgba::new(160, 190, 220, 0.55);
const MARKER_COLOR: Rgba = Rgba::new(255, 170, 60, 0.95);

fn ctx_set_fill_style(ctx: &CanvasRenderingContext2d, value: &JsValue) {
    let _ = js_sys::Reflect::set(ctx.as_ref(), &JsValue::from_str("fillStyle"), value);
}

fn ctx_set_stroke_style(ctx: &CanvasRenderingContext2d, value: &str) {
    let _ = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str("strokeStyle"),
        &JsValue::from_str(value),
    );
}

fn fill_circle(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64) {
    ctx.begin_path();
    if ctx.arc(x, y, radius, 0.0, TAU).is_ok() {
        ctx.fill();
    }
}

/// One `<canvas>` with its 2D context, absolutely positioned in the container.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn create(document: &Document) -> Result<Self, JsValue> {
        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        let style = canvas.style();
        style.set_property("position", "absolute")?;
        style.set_property("left", "0")?;
        style.set_property("top", "0")?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl DrawingSurface for CanvasSurface {
    fn resize(&mut self, size: SurfaceSize) {
        let px = size.buffer_px();
        self.canvas.set_width(px);
        self.canvas.set_height(px);
        let css = format!("{}px", size.display_width);
        let style = self.canvas.style();
        let _ = style.set_property("width", &css);
        let _ = style.set_property("height", &css);
    }
}

/// Canvas-owning surface handle shared with the DOM wiring.
pub struct SphereCanvas(pub CanvasSurface);

impl DrawingSurface for SphereCanvas {
    fn resize(&mut self, size: SurfaceSize) {
        self.0.resize(size);
    }
}

impl SphereSurface for SphereCanvas {
    fn draw_sphere(&mut self, frame: &SphereFrame) {
        let ctx = &self.0.ctx;
        let w = frame.width;
        let r = w / 2.0;
        ctx.clear_rect(0.0, 0.0, w, w);

        ctx_set_fill_style(ctx, &JsValue::from_str(&SPHERE_FILL.css()));
        fill_circle(ctx, r, r, r);
        ctx_set_stroke_style(ctx, &LIMB_STROKE.css());
        ctx.set_line_width(1.0);
        ctx.begin_path();
        if ctx.arc(r, r, r - 0.5, 0.0, TAU).is_ok() {
            ctx.stroke();
        }

        let view = View::new(frame.phi, frame.theta, w);
        let dot_radius = (w / 500.0).max(0.75);
        ctx_set_fill_style(ctx, &JsValue::from_str(&DOT_COLOR.css()));
        let mut lat = -90.0 + DOT_STEP_DEG / 2.0;
        while lat < 90.0 {
            let mut lon = -180.0;
            while lon < 180.0 {
                let p = view.project(LatLon::new(lat, lon));
                if p.is_front() {
                    fill_circle(ctx, p.x, p.y, dot_radius * p.z.sqrt());
                }
                lon += DOT_STEP_DEG;
            }
            lat += DOT_STEP_DEG;
        }

        ctx_set_fill_style(ctx, &JsValue::from_str(&MARKER_COLOR.css()));
        for marker in &frame.markers {
            let p = view.project(marker.location);
            if p.is_front() {
                fill_circle(ctx, p.x, p.y, marker.size * r);
            }
        }
    }
}

pub struct OverlayCanvas(pub CanvasSurface);

impl DrawingSurface for OverlayCanvas {
    fn resize(&mut self, size: SurfaceSize) {
        self.0.resize(size);
    }
}

impl OverlaySurface for OverlayCanvas {
    fn present(&mut self, frame: &OverlayFrame) {
        let ctx = &self.0.ctx;
        for command in &frame.commands {
            match *command {
                OverlayCommand::Clear { width } => ctx.clear_rect(0.0, 0.0, width, width),
                OverlayCommand::SetBlend(mode) => {
                    let _ = ctx.set_global_composite_operation(mode.composite_op());
                }
                OverlayCommand::RadialGlow {
                    center,
                    radius,
                    stops,
                } => {
                    let Ok(gradient) =
                        ctx.create_radial_gradient(center.x, center.y, 0.0, center.x, center.y, radius)
                    else {
                        continue;
                    };
                    for stop in stops {
                        let _ = gradient.add_color_stop(stop.offset as f32, &stop.color.css());
                    }
                    ctx_set_fill_style(ctx, gradient.as_ref());
                    fill_circle(ctx, center.x, center.y, radius);
                }
                OverlayCommand::QuadraticArc {
                    from,
                    control,
                    to,
                    color,
                    line_width,
                } => {
                    ctx_set_stroke_style(ctx, &color.css());
                    ctx.set_line_width(line_width);
                    ctx.begin_path();
                    ctx.move_to(from.x, from.y);
                    ctx.quadratic_curve_to(control.x, control.y, to.x, to.y);
                    ctx.stroke();
                }
                OverlayCommand::Particle {
                    center,
                    radius,
                    color,
                } => {
                    ctx_set_fill_style(ctx, &JsValue::from_str(&color.css()));
                    fill_circle(ctx, center.x, center.y, radius);
                }
            }
        }
    }
}
