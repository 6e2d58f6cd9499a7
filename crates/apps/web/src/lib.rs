use console_error_panic_hook::set_once;
use std::cell::RefCell;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{EventTarget, HtmlCanvasElement, PointerEvent};

use foundation::math::Vec2;
use foundation::time::Time;
use globe::{
    Connection, GlobeConfig, GlobeController, GlobeSession, HeatmapPoint, InputEvent, Marker,
    Scene, Surfaces,
};

mod canvas;
mod dom;
mod raf;
use canvas::{CanvasSurface, OverlayCanvas, SphereCanvas};
use dom::{ElementContainer, ResizeWatch, now_s};
use raf::RafScheduler;

type PointerListener = Closure<dyn FnMut(PointerEvent)>;

/// A globe mounted into a page element.
struct WebGlobe {
    session: GlobeSession<RafScheduler>,
    on_click: Option<js_sys::Function>,
    sphere: HtmlCanvasElement,
    overlay: HtmlCanvasElement,
    listeners: Vec<(&'static str, PointerListener)>,
}

impl Drop for WebGlobe {
    fn drop(&mut self) {
        self.session.unmount();
        let target: &EventTarget = self.overlay.as_ref();
        for (name, listener) in &self.listeners {
            let _ = target.remove_event_listener_with_callback(name, listener.as_ref().unchecked_ref());
        }
        self.overlay.remove();
        self.sphere.remove();
    }
}

thread_local! {
    static GLOBE: RefCell<Option<WebGlobe>> = const { RefCell::new(None) };
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn log_error(context: &str, err: &JsValue) {
    web_sys::console::log_1(&JsValue::from_str(&format!("{context}: {err:?}")));
}

fn with_controller<R>(f: impl FnOnce(&mut GlobeController) -> R) -> Result<R, JsValue> {
    GLOBE.with(|g| {
        let g = g.try_borrow().map_err(js_err)?;
        let web = g
            .as_ref()
            .ok_or_else(|| JsValue::from_str("globe is not mounted"))?;
        Ok(web.session.with_controller(f))
    })
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Mount a globe into the element with id `container_id`, replacing any
/// previously mounted globe. `config_json` may set any subset of the config.
#[wasm_bindgen]
pub fn mount_globe(container_id: &str, config_json: Option<String>) -> Result<(), JsValue> {
    unmount_globe();

    let config = match config_json {
        Some(json) => GlobeConfig::from_json_str(&json).map_err(js_err)?,
        None => GlobeConfig::default(),
    };

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let container = document
        .get_element_by_id(container_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element #{container_id}")))?;

    let watch = ResizeWatch::observe(&container, || {
        GLOBE.with(|g| {
            let Ok(g) = g.try_borrow() else {
                return;
            };
            if let Some(web) = g.as_ref() {
                web.session.notify_resize(Time(now_s()));
            }
        });
    })?;

    let sphere = CanvasSurface::create(&document)?;
    let overlay = CanvasSurface::create(&document)?;
    let sphere_el = sphere.canvas().clone();
    let overlay_el = overlay.canvas().clone();
    container.append_child(&sphere_el)?;
    container.append_child(&overlay_el)?;

    let session = GlobeSession::mount(
        GlobeController::new(config),
        Surfaces::new(Box::new(SphereCanvas(sphere)), Box::new(OverlayCanvas(overlay))),
        Box::new(ElementContainer::new(container)),
        RafScheduler::new(),
        Time(now_s()),
    )
    .with_watch(Box::new(watch));

    let mut web = WebGlobe {
        session,
        on_click: None,
        sphere: sphere_el,
        overlay: overlay_el,
        listeners: Vec::new(),
    };
    install_listeners(&mut web)?;
    update_cursor(&web);

    GLOBE.with(|g| *g.borrow_mut() = Some(web));
    Ok(())
}

/// Stop the frame loop, disconnect the resize observer and remove the canvases.
#[wasm_bindgen]
pub fn unmount_globe() {
    let taken = GLOBE.with(|g| g.try_borrow_mut().ok().and_then(|mut g| g.take()));
    drop(taken);
}

#[wasm_bindgen]
pub fn is_globe_mounted() -> bool {
    GLOBE.with(|g| g.try_borrow().map(|g| g.is_some()).unwrap_or(true))
}

fn install_listeners(web: &mut WebGlobe) -> Result<(), JsValue> {
    let events: [(&'static str, fn(Vec2) -> InputEvent); 4] = [
        ("pointerdown", InputEvent::PointerDown),
        ("pointermove", InputEvent::PointerMove),
        ("pointerup", InputEvent::PointerUp),
        ("pointerleave", |_| InputEvent::PointerLeave),
    ];
    let target: EventTarget = web.overlay.clone().into();
    for (name, to_event) in events {
        let listener = PointerListener::new(move |e: PointerEvent| {
            let pos = Vec2::new(e.offset_x() as f64, e.offset_y() as f64);
            dispatch(to_event(pos));
        });
        target.add_event_listener_with_callback(name, listener.as_ref().unchecked_ref())?;
        web.listeners.push((name, listener));
    }
    Ok(())
}

/// Forward a pointer event; invoke the click callback after the state borrow is released.
fn dispatch(event: InputEvent) {
    let clicked = GLOBE.with(|g| {
        let g = g.try_borrow().ok()?;
        let web = g.as_ref()?;
        let marker = web.session.handle_input(event);
        update_cursor(web);
        Some((marker?, web.on_click.clone()?))
    });
    let Some((marker, callback)) = clicked else {
        return;
    };
    let result = marker_to_js(&marker).and_then(|value| callback.call1(&JsValue::NULL, &value));
    if let Err(err) = result {
        log_error("marker click handler", &err);
    }
}

fn update_cursor(web: &WebGlobe) {
    let (hovering, dragging) = web
        .session
        .with_controller(|c| (c.hover().is_some(), c.state().rotation.is_dragging));
    let cursor = if dragging {
        "grabbing"
    } else if hovering {
        "pointer"
    } else {
        "grab"
    };
    let _ = web.overlay.style().set_property("cursor", cursor);
}

fn marker_to_js(marker: &Marker) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(marker).map_err(js_err)?;
    js_sys::JSON::parse(&json)
}

#[wasm_bindgen]
pub fn set_marker_click_handler(callback: Option<js_sys::Function>) -> Result<(), JsValue> {
    GLOBE.with(|g| {
        let mut g = g.try_borrow_mut().map_err(js_err)?;
        let web = g
            .as_mut()
            .ok_or_else(|| JsValue::from_str("globe is not mounted"))?;
        web.on_click = callback;
        Ok(())
    })
}

/// Replace markers, connections and heatmap points at once.
#[wasm_bindgen]
pub fn set_scene_json(json: &str) -> Result<(), JsValue> {
    let scene = Scene::from_json_str(json).map_err(js_err)?;
    with_controller(|c| c.set_scene(scene))
}

#[wasm_bindgen]
pub fn set_markers_json(json: &str) -> Result<(), JsValue> {
    let markers: Vec<Marker> = serde_json::from_str(json).map_err(js_err)?;
    with_controller(|c| c.set_markers(markers))
}

#[wasm_bindgen]
pub fn set_connections_json(json: &str) -> Result<(), JsValue> {
    let connections: Vec<Connection> = serde_json::from_str(json).map_err(js_err)?;
    with_controller(|c| c.set_connections(connections))
}

#[wasm_bindgen]
pub fn set_heatmap_json(json: &str) -> Result<(), JsValue> {
    let points: Vec<HeatmapPoint> = serde_json::from_str(json).map_err(js_err)?;
    with_controller(|c| c.set_heatmap_points(points))
}

/// Hovered marker as `{ tooltip, x, y }` in display pixels, or `null`.
#[wasm_bindgen]
pub fn get_hover() -> Result<JsValue, JsValue> {
    let hover = with_controller(|c| {
        c.hover()
            .map(|h| (h.marker.tooltip.clone().unwrap_or_default(), h.display_position))
    })?;
    let Some((tooltip, at)) = hover else {
        return Ok(JsValue::NULL);
    };
    let o = js_sys::Object::new();
    js_sys::Reflect::set(&o, &JsValue::from_str("tooltip"), &JsValue::from_str(&tooltip))?;
    js_sys::Reflect::set(&o, &JsValue::from_str("x"), &JsValue::from_f64(at.x))?;
    js_sys::Reflect::set(&o, &JsValue::from_str("y"), &JsValue::from_f64(at.y))?;
    Ok(o.into())
}

#[wasm_bindgen]
pub fn get_globe_stats() -> Result<JsValue, JsValue> {
    let (state, metrics) = with_controller(|c| (c.state(), c.metrics().clone()))?;
    let o = js_sys::Object::new();
    let fields = [
        ("phi", state.rotation.phi),
        ("velocity", state.rotation.velocity),
        ("displayWidth", state.surface.display_width),
        ("renderWidth", state.surface.render_width),
        ("frames", metrics.counter("frames") as f64),
        ("glows", metrics.counter("overlay.glows") as f64),
        ("arcs", metrics.counter("overlay.arcs") as f64),
        ("clicks", metrics.counter("clicks") as f64),
    ];
    for (key, value) in fields {
        js_sys::Reflect::set(&o, &JsValue::from_str(key), &JsValue::from_f64(value))?;
    }
    Ok(o.into())
}
