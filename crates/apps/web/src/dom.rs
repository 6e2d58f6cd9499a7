use globe::{Container, ContainerSize, ContainerWatch};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, ResizeObserver};

/// A DOM element measured through its bounding client rect.
pub struct ElementContainer {
    element: Element,
}

impl ElementContainer {
    pub fn new(element: Element) -> Self {
        Self { element }
    }
}

impl Container for ElementContainer {
    fn measure(&self) -> ContainerSize {
        let rect = self.element.get_bounding_client_rect();
        ContainerSize::new(rect.width(), rect.height())
    }
}

/// `ResizeObserver` subscription on the container element.
pub struct ResizeWatch {
    observer: ResizeObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, ResizeObserver)>,
}

impl ResizeWatch {
    pub fn observe(element: &Element, mut on_resize: impl FnMut() + 'static) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(js_sys::Array, ResizeObserver)>::new(
            move |_entries: js_sys::Array, _observer: ResizeObserver| on_resize(),
        );
        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
        observer.observe(element);
        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl ContainerWatch for ResizeWatch {
    fn disconnect(&mut self) {
        self.observer.disconnect();
    }
}

pub fn now_s() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now() / 1000.0)
        .unwrap_or_else(|| js_sys::Date::now() / 1000.0)
}
