//! `requestAnimationFrame`-driven [`FrameScheduler`].

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use foundation::time::Time;
use runtime::{CallbackId, CallbackRegistry, Frame, FrameCallback, FrameScheduler};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

struct RafInner {
    callbacks: CallbackRegistry,
    frame: Option<Frame>,
    last_ts_ms: Option<f64>,
    handle: Option<i32>,
    tick: Option<Closure<dyn FnMut(f64)>>,
}

/// Runs registered callbacks once per display refresh while any are registered.
pub struct RafScheduler {
    inner: Rc<RefCell<RafInner>>,
}

impl RafScheduler {
    pub fn new() -> Self {
        let inner = Rc::new(RefCell::new(RafInner {
            callbacks: CallbackRegistry::new(),
            frame: None,
            last_ts_ms: None,
            handle: None,
            tick: None,
        }));
        let weak = Rc::downgrade(&inner);
        let tick = Closure::<dyn FnMut(f64)>::new(move |ts_ms: f64| on_frame(&weak, ts_ms));
        inner.borrow_mut().tick = Some(tick);
        Self { inner }
    }
}

impl Default for RafScheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn on_frame(weak: &Weak<RefCell<RafInner>>, ts_ms: f64) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let (frame, mut callbacks) = {
        let mut s = inner.borrow_mut();
        s.handle = None;
        let frame = match (s.frame, s.last_ts_ms) {
            (Some(prev), Some(last)) => prev.advance((ts_ms - last) / 1000.0),
            _ => Frame::start(Time(ts_ms / 1000.0)),
        };
        s.frame = Some(frame);
        s.last_ts_ms = Some(ts_ms);
        (frame, s.callbacks.begin_dispatch())
    };

    for (_, callback) in &mut callbacks {
        callback(frame);
    }

    let mut s = inner.borrow_mut();
    s.callbacks.finish_dispatch(callbacks);
    request(&mut s);
}

fn request(s: &mut RafInner) {
    if s.handle.is_some() || s.callbacks.is_empty() {
        return;
    }
    let (Some(window), Some(tick)) = (web_sys::window(), s.tick.as_ref()) else {
        return;
    };
    match window.request_animation_frame(tick.as_ref().unchecked_ref()) {
        Ok(handle) => s.handle = Some(handle),
        Err(err) => web_sys::console::log_1(&err),
    }
}

fn cancel(s: &mut RafInner) {
    if let (Some(handle), Some(window)) = (s.handle.take(), web_sys::window()) {
        let _ = window.cancel_animation_frame(handle);
    }
}

impl FrameScheduler for RafScheduler {
    fn register(&mut self, callback: FrameCallback) -> CallbackId {
        let mut s = self.inner.borrow_mut();
        let id = s.callbacks.register(callback);
        request(&mut s);
        id
    }

    fn unregister(&mut self, id: CallbackId) -> bool {
        let mut s = self.inner.borrow_mut();
        let removed = s.callbacks.unregister(id);
        if s.callbacks.is_empty() {
            cancel(&mut s);
        }
        removed
    }

    fn callback_count(&self) -> usize {
        self.inner.borrow().callbacks.len()
    }
}

impl Drop for RafScheduler {
    fn drop(&mut self) {
        let mut s = self.inner.borrow_mut();
        cancel(&mut s);
        s.callbacks = CallbackRegistry::new();
        s.tick = None;
    }
}
