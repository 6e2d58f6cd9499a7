use foundation::time::Time;

use crate::frame::Frame;

/// Per-tick callback. Must not block; it runs once per host refresh.
pub type FrameCallback = Box<dyn FnMut(Frame)>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(pub u64);

/// Host-side driver of per-frame callbacks.
///
/// Implementations decide the cadence (display refresh, fixed step, ...).
/// Registered callbacks run in registration order.
pub trait FrameScheduler {
    fn register(&mut self, callback: FrameCallback) -> CallbackId;

    /// Returns `false` when `id` was not registered (already removed).
    fn unregister(&mut self, id: CallbackId) -> bool;

    fn callback_count(&self) -> usize;
}

/// Registered callbacks in registration order.
///
/// Callbacks are taken out while a frame is dispatched so they can run
/// without holding the scheduler borrowed. An `unregister` arriving during
/// that window is deferred and applied by `finish_dispatch`.
#[derive(Default)]
pub struct CallbackRegistry {
    next_id: u64,
    callbacks: Vec<(CallbackId, FrameCallback)>,
    /// Ids taken out by `begin_dispatch`.
    dispatching: Vec<CallbackId>,
    /// Unregistered while dispatching.
    removed: Vec<CallbackId>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, callback: FrameCallback) -> CallbackId {
        let id = CallbackId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.callbacks.push((id, callback));
        id
    }

    pub fn unregister(&mut self, id: CallbackId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(cid, _)| *cid != id);
        if self.callbacks.len() != before {
            return true;
        }
        if self.dispatching.contains(&id) && !self.removed.contains(&id) {
            self.removed.push(id);
            return true;
        }
        false
    }

    pub fn len(&self) -> usize {
        self.callbacks.len() + self.dispatching.len() - self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take the callbacks to run for one frame. Hand them back with
    /// [`CallbackRegistry::finish_dispatch`].
    pub fn begin_dispatch(&mut self) -> Vec<(CallbackId, FrameCallback)> {
        let callbacks = std::mem::take(&mut self.callbacks);
        self.dispatching = callbacks.iter().map(|(id, _)| *id).collect();
        callbacks
    }

    pub fn finish_dispatch(&mut self, mut callbacks: Vec<(CallbackId, FrameCallback)>) {
        let removed = std::mem::take(&mut self.removed);
        self.dispatching.clear();
        callbacks.retain(|(id, _)| !removed.contains(id));
        // Registered while dispatching.
        callbacks.append(&mut self.callbacks);
        self.callbacks = callbacks;
    }
}

/// Deterministic scheduler driven explicitly by the caller.
///
/// Used by the headless simulator and tests: each `advance` produces one
/// frame and runs every registered callback with it.
pub struct ManualScheduler {
    registry: CallbackRegistry,
    frame: Option<Frame>,
    start: Time,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::starting_at(Time::ZERO)
    }

    pub fn starting_at(start: Time) -> Self {
        Self {
            registry: CallbackRegistry::new(),
            frame: None,
            start,
        }
    }

    /// The most recently dispatched frame, if any.
    pub fn last_frame(&self) -> Option<Frame> {
        self.frame
    }

    /// Dispatch one frame `dt_s` seconds after the previous one.
    ///
    /// The first call dispatches the start frame (`index == 0`) and ignores `dt_s`.
    pub fn advance(&mut self, dt_s: f64) -> Frame {
        let frame = match self.frame {
            None => Frame::start(self.start),
            Some(prev) => prev.advance(dt_s),
        };
        self.frame = Some(frame);
        let mut callbacks = self.registry.begin_dispatch();
        for (_, callback) in &mut callbacks {
            callback(frame);
        }
        self.registry.finish_dispatch(callbacks);
        frame
    }

    /// Dispatch `count` frames at a fixed step. Returns the last frame dispatched.
    pub fn run_frames(&mut self, count: usize, dt_s: f64) -> Option<Frame> {
        let mut last = None;
        for _ in 0..count {
            last = Some(self.advance(dt_s));
        }
        last
    }
}

impl FrameScheduler for ManualScheduler {
    fn register(&mut self, callback: FrameCallback) -> CallbackId {
        let id = self.registry.register(callback);
        tracing::trace!(id = id.0, "frame callback registered");
        id
    }

    fn unregister(&mut self, id: CallbackId) -> bool {
        let removed = self.registry.unregister(id);
        if removed {
            tracing::trace!(id = id.0, "frame callback unregistered");
        }
        removed
    }

    fn callback_count(&self) -> usize {
        self.registry.len()
    }
}
