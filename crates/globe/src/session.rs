//! Mount/unmount lifecycle of a globe on a host.
//!
//! A session owns the scheduler registration and the container watch. While
//! mounted, every scheduler frame settles pending resizes, advances the
//! controller and draws both surfaces. Unmounting (explicitly or on drop)
//! cancels the per-frame callback and disconnects the watch.

use std::cell::RefCell;
use std::rc::Rc;

use foundation::time::Time;
use runtime::{CallbackId, Frame, FrameScheduler};

use crate::controller::GlobeController;
use crate::input::InputEvent;
use crate::model::Marker;
use crate::resize::{ContainerSize, SurfaceSize};
use crate::surface::Surfaces;

/// The host element the globe is laid out in.
pub trait Container {
    fn measure(&self) -> ContainerSize;
}

/// Host subscription that reports container size changes.
pub trait ContainerWatch {
    fn disconnect(&mut self);
}

/// Fixed-size container for headless hosts.
#[derive(Debug, Clone, Default)]
pub struct StaticContainer {
    size: Rc<RefCell<ContainerSize>>,
}

impl StaticContainer {
    pub fn new(size: ContainerSize) -> Self {
        Self {
            size: Rc::new(RefCell::new(size)),
        }
    }

    /// Change the reported size. Clones observe the change.
    pub fn set(&self, size: ContainerSize) {
        *self.size.borrow_mut() = size;
    }
}

impl Container for StaticContainer {
    fn measure(&self) -> ContainerSize {
        *self.size.borrow()
    }
}

struct Mounted {
    controller: GlobeController,
    surfaces: Surfaces,
    container: Box<dyn Container>,
}

impl Mounted {
    fn frame(&mut self, frame: Frame) {
        if self.controller.settle_due(frame.time) {
            let measured = self.container.measure();
            if let Some(size) = self.controller.settle(measured, frame.time) {
                self.surfaces.resize(size);
            }
        }
        let out = self.controller.tick(frame);
        self.surfaces.sphere.draw_sphere(&out.sphere);
        self.surfaces.overlay.present(&out.overlay);
    }
}

pub struct GlobeSession<S: FrameScheduler> {
    mounted: Rc<RefCell<Mounted>>,
    scheduler: S,
    callback: Option<CallbackId>,
    watch: Option<Box<dyn ContainerWatch>>,
}

impl<S: FrameScheduler> GlobeSession<S> {
    /// Measure the container, size both surfaces and start the per-frame loop.
    pub fn mount(
        mut controller: GlobeController,
        mut surfaces: Surfaces,
        container: Box<dyn Container>,
        mut scheduler: S,
        now: Time,
    ) -> Self {
        controller.on_resize(container.measure(), now);
        surfaces.resize(controller.surface_size());

        let mounted = Rc::new(RefCell::new(Mounted {
            controller,
            surfaces,
            container,
        }));
        let shared = Rc::clone(&mounted);
        let callback = scheduler.register(Box::new(move |frame| {
            shared.borrow_mut().frame(frame);
        }));
        tracing::debug!(callback = callback.0, "globe mounted");

        Self {
            mounted,
            scheduler,
            callback: Some(callback),
            watch: None,
        }
    }

    /// Attach the host's resize subscription; it is disconnected on unmount.
    pub fn with_watch(mut self, watch: Box<dyn ContainerWatch>) -> Self {
        self.watch = Some(watch);
        self
    }

    pub fn is_mounted(&self) -> bool {
        self.callback.is_some()
    }

    /// Container reported a size change.
    pub fn notify_resize(&self, now: Time) -> Option<SurfaceSize> {
        if !self.is_mounted() {
            return None;
        }
        let mut m = self.mounted.borrow_mut();
        let measured = m.container.measure();
        let changed = m.controller.on_resize(measured, now);
        if let Some(size) = changed {
            m.surfaces.resize(size);
        }
        changed
    }

    /// Forward one pointer event. Returns the clicked marker, if any.
    pub fn handle_input(&self, event: InputEvent) -> Option<Marker> {
        if !self.is_mounted() {
            return None;
        }
        self.mounted.borrow_mut().controller.handle_input(event)
    }

    /// Run `f` against the controller, e.g. to replace scene data.
    pub fn with_controller<R>(&self, f: impl FnOnce(&mut GlobeController) -> R) -> R {
        f(&mut self.mounted.borrow_mut().controller)
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Cancel the frame callback and disconnect the watch. Idempotent.
    pub fn unmount(&mut self) {
        if let Some(id) = self.callback.take() {
            self.scheduler.unregister(id);
            tracing::debug!(callback = id.0, "globe unmounted");
        }
        if let Some(mut watch) = self.watch.take() {
            watch.disconnect();
        }
    }
}

impl<S: FrameScheduler> Drop for GlobeSession<S> {
    fn drop(&mut self) {
        self.unmount();
    }
}
