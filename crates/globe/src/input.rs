use std::collections::VecDeque;

use foundation::math::Vec2;

/// Pointer interaction in display coordinates relative to the globe surface.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    /// Press: starts a drag.
    PointerDown(Vec2),
    /// Hover while idle, rotate while dragging.
    PointerMove(Vec2),
    /// Release: ends a drag and clicks the hovered marker, if any.
    PointerUp(Vec2),
    /// Pointer left the surface: clears hover, ends a drag without clicking.
    PointerLeave,
}

/// Host-side producer of pointer events.
pub trait InputSource {
    fn next_event(&mut self) -> Option<InputEvent>;
}

/// FIFO input source. Hosts push platform events; the controller drains them.
#[derive(Debug, Default, Clone)]
pub struct QueuedInput {
    events: VecDeque<InputEvent>,
}

impl QueuedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    /// Queue a full drag gesture from `from` through `steps` evenly spaced moves to `to`.
    pub fn push_drag(&mut self, from: Vec2, to: Vec2, steps: usize) {
        self.push(InputEvent::PointerDown(from));
        let steps = steps.max(1);
        for i in 1..=steps {
            let (i, n) = (i as f64, steps as f64);
            let p = Vec2::new(
                from.x + (to.x - from.x) * i / n,
                from.y + (to.y - from.y) * i / n,
            );
            self.push(InputEvent::PointerMove(p));
        }
        self.push(InputEvent::PointerUp(to));
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl InputSource for QueuedInput {
    fn next_event(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }
}

impl Extend<InputEvent> for QueuedInput {
    fn extend<T: IntoIterator<Item = InputEvent>>(&mut self, iter: T) {
        self.events.extend(iter);
    }
}
