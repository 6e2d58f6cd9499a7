use crate::frame::Frame;

/// Minimal event type for traceability.
///
/// Structured text keyed by a static kind; interaction layers emit these so a
/// session can be inspected or replayed after the fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub frame_index: u64,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<Event>,
    /// Frame index stamped on events emitted outside a tick.
    current_frame: u64,
    /// Oldest events are dropped beyond this many.
    limit: Option<usize>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            current_frame: 0,
            limit: None,
        }
    }

    /// Keep only the most recent `limit` events.
    pub fn bounded(limit: usize) -> Self {
        Self {
            limit: Some(limit.max(1)),
            ..Self::new()
        }
    }

    fn push(&mut self, event: Event) {
        if let Some(limit) = self.limit {
            if self.events.len() >= limit {
                let excess = self.events.len() + 1 - limit;
                self.events.drain(..excess);
            }
        }
        self.events.push(event);
    }

    pub fn emit(&mut self, frame: Frame, kind: &'static str, message: impl Into<String>) {
        self.current_frame = frame.index;
        self.push(Event {
            frame_index: frame.index,
            kind,
            message: message.into(),
        });
    }

    /// Record against the last frame seen. Used by event handlers that run
    /// between ticks.
    pub fn emit_now(&mut self, kind: &'static str, message: impl Into<String>) {
        self.push(Event {
            frame_index: self.current_frame,
            kind,
            message: message.into(),
        });
    }

    pub fn set_frame(&mut self, frame: Frame) {
        self.current_frame = frame.index;
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
