use foundation::time::Time;

/// Frame metadata handed to per-tick callbacks.
///
/// Fixed-step frames (`new`/`next`) are fully deterministic and are what the
/// headless host and tests use. Hosts driven by a display clock build frames
/// with `advance`, which carries the measured delta.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta time since the previous frame (seconds).
    pub dt_s: f64,
    /// Session time at the start of the frame (seconds).
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    /// First frame of a session started at `time`.
    pub fn start(time: Time) -> Self {
        Self {
            index: 0,
            dt_s: 0.0,
            time,
        }
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1, self.dt_s)
    }

    /// Advance by a measured, possibly irregular, delta. Negative deltas clamp to zero.
    pub fn advance(self, dt_s: f64) -> Self {
        let dt_s = dt_s.max(0.0);
        Self {
            index: self.index + 1,
            dt_s,
            time: self.time.after(dt_s),
        }
    }
}
