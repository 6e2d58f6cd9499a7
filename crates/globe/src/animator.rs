//! Breathing / pulse size modulation for markers.

use std::collections::HashMap;
use std::f64::consts::TAU;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Amplitude of the slow breathing term.
pub const BREATHING_AMPLITUDE: f64 = 0.3;
/// Angular speed of breathing (radians per second).
pub const BREATHING_RATE: f64 = 2.0;
/// Angular speed of the pulse flash (radians per second).
pub const PULSE_RATE: f64 = 10.0;

/// Size multiplier for a marker with the given phase at `elapsed_s`.
///
/// Without pulse the result stays in `[1 - 0.3, 1 + 0.3]`; the pulse adds a
/// flash term in `[0, 1]` on top.
pub fn size_factor(phase: f64, elapsed_s: f64, pulse: bool) -> f64 {
    let breathing = 1.0 + (elapsed_s * BREATHING_RATE + phase).sin() * BREATHING_AMPLITUDE;
    let pulse_term = if pulse {
        (elapsed_s * PULSE_RATE).sin() * 0.5 + 0.5
    } else {
        0.0
    };
    breathing + pulse_term
}

/// Per-marker phase cache.
///
/// A phase is drawn uniformly from `[0, 2pi)` the first time an index is seen
/// and kept for the whole session, so data refreshes never make a marker jump.
#[derive(Debug, Clone)]
pub struct MarkerAnimator<R = SmallRng> {
    phases: HashMap<usize, f64>,
    rng: R,
}

impl Default for MarkerAnimator<SmallRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkerAnimator<SmallRng> {
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    /// Reproducible phases, for headless runs and tests.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> MarkerAnimator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            phases: HashMap::new(),
            rng,
        }
    }

    pub fn phase(&mut self, index: usize) -> f64 {
        let rng = &mut self.rng;
        *self
            .phases
            .entry(index)
            .or_insert_with(|| rng.gen_range(0.0..TAU))
    }

    pub fn cached_phase(&self, index: usize) -> Option<f64> {
        self.phases.get(&index).copied()
    }

    pub fn cached_len(&self) -> usize {
        self.phases.len()
    }

    pub fn effective_size(&mut self, index: usize, size: f64, elapsed_s: f64, pulse: bool) -> f64 {
        let phase = self.phase(index);
        size * size_factor(phase, elapsed_s, pulse)
    }
}
