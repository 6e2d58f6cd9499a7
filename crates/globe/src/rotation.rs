//! Yaw physics: auto-rotation with a minimum spin, drag tracking and inertial coast-down.
//!
//! Only `phi` is interactive. `theta` is set once per session.

use crate::config::GlobeConfig;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RotationState {
    /// Longitudinal rotation (radians).
    pub phi: f64,
    /// Fixed tilt (radians).
    pub theta: f64,
    /// Radians per tick.
    pub velocity: f64,
    pub is_dragging: bool,
}

impl RotationState {
    pub fn new(phi: f64, theta: f64) -> Self {
        Self {
            phi,
            theta,
            velocity: 0.0,
            is_dragging: false,
        }
    }
}

/// Constants of the rotation model, taken from [`GlobeConfig`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RotationPhysics {
    pub damping: f64,
    pub min_velocity: f64,
    pub drag_sensitivity: f64,
}

impl Default for RotationPhysics {
    fn default() -> Self {
        Self::from_config(&GlobeConfig::default())
    }
}

impl RotationPhysics {
    pub fn from_config(cfg: &GlobeConfig) -> Self {
        Self {
            damping: cfg.damping,
            min_velocity: cfg.min_velocity,
            drag_sensitivity: cfg.drag_sensitivity,
        }
    }

    /// Advance one tick. While dragging the pointer drives `phi` and ticks
    /// leave the state alone.
    pub fn tick(&self, state: &mut RotationState) {
        if state.is_dragging {
            return;
        }
        state.velocity *= self.damping;
        if state.velocity.abs() < self.min_velocity {
            state.velocity = self.min_velocity;
        }
        state.phi += state.velocity;
    }

    pub fn drag_start(&self, state: &mut RotationState) {
        state.is_dragging = true;
        state.velocity = 0.0;
    }

    /// Apply a horizontal pointer delta (display pixels) immediately.
    pub fn drag_move(&self, state: &mut RotationState, delta_x: f64) {
        if !state.is_dragging {
            return;
        }
        state.velocity = delta_x * self.drag_sensitivity;
        state.phi += state.velocity;
    }

    /// Release: keep the last drag velocity and coast under damping.
    pub fn drag_end(&self, state: &mut RotationState) {
        state.is_dragging = false;
    }
}
