//! Orthographic projection of geographic points onto the square globe surface.
//!
//! The render tick and the hit tester both go through [`project`]; there is no
//! other copy of the formula.

use foundation::math::{LatLon, Vec2};

/// Screen-space result of a projection. `z` is the depth after tilt:
/// positive faces the viewer, `<= 0` is on the far hemisphere.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Projected {
    pub fn point(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Strictly front-facing. Used for markers and heat glows.
    pub fn is_front(&self) -> bool {
        self.z > 0.0
    }

    /// Front-facing or within `threshold` past the limb. Used for arc endpoints.
    pub fn is_near_front(&self, threshold: f64) -> bool {
        self.z > threshold
    }
}

/// Rotation inputs for a projection: yaw `phi` and fixed tilt `theta`, radians.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct View {
    pub phi: f64,
    pub theta: f64,
    /// Side of the square surface in pixels.
    pub width: f64,
}

impl View {
    pub fn new(phi: f64, theta: f64, width: f64) -> Self {
        Self { phi, theta, width }
    }

    pub fn project(&self, location: LatLon) -> Projected {
        project(location, self.phi, self.theta, self.width)
    }
}

/// Project `location` for a globe yawed by `phi` and tilted by `theta`, drawn
/// in a `width x width` surface with the sphere inscribed.
pub fn project(location: LatLon, phi: f64, theta: f64, width: f64) -> Projected {
    let r = width / 2.0;
    let p = location.to_unit_sphere(phi);
    let tilted = p.rotate_x(theta);
    Projected {
        x: r + p.x * r,
        y: r - tilted.y * r,
        z: tilted.z,
    }
}
