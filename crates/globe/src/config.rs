use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the base globe size is derived from the container box.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizingMode {
    /// Smaller container side; the globe always fits.
    #[default]
    Fit,
    /// Larger container side; the globe may overflow.
    Cover,
}

/// sRGB color with straight alpha.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// CSS `rgba(...)` form understood by 2D canvas APIs.
    pub fn css(&self) -> String {
        let a = self.a.clamp(0.0, 1.0);
        format!("rgba({},{},{},{a})", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayColors {
    pub arc: Rgba,
    pub arc_width_px: f64,
    pub particle: Rgba,
    pub particle_radius_px: f64,
    /// Heat glow core; alpha is scaled by point intensity.
    pub heat_core: Rgba,
    pub heat_mid: Rgba,
}

impl Default for OverlayColors {
    fn default() -> Self {
        Self {
            arc: Rgba::new(96, 200, 255, 0.6),
            arc_width_px: 1.5,
            particle: Rgba::new(220, 245, 255, 0.95),
            particle_radius_px: 2.5,
            heat_core: Rgba::new(255, 120, 60, 0.65),
            heat_mid: Rgba::new(255, 60, 20, 0.3),
        }
    }
}

/// Every tunable of a globe session. Missing JSON fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    /// Multiplier applied to the container-derived base size.
    pub scale: f64,
    pub sizing_mode: SizingMode,
    /// Hard ceiling on the drawing-buffer width in pixels.
    pub render_cap: f64,
    /// Base size used while the container measures zero.
    pub fallback_size: f64,
    /// Fixed tilt about the screen x axis (radians).
    pub theta: f64,
    pub initial_phi: f64,
    /// Per-tick velocity multiplier while coasting.
    pub damping: f64,
    /// Auto-rotate floor (radians per tick).
    pub min_velocity: f64,
    /// Radians of yaw per display pixel of horizontal drag.
    pub drag_sensitivity: f64,
    /// Delay before the container is re-measured after a resize.
    pub settle_delay_s: f64,
    pub particle_period_ms: f64,
    pub particle_phase_step_ms: f64,
    /// Arc control-point offset as a fraction of chord length.
    pub arc_curvature: f64,
    /// Connections are drawn while both endpoints have `z` above this.
    pub limb_threshold: f64,
    /// Heat glow radius per unit intensity, as a fraction of render width.
    pub heat_radius_factor: f64,
    pub min_hit_radius_px: f64,
    pub hit_size_factor: f64,
    pub colors: OverlayColors,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            sizing_mode: SizingMode::Fit,
            render_cap: 1000.0,
            fallback_size: 300.0,
            theta: 0.3,
            initial_phi: 0.0,
            damping: 0.95,
            min_velocity: 0.003,
            drag_sensitivity: 0.005,
            settle_delay_s: 0.15,
            particle_period_ms: 2000.0,
            particle_phase_step_ms: 100.0,
            arc_curvature: 0.3,
            limb_threshold: -0.5,
            heat_radius_factor: 0.1,
            min_hit_radius_px: 10.0,
            hit_size_factor: 200.0,
            colors: OverlayColors::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be {expected} (got {value})")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },
}

impl GlobeConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: GlobeConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_sizing_mode(mut self, mode: SizingMode) -> Self {
        self.sizing_mode = mode;
        self
    }

    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("scale", self.scale)?;
        positive("render_cap", self.render_cap)?;
        positive("fallback_size", self.fallback_size)?;
        positive("particle_period_ms", self.particle_period_ms)?;
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "damping",
                expected: "in (0, 1]",
                value: self.damping,
            });
        }
        for (field, value) in [
            ("min_velocity", self.min_velocity),
            ("settle_delay_s", self.settle_delay_s),
            ("heat_radius_factor", self.heat_radius_factor),
            ("min_hit_radius_px", self.min_hit_radius_px),
            ("hit_size_factor", self.hit_size_factor),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::OutOfRange {
                    field,
                    expected: "non-negative",
                    value,
                });
            }
        }
        for (field, value) in [
            ("theta", self.theta),
            ("initial_phi", self.initial_phi),
            ("drag_sensitivity", self.drag_sensitivity),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::OutOfRange {
                    field,
                    expected: "finite",
                    value,
                });
            }
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            expected: "positive",
            value,
        })
    }
}
