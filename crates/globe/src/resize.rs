//! Display size vs. drawing-buffer resolution.
//!
//! The display width follows the container. The buffer width is capped so
//! high-density or oversized containers never allocate past `render_cap`.
//! Device pixel ratio is pinned to 1.

use foundation::time::Time;

use crate::config::{GlobeConfig, SizingMode};

/// Measured container box in CSS/display pixels.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Sizes pushed to both drawing surfaces so they stay pixel-aligned.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceSize {
    /// Visual size (square side) in display pixels.
    pub display_width: f64,
    /// Drawing-buffer side in pixels, `<= render_cap`.
    pub render_width: f64,
}

impl SurfaceSize {
    /// Render pixels per display pixel.
    pub fn scale_factor(&self) -> f64 {
        if self.display_width > 0.0 {
            self.render_width / self.display_width
        } else {
            1.0
        }
    }

    /// Integer buffer side for surface allocation.
    pub fn buffer_px(&self) -> u32 {
        self.render_width.round().max(1.0) as u32
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderSurfaceState {
    pub display_width: f64,
    pub render_width: f64,
    pub last_resize: Time,
}

impl RenderSurfaceState {
    pub fn size(&self) -> SurfaceSize {
        SurfaceSize {
            display_width: self.display_width,
            render_width: self.render_width,
        }
    }
}

/// Compute surface sizes for a measured container.
///
/// A zero (or unmeasurable) base size falls back to `fallback_size`.
pub fn compute_surface_size(
    container: ContainerSize,
    mode: SizingMode,
    scale: f64,
    render_cap: f64,
    fallback_size: f64,
) -> SurfaceSize {
    let w = sanitize(container.width);
    let h = sanitize(container.height);
    let base = match mode {
        SizingMode::Fit => w.min(h),
        SizingMode::Cover => w.max(h),
    };
    let base = if base > 0.0 { base } else { fallback_size };
    let display_width = base * scale;
    SurfaceSize {
        display_width,
        render_width: display_width.min(render_cap),
    }
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

/// Owns [`RenderSurfaceState`] and the single settle timer.
#[derive(Debug, Clone)]
pub struct ResizeManager {
    mode: SizingMode,
    scale: f64,
    render_cap: f64,
    fallback_size: f64,
    settle_delay_s: f64,
    state: RenderSurfaceState,
    settle_at: Option<Time>,
}

impl ResizeManager {
    pub fn new(cfg: &GlobeConfig) -> Self {
        let initial = compute_surface_size(
            ContainerSize::default(),
            cfg.sizing_mode,
            cfg.scale,
            cfg.render_cap,
            cfg.fallback_size,
        );
        Self {
            mode: cfg.sizing_mode,
            scale: cfg.scale,
            render_cap: cfg.render_cap,
            fallback_size: cfg.fallback_size,
            settle_delay_s: cfg.settle_delay_s,
            state: RenderSurfaceState {
                display_width: initial.display_width,
                render_width: initial.render_width,
                last_resize: Time::ZERO,
            },
            settle_at: None,
        }
    }

    pub fn state(&self) -> RenderSurfaceState {
        self.state
    }

    pub fn size(&self) -> SurfaceSize {
        self.state.size()
    }

    /// Record a container measurement at `now` and arm the settle timer.
    ///
    /// Returns the new sizes only when they changed.
    pub fn observe(&mut self, container: ContainerSize, now: Time) -> Option<SurfaceSize> {
        self.settle_at = Some(now.after(self.settle_delay_s));
        self.apply(container, now)
    }

    /// Re-measurement after the settle delay. Does not re-arm the timer.
    pub fn settle(&mut self, container: ContainerSize, now: Time) -> Option<SurfaceSize> {
        self.apply(container, now)
    }

    /// `true` exactly once when the armed settle deadline has passed.
    pub fn take_settle_due(&mut self, now: Time) -> bool {
        match self.settle_at {
            Some(deadline) if now >= deadline => {
                self.settle_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn settle_pending(&self) -> bool {
        self.settle_at.is_some()
    }

    fn apply(&mut self, container: ContainerSize, now: Time) -> Option<SurfaceSize> {
        let next = compute_surface_size(
            container,
            self.mode,
            self.scale,
            self.render_cap,
            self.fallback_size,
        );
        if next == self.state.size() {
            return None;
        }
        self.state = RenderSurfaceState {
            display_width: next.display_width,
            render_width: next.render_width,
            last_resize: now,
        };
        tracing::debug!(
            display = next.display_width,
            render = next.render_width,
            "globe surface resized"
        );
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::{ContainerSize, ResizeManager, compute_surface_size};
    use crate::config::{GlobeConfig, SizingMode};
    use foundation::time::Time;

    #[test]
    fn fit_uses_smaller_side_and_cover_larger() {
        let c = ContainerSize::new(800.0, 600.0);
        let fit = compute_surface_size(c, SizingMode::Fit, 1.0, 1000.0, 300.0);
        let cover = compute_surface_size(c, SizingMode::Cover, 1.0, 1000.0, 300.0);
        assert_eq!(fit.display_width, 600.0);
        assert_eq!(cover.display_width, 800.0);
    }

    #[test]
    fn zero_container_falls_back_to_default() {
        for scale in [0.5, 1.0, 2.5] {
            let s = compute_surface_size(ContainerSize::new(0.0, 0.0), SizingMode::Fit, scale, 1000.0, 300.0);
            assert_eq!(s.display_width, 300.0 * scale);
        }
    }

    #[test]
    fn render_width_is_capped_exactly() {
        let s = compute_surface_size(ContainerSize::new(900.0, 900.0), SizingMode::Fit, 2.0, 1000.0, 300.0);
        assert_eq!(s.display_width, 1800.0);
        assert_eq!(s.render_width, 1000.0);
        assert_eq!(s.scale_factor(), 1000.0 / 1800.0);

        let s = compute_surface_size(ContainerSize::new(640.0, 700.0), SizingMode::Fit, 1.0, 1000.0, 300.0);
        assert_eq!(s.render_width, s.display_width);
        assert_eq!(s.scale_factor(), 1.0);
    }

    #[test]
    fn observe_reports_only_changes() {
        let mut rm = ResizeManager::new(&GlobeConfig::default());
        let c = ContainerSize::new(500.0, 400.0);
        assert!(rm.observe(c, Time(1.0)).is_some());
        assert!(rm.observe(c, Time(1.1)).is_none());
        assert_eq!(rm.state().last_resize, Time(1.0));
    }

    #[test]
    fn settle_timer_fires_once() {
        let mut rm = ResizeManager::new(&GlobeConfig::default());
        rm.observe(ContainerSize::new(500.0, 500.0), Time(1.0));
        assert!(rm.settle_pending());
        assert!(!rm.take_settle_due(Time(1.1)));
        assert!(rm.take_settle_due(Time(1.2)));
        assert!(!rm.take_settle_due(Time(5.0)));
    }

    #[test]
    fn later_observation_rearms_single_timer() {
        let mut rm = ResizeManager::new(&GlobeConfig::default());
        rm.observe(ContainerSize::new(500.0, 500.0), Time(1.0));
        rm.observe(ContainerSize::new(520.0, 500.0), Time(1.1));
        assert!(!rm.take_settle_due(Time(1.2)));
        assert!(rm.take_settle_due(Time(1.3)));
    }

    #[test]
    fn initial_state_uses_fallback() {
        let rm = ResizeManager::new(&GlobeConfig::default().with_scale(2.0));
        assert_eq!(rm.size().display_width, 600.0);
        assert_eq!(rm.size().render_width, 600.0);
    }
}
