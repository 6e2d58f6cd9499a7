//! Drawing-surface seams.
//!
//! The primary surface draws the sphere itself (dots, shading, markers) from a
//! [`SphereFrame`]; the overlay surface replays an [`OverlayFrame`]. Both get
//! the same [`SurfaceSize`] so they stay pixel-aligned.

use std::cell::RefCell;
use std::rc::Rc;

use foundation::math::LatLon;

use crate::overlay::OverlayFrame;
use crate::resize::SurfaceSize;

/// A marker as the sphere surface should draw it this frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AnimatedMarker {
    pub location: LatLon,
    /// Base size after breathing/pulse modulation.
    pub size: f64,
}

/// Everything the primary surface needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereFrame {
    pub phi: f64,
    pub theta: f64,
    /// Drawing-buffer side in pixels.
    pub width: f64,
    pub markers: Vec<AnimatedMarker>,
}

pub trait DrawingSurface {
    /// Set visual size and buffer size. Called on mount and on every size change.
    fn resize(&mut self, size: SurfaceSize);
}

pub trait SphereSurface: DrawingSurface {
    fn draw_sphere(&mut self, frame: &SphereFrame);
}

pub trait OverlaySurface: DrawingSurface {
    fn present(&mut self, frame: &OverlayFrame);
}

/// The pair of surfaces a mounted globe draws into.
pub struct Surfaces {
    pub sphere: Box<dyn SphereSurface>,
    pub overlay: Box<dyn OverlaySurface>,
}

impl Surfaces {
    pub fn new(sphere: Box<dyn SphereSurface>, overlay: Box<dyn OverlaySurface>) -> Self {
        Self { sphere, overlay }
    }

    pub fn resize(&mut self, size: SurfaceSize) {
        self.sphere.resize(size);
        self.overlay.resize(size);
    }
}

/// What a [`RecordingSurface`] has seen.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordingLog {
    pub sizes: Vec<SurfaceSize>,
    pub overlay_frames: usize,
    pub sphere_frames: usize,
    pub last_overlay: Option<OverlayFrame>,
    pub last_sphere: Option<SphereFrame>,
}

/// Headless surface that records instead of drawing.
///
/// Clones share the same log, so a caller can keep one handle while the
/// session owns another.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    log: Rc<RefCell<RecordingLog>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> RecordingLog {
        self.log.borrow().clone()
    }

    pub fn last_size(&self) -> Option<SurfaceSize> {
        self.log.borrow().sizes.last().copied()
    }
}

impl DrawingSurface for RecordingSurface {
    fn resize(&mut self, size: SurfaceSize) {
        self.log.borrow_mut().sizes.push(size);
    }
}

impl SphereSurface for RecordingSurface {
    fn draw_sphere(&mut self, frame: &SphereFrame) {
        let mut log = self.log.borrow_mut();
        log.sphere_frames += 1;
        log.last_sphere = Some(frame.clone());
    }
}

impl OverlaySurface for RecordingSurface {
    fn present(&mut self, frame: &OverlayFrame) {
        let mut log = self.log.borrow_mut();
        log.overlay_frames += 1;
        log.last_overlay = Some(frame.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::{OverlaySurface, RecordingSurface, Surfaces};
    use crate::overlay::OverlayFrame;
    use crate::resize::SurfaceSize;

    #[test]
    fn clones_share_one_log() {
        let rec = RecordingSurface::new();
        let mut handle = rec.clone();
        handle.present(&OverlayFrame::default());
        assert_eq!(rec.log().overlay_frames, 1);
    }

    #[test]
    fn surfaces_resize_together() {
        let sphere = RecordingSurface::new();
        let overlay = RecordingSurface::new();
        let mut surfaces = Surfaces::new(Box::new(sphere.clone()), Box::new(overlay.clone()));
        let size = SurfaceSize {
            display_width: 1200.0,
            render_width: 1000.0,
        };
        surfaces.resize(size);
        assert_eq!(sphere.last_size(), Some(size));
        assert_eq!(overlay.last_size(), Some(size));
    }
}
