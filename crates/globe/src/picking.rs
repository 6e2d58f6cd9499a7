//! Pointer hit-testing of markers against the projected globe.

use foundation::math::Vec2;

use crate::model::Marker;
use crate::projection::View;
use crate::resize::SurfaceSize;

/// Radii used for marker hit-testing, in render pixels before scaling.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HitOptions {
    pub min_radius_px: f64,
    pub size_factor: f64,
}

impl Default for HitOptions {
    fn default() -> Self {
        Self {
            min_radius_px: 10.0,
            size_factor: 200.0,
        }
    }
}

impl HitOptions {
    /// Hit radius in render pixels. Never decreases as `marker_size` grows.
    pub fn radius(&self, marker_size: f64, scale_factor: f64) -> f64 {
        (self.min_radius_px * scale_factor).max(marker_size * self.size_factor * scale_factor)
    }
}

/// A marker under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerHit {
    /// Index into the marker list the hit was computed against.
    pub index: usize,
    pub marker: Marker,
    /// Marker position in display coordinates, for tooltip placement.
    pub display_position: Vec2,
}

/// Find the marker under a display-space pointer position.
///
/// Only markers carrying a tooltip and facing the viewer are candidates. The
/// first match in list order wins, independent of depth, so the result is
/// stable for overlapping markers.
pub fn hit_test(
    markers: &[Marker],
    pointer_display: Vec2,
    phi: f64,
    theta: f64,
    size: SurfaceSize,
    opts: HitOptions,
) -> Option<MarkerHit> {
    let scale = size.scale_factor();
    if !(scale.is_finite() && scale > 0.0) {
        return None;
    }
    let view = View::new(phi, theta, size.render_width);
    let pointer = pointer_display.scale(scale);

    markers.iter().enumerate().find_map(|(index, marker)| {
        marker.tooltip.as_ref()?;
        let p = view.project(marker.location);
        if !p.is_front() {
            return None;
        }
        let at = p.point();
        if pointer.distance(at) >= opts.radius(marker.size, scale) {
            return None;
        }
        Some(MarkerHit {
            index,
            marker: marker.clone(),
            display_position: at.scale(1.0 / scale),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::{HitOptions, hit_test};
    use crate::model::Marker;
    use crate::projection::project;
    use crate::resize::SurfaceSize;
    use foundation::math::{LatLon, Vec2};

    fn size(display: f64, render: f64) -> SurfaceSize {
        SurfaceSize {
            display_width: display,
            render_width: render,
        }
    }

    #[test]
    fn pointer_on_marker_hits_it() {
        let markers = vec![Marker::new(LatLon::new(0.0, 0.0), 0.05).with_tooltip("X")];
        let s = size(600.0, 600.0);
        let p = project(LatLon::new(0.0, 0.0), 0.0, 0.4, 600.0);
        let hit = hit_test(&markers, p.point(), 0.0, 0.4, s, HitOptions::default()).expect("hit");
        assert_eq!(hit.index, 0);
        assert_eq!(hit.marker.tooltip.as_deref(), Some("X"));
    }

    #[test]
    fn markers_without_tooltip_are_not_hit() {
        let markers = vec![Marker::new(LatLon::new(0.0, 0.0), 0.05)];
        let hit = hit_test(
            &markers,
            Vec2::new(150.0, 150.0),
            0.0,
            0.0,
            size(300.0, 300.0),
            HitOptions::default(),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn back_facing_markers_are_not_hit() {
        // Back-facing marker projects onto the center too (x = r, y = r).
        let markers = vec![Marker::new(LatLon::new(0.0, 180.0), 0.05).with_tooltip("far side")];
        let hit = hit_test(
            &markers,
            Vec2::new(150.0, 150.0),
            0.0,
            0.0,
            size(300.0, 300.0),
            HitOptions::default(),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn first_declared_marker_wins() {
        let markers = vec![
            Marker::new(LatLon::new(0.0, 0.5), 0.05).with_tooltip("first"),
            Marker::new(LatLon::new(0.0, 0.0), 0.05).with_tooltip("second"),
        ];
        let hit = hit_test(
            &markers,
            Vec2::new(150.0, 150.0),
            0.0,
            0.0,
            size(300.0, 300.0),
            HitOptions::default(),
        )
        .expect("hit");
        assert_eq!(hit.index, 0);
    }

    #[test]
    fn pointer_is_scaled_into_render_space() {
        // Display is twice the render buffer; the marker sits at the render center.
        let markers = vec![Marker::new(LatLon::new(0.0, 0.0), 0.01).with_tooltip("c")];
        let s = size(2000.0, 1000.0);
        let hit = hit_test(&markers, Vec2::new(1000.0, 1000.0), 0.0, 0.0, s, HitOptions::default())
            .expect("hit");
        assert_eq!(hit.display_position, Vec2::new(1000.0, 1000.0));

        // 30 display px away is 15 render px: outside max(10*0.5, 0.01*200*0.5) = 5.
        let miss = hit_test(&markers, Vec2::new(1030.0, 1000.0), 0.0, 0.0, s, HitOptions::default());
        assert!(miss.is_none());
    }

    #[test]
    fn radius_is_monotonic_in_size() {
        let opts = HitOptions::default();
        let mut last = 0.0;
        for i in 0..200 {
            let r = opts.radius(i as f64 * 0.001, 0.75);
            assert!(r >= last);
            last = r;
        }
        assert_eq!(opts.radius(0.0, 1.0), 10.0);
        assert_eq!(opts.radius(0.1, 1.0), 20.0);
    }
}
