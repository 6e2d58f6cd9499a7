use foundation::math::LatLon;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point of interest drawn on the sphere and hit-testable when it carries a tooltip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// `[latitude, longitude]` in degrees.
    pub location: LatLon,
    /// Base size in sphere-relative units (e.g. `0.05`).
    pub size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    /// Superimpose the fast flash used for markers under live data events.
    #[serde(default)]
    pub pulse: bool,
}

impl Marker {
    pub fn new(location: LatLon, size: f64) -> Self {
        Self {
            location,
            size,
            tooltip: None,
            pulse: false,
        }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn pulsing(mut self, pulse: bool) -> Self {
        self.pulse = pulse;
        self
    }
}

/// Arc between two geographic points. Identity is its position in the list.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub start: LatLon,
    pub end: LatLon,
}

impl Connection {
    pub fn new(start: LatLon, end: LatLon) -> Self {
        Self { start, end }
    }
}

/// Transient intensity at a point. `value` is expected in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapPoint {
    pub lat: f64,
    pub lon: f64,
    pub value: f64,
}

impl HeatmapPoint {
    pub fn new(lat: f64, lon: f64, value: f64) -> Self {
        Self { lat, lon, value }
    }

    pub fn location(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }

    /// Intensity clamped into `[0, 1]`; non-finite values read as zero.
    pub fn intensity(&self) -> f64 {
        if self.value.is_finite() {
            self.value.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Externally owned data the globe draws. Replaced wholesale on update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Scene {
    pub markers: Vec<Marker>,
    pub connections: Vec<Connection>,
    pub heatmap_points: Vec<HeatmapPoint>,
}

#[derive(Debug, Error)]
#[error("invalid scene json: {0}")]
pub struct SceneError(#[from] serde_json::Error);

impl Scene {
    pub fn from_json_str(s: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty() && self.connections.is_empty() && self.heatmap_points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{HeatmapPoint, Marker, Scene};
    use foundation::math::LatLon;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_scene_with_optional_fields() {
        let json = r#"{
            "markers": [
                { "location": [40.7, -74.0], "size": 0.05, "tooltip": "New York" },
                { "location": [51.5, -0.1], "size": 0.03, "pulse": true }
            ],
            "connections": [ { "start": [40.7, -74.0], "end": [51.5, -0.1] } ],
            "heatmapPoints": [ { "lat": 35.6, "lon": 139.6, "value": 0.8 } ]
        }"#;
        let scene = Scene::from_json_str(json).expect("parse");
        assert_eq!(
            scene.markers[0],
            Marker::new(LatLon::new(40.7, -74.0), 0.05).with_tooltip("New York")
        );
        assert!(scene.markers[1].pulse);
        assert_eq!(scene.markers[1].tooltip, None);
        assert_eq!(scene.connections.len(), 1);
        assert_eq!(scene.heatmap_points[0], HeatmapPoint::new(35.6, 139.6, 0.8));
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let scene = Scene::from_json_str("{}").expect("parse");
        assert!(scene.is_empty());
    }

    #[test]
    fn intensity_is_clamped() {
        assert_eq!(HeatmapPoint::new(0.0, 0.0, 1.7).intensity(), 1.0);
        assert_eq!(HeatmapPoint::new(0.0, 0.0, -0.2).intensity(), 0.0);
        assert_eq!(HeatmapPoint::new(0.0, 0.0, f64::NAN).intensity(), 0.0);
    }
}
