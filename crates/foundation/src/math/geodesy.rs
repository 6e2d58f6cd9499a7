use super::Vec3;

/// Geographic coordinate in degrees.
///
/// Serialized as a `[latitude, longitude]` pair.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "(f64, f64)", into = "(f64, f64)"))]
pub struct LatLon {
    pub lat_deg: f64,
    pub lon_deg: f64,
}

impl LatLon {
    pub const fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }

    pub fn lat_rad(self) -> f64 {
        self.lat_deg.to_radians()
    }

    pub fn lon_rad(self) -> f64 {
        self.lon_deg.to_radians()
    }

    /// Position on the unit sphere after yawing the globe by `phi` radians.
    ///
    /// Axes: `+y` towards the north pole, `+z` towards the viewer at `phi = 0`
    /// for the prime meridian, `+x` towards 90°E.
    pub fn to_unit_sphere(self, phi: f64) -> Vec3 {
        let lat = self.lat_rad();
        let lambda = self.lon_rad() + phi;
        let cos_lat = lat.cos();
        Vec3::new(cos_lat * lambda.sin(), lat.sin(), cos_lat * lambda.cos())
    }
}

impl From<(f64, f64)> for LatLon {
    fn from((lat_deg, lon_deg): (f64, f64)) -> Self {
        Self::new(lat_deg, lon_deg)
    }
}

impl From<LatLon> for (f64, f64) {
    fn from(p: LatLon) -> Self {
        (p.lat_deg, p.lon_deg)
    }
}
