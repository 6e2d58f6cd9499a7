use foundation::math::LatLon;
use globe::HeatmapPoint;

/// Intensities below this are dropped on decay.
const FLOOR: f64 = 1e-3;

/// Owner-side heat accumulator: data events add intensity at a location and
/// every step fades all points, so bursts glow briefly and then disappear.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatField {
    decay: f64,
    points: Vec<(LatLon, f64)>,
}

impl HeatField {
    /// `decay` is the per-step multiplier, in `[0, 1]`.
    pub fn new(decay: f64) -> Self {
        Self {
            decay: decay.clamp(0.0, 1.0),
            points: Vec::new(),
        }
    }

    /// Add `amount` at `location`, saturating at 1.
    pub fn record(&mut self, location: LatLon, amount: f64) {
        if !(amount.is_finite() && amount > 0.0) {
            return;
        }
        match self.points.iter_mut().find(|(at, _)| *at == location) {
            Some((_, value)) => *value = (*value + amount).min(1.0),
            None => self.points.push((location, amount.min(1.0))),
        }
    }

    pub fn step(&mut self) {
        let decay = self.decay;
        self.points.retain_mut(|(_, value)| {
            *value *= decay;
            *value >= FLOOR
        });
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> Vec<HeatmapPoint> {
        self.points
            .iter()
            .map(|(at, value)| HeatmapPoint::new(at.lat_deg, at.lon_deg, *value))
            .collect()
    }
}
