//! Validator-map demo scenes.

use foundation::math::LatLon;
use globe::{Connection, HeatmapPoint, Marker, Scene};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DataCenter {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

impl DataCenter {
    const fn new(name: &'static str, lat: f64, lon: f64) -> Self {
        Self { name, lat, lon }
    }

    pub fn location(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }
}

pub const DATA_CENTERS: [DataCenter; 24] = [
    DataCenter::new("US-East (N. Virginia)", 39.0438, -77.4874),
    DataCenter::new("US-East (New York)", 40.7128, -74.0060),
    DataCenter::new("US-West (California)", 37.3382, -121.8863),
    DataCenter::new("US-West (Oregon)", 45.5152, -122.6784),
    DataCenter::new("US-Central (Texas)", 30.2672, -97.7431),
    DataCenter::new("Canada (Toronto)", 43.6532, -79.3832),
    DataCenter::new("Canada (Montreal)", 45.5017, -73.5673),
    DataCenter::new("EU-Central (Frankfurt)", 50.1109, 8.6821),
    DataCenter::new("EU-West (London)", 51.5074, -0.1278),
    DataCenter::new("EU-West (Paris)", 48.8566, 2.3522),
    DataCenter::new("EU-North (Stockholm)", 59.3293, 18.0686),
    DataCenter::new("EU-West (Ireland)", 53.3498, -6.2603),
    DataCenter::new("EU-South (Milan)", 45.4642, 9.1900),
    DataCenter::new("Asia-East (Tokyo)", 35.6762, 139.6503),
    DataCenter::new("Asia-East (Seoul)", 37.5665, 126.9780),
    DataCenter::new("Asia-East (Hong Kong)", 22.3193, 114.1694),
    DataCenter::new("Asia-South (Singapore)", 1.3521, 103.8198),
    DataCenter::new("Asia-South (Mumbai)", 19.0760, 72.8777),
    DataCenter::new("AU-East (Sydney)", -33.8688, 151.2093),
    DataCenter::new("AU-South (Melbourne)", -37.8136, 144.9631),
    DataCenter::new("SA-East (Sao Paulo)", -23.5505, -46.6333),
    DataCenter::new("SA-West (Santiago)", -33.4489, -70.6693),
    DataCenter::new("ME-Central (Dubai)", 25.2048, 55.2708),
    DataCenter::new("AF-South (Cape Town)", -33.9249, 18.4241),
];

const BASE_SIZE: f64 = 0.03;
const SHARE_SIZE: f64 = 0.15;

/// Validators per data center for `count` nodes placed with `seed`.
pub fn assign_validators(count: u64, seed: u64) -> [u64; DATA_CENTERS.len()] {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut counts = [0u64; DATA_CENTERS.len()];
    for _ in 0..count {
        counts[rng.gen_range(0..DATA_CENTERS.len())] += 1;
    }
    counts
}

/// Aggregate `count` validators into a scene.
///
/// Empty data centers get no marker. A data center holding more than 1/20 of
/// all validators is a hub: its marker pulses and consecutive hubs are linked.
pub fn generate_scene(count: u64, seed: u64) -> Scene {
    let counts = assign_validators(count, seed);
    let mut scene = Scene::default();
    if count == 0 {
        return scene;
    }
    let total = count as f64;
    let max = counts.iter().copied().max().unwrap_or(0).max(1) as f64;

    let mut hubs = Vec::new();
    for (dc, &n) in DATA_CENTERS.iter().zip(counts.iter()) {
        if n == 0 {
            continue;
        }
        let share = n as f64 / total;
        let is_hub = n > count / 20;
        scene.markers.push(
            Marker::new(dc.location(), BASE_SIZE + share * SHARE_SIZE)
                .with_tooltip(format!("{} ({} nodes)", dc.name, n))
                .pulsing(is_hub),
        );
        scene
            .heatmap_points
            .push(HeatmapPoint::new(dc.lat, dc.lon, n as f64 / max));
        if is_hub {
            hubs.push(dc.location());
        }
    }
    scene.connections = hubs
        .windows(2)
        .map(|pair| Connection::new(pair[0], pair[1]))
        .collect();
    scene
}
