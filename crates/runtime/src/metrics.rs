use std::collections::BTreeMap;

/// Deterministic metrics aggregation for a rendering session.
///
/// Keys are static so recording stays allocation-free on the frame path.
/// Sorted maps keep snapshots stable across runs.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Metrics {
    counters: BTreeMap<&'static str, u64>,
    gauges: BTreeMap<&'static str, f64>,
    histograms: BTreeMap<&'static str, Histogram>,
}

/// Running summary of per-frame samples.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Histogram {
    pub count: u64,
    pub sum: u64,
    pub min: u64,
    pub max: u64,
}

impl Histogram {
    pub fn record(&mut self, value: u64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum = self.sum.saturating_add(value);
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub counters: Vec<(&'static str, u64)>,
    pub gauges: Vec<(&'static str, f64)>,
    pub histograms: Vec<(&'static str, Histogram)>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.counters.clear();
        self.gauges.clear();
        self.histograms.clear();
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn inc_counter(&mut self, name: &'static str, by: u64) {
        *self.counters.entry(name).or_insert(0) += by;
    }

    pub fn gauge(&self, name: &str) -> Option<f64> {
        self.gauges.get(name).copied()
    }

    pub fn set_gauge(&mut self, name: &'static str, value: f64) {
        self.gauges.insert(name, value);
    }

    pub fn record(&mut self, name: &'static str, value: u64) {
        self.histograms.entry(name).or_default().record(value);
    }

    pub fn histogram(&self, name: &str) -> Option<Histogram> {
        self.histograms.get(name).copied()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self.counters.iter().map(|(k, v)| (*k, *v)).collect(),
            gauges: self.gauges.iter().map(|(k, v)| (*k, *v)).collect(),
            histograms: self.histograms.iter().map(|(k, v)| (*k, *v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Histogram, Metrics};

    #[test]
    fn counters_accumulate() {
        let mut m = Metrics::new();
        m.inc_counter("overlay.arcs", 2);
        m.inc_counter("overlay.arcs", 3);
        assert_eq!(m.counter("overlay.arcs"), 5);
        assert_eq!(m.counter("overlay.glows"), 0);
    }

    #[test]
    fn gauges_keep_latest_value() {
        let mut m = Metrics::new();
        assert_eq!(m.gauge("rotation.phi"), None);
        m.set_gauge("rotation.phi", 0.5);
        m.set_gauge("rotation.phi", 0.75);
        assert_eq!(m.gauge("rotation.phi"), Some(0.75));
    }

    #[test]
    fn histogram_tracks_frame_samples() {
        let mut h = Histogram::default();
        assert_eq!(h.mean(), 0.0);
        h.record(4);
        h.record(1);
        h.record(7);
        assert_eq!((h.count, h.sum, h.min, h.max), (3, 12, 1, 7));
        assert_eq!(h.mean(), 4.0);
    }

    #[test]
    fn snapshot_is_sorted_by_key() {
        let mut m = Metrics::new();
        m.inc_counter("frames", 1);
        m.inc_counter("overlay.arcs", 1);
        m.inc_counter("clicks", 1);
        m.record("overlay.commands", 3);

        let snap = m.snapshot();
        let keys: Vec<_> = snap.counters.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["clicks", "frames", "overlay.arcs"]);
        assert_eq!(snap.histograms.len(), 1);
    }
}
