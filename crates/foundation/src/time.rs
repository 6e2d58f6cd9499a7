/// Time primitives
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64); // seconds

impl Time {
    pub const ZERO: Self = Time(0.0);

    pub fn seconds(self) -> f64 {
        self.0
    }

    pub fn millis(self) -> f64 {
        self.0 * 1000.0
    }

    pub fn after(self, seconds: f64) -> Self {
        Time(self.0 + seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::Time;

    #[test]
    fn converts_to_millis() {
        assert_eq!(Time(1.5).millis(), 1500.0);
        assert_eq!(Time(1.5).after(0.25), Time(1.75));
    }

    #[test]
    fn orders_by_seconds() {
        assert!(Time(0.1) < Time(0.2));
    }
}
