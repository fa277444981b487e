use std::time::Duration;
use log::debug;

/// Running duration statistics for a repeated operation.
pub struct TimingStats {
    pub name: String,
    pub total_time: Duration,
    pub max_time: Duration,
    pub count: u32,
}

impl TimingStats {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            total_time: Duration::ZERO,
            max_time: Duration::ZERO,
            count: 0,
        }
    }

    pub fn add_measurement(&mut self, duration: Duration) {
        self.total_time += duration;
        self.max_time = self.max_time.max(duration);
        self.count += 1;

        debug!("{} - Current: {:.2}ms, Avg: {:.2}ms, Max: {:.2}ms, Count: {}",
            self.name,
            duration.as_secs_f64() * 1000.0,
            self.average_ms(),
            self.max_time.as_secs_f64() * 1000.0,
            self.count
        );
    }

    pub fn average_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.total_time.as_secs_f64() * 1000.0) / self.count as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_and_max() {
        let mut stats = TimingStats::new("test");
        assert_eq!(stats.average_ms(), 0.0);

        stats.add_measurement(Duration::from_millis(10));
        stats.add_measurement(Duration::from_millis(30));
        assert_eq!(stats.count, 2);
        assert!((stats.average_ms() - 20.0).abs() < 1e-9);
        assert_eq!(stats.max_time, Duration::from_millis(30));
    }
}
