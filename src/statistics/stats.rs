use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunStats {
    kernel_calls: usize,
    elements: usize,
    elapsed_nanos: u128,
    max_abs_error: f64,
}

impl RunStats {
    pub fn new() -> Self {
        RunStats {
            kernel_calls: 0,
            elements: 0,
            elapsed_nanos: 0,
            max_abs_error: 0.0,
        }
    }

    /// Record one kernel invocation over `len` elements that took `elapsed`
    pub fn bump_call(&mut self, len: usize, elapsed: Duration) {
        self.kernel_calls += 1;
        self.elements += len;
        self.elapsed_nanos += elapsed.as_nanos();
    }

    /// Record the deviation of a result from its scalar reference. Only the
    /// worst one is kept. NaN deviations are kept as NaN.
    pub fn observe_error(&mut self, abs_error: f64) {
        if abs_error.is_nan() || abs_error > self.max_abs_error {
            self.max_abs_error = abs_error;
        }
    }

    pub fn get_kernel_calls(&self) -> usize {
        self.kernel_calls
    }

    pub fn get_elements(&self) -> usize {
        self.elements
    }

    pub fn get_elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos.min(u64::MAX as u128) as u64)
    }

    pub fn get_max_abs_error(&self) -> f64 {
        self.max_abs_error
    }

    /// Elements processed per second, 0 when no time was recorded.
    pub fn throughput(&self) -> f64 {
        if self.elapsed_nanos == 0 {
            0.0
        } else {
            self.elements as f64 / (self.elapsed_nanos as f64 * 1e-9)
        }
    }

    pub fn merge(&self, other: &RunStats) -> RunStats {
        let mut merged = RunStats {
            kernel_calls: self.kernel_calls + other.kernel_calls,
            elements: self.elements + other.elements,
            elapsed_nanos: self.elapsed_nanos + other.elapsed_nanos,
            max_abs_error: self.max_abs_error,
        };
        merged.observe_error(other.max_abs_error);
        merged
    }
}

impl Default for RunStats {
    fn default() -> Self {
        RunStats::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stats_initialized_to_zero() {
        let stats = RunStats::new();
        assert_eq!(stats.get_kernel_calls(), 0);
        assert_eq!(stats.get_elements(), 0);
        assert_eq!(stats.get_elapsed(), Duration::ZERO);
        assert_eq!(stats.get_max_abs_error(), 0.0);
    }

    #[test]
    fn test_default_matches_new() {
        assert_eq!(RunStats::default(), RunStats::new());
    }

    #[test]
    fn test_bump_call_accumulates() {
        let mut stats = RunStats::new();
        stats.bump_call(100, Duration::from_micros(3));
        stats.bump_call(50, Duration::from_micros(2));
        assert_eq!(stats.get_kernel_calls(), 2);
        assert_eq!(stats.get_elements(), 150);
        assert_eq!(stats.get_elapsed(), Duration::from_micros(5));
    }

    #[test]
    fn test_observe_error_keeps_worst() {
        let mut stats = RunStats::new();
        stats.observe_error(1e-6);
        stats.observe_error(1e-3);
        stats.observe_error(1e-9);
        assert_eq!(stats.get_max_abs_error(), 1e-3);
    }

    #[test]
    fn test_observe_error_keeps_nan() {
        let mut stats = RunStats::new();
        stats.observe_error(f64::NAN);
        stats.observe_error(1.0);
        assert!(stats.get_max_abs_error().is_nan());
    }

    #[test]
    fn test_throughput() {
        let mut stats = RunStats::new();
        assert_eq!(stats.throughput(), 0.0);
        stats.bump_call(1_000, Duration::from_millis(1));
        assert!((stats.throughput() - 1_000_000.0).abs() < 1e-3);
    }

    #[test]
    fn test_merge() {
        let mut left = RunStats::new();
        left.bump_call(10, Duration::from_nanos(40));
        left.observe_error(0.5);
        let mut right = RunStats::new();
        right.bump_call(20, Duration::from_nanos(60));
        right.bump_call(20, Duration::from_nanos(60));
        right.observe_error(0.25);

        let merged = left.merge(&right);
        assert_eq!(merged.get_kernel_calls(), 3);
        assert_eq!(merged.get_elements(), 50);
        assert_eq!(merged.get_elapsed(), Duration::from_nanos(160));
        assert_eq!(merged.get_max_abs_error(), 0.5);
    }

    #[test]
    fn test_serializes_to_json() {
        let mut stats = RunStats::new();
        stats.bump_call(8, Duration::from_nanos(16));
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["kernel_calls"], 1);
        assert_eq!(json["elements"], 8);
        assert_eq!(json["elapsed_nanos"], 16);
    }
}
