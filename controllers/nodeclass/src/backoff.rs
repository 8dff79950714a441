//! # Fibonacci Backoff
//!
//! Requeue delays for node classes whose image resolution keeps failing.
//! Delays grow along the Fibonacci sequence (min, min, 2·min, 3·min, 5·min, ...)
//! and are capped at a maximum. A success resets the sequence.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Fibonacci backoff sequence
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    min: Duration,
    max: Duration,
    prev: Duration,
    current: Duration,
}

impl FibonacciBackoff {
    /// Sequence starting at `min`, never exceeding `max`
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max,
            prev: Duration::ZERO,
            current: min.min(max),
        }
    }

    /// The next delay, advancing the sequence
    pub fn next_backoff(&mut self) -> Duration {
        let result = self.current;
        let next = self.prev.saturating_add(self.current);
        self.prev = self.current;
        self.current = next.min(self.max);
        result
    }

    /// Restart from `min`
    pub fn reset(&mut self) {
        self.prev = Duration::ZERO;
        self.current = self.min.min(self.max);
    }
}

/// One backoff sequence per failing object
#[derive(Debug)]
pub struct BackoffTracker {
    min: Duration,
    max: Duration,
    sequences: Mutex<HashMap<String, FibonacciBackoff>>,
}

impl BackoffTracker {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max,
            sequences: Mutex::new(HashMap::new()),
        }
    }

    /// Next delay for `name` after another failure
    pub fn failed(&self, name: &str) -> Duration {
        let mut sequences = self.sequences.lock().unwrap_or_else(PoisonError::into_inner);
        sequences
            .entry(name.to_string())
            .or_insert_with(|| FibonacciBackoff::new(self.min, self.max))
            .next_backoff()
    }

    /// Forget the failure history of `name`
    pub fn succeeded(&self, name: &str) {
        self.sequences
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn test_fibonacci_backoff_sequence() {
        let mut backoff = FibonacciBackoff::new(MINUTE, 10 * MINUTE);

        // 1m, 1m, 2m, 3m, 5m, 8m, then capped at 10m
        let delays: Vec<u64> = (0..8).map(|_| backoff.next_backoff().as_secs()).collect();
        assert_eq!(delays, vec![60, 60, 120, 180, 300, 480, 600, 600]);
    }

    #[test]
    fn test_fibonacci_backoff_reset() {
        let mut backoff = FibonacciBackoff::new(MINUTE, 10 * MINUTE);
        for _ in 0..4 {
            backoff.next_backoff();
        }

        backoff.reset();

        assert_eq!(backoff.next_backoff(), MINUTE);
        assert_eq!(backoff.next_backoff(), MINUTE);
        assert_eq!(backoff.next_backoff(), 2 * MINUTE);
    }

    #[test]
    fn test_tracker_is_per_object() {
        let tracker = BackoffTracker::new(MINUTE, 10 * MINUTE);
        assert_eq!(tracker.failed("a"), MINUTE);
        assert_eq!(tracker.failed("a"), MINUTE);
        assert_eq!(tracker.failed("a"), 2 * MINUTE);
        assert_eq!(tracker.failed("b"), MINUTE);

        tracker.succeeded("a");
        assert_eq!(tracker.failed("a"), MINUTE);
    }
}
