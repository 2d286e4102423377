//! Exponential backoff with jitter

use rand::Rng;
use std::time::Duration;

/// Delay generator for repeated polling.
///
/// Every [`count`](BackoffCounter::count) doubles the delay up to `max` and
/// adds a jitter of up to a sixteenth of the previous delay, centered on
/// zero. [`reset`](BackoffCounter::reset) goes back to `min`.
#[derive(Debug, Clone)]
pub struct BackoffCounter {
    min: Duration,
    max: Duration,
    value: Duration,
}

impl BackoffCounter {
    /// Create a counter; `min` is at least one millisecond and `max` at least `min`
    pub fn new(min: Duration, max: Duration) -> Self {
        let min = min.max(Duration::from_millis(1));
        let max = max.max(min);
        Self {
            min,
            max,
            value: min,
        }
    }

    /// Advance the counter and return the next delay
    pub fn count(&mut self) -> Duration {
        let max_jitter = self.value.as_secs_f64() / 16.0;
        self.value = (self.value * 2).min(self.max);

        let jitter = if max_jitter > 0.0 {
            rand::thread_rng().gen_range(0.0..max_jitter) - max_jitter / 2.0
        } else {
            0.0
        };
        let secs = (self.value.as_secs_f64() + jitter)
            .clamp(self.min.as_secs_f64(), self.max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    /// Go back to the minimum delay and return it
    pub fn reset(&mut self) -> Duration {
        self.value = self.min;
        self.min
    }

    /// Delay without jitter
    pub fn current(&self) -> Duration {
        self.value
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }
}

impl Default for BackoffCounter {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(16))
    }
}
