//! Retry delay policy of the poller
//!
//! The delay doubles on every consecutive failure. Once it has reached the
//! ceiling, the next failure starts over from the base delay instead of
//! holding at the ceiling. Any success resets it to the base delay.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    ceiling: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(base: Duration, ceiling: Duration) -> Self {
        Self { base, ceiling, current: base }
    }

    pub fn current(&self) -> Duration {
        self.current
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    /// Records a failure and returns the delay before the next retry.
    pub fn on_failure(&mut self) -> Duration {
        self.current = if self.current >= self.ceiling {
            self.base
        } else {
            self.current * 2
        };
        self.current
    }

    pub fn reset(&mut self) {
        self.current = self.base;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(2000), Duration::from_millis(128_000))
    }
}
