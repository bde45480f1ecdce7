use crate::config::RateLimitConfig;
use rand::Rng;
use std::time::Duration;

/// Randomized pause applied before every request and between batch items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    min: Duration,
    max: Duration,
}

impl Throttle {
    /// Creates a throttle drawing delays from `[min, max]`
    ///
    /// Bounds given in the wrong order are swapped.
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            Duration::from_millis(config.min_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }

    /// Draws the next delay uniformly from the configured interval
    pub fn next_delay(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        let ms = rand::thread_rng().gen_range(min..=max);
        Duration::from_millis(ms)
    }

    /// Sleeps for a freshly drawn delay
    pub async fn pause(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tracing::trace!("Rate limit pause {:?}", delay);
            tokio::time::sleep(delay).await;
        }
    }
}
