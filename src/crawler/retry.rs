//! Bounded retry with exponential backoff
//!
//! Failures classified as transient by [`FetchError::is_transient`] are
//! retried after an exponentially growing delay; everything else is
//! returned at once.

use crate::config::HttpConfig;
use crate::FetchError;
use std::future::Future;
use std::time::Duration;

/// Attempt ceiling and backoff schedule for one fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base: Duration,
    /// Upper bound for any single delay
    pub cap: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base: Duration::from_millis(config.backoff_base_ms),
            cap: Duration::from_millis(config.backoff_max_ms),
        }
    }

    /// Delay to sleep after the given failed attempt (0-based)
    ///
    /// `base * 2^attempt`, capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.min(31)).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.cap)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&HttpConfig::default())
    }
}

/// Executes `operation` until it succeeds, fails permanently, or runs out of attempts
///
/// # Backoff schedule (base 1s, cap 10s)
///
/// | Failed attempt | Sleep before next attempt |
/// |----------------|---------------------------|
/// | 1 | 1s |
/// | 2 | 2s |
/// | 3 | 4s |
/// | 5+ | 10s |
///
/// The last error is returned once the ceiling is reached.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        attempt += 1;
        if !err.is_transient() || attempt >= policy.max_attempts {
            return Err(err);
        }

        let delay = policy.delay_for(attempt - 1);
        tracing::warn!(
            attempt,
            max_attempts = policy.max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "transient fetch error, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
    }
}
