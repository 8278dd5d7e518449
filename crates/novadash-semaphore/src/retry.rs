//! Retry policy for Semaphore requests

use std::time::Duration;

use tracing::warn;

use crate::{
    SemaphoreError,
    SemaphoreResult,
};

pub const DEFAULT_MAX_RETRIES: usize = 2;

pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Retry policy configuration
///
/// A budget of `max_retries` allows at most `max_retries + 1` attempts. The
/// wait before attempt `k + 1` is `base_delay * 2^k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt
    pub max_retries: usize,
    /// Delay after the first failed attempt
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: usize, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay to wait after the failed attempt numbered `attempt` (from 0)
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let factor = 1u32.checked_shl(attempt as u32).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Executes an operation, retrying server and transport failures
    ///
    /// Each call runs its own loop; nothing is shared between calls.
    pub async fn retry<F, Fut, T>(&self, operation: F) -> SemaphoreResult<T>
    where
        F: Fn(usize) -> Fut,
        Fut: std::future::Future<Output = SemaphoreResult<T>>,
    {
        let mut attempt = 0;

        loop {
            match operation(attempt).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retriable() && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = self.max_retries + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Semaphore request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.with_attempts(attempt + 1)),
            }
        }
    }
}
