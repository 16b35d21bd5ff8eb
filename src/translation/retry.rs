/*!
 * Retry with exponential backoff.
 *
 * Transient provider failures are retried with a delay of
 * `base_delay * 2^attempt` before every attempt but the first. Permanent
 * failures (bad credentials, exhausted quota) abort immediately so a broken
 * key never triggers a retry storm.
 */

use std::future::Future;
use std::time::Duration;
use log::{debug, warn};

use crate::errors::ProviderError;

/// How often and how patiently a call is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,

    /// Base delay, doubled for every further attempt
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Single attempt, no waiting
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Delay awaited before the given zero-based attempt
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.base_delay.saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}

/// Run `operation` until it succeeds, fails permanently, or runs out of attempts
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut operation: F) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0;
    loop {
        let delay = policy.delay_for_attempt(attempt);
        if !delay.is_zero() {
            debug!("{}: waiting {:?} before attempt {}/{}", label, delay, attempt + 1, policy.max_attempts);
            tokio::time::sleep(delay).await;
        }

        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                let kind = e.kind();
                warn!("{}: attempt {}/{} failed ({}): {}", label, attempt + 1, policy.max_attempts, kind, e);

                if kind.is_permanent() {
                    return Err(e);
                }
                attempt += 1;
                if attempt >= policy.max_attempts {
                    return Err(e);
                }
            }
        }
    }
}
