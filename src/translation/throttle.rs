/*!
 * Global request spacing.
 *
 * Every backend call first waits until at least `min_interval` has passed
 * since the previous call, regardless of which provider served it.
 */

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Default minimum spacing between provider requests
pub const DEFAULT_MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(100);

/// Minimum-interval throttle shared by all provider calls
#[derive(Debug, Clone)]
pub struct RequestThrottle {
    min_interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl RequestThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait for this caller's slot and claim it
    ///
    /// The lock is held across the sleep so concurrent callers are spaced out
    /// one after another instead of all waking at the same instant.
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let next_allowed = previous + self.min_interval;
            let now = Instant::now();
            if next_allowed > now {
                tokio::time::sleep_until(next_allowed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

impl Default for RequestThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_REQUEST_INTERVAL)
    }
}
