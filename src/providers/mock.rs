/*!
 * Mock provider implementations for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds with a tagged translation
 * - `MockProvider::failing(kind)` - Always fails with the given error kind
 * - `MockProvider::fail_first(times, kind)` - Fails a number of times, then succeeds
 * - `MockProvider::slow(delay_ms)` - Succeeds after a delay
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{ErrorKind, ProviderError};
use crate::providers::Provider;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Always fails with the given kind
    Failing(ErrorKind),
    /// Fails `times` times with `kind`, then succeeds
    FailFirst { times: usize, kind: ErrorKind },
    /// Succeeds after a fixed delay
    Slow { delay_ms: u64 },
}

/// Build a provider error of the requested kind
pub fn error_of_kind(kind: ErrorKind) -> ProviderError {
    match kind {
        ErrorKind::Auth => ProviderError::AuthenticationError("mock: invalid key".to_string()),
        ErrorKind::QuotaExceeded => ProviderError::QuotaExceeded("mock: quota exhausted".to_string()),
        ErrorKind::RateLimited => ProviderError::RateLimitExceeded("mock: slow down".to_string()),
        ErrorKind::Server => ProviderError::ApiError { status_code: 503, message: "mock: unavailable".to_string() },
        ErrorKind::Timeout => ProviderError::Timeout("mock: timed out".to_string()),
        ErrorKind::Network => ProviderError::ConnectionError("mock: connection refused".to_string()),
        ErrorKind::Unknown => ProviderError::RequestFailed("mock: unknown failure".to_string()),
    }
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Provider name used in tagged output
    name: String,
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of translate calls made so far
    request_count: Arc<AtomicUsize>,
    /// Texts received, in call order
    received: Arc<Mutex<Vec<String>>>,
    /// Fixed translations looked up before the generic response
    translations: HashMap<String, String>,
    /// Per-text delay, used to force out-of-order completion
    delay_fn: Option<fn(&str) -> u64>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(name: impl Into<String>, behavior: MockBehavior) -> Self {
        Self {
            name: name.into(),
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            received: Arc::new(Mutex::new(Vec::new())),
            translations: HashMap::new(),
            delay_fn: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new("mock", MockBehavior::Working)
    }

    /// Create a failing mock provider that always errors
    pub fn failing(kind: ErrorKind) -> Self {
        Self::new("mock", MockBehavior::Failing(kind))
    }

    /// Create a provider that fails `times` times before succeeding
    pub fn fail_first(times: usize, kind: ErrorKind) -> Self {
        Self::new("mock", MockBehavior::FailFirst { times, kind })
    }

    /// Create a provider that answers after `delay_ms`
    pub fn slow(delay_ms: u64) -> Self {
        Self::new("mock", MockBehavior::Slow { delay_ms })
    }

    /// Set the name used to tag generic translations
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add a fixed translation
    pub fn with_translation(mut self, source: impl Into<String>, translation: impl Into<String>) -> Self {
        self.translations.insert(source.into(), translation.into());
        self
    }

    /// Delay each call by an amount derived from the text
    pub fn with_delay_fn(mut self, delay_fn: fn(&str) -> u64) -> Self {
        self.delay_fn = Some(delay_fn);
        self
    }

    /// Number of translate calls made so far
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Shared handle on the call counter, usable after the provider is boxed
    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.request_count.clone()
    }

    /// Texts received so far
    pub fn received(&self) -> Vec<String> {
        self.received.lock().clone()
    }

    fn respond(&self, text: &str, target_language: &str) -> String {
        self.translations.get(text)
            .cloned()
            .unwrap_or_else(|| format!("[{}:{}] {}", self.name, target_language, text))
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn translate(&self, text: &str, _source_language: Option<&str>, target_language: &str) -> Result<String, ProviderError> {
        let call = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.received.lock().push(text.to_string());

        if let Some(delay_fn) = self.delay_fn {
            tokio::time::sleep(Duration::from_millis(delay_fn(text))).await;
        }

        match self.behavior {
            MockBehavior::Working => Ok(self.respond(text, target_language)),
            MockBehavior::Failing(kind) => Err(error_of_kind(kind)),
            MockBehavior::FailFirst { times, kind } => {
                if call < times {
                    Err(error_of_kind(kind))
                } else {
                    Ok(self.respond(text, target_language))
                }
            }
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(self.respond(text, target_language))
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing(kind) => Err(error_of_kind(kind)),
            _ => Ok(()),
        }
    }
}
