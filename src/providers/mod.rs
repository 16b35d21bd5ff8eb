/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the supported backends:
 * - MyMemory: free translation memory service, no key required
 * - DeepL: metered machine translation API
 * - OpenAI: chat-completion model prompted to translate
 * - Mock: deterministic provider for tests
 */

use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Account usage reported by metered providers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageInfo {
    /// Characters used in the current period
    pub character_count: u64,
    /// Character allowance for the current period
    pub character_limit: u64,
}

/// Common trait for all translation providers
///
/// Implementations classify every failure into a `ProviderError` so callers
/// can decide whether to retry or fall back without provider-specific logic.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Translate `text` into `target_language`
    ///
    /// # Arguments
    /// * `text` - Source text, possibly spanning several lines
    /// * `source_language` - Source language hint, `None` or "auto" to detect
    /// * `target_language` - Target language code
    async fn translate(
        &self,
        text: &str,
        source_language: Option<&str>,
        target_language: &str,
    ) -> Result<String, ProviderError>;

    /// Test the connection and the credential
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Usage statistics, if the provider reports any
    async fn usage(&self) -> Result<Option<UsageInfo>, ProviderError> {
        Ok(None)
    }
}

/// Strip one layer of quotes that chat models and some APIs wrap results in
pub fn strip_wrapping_quotes(text: &str) -> String {
    let trimmed = text.trim();
    let pairs = [('"', '"'), ('\'', '\''), ('“', '”'), ('「', '」')];
    for (open, close) in pairs {
        if let Some(inner) = trimmed.strip_prefix(open).and_then(|t| t.strip_suffix(close)) {
            return inner.trim().to_string();
        }
    }
    trimmed.to_string()
}

pub mod mymemory;
pub mod deepl;
pub mod openai;
pub mod mock;
pub mod registry;
