/*!
 * Common test utilities for the subtrans test suite
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use anyhow::Result;
use tempfile::TempDir;

use subtrans::app_config::{Config, TranslationProvider};
use subtrans::credentials::Credentials;
use subtrans::providers::mock::MockProvider;
use subtrans::providers::registry::ProviderRegistry;
use subtrans::translation::cache::TranslationCache;
use subtrans::translation::concurrency::SystemResources;
use subtrans::translation::retry::RetryPolicy;
use subtrans::translation::throttle::RequestThrottle;
use subtrans::translation::{FallbackRouter, TranslationService};

/// Route library logs to the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Sample document with two dialogue cues and a music cue
pub const SAMPLE_SRT: &str = "1\n00:00:01,000 --> 00:00:02,000\nHello\n\n2\n00:00:03,000 --> 00:00:04,000\n♪ la la ♪\n\n3\n00:00:05,000 --> 00:00:06,000\nGoodbye\n";

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, SAMPLE_SRT)
}

/// Build a document with `count` numbered cues
pub fn numbered_document(count: usize) -> String {
    (1..=count)
        .map(|i| format!("{}\n00:00:{:02},000 --> 00:00:{:02},500\nLine {}\n", i, i % 60, i % 60, i))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Configuration with every delay shortened for tests
pub fn fast_config() -> Config {
    let mut config = Config::default();
    let common = &mut config.translation.common;
    common.min_request_interval_ms = 0;
    common.retry_backoff_ms = 1;
    common.unit_retry_delay_ms = 1;
    common.inter_group_delay_ms = 0;
    config
}

/// Host profile that allows the widest concurrency window
pub fn large_host() -> SystemResources {
    SystemResources { total_memory_gb: 32, cpu_cores: 16 }
}

/// Registry with a single working MyMemory mock
pub fn mymemory_registry(mock: Arc<MockProvider>) -> ProviderRegistry {
    ProviderRegistry::new().with(TranslationProvider::MyMemory, mock)
}

/// Service backed by mock providers with fast timings
pub fn service_with(registry: ProviderRegistry, credentials: Credentials) -> TranslationService {
    TranslationService::with_registry(fast_config(), credentials, registry).with_resources(large_host())
}

/// Router with no throttle and millisecond backoff
pub fn router_with(registry: ProviderRegistry, credentials: Credentials) -> FallbackRouter {
    FallbackRouter::new(
        registry,
        credentials,
        TranslationCache::default(),
        RequestThrottle::new(Duration::ZERO),
        RetryPolicy::new(3, Duration::from_millis(1)),
    )
}

/// Credentials for both keyed providers
pub fn all_credentials() -> Credentials {
    Credentials::new()
        .with(TranslationProvider::DeepL, "deepl-test-key:fx")
        .with(TranslationProvider::OpenAI, "sk-test")
}
