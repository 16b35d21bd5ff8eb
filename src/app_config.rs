use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::file_utils::FileManager;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language hint ("auto" lets the provider detect it)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: MyMemory (free, no key)
    #[default]
    MyMemory,
    // @provider: DeepL (metered)
    DeepL,
    // @provider: OpenAI chat completions
    #[serde(alias = "chatgpt")]
    OpenAI,
}

impl TranslationProvider {
    /// Providers in fallback order
    pub const FALLBACK_ORDER: [TranslationProvider; 3] = [Self::MyMemory, Self::DeepL, Self::OpenAI];

    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::MyMemory => "MyMemory",
            Self::DeepL => "DeepL",
            Self::OpenAI => "OpenAI",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::MyMemory => "mymemory".to_string(),
            Self::DeepL => "deepl".to_string(),
            Self::OpenAI => "openai".to_string(),
        }
    }

    /// Whether the provider needs an API key to be selectable
    pub fn requires_credential(&self) -> bool {
        !matches!(self, Self::MyMemory)
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mymemory" => Ok(Self::MyMemory),
            "deepl" => Ok(Self::DeepL),
            "openai" | "chatgpt" => Ok(Self::OpenAI),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name (chat providers only)
    #[serde(default = "String::new")]
    pub model: String,

    // @field: Service URL, empty means the provider default
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Units per batch, overrides the provider profile
    #[serde(default)]
    pub batch_size: Option<usize>,

    // @field: Concurrent batches, overrides the provider profile
    #[serde(default)]
    pub max_concurrent_batches: Option<usize>,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        let (model, endpoint) = match provider_type {
            TranslationProvider::MyMemory => (String::new(), default_mymemory_endpoint()),
            TranslationProvider::DeepL => (String::new(), String::new()),
            TranslationProvider::OpenAI => (default_openai_model(), default_openai_endpoint()),
        };

        Self {
            provider_type: provider_type.to_lowercase_string(),
            model,
            endpoint,
            timeout_secs: default_timeout_secs(),
            batch_size: None,
            max_concurrent_batches: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Preferred translation provider
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Whether translations are cached
    #[serde(default = "default_true")]
    pub enable_cache: bool,

    /// Maximum number of cached translations
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Whether units are grouped into concurrent batches
    #[serde(default = "default_true")]
    pub batch_translation: bool,

    /// Fixed concurrency window, detected from system resources when absent
    #[serde(default)]
    pub max_concurrent_batches: Option<usize>,

    /// Minimum spacing between any two provider requests
    #[serde(default = "default_min_request_interval_ms")]
    pub min_request_interval_ms: u64,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff base for retries (in milliseconds), doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Delay before a failed unit inside a batch is retried
    #[serde(default = "default_unit_retry_delay_ms")]
    pub unit_retry_delay_ms: u64,

    /// Pause between concurrency windows
    #[serde(default)]
    pub inter_group_delay_ms: u64,

    /// Temperature parameter for chat providers (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// How many identities the free provider may rotate through on quota errors
    #[serde(default = "default_identity_rotations")]
    pub identity_rotations: u32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            enable_cache: true,
            cache_capacity: default_cache_capacity(),
            batch_translation: true,
            max_concurrent_batches: None,
            min_request_interval_ms: default_min_request_interval_ms(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            unit_retry_delay_ms: default_unit_retry_delay_ms(),
            inter_group_delay_ms: 0,
            temperature: default_temperature(),
            identity_rotations: default_identity_rotations(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "auto".to_string()
}

fn default_target_language() -> String {
    "ko".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_cache_capacity() -> usize {
    1000
}

fn default_min_request_interval_ms() -> u64 {
    100
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_unit_retry_delay_ms() -> u64 {
    500
}

fn default_temperature() -> f32 {
    0.3
}

fn default_identity_rotations() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

fn default_mymemory_endpoint() -> String {
    "https://api.mymemory.translated.net".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Config {
    /// Load a configuration file, creating a default one when it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        log::warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        FileManager::write_to_file(path, &config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if !self.source_language.eq_ignore_ascii_case("auto") {
            crate::language_utils::get_language_name(&self.source_language)?;
        }
        crate::language_utils::get_language_name(&self.target_language)?;

        let common = &self.translation.common;
        if common.cache_capacity == 0 {
            return Err(anyhow!("cache_capacity must be greater than zero"));
        }
        if common.retry_count == 0 {
            return Err(anyhow!("retry_count must be at least 1"));
        }
        if common.max_concurrent_batches == Some(0) {
            return Err(anyhow!("max_concurrent_batches must be greater than zero"));
        }
        if !(0.0..=1.0).contains(&common.temperature) {
            return Err(anyhow!("temperature must be between 0.0 and 1.0"));
        }

        for provider in &self.translation.available_providers {
            provider.provider_type.parse::<TranslationProvider>()?;
            if !provider.endpoint.is_empty() {
                Url::parse(&provider.endpoint)
                    .with_context(|| format!("Invalid endpoint for {}: {}", provider.provider_type, provider.endpoint))?;
            }
            if provider.batch_size == Some(0) {
                return Err(anyhow!("batch_size for {} must be greater than zero", provider.provider_type));
            }
            if provider.timeout_secs == 0 {
                return Err(anyhow!("timeout_secs for {} must be greater than zero", provider.provider_type));
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: TranslationProvider) -> Option<&ProviderConfig> {
        self.available_providers.iter()
            .find(|p| p.provider_type.parse::<TranslationProvider>().ok() == Some(provider_type))
    }

    /// Provider configuration with defaults filled in for anything left empty
    pub fn resolved_provider_config(&self, provider_type: TranslationProvider) -> ProviderConfig {
        let defaults = ProviderConfig::new(provider_type);
        match self.get_provider_config(provider_type) {
            Some(config) => ProviderConfig {
                provider_type: defaults.provider_type,
                model: if config.model.is_empty() { defaults.model } else { config.model.clone() },
                endpoint: if config.endpoint.is_empty() { defaults.endpoint } else { config.endpoint.clone() },
                timeout_secs: config.timeout_secs,
                batch_size: config.batch_size,
                max_concurrent_batches: config.max_concurrent_batches,
            },
            None => defaults,
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: TranslationProvider::FALLBACK_ORDER
                .iter()
                .map(|p| ProviderConfig::new(*p))
                .collect(),
            common: TranslationCommonConfig::default(),
        }
    }
}
