/*!
 * Tests for configuration loading and validation
 */

use anyhow::Result;
use subtrans::app_config::{Config, LogLevel, ProviderConfig, TranslationProvider};
use crate::common;

#[test]
fn test_default_config_shouldHaveExpectedValues() {
    let config = Config::default();
    let common = &config.translation.common;

    assert_eq!(config.source_language, "auto");
    assert_eq!(config.target_language, "ko");
    assert_eq!(config.translation.provider, TranslationProvider::MyMemory);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(common.enable_cache);
    assert_eq!(common.cache_capacity, 1000);
    assert!(common.batch_translation);
    assert_eq!(common.max_concurrent_batches, None);
    assert_eq!(common.min_request_interval_ms, 100);
    assert_eq!(common.retry_count, 3);
    assert_eq!(common.retry_backoff_ms, 1000);
    assert_eq!(config.translation.available_providers.len(), 3);
}

#[test]
fn test_default_config_shouldValidate() {
    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_validate_withUnknownTargetLanguage_shouldFail() {
    let mut config = Config::default();
    config.target_language = "xx".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withRegionalTarget_shouldPass() {
    let mut config = Config::default();
    config.target_language = "pt-BR".to_string();
    config.source_language = "en".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withZeroCapacityOrRetries_shouldFail() {
    let mut config = Config::default();
    config.translation.common.cache_capacity = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.common.retry_count = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.common.max_concurrent_batches = Some(0);
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withTemperatureOutOfRange_shouldFail() {
    let mut config = Config::default();
    config.translation.common.temperature = 1.5;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withBadEndpoint_shouldFail() {
    let mut config = Config::default();
    let mut provider = ProviderConfig::new(TranslationProvider::DeepL);
    provider.endpoint = "not a url".to_string();
    config.translation.available_providers = vec![provider];
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withUnknownProviderType_shouldFail() {
    let mut config = Config::default();
    let mut provider = ProviderConfig::new(TranslationProvider::DeepL);
    provider.provider_type = "babelfish".to_string();
    config.translation.available_providers = vec![provider];
    assert!(config.validate().is_err());
}

#[test]
fn test_provider_from_str_shouldAcceptChatgptAlias() {
    assert_eq!("ChatGPT".parse::<TranslationProvider>().unwrap(), TranslationProvider::OpenAI);
    assert_eq!(" deepl ".parse::<TranslationProvider>().unwrap(), TranslationProvider::DeepL);
    assert!("google".parse::<TranslationProvider>().is_err());
}

#[test]
fn test_deserialize_withChatgptProvider_shouldMapToOpenAI() {
    let config: Config = serde_json::from_str(r#"{"translation":{"provider":"chatgpt"}}"#).unwrap();
    assert_eq!(config.translation.provider, TranslationProvider::OpenAI);
}

#[test]
fn test_deserialize_withPartialJson_shouldFillDefaults() {
    let config: Config = serde_json::from_str(r#"{"target_language":"ja","log_level":"debug"}"#).unwrap();
    assert_eq!(config.target_language, "ja");
    assert_eq!(config.source_language, "auto");
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.translation.common.cache_capacity, 1000);
}

#[test]
fn test_resolved_provider_config_shouldFillEmptyFields() {
    let config: Config = serde_json::from_str(
        r#"{"translation":{"available_providers":[{"type":"openai","model":"","timeout_secs":5,"batch_size":2}]}}"#,
    ).unwrap();

    let openai = config.translation.resolved_provider_config(TranslationProvider::OpenAI);
    assert_eq!(openai.model, "gpt-4o-mini");
    assert_eq!(openai.endpoint, "https://api.openai.com/v1");
    assert_eq!(openai.timeout_secs, 5);
    assert_eq!(openai.batch_size, Some(2));

    let mymemory = config.translation.resolved_provider_config(TranslationProvider::MyMemory);
    assert_eq!(mymemory.endpoint, "https://api.mymemory.translated.net");
}

#[test]
fn test_log_level_to_level_filter_shouldMap() {
    assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}

#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefault() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;
    assert!(path.exists());
    assert_eq!(config.target_language, "ko");

    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded.translation.provider, config.translation.provider);
    Ok(())
}

#[test]
fn test_load_or_create_withExistingFile_shouldReadIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{"target_language":"fr","translation":{"provider":"deepl","common":{"retry_count":5}}}"#,
    )?;

    let config = Config::load_or_create(&path)?;
    assert_eq!(config.target_language, "fr");
    assert_eq!(config.translation.provider, TranslationProvider::DeepL);
    assert_eq!(config.translation.common.retry_count, 5);
    assert!(config.translation.common.enable_cache);
    Ok(())
}

#[test]
fn test_load_or_create_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;
    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}

#[test]
fn test_validate_withZeroTimeout_shouldFail() {
    let mut config = Config::default();
    let mut provider = ProviderConfig::new(TranslationProvider::OpenAI);
    provider.timeout_secs = 0;
    config.translation.available_providers = vec![provider];

    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("timeout_secs"));
}

#[test]
fn test_load_or_create_withMissingDirectory_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("settings").join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    assert_eq!(config.target_language, Config::default().target_language);
    Ok(())
}
