/*!
 * Tests for provider clients that do not need a live service
 */

use std::sync::Arc;
use std::time::Duration;

use subtrans::app_config::{TranslationConfig, TranslationProvider};
use subtrans::credentials::Credentials;
use subtrans::errors::ErrorKind;
use subtrans::providers::deepl::{DeepL, DeepLRequest};
use subtrans::providers::mock::MockProvider;
use subtrans::providers::mymemory::{MyMemoryOutcome, MyMemoryResponse};
use subtrans::providers::openai::{max_tokens_for, translation_instruction, OpenAI, OpenAIRequest, OpenAIResponse};
use subtrans::providers::registry::ProviderRegistry;
use subtrans::providers::{strip_wrapping_quotes, Provider};

fn mymemory_body(json: &str) -> MyMemoryResponse {
    serde_json::from_str(json).unwrap()
}

#[test]
fn test_mymemory_interpret_withQuotaFinished_shouldSignalQuota() {
    let body = mymemory_body(r#"{"responseData":{"translatedText":"x"},"responseStatus":200,"quotaFinished":true}"#);
    assert_eq!(body.interpret().unwrap(), MyMemoryOutcome::QuotaExhausted);
}

#[test]
fn test_mymemory_interpret_withWarningText_shouldSignalQuota() {
    let body = mymemory_body(
        r#"{"responseData":{"translatedText":"MYMEMORY WARNING: YOU USED ALL AVAILABLE FREE TRANSLATIONS FOR TODAY."},"responseStatus":200}"#,
    );
    assert_eq!(body.interpret().unwrap(), MyMemoryOutcome::QuotaExhausted);
}

#[test]
fn test_mymemory_interpret_withStringStatus403_shouldSignalQuota() {
    let body = mymemory_body(r#"{"responseData":{"translatedText":""},"responseStatus":"403"}"#);
    assert_eq!(body.interpret().unwrap(), MyMemoryOutcome::QuotaExhausted);
}

#[test]
fn test_mymemory_interpret_withServerStatus_shouldBeServerError() {
    let body = mymemory_body(r#"{"responseData":null,"responseStatus":500,"responseDetails":"internal"}"#);
    assert_eq!(body.interpret().unwrap_err().kind(), ErrorKind::Server);
}

#[test]
fn test_mymemory_interpret_withEmptyTranslation_shouldBeParseError() {
    let body = mymemory_body(r#"{"responseData":{"translatedText":"  "},"responseStatus":200}"#);
    assert_eq!(body.interpret().unwrap_err().kind(), ErrorKind::Unknown);
}

#[test]
fn test_deepl_new_withoutEndpoint_shouldPickHostFromKey() {
    let free = DeepL::new("abc:fx", "", Duration::from_secs(1));
    let pro = DeepL::new("abc", "", Duration::from_secs(1));
    assert!(free.endpoint().contains("api-free.deepl.com"));
    assert!(pro.endpoint().contains("api.deepl.com"));
    assert!(!pro.endpoint().contains("api-free"));
}

#[test]
fn test_deepl_new_withCustomEndpoint_shouldTrimSlash() {
    let client = DeepL::new("abc", "http://localhost:8080/", Duration::from_secs(1));
    assert_eq!(client.endpoint(), "http://localhost:8080");
}

#[test]
fn test_deepl_request_withSource_shouldSerializeSourceLang() {
    let request = DeepLRequest::new("Hallo", "EN-US").source_lang(Some("DE".to_string()));
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["source_lang"], "DE");
    assert_eq!(json["target_lang"], "EN-US");
}

#[tokio::test]
async fn test_deepl_usage_withEmptyKey_shouldBeNotConfigured() {
    let client = DeepL::new("  ", "", Duration::from_secs(1));
    assert_eq!(client.usage().await.unwrap_err().kind(), ErrorKind::Auth);
}

#[test]
fn test_openai_request_shouldSerializeMessagesInOrder() {
    let request = OpenAIRequest::new("gpt-4o-mini")
        .add_message("system", translation_instruction("Korean"))
        .add_message("user", "Hello")
        .temperature(0.3)
        .max_tokens(max_tokens_for("Hello"));
    let json = serde_json::to_value(&request).unwrap();

    assert_eq!(json["model"], "gpt-4o-mini");
    assert_eq!(json["messages"][0]["role"], "system");
    assert!(json["messages"][0]["content"].as_str().unwrap().contains("Korean"));
    assert_eq!(json["messages"][1]["content"], "Hello");
    assert_eq!(json["max_tokens"], 64);
}

#[test]
fn test_openai_request_withoutOptions_shouldOmitThem() {
    let json = serde_json::to_value(OpenAIRequest::new("m").add_message("user", "x")).unwrap();
    assert!(json.get("temperature").is_none());
    assert!(json.get("max_tokens").is_none());
}

#[test]
fn test_max_tokens_for_shouldClamp() {
    assert_eq!(max_tokens_for(""), 64);
    assert_eq!(max_tokens_for(&"a".repeat(100)), 300);
    assert_eq!(max_tokens_for(&"a".repeat(10_000)), 1500);
}

#[test]
fn test_openai_extract_text_shouldStripQuotes() {
    let response: OpenAIResponse = serde_json::from_str(
        r#"{"choices":[{"message":{"role":"assistant","content":"\"안녕하세요\""}}]}"#,
    ).unwrap();
    assert_eq!(OpenAI::extract_text_from_response(&response), Some("안녕하세요".to_string()));
}

#[test]
fn test_openai_extract_text_withNoChoices_shouldBeNone() {
    let response: OpenAIResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
    assert!(OpenAI::extract_text_from_response(&response).is_none());
}

#[tokio::test]
async fn test_openai_translate_withEmptyKey_shouldBeNotConfigured() {
    let client = OpenAI::new("", "", "gpt-4o-mini", 0.3, Duration::from_secs(1));
    let err = client.translate("Hello", None, "ko").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
}

#[test]
fn test_strip_wrapping_quotes_shouldRemoveOneLayer() {
    assert_eq!(strip_wrapping_quotes("\"Hello\""), "Hello");
    assert_eq!(strip_wrapping_quotes("「こんにちは」"), "こんにちは");
    assert_eq!(strip_wrapping_quotes("He said \"hi\""), "He said \"hi\"");
    assert_eq!(strip_wrapping_quotes("  plain  "), "plain");
}

#[test]
fn test_registry_from_config_withoutKeys_shouldOnlyRegisterFreeProvider() {
    let registry = ProviderRegistry::from_config(&TranslationConfig::default(), &Credentials::new());
    assert_eq!(registry.registered(), vec![TranslationProvider::MyMemory]);
}

#[test]
fn test_registry_from_config_withKeys_shouldRegisterAll() {
    let credentials = Credentials::new()
        .with(TranslationProvider::DeepL, "k:fx")
        .with(TranslationProvider::OpenAI, "sk");
    let registry = ProviderRegistry::from_config(&TranslationConfig::default(), &credentials);
    assert_eq!(registry.registered(), TranslationProvider::FALLBACK_ORDER.to_vec());
}

#[tokio::test]
async fn test_mock_provider_withFixedTranslation_shouldReturnIt() {
    let mock = MockProvider::working().with_translation("Hello", "안녕");
    assert_eq!(mock.translate("Hello", None, "ko").await.unwrap(), "안녕");
    assert_eq!(mock.translate("Bye", None, "ko").await.unwrap(), "[mock:ko] Bye");
    assert_eq!(mock.received(), vec!["Hello".to_string(), "Bye".to_string()]);
}

#[tokio::test]
async fn test_mock_provider_counter_shouldBeSharedWithArc() {
    let mock = Arc::new(MockProvider::slow(1));
    let counter = mock.counter();
    let provider: Arc<dyn Provider> = mock;
    provider.translate("a", None, "ko").await.unwrap();
    assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 1);
}
