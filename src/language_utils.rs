use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// Providers disagree on how a language is spelled: MyMemory wants lowercase
/// ISO 639-1 codes, DeepL wants upper-case codes with a regional variant for a
/// few languages, and chat models want a human-readable name.
/// ISO 639-2/B codes that differ from their 639-2/T counterpart
const PART2B_TO_PART2T: [(&str, &str); 18] = [
    ("fre", "fra"), ("ger", "deu"), ("dut", "nld"), ("gre", "ell"),
    ("chi", "zho"), ("cze", "ces"), ("ice", "isl"), ("alb", "sqi"),
    ("arm", "hye"), ("baq", "eus"), ("bur", "mya"), ("per", "fas"),
    ("geo", "kat"), ("may", "msa"), ("mac", "mkd"), ("rum", "ron"),
    ("slo", "slk"), ("wel", "cym"),
];

/// Marker used by callers that want the provider to detect the source language
pub const AUTO_DETECT: &str = "auto";

/// Whether the given hint asks for source-language detection
pub fn is_auto(code: Option<&str>) -> bool {
    match code {
        None => true,
        Some(c) => c.trim().is_empty() || c.trim().eq_ignore_ascii_case(AUTO_DETECT),
    }
}

/// Resolve a 2- or 3-letter code to an isolang language
pub fn parse_language(code: &str) -> Result<Language> {
    let normalized_code = code.trim().to_lowercase();
    // Regional variants such as "pt-br" resolve to their base language
    let base = normalized_code.split(['-', '_']).next().unwrap_or_default();

    let lang = match base.len() {
        2 => Language::from_639_1(base),
        3 => {
            let part2t = PART2B_TO_PART2T.iter()
                .find(|(b, _)| *b == base)
                .map(|(_, t)| *t)
                .unwrap_or(base);
            Language::from_639_3(part2t)
        }
        _ => None,
    };

    lang.ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    Ok(parse_language(code)?.to_639_3().to_string())
}

/// Normalize a language code to ISO 639-1 (2-letter) format if possible
/// Falls back to ISO 639-2/T if no ISO 639-1 code exists
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let lang = parse_language(code)?;
    Ok(lang.to_639_1()
        .map(|c| c.to_string())
        .unwrap_or_else(|| lang.to_639_3().to_string()))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    Ok(parse_language(code)?.to_name().to_string())
}

/// Human-readable target language for chat prompts, falls back to the raw code
pub fn display_name_for_prompt(code: &str) -> String {
    get_language_name(code).unwrap_or_else(|_| code.to_string())
}

/// Language code in the form DeepL expects for a target language
pub fn deepl_target_code(code: &str) -> String {
    let trimmed = code.trim();
    if trimmed.contains('-') {
        return trimmed.to_uppercase();
    }
    match normalize_to_part1_or_part2t(trimmed).as_deref() {
        Ok("en") => "EN-US".to_string(),
        Ok("pt") => "PT-BR".to_string(),
        Ok(other) => other.to_uppercase(),
        Err(_) => trimmed.to_uppercase(),
    }
}

/// Language code in the form DeepL expects for a source language, `None` means detect
pub fn deepl_source_code(code: Option<&str>) -> Option<String> {
    if is_auto(code) {
        return None;
    }
    code.map(|c| {
        let base = c.trim().split(['-', '_']).next().unwrap_or_default();
        base.to_uppercase()
    })
}

/// Language code in the form MyMemory expects
pub fn mymemory_code(code: Option<&str>) -> String {
    if is_auto(code) {
        return "autodetect".to_string();
    }
    let code = code.unwrap_or_default();
    normalize_to_part1_or_part2t(code).unwrap_or_else(|_| code.trim().to_lowercase())
}
