//! Translation rules - 翻译方向决策与回复清理

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::language::{detect, Language};

/// 模型常见的翻译前缀，按顺序匹配，只去除第一个命中的
const TRANSLATION_PREFIXES: &[&str] = &[
    "TRADUCCIÓN AL",
    "Traducción:",
    "Translation:",
    "TRADUÇÃO:",
    "Traduction:",
    "Übersetzung:",
    "Traduzione:",
    "翻译:",
    "翻譯:",
    "번역:",
];

static EXCESS_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid newline regex"));

/// 翻译方向
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationPlan {
    pub detected_source: Language,
    pub requested_target: String,
    pub actual_target: String,
}

impl TranslationPlan {
    /// 检测源语言并在目标与源相同时自动翻转到另一种已知语言
    pub fn resolve(text: &str, requested_target: &str) -> Self {
        let detected_source = detect(text);
        let mut actual_target = requested_target.to_string();

        if detected_source.is_known() && Language::from_code(requested_target) == detected_source {
            if let Some(other) = detected_source.other() {
                tracing::debug!(
                    detected = %detected_source,
                    requested = %requested_target,
                    flipped = %other,
                    "Target language equals source, flipping"
                );
                actual_target = other.code().to_string();
            }
        }

        Self {
            detected_source,
            requested_target: requested_target.to_string(),
            actual_target,
        }
    }

    pub fn flipped(&self) -> bool {
        self.actual_target != self.requested_target
    }
}

/// 翻译结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationOutcome {
    pub translated_text: String,
    pub detected_source_lang: Language,
    pub actual_target_lang: String,
}

/// 清理模型返回的翻译文本
///
/// - 去除已知前缀（大小写不敏感）
/// - 去除一对完整包裹的引号
/// - 三个及以上换行折叠为两个
pub fn clean_translation(reply: &str) -> String {
    let mut cleaned = reply.trim().to_string();

    for prefix in TRANSLATION_PREFIXES {
        if let Some(rest) = strip_prefix_ignore_case(&cleaned, prefix) {
            cleaned = rest.trim().to_string();
            break;
        }
    }

    for quote in ['"', '\''] {
        if cleaned.len() >= 2 && cleaned.starts_with(quote) && cleaned.ends_with(quote) {
            cleaned = cleaned[1..cleaned.len() - 1].to_string();
            break;
        }
    }

    EXCESS_NEWLINES
        .replace_all(&cleaned, "\n\n")
        .trim()
        .to_string()
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let upper_prefix = prefix.to_uppercase();
    let mut text_chars = text.char_indices();
    let mut consumed = 0;

    for expected in upper_prefix.chars() {
        let (idx, ch) = text_chars.next()?;
        let mut upper = ch.to_uppercase();
        if upper.next() != Some(expected) || upper.next().is_some() {
            return None;
        }
        consumed = idx + ch.len_utf8();
    }

    Some(&text[consumed..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_spanish_to_english() {
        let plan = TranslationPlan::resolve("El gato está en la casa", "es");
        assert_eq!(plan.detected_source, Language::Es);
        assert_eq!(plan.actual_target, "en");
        assert!(plan.flipped());
    }

    #[test]
    fn test_flip_english_to_spanish() {
        let plan = TranslationPlan::resolve("The cat is in the house", "en");
        assert_eq!(plan.detected_source, Language::En);
        assert_eq!(plan.actual_target, "es");
    }

    #[test]
    fn test_no_flip_when_languages_differ() {
        let plan = TranslationPlan::resolve("The cat is in the house", "es");
        assert_eq!(plan.actual_target, "es");
        assert!(!plan.flipped());
    }

    #[test]
    fn test_no_flip_for_unknown_source() {
        let plan = TranslationPlan::resolve("12345", "es");
        assert_eq!(plan.detected_source, Language::Unknown);
        assert_eq!(plan.actual_target, "es");
    }

    #[test]
    fn test_other_targets_untouched() {
        let plan = TranslationPlan::resolve("El gato", "fr");
        assert_eq!(plan.actual_target, "fr");
    }

    #[test]
    fn test_clean_strips_prefix_case_insensitive() {
        assert_eq!(clean_translation("translation: Hello"), "Hello");
        assert_eq!(clean_translation("TRADUCCIÓN AL INGLÉS: The cat"), "INGLÉS: The cat");
        assert_eq!(clean_translation("traducción: Hola"), "Hola");
    }

    #[test]
    fn test_clean_strips_wrapping_quotes_once() {
        assert_eq!(clean_translation("\"Hello\""), "Hello");
        assert_eq!(clean_translation("'Hola'"), "Hola");
        assert_eq!(clean_translation("\"\"nested\"\""), "\"nested\"");
        assert_eq!(clean_translation("\"half"), "\"half");
    }

    #[test]
    fn test_clean_collapses_newlines() {
        assert_eq!(clean_translation("a\n\n\n\nb\nc"), "a\n\nb\nc");
    }

    #[test]
    fn test_clean_single_quote_char() {
        assert_eq!(clean_translation("\""), "\"");
    }
}
