//! Language Heuristic Detector - 词法启发式语言检测
//!
//! 只区分西班牙语 / 英语 / 未知，基于变音符号与功能词。
//! 西班牙语优先于英语判断，同时命中两者的文本归为西班牙语。

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SPANISH_MARKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[ñáéíóúü¿¡]").expect("valid spanish marks regex"));

static SPANISH_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(es|la|el|de|que|y|a|en|un|ser|se|no|te|lo|le|da|su|por|son|con|para|al|una|del|está|todo|pero|más|hay|muy|fue|tener|como|donde)\b",
    )
    .expect("valid spanish words regex")
});

static ENGLISH_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(the|and|or|but|in|on|at|to|for|of|with|by|from|up|about|into|through|during|before|after|above|below|between|among|under|over|since|until|while|because|although|however|therefore|moreover|furthermore|nevertheless|consequently|accordingly|indeed|certainly|obviously|apparently|perhaps|probably|possibly|definitely|absolutely)\b",
    )
    .expect("valid english words regex")
});

/// 检测到的语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Es,
    En,
    Unknown,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
            Language::Unknown => "unknown",
        }
    }

    /// 解析语言代码，只识别 `es` / `en`
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "es" => Language::Es,
            "en" => Language::En,
            _ => Language::Unknown,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Language::Unknown)
    }

    /// 另一种已知语言（用于自动翻转）
    pub fn other(&self) -> Option<Language> {
        match self {
            Language::Es => Some(Language::En),
            Language::En => Some(Language::Es),
            Language::Unknown => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// 检测文本语言
pub fn detect(text: &str) -> Language {
    if SPANISH_MARKS.is_match(text) || SPANISH_WORDS.is_match(text) {
        Language::Es
    } else if ENGLISH_WORDS.is_match(text) {
        Language::En
    } else {
        Language::Unknown
    }
}

/// 语言代码对应的显示名称（用于提示词）
pub fn language_name(code: &str) -> String {
    let name = match code {
        "es" => "español",
        "en" => "inglés",
        "fr" => "francés",
        "de" => "alemán",
        "it" => "italiano",
        "pt" => "portugués",
        "zh" => "chino",
        "ja" => "japonés",
        "ko" => "coreano",
        "ru" => "ruso",
        other => return other.to_string(),
    };
    name.to_string()
}
