//! Payload Validator - 图片负载校验
//!
//! 在发送到推理服务之前，清理并校验 base64 编码的图片数据。
//! 支持三种输入形式：
//! - `data:image/<mime>;base64,<data>`
//! - `data:<anything>,<data>`
//! - 纯 base64 字符串

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// 一张图片的 base64 最小合理长度
pub const DEFAULT_MIN_PAYLOAD_LEN: usize = 100;

static BASE64_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9+/]*={0,2}$").expect("valid base64 class regex"));

/// 负载校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("Invalid image payload: {0}")]
    InvalidPayload(String),

    #[error("Malformed data URL: {0}")]
    ParseError(String),
}

/// 图片负载校验器
#[derive(Debug, Clone, Copy)]
pub struct PayloadValidator {
    min_len: usize,
}

impl Default for PayloadValidator {
    fn default() -> Self {
        Self {
            min_len: DEFAULT_MIN_PAYLOAD_LEN,
        }
    }
}

impl PayloadValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 自定义最小长度（0 表示只校验字符集与填充）
    pub fn with_min_len(min_len: usize) -> Self {
        Self { min_len }
    }

    pub fn min_len(&self) -> usize {
        self.min_len
    }

    /// 清理并校验负载，返回可直接放入 `images` 字段的 base64
    ///
    /// 步骤：
    /// 1. 如果是 data URL，提取 base64 部分
    /// 2. 去除空白及非 base64 字符
    /// 3. 补齐到 4 的倍数
    /// 4. 字符集校验 `[A-Za-z0-9+/]*={0,2}`
    /// 5. 最小长度校验
    pub fn clean(&self, raw: &str) -> Result<String, PayloadError> {
        if raw.trim().is_empty() {
            return Err(PayloadError::InvalidPayload("payload is empty".to_string()));
        }

        let data = extract_base64(raw)?;

        let mut cleaned: String = data
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
            .collect();

        if cleaned.is_empty() {
            return Err(PayloadError::InvalidPayload(
                "no base64 data left after cleanup".to_string(),
            ));
        }

        let remainder = cleaned.len() % 4;
        if remainder != 0 {
            cleaned.push_str(&"=".repeat(4 - remainder));
        }

        if !BASE64_CLASS.is_match(&cleaned) {
            return Err(PayloadError::InvalidPayload(
                "base64 data contains invalid characters after cleanup".to_string(),
            ));
        }

        if cleaned.len() < self.min_len {
            return Err(PayloadError::InvalidPayload(format!(
                "base64 data too short for an image ({} < {})",
                cleaned.len(),
                self.min_len
            )));
        }

        tracing::debug!(len = cleaned.len(), "Base64 payload cleaned");
        Ok(cleaned)
    }

    /// 仅判断是否为合法负载
    pub fn is_valid(&self, raw: &str) -> bool {
        self.clean(raw).is_ok()
    }
}

/// 使用默认最小长度清理负载
pub fn clean(raw: &str) -> Result<String, PayloadError> {
    PayloadValidator::default().clean(raw)
}

/// 将原始图片字节编码为标准 base64
pub fn encode_image(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// 从 data URL 中提取 base64 部分；非 data URL 原样返回
fn extract_base64(raw: &str) -> Result<&str, PayloadError> {
    let raw = raw.trim();

    if raw.starts_with("data:image/") {
        let parts: Vec<&str> = raw.split(";base64,").collect();
        return match parts.as_slice() {
            [_, data] => Ok(data),
            _ => Err(PayloadError::ParseError(
                "expected exactly one ';base64,' separator".to_string(),
            )),
        };
    }

    if raw.starts_with("data:") {
        let parts: Vec<&str> = raw.split(',').collect();
        return match parts.as_slice() {
            [_, data] => Ok(data),
            _ => Err(PayloadError::ParseError(
                "expected exactly one ',' separator".to_string(),
            )),
        };
    }

    Ok(raw)
}
