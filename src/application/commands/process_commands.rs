//! Process Commands - 用户动作命令

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tokio::sync::mpsc;

use crate::application::ports::{AvailabilitySnapshot, UnitMessage};

/// 未指定目标语言时使用的默认值
pub const DEFAULT_TARGET_LANG: &str = "es";

/// 不翻译识别结果的目标语言
pub const AUTO_TARGET_LANG: &str = "auto";

/// 图片处理模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// 识别文字后翻译
    Translate,
    /// 图片描述
    Caption,
    /// 关键词提取
    Keywords,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Translate => "translate",
            Mode::Caption => "caption",
            Mode::Keywords => "keywords",
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "translate" => Ok(Mode::Translate),
            "caption" => Ok(Mode::Caption),
            "keywords" => Ok(Mode::Keywords),
            other => Err(format!("Unknown mode: {}", other)),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 处理图片命令
#[derive(Debug, Clone)]
pub struct ProcessImageCommand {
    pub mode: Mode,
    /// base64 或 data URL
    pub image: String,
    pub target_lang: String,
}

/// 翻译文本命令
#[derive(Debug, Clone)]
pub struct TranslateTextCommand {
    pub text: String,
    pub target_lang: String,
}

/// 刷新可用性命令
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshAvailabilityCommand;

/// 刷新可用性响应
#[derive(Debug, Clone, Serialize)]
pub struct RefreshAvailabilityResponse {
    /// 探测请求是否被接受（已有探测进行中时为 false）
    pub accepted: bool,
    pub status: AvailabilitySnapshot,
}

/// 进度转发
///
/// 一个动作内所有单元的 progress 按到达顺序转给调用方
#[derive(Debug, Clone, Default)]
pub struct ProgressRelay {
    sender: Option<mpsc::UnboundedSender<UnitMessage>>,
}

impl ProgressRelay {
    /// 不转发
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(sender: mpsc::UnboundedSender<UnitMessage>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    pub fn forward(&self, message: &UnitMessage) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(message.clone());
        }
    }
}

/// 规范化目标语言代码，空值使用默认值
pub fn normalize_target_lang(target_lang: &str) -> String {
    let code = target_lang.trim().to_lowercase();
    if code.is_empty() {
        DEFAULT_TARGET_LANG.to_string()
    } else {
        code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Caption".parse::<Mode>().unwrap(), Mode::Caption);
        assert_eq!(" keywords ".parse::<Mode>().unwrap(), Mode::Keywords);
        assert!("handwriting".parse::<Mode>().is_err());
        assert_eq!(serde_json::to_value(Mode::Translate).unwrap(), "translate");
    }

    #[test]
    fn test_normalize_target_lang() {
        assert_eq!(normalize_target_lang(""), "es");
        assert_eq!(normalize_target_lang(" EN "), "en");
        assert_eq!(normalize_target_lang("auto"), "auto");
    }

    #[test]
    fn test_relay_forwards_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let relay = ProgressRelay::new(tx);
        relay.forward(&UnitMessage::progress("a", None));
        relay.forward(&UnitMessage::progress("b", Some(50)));

        assert_eq!(rx.try_recv().unwrap(), UnitMessage::progress("a", None));
        assert_eq!(rx.try_recv().unwrap(), UnitMessage::progress("b", Some(50)));
        ProgressRelay::none().forward(&UnitMessage::progress("c", None));
    }
}
