//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::{Mode, ProcessImageCommand, TranslateTextCommand};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Process DTOs
// ============================================================================

/// 图片处理请求（image 为 base64 或 data URL）
#[derive(Debug, Deserialize)]
pub struct ProcessImageRequest {
    pub mode: Mode,
    pub image: String,
    #[serde(default)]
    pub target_lang: String,
}

impl From<ProcessImageRequest> for ProcessImageCommand {
    fn from(req: ProcessImageRequest) -> Self {
        Self {
            mode: req.mode,
            image: req.image,
            target_lang: req.target_lang,
        }
    }
}

/// 文本翻译请求
#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    #[serde(default)]
    pub target_lang: String,
}

impl From<TranslateRequest> for TranslateTextCommand {
    fn from(req: TranslateRequest) -> Self {
        Self {
            text: req.text,
            target_lang: req.target_lang,
        }
    }
}

// ============================================================================
// WebSocket DTOs
// ============================================================================

/// `/ws/process` 上客户端发送的唯一一条请求
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WsProcessRequest {
    Process(ProcessImageRequest),
    Translate(TranslateRequest),
}
