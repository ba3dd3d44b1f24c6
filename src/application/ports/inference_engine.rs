//! Inference Engine Port - 本地推理服务抽象
//!
//! 定义与本地模型服务交互的接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::domain::PayloadError;

/// 推理错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    #[error("Inference service is not available")]
    Unavailable,

    #[error("Invalid image payload: {0}")]
    InvalidPayload(String),

    #[error("Empty response from inference service")]
    EmptyResponse,

    #[error("HTTP error {status}: {detail}")]
    HttpError { status: u16, detail: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,
}

impl InferenceError {
    pub fn http(status: u16, detail: impl Into<String>) -> Self {
        Self::HttpError {
            status,
            detail: detail.into(),
        }
    }
}

impl From<PayloadError> for InferenceError {
    fn from(err: PayloadError) -> Self {
        match err {
            PayloadError::InvalidPayload(msg) => Self::InvalidPayload(msg),
            PayloadError::ParseError(msg) => Self::ParseError(msg),
        }
    }
}

/// 生成参数，未设置的字段不会出现在请求体中
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

impl GenerateOptions {
    /// 翻译使用的参数
    pub fn translation() -> Self {
        Self {
            temperature: Some(0.1),
            top_p: Some(0.9),
            num_predict: Some(200),
            ..Default::default()
        }
    }

    /// 图片分析使用的参数
    pub fn vision() -> Self {
        Self {
            temperature: Some(0.1),
            top_p: Some(0.9),
            top_k: Some(40),
            ..Default::default()
        }
    }
}

/// 生成请求
///
/// 不变量: `images` 只在多模态请求中出现，且恰好包含一张已清理的图片
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<String>>,
    pub stream: bool,
    pub options: GenerateOptions,
}

impl GenerateRequest {
    /// 纯文本生成请求
    pub fn text(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            images: None,
            stream: false,
            options: GenerateOptions::default(),
        }
    }

    /// 多模态请求（图片必须已经过校验）
    pub fn multimodal(
        model: impl Into<String>,
        prompt: impl Into<String>,
        cleaned_image: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            images: Some(vec![cleaned_image.into()]),
            stream: false,
            options: GenerateOptions::vision(),
        }
    }

    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn images(&self) -> Option<&[String]> {
        self.images.as_deref()
    }
}

/// Inference Engine Port
///
/// 所有方法都不保存调用间状态
#[async_trait]
pub trait InferenceEnginePort: Send + Sync {
    /// 探测服务是否可用，失败一律返回 false
    async fn probe_availability(&self) -> bool;

    /// 已安装的模型列表，失败返回空列表
    async fn list_models(&self) -> Vec<String>;

    /// 文本生成
    async fn generate_text(&self, request: GenerateRequest) -> Result<String, InferenceError>;

    /// 图片 + 提示词生成
    ///
    /// 先探测可用性，不可用时直接返回 `Unavailable`
    async fn describe_image(
        &self,
        image_b64: &str,
        prompt: &str,
        model: &str,
    ) -> Result<String, InferenceError>;
}
