//! Scripted Inference Client - 用于测试的推理客户端
//!
//! 不发起网络请求，按顺序返回预先设定的回复，并记录收到的请求

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::application::ports::{GenerateRequest, InferenceEnginePort, InferenceError};

/// 记录的一次调用
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedCall {
    Generate(GenerateRequest),
    DescribeImage { prompt: String, model: String },
}

/// Scripted Inference Client
///
/// 回复队列耗尽后返回 `EmptyResponse`
pub struct ScriptedInferenceClient {
    available: bool,
    models: Vec<String>,
    text_replies: Mutex<VecDeque<Result<String, InferenceError>>>,
    image_replies: Mutex<VecDeque<Result<String, InferenceError>>>,
    calls: Mutex<Vec<ScriptedCall>>,
}

impl ScriptedInferenceClient {
    pub fn new() -> Self {
        Self {
            available: true,
            models: Vec::new(),
            text_replies: Mutex::new(VecDeque::new()),
            image_replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 模拟服务不可用
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn with_models(mut self, models: &[&str]) -> Self {
        self.models = models.iter().map(|m| m.to_string()).collect();
        self
    }

    /// 追加一个文本生成回复
    pub fn with_text_reply(self, reply: Result<String, InferenceError>) -> Self {
        if let Ok(mut queue) = self.text_replies.lock() {
            queue.push_back(reply);
        }
        self
    }

    /// 追加一个图片分析回复
    pub fn with_image_reply(self, reply: Result<String, InferenceError>) -> Self {
        if let Ok(mut queue) = self.image_replies.lock() {
            queue.push_back(reply);
        }
        self
    }

    /// 已记录的调用
    pub fn calls(&self) -> Vec<ScriptedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn generate_requests(&self) -> Vec<GenerateRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ScriptedCall::Generate(request) => Some(request),
                ScriptedCall::DescribeImage { .. } => None,
            })
            .collect()
    }

    fn record(&self, call: ScriptedCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn next(
        queue: &Mutex<VecDeque<Result<String, InferenceError>>>,
    ) -> Result<String, InferenceError> {
        queue
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or(Err(InferenceError::EmptyResponse))
    }
}

impl Default for ScriptedInferenceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceEnginePort for ScriptedInferenceClient {
    async fn probe_availability(&self) -> bool {
        self.available
    }

    async fn list_models(&self) -> Vec<String> {
        if self.available {
            self.models.clone()
        } else {
            Vec::new()
        }
    }

    async fn generate_text(&self, request: GenerateRequest) -> Result<String, InferenceError> {
        tracing::debug!(model = %request.model, "ScriptedInferenceClient: generate");
        self.record(ScriptedCall::Generate(request));
        Self::next(&self.text_replies)
    }

    async fn describe_image(
        &self,
        _image_b64: &str,
        prompt: &str,
        model: &str,
    ) -> Result<String, InferenceError> {
        if !self.available {
            return Err(InferenceError::Unavailable);
        }
        self.record(ScriptedCall::DescribeImage {
            prompt: prompt.to_string(),
            model: model.to_string(),
        });
        Self::next(&self.image_replies)
    }
}
