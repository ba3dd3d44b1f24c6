//! HTTP Ollama Client - 调用本地推理服务
//!
//! 实现 InferenceEnginePort trait
//!
//! 推理服务 API:
//! GET  http://localhost:11434/api/tags      已安装模型
//! POST http://localhost:11434/api/generate  {"model", "prompt", "images"?, "stream": false, "options"}

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::normalizer;
use crate::application::ports::{GenerateRequest, InferenceEnginePort, InferenceError};
use crate::domain::PayloadValidator;

/// `/api/tags` 响应
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// HTTP Ollama 客户端配置
#[derive(Debug, Clone)]
pub struct HttpOllamaClientConfig {
    /// 推理服务基础 URL
    pub base_url: String,
    /// 生成请求超时时间（秒）
    pub timeout_secs: u64,
    /// 探测请求超时时间（秒）
    pub probe_timeout_secs: u64,
}

impl Default for HttpOllamaClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            timeout_secs: 120,
            probe_timeout_secs: 5,
        }
    }
}

impl HttpOllamaClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP Ollama 客户端
pub struct HttpOllamaClient {
    client: Client,
    config: HttpOllamaClientConfig,
    validator: PayloadValidator,
}

impl HttpOllamaClient {
    pub fn new(config: HttpOllamaClientConfig) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InferenceError::Network(e.to_string()))?;

        Ok(Self {
            client,
            config,
            validator: PayloadValidator::default(),
        })
    }

    pub fn with_default_config() -> Result<Self, InferenceError> {
        Self::new(HttpOllamaClientConfig::default())
    }

    /// 替换图片校验器
    pub fn with_validator(mut self, validator: PayloadValidator) -> Self {
        self.validator = validator;
        self
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn tags_url(&self) -> String {
        format!("{}/api/tags", self.base_url())
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url())
    }

    /// 请求 `/api/tags`，只检查状态码
    async fn get_tags(&self) -> Result<reqwest::Response, InferenceError> {
        let response = self
            .client
            .get(self.tags_url())
            .timeout(Duration::from_secs(self.config.probe_timeout_secs))
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(InferenceError::http(status.as_u16(), "tags request failed"));
        }

        Ok(response)
    }

    async fn fetch_tags(&self) -> Result<TagsResponse, InferenceError> {
        self.get_tags()
            .await?
            .json::<TagsResponse>()
            .await
            .map_err(|e| InferenceError::ParseError(e.to_string()))
    }

    async fn post_generate(&self, request: &GenerateRequest) -> Result<String, InferenceError> {
        tracing::debug!(
            url = %self.generate_url(),
            model = %request.model,
            prompt_len = request.prompt.len(),
            images = request.images().map_or(0, |images| images.len()),
            "Sending generate request"
        );

        let response = self
            .client
            .post(self.generate_url())
            .json(request)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                model = %request.model,
                body = %error_text,
                "Generate request rejected"
            );
            return Err(InferenceError::http(status.as_u16(), error_text));
        }

        let body = response
            .text()
            .await
            .map_err(|e| InferenceError::Network(format!("Failed to read response: {}", e)))?;

        let text = normalizer::normalize(&body)?;

        tracing::info!(
            model = %request.model,
            response_len = text.len(),
            "Generate request completed"
        );

        Ok(text)
    }
}

fn map_send_error(e: reqwest::Error) -> InferenceError {
    if e.is_timeout() {
        InferenceError::Timeout
    } else if e.is_connect() {
        InferenceError::Network(format!("Cannot connect to inference service: {}", e))
    } else {
        InferenceError::Network(e.to_string())
    }
}

#[async_trait]
impl InferenceEnginePort for HttpOllamaClient {
    async fn probe_availability(&self) -> bool {
        match self.get_tags().await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    url = %self.tags_url(),
                    "Inference service probe failed"
                );
                false
            }
        }
    }

    async fn list_models(&self) -> Vec<String> {
        match self.fetch_tags().await {
            Ok(tags) => tags.models.into_iter().map(|m| m.name).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list models");
                Vec::new()
            }
        }
    }

    async fn generate_text(&self, request: GenerateRequest) -> Result<String, InferenceError> {
        self.post_generate(&request).await
    }

    async fn describe_image(
        &self,
        image_b64: &str,
        prompt: &str,
        model: &str,
    ) -> Result<String, InferenceError> {
        if !self.probe_availability().await {
            return Err(InferenceError::Unavailable);
        }

        let cleaned = self.validator.clean(image_b64)?;
        let request = GenerateRequest::multimodal(model, prompt, cleaned);
        self.post_generate(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::encode_image;
    use mockito::{Matcher, Server};

    fn client_for(url: String) -> HttpOllamaClient {
        HttpOllamaClient::new(HttpOllamaClientConfig::new(url).with_timeout(5)).unwrap()
    }

    #[test]
    fn test_config_default() {
        let config = HttpOllamaClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.probe_timeout_secs, 5);
    }

    #[tokio::test]
    async fn test_probe_and_list_models() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"models":[{"name":"llava:7b"},{"name":"minicpm-v:latest"}]}"#)
            .expect_at_least(2)
            .create_async()
            .await;

        let client = client_for(server.url());
        assert!(client.probe_availability().await);
        assert_eq!(
            client.list_models().await,
            vec!["llava:7b".to_string(), "minicpm-v:latest".to_string()]
        );
    }

    #[tokio::test]
    async fn test_probe_non_success_is_unavailable() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/tags")
            .with_status(500)
            .create_async()
            .await;

        let client = client_for(server.url());
        assert!(!client.probe_availability().await);
        assert!(client.list_models().await.is_empty());
    }

    #[tokio::test]
    async fn test_probe_only_checks_status() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let client = client_for(server.url());
        assert!(client.probe_availability().await);
        assert!(client.list_models().await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let client = client_for("http://127.0.0.1:1".to_string());
        assert!(!client.probe_availability().await);
        assert!(client.list_models().await.is_empty());
    }

    #[tokio::test]
    async fn test_generate_text_streaming_body() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "llama",
                "stream": false
            })))
            .with_status(200)
            .with_body("{\"model\":\"llama\",\"response\":\"Hola\",\"done\":false}\n{\"model\":\"llama\",\"response\":\" mundo\",\"done\":true}\n")
            .create_async()
            .await;

        let client = client_for(server.url());
        let text = client
            .generate_text(GenerateRequest::text("llama", "Translate"))
            .await
            .unwrap();
        assert_eq!(text, "Hola mundo");
    }

    #[tokio::test]
    async fn test_generate_text_http_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/api/generate")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let client = client_for(server.url());
        let err = client
            .generate_text(GenerateRequest::text("llama", "hi"))
            .await
            .unwrap_err();
        assert_eq!(err, InferenceError::http(503, "overloaded"));
    }

    #[tokio::test]
    async fn test_generate_text_empty_body() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_body(r#"{"model":"llama","response":"","done":true}"#)
            .create_async()
            .await;

        let client = client_for(server.url());
        let err = client
            .generate_text(GenerateRequest::text("llama", "hi"))
            .await
            .unwrap_err();
        assert_eq!(err, InferenceError::EmptyResponse);
    }

    #[tokio::test]
    async fn test_describe_image_sends_cleaned_payload() {
        let mut server = Server::new_async().await;
        let _tags = server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body(r#"{"models":[]}"#)
            .create_async()
            .await;

        let encoded = encode_image(&[7u8; 120]);
        let generate = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "minicpm-v:latest",
                "images": [encoded.clone()],
                "options": {"top_k": 40}
            })))
            .with_status(200)
            .with_body(r#"{"model":"minicpm-v:latest","response":"A red square.","done":true}"#)
            .create_async()
            .await;

        let client = client_for(server.url());
        let data_url = format!("data:image/png;base64,{}", encoded);
        let text = client
            .describe_image(&data_url, "Describe", "minicpm-v:latest")
            .await
            .unwrap();

        assert_eq!(text, "A red square.");
        generate.assert_async().await;
    }

    #[tokio::test]
    async fn test_describe_image_requires_available_service() {
        let mut server = Server::new_async().await;
        let _tags = server
            .mock("GET", "/api/tags")
            .with_status(500)
            .create_async()
            .await;
        let generate = server
            .mock("POST", "/api/generate")
            .expect(0)
            .create_async()
            .await;

        let client = client_for(server.url());
        let err = client
            .describe_image(&encode_image(&[1u8; 120]), "Describe", "m")
            .await
            .unwrap_err();

        assert_eq!(err, InferenceError::Unavailable);
        generate.assert_async().await;
    }

    #[tokio::test]
    async fn test_describe_image_rejects_short_payload() {
        let mut server = Server::new_async().await;
        let _tags = server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body(r#"{"models":[]}"#)
            .create_async()
            .await;
        let generate = server
            .mock("POST", "/api/generate")
            .expect(0)
            .create_async()
            .await;

        let client = client_for(server.url());
        let err = client.describe_image("abc", "Describe", "m").await.unwrap_err();

        assert!(matches!(err, InferenceError::InvalidPayload(_)));
        generate.assert_async().await;
    }
}
