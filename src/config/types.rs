//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 推理服务配置
    #[serde(default)]
    pub inference: InferenceConfig,

    /// 各任务使用的模型
    #[serde(default)]
    pub models: ModelsConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 上传图片最大大小（字节），默认 20MB
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,

    /// 静态文件服务配置（托管前端页面）
    #[serde(default)]
    pub static_files: StaticFilesConfig,
}

/// 静态文件服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct StaticFilesConfig {
    /// 是否启用静态文件服务
    #[serde(default = "default_static_enabled")]
    pub enabled: bool,

    /// 静态文件目录
    #[serde(default = "default_static_dir")]
    pub dir: PathBuf,

    /// URL 路径前缀（如 "/" 表示根路径托管）
    #[serde(default = "default_static_path")]
    pub path: String,
}

fn default_static_enabled() -> bool {
    false
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("web")
}

fn default_static_path() -> String {
    "/".to_string()
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: default_static_enabled(),
            dir: default_static_dir(),
            path: default_static_path(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5060
}

fn default_max_upload_size() -> u64 {
    20 * 1024 * 1024 // 20 MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_size: default_max_upload_size(),
            static_files: StaticFilesConfig::default(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 推理服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    /// 推理服务基础 URL
    #[serde(default = "default_inference_url")]
    pub base_url: String,

    /// 生成请求超时时间（秒）
    #[serde(default = "default_inference_timeout")]
    pub timeout_secs: u64,

    /// 可用性探测间隔（秒），0 表示关闭周期探测
    #[serde(default = "default_probe_interval")]
    pub probe_interval_secs: u64,
}

fn default_inference_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_inference_timeout() -> u64 {
    120
}

fn default_probe_interval() -> u64 {
    60
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_inference_url(),
            timeout_secs: default_inference_timeout(),
            probe_interval_secs: default_probe_interval(),
        }
    }
}

/// 模型配置
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// 文字识别（多模态）
    #[serde(default = "default_vision_model")]
    pub ocr: String,

    /// 图片描述（多模态）
    #[serde(default = "default_vision_model")]
    pub caption: String,

    /// 关键词提取（多模态）
    #[serde(default = "default_vision_model")]
    pub keywords: String,

    /// 文本翻译
    #[serde(default = "default_translation_model")]
    pub translation: String,
}

fn default_vision_model() -> String {
    "minicpm-v:latest".to_string()
}

fn default_translation_model() -> String {
    "llama3.1:8b-instruct-q5_k_m".to_string()
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            ocr: default_vision_model(),
            caption: default_vision_model(),
            keywords: default_vision_model(),
            translation: default_translation_model(),
        }
    }
}

impl ModelsConfig {
    /// 去重后的模型列表，用于检查缺失模型
    pub fn required(&self) -> Vec<String> {
        let mut required: Vec<String> = Vec::new();
        for model in [&self.ocr, &self.caption, &self.keywords, &self.translation] {
            if !required.contains(model) {
                required.push(model.clone());
            }
        }
        required
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5060);
        assert_eq!(config.inference.base_url, "http://localhost:11434");
        assert_eq!(config.inference.timeout_secs, 120);
        assert_eq!(config.inference.probe_interval_secs, 60);
        assert_eq!(config.models.translation, "llama3.1:8b-instruct-q5_k_m");
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:5060");
    }

    #[test]
    fn test_required_models_deduplicated() {
        let models = ModelsConfig::default();
        assert_eq!(
            models.required(),
            vec![
                "minicpm-v:latest".to_string(),
                "llama3.1:8b-instruct-q5_k_m".to_string()
            ]
        );
    }
}
