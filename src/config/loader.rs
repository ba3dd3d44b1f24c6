//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `POLYGLOT_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `POLYGLOT_SERVER__PORT=8080`
/// - `POLYGLOT_INFERENCE__BASE_URL=http://gpu-box:11434`
/// - `POLYGLOT_INFERENCE__TIMEOUT_SECS=300`
/// - `POLYGLOT_MODELS__TRANSLATION=llama3.1:8b`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5060)?
        .set_default("server.max_upload_size", 20 * 1024 * 1024)?
        .set_default("inference.base_url", "http://localhost:11434")?
        .set_default("inference.timeout_secs", 120)?
        .set_default("inference.probe_interval_secs", 60)?
        .set_default("models.ocr", "minicpm-v:latest")?
        .set_default("models.caption", "minicpm-v:latest")?
        .set_default("models.keywords", "minicpm-v:latest")?
        .set_default("models.translation", "llama3.1:8b-instruct-q5_k_m")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: POLYGLOT_INFERENCE__BASE_URL=http://gpu-box:11434
    builder = builder.add_source(
        Environment::with_prefix("POLYGLOT")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.inference.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Inference base URL cannot be empty".to_string(),
        ));
    }

    if config.inference.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Inference timeout cannot be 0".to_string(),
        ));
    }

    let models = [
        ("ocr", &config.models.ocr),
        ("caption", &config.models.caption),
        ("keywords", &config.models.keywords),
        ("translation", &config.models.translation),
    ];
    if let Some((name, _)) = models.iter().find(|(_, model)| model.trim().is_empty()) {
        return Err(ConfigError::ValidationError(format!(
            "Model for {} cannot be empty",
            name
        )));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Max Upload Size: {} bytes", config.server.max_upload_size);
    tracing::info!("Inference URL: {}", config.inference.base_url);
    tracing::info!("Inference Timeout: {}s", config.inference.timeout_secs);
    if config.inference.probe_interval_secs > 0 {
        tracing::info!("Probe Interval: {}s", config.inference.probe_interval_secs);
    } else {
        tracing::info!("Probe Interval: disabled");
    }
    tracing::info!("OCR Model: {}", config.models.ocr);
    tracing::info!("Caption Model: {}", config.models.caption);
    tracing::info!("Keywords Model: {}", config.models.keywords);
    tracing::info!("Translation Model: {}", config.models.translation);
    if config.server.static_files.enabled {
        tracing::info!("Static Files: {:?}", config.server.static_files.dir);
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
