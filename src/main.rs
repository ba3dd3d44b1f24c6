//! Polyglot - 图片文字识别、描述与翻译服务

use std::sync::Arc;

use polyglot::config::{load_config, print_config, AppConfig};
use polyglot::infrastructure::adapters::{HttpOllamaClient, HttpOllamaClientConfig};
use polyglot::infrastructure::http::{AppState, HttpServer, ServerConfig};
use polyglot::infrastructure::memory::{AvailabilityMonitor, AvailabilityMonitorConfig};
use polyglot::infrastructure::worker::{TaskOrchestrator, TaskOrchestratorConfig, UnitModels};

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},polyglot={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Polyglot v{}", env!("CARGO_PKG_VERSION"));
    print_config(&config);

    // 推理服务客户端
    let client_config = HttpOllamaClientConfig::new(&config.inference.base_url)
        .with_timeout(config.inference.timeout_secs);
    let engine = Arc::new(HttpOllamaClient::new(client_config)?);

    // 可用性监视器
    let monitor_config = AvailabilityMonitorConfig {
        probe_interval_secs: config.inference.probe_interval_secs,
        required_models: config.models.required(),
    };
    let (monitor, probe_loop) = AvailabilityMonitor::new(monitor_config, engine.clone());
    tokio::spawn(probe_loop.run());

    // 任务编排
    let orchestrator_config = TaskOrchestratorConfig {
        models: UnitModels {
            recognize_text: config.models.ocr.clone(),
            describe_image: config.models.caption.clone(),
            extract_keywords: config.models.keywords.clone(),
            translation: config.models.translation.clone(),
        },
        ..TaskOrchestratorConfig::default()
    };
    let orchestrator = Arc::new(TaskOrchestrator::new(orchestrator_config, engine));

    // 创建 HTTP 服务器
    let state = AppState::new(orchestrator, monitor.arc());
    let server = HttpServer::new(ServerConfig::from(&config.server), state);

    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
