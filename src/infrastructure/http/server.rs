//! HTTP Server
//!
//! Axum HTTP 服务器启动和配置

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::Router;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::middleware::request_logging_middleware;
use super::routes::create_routes;
use super::state::AppState;

/// 静态页面托管
#[derive(Debug, Clone)]
pub struct StaticFiles {
    pub dir: PathBuf,
    /// 挂载路径，"/" 表示作为兜底服务
    pub path: String,
}

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 请求体大小上限（字节）
    pub max_body_size: usize,
    pub static_files: Option<StaticFiles>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5060,
            max_body_size: 20 * 1024 * 1024,
            static_files: None,
        }
    }
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_static_files(mut self, dir: impl Into<PathBuf>, path: impl Into<String>) -> Self {
        self.static_files = Some(StaticFiles {
            dir: dir.into(),
            path: path.into(),
        });
        self
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&crate::config::ServerConfig> for ServerConfig {
    fn from(config: &crate::config::ServerConfig) -> Self {
        let base = Self {
            host: config.host.clone(),
            port: config.port,
            max_body_size: usize::try_from(config.max_upload_size).unwrap_or(usize::MAX),
            static_files: None,
        };

        if config.static_files.enabled {
            base.with_static_files(
                config.static_files.dir.clone(),
                config.static_files.path.clone(),
            )
        } else {
            base
        }
    }
}

/// HTTP 服务器
pub struct HttpServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl HttpServer {
    /// 创建新的 HTTP 服务器
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// 创建带默认配置的服务器
    pub fn with_default_config(state: AppState) -> Self {
        Self::new(ServerConfig::default(), state)
    }

    /// 构建 Router
    fn build_router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers([AUTHORIZATION, CONTENT_TYPE])
            .expose_headers(Any)
            .max_age(Duration::from_secs(3600));

        let mut router: Router = create_routes().with_state(self.state.clone());

        if let Some(static_files) = &self.config.static_files {
            info!(
                dir = %static_files.dir.display(),
                path = %static_files.path,
                "Serving static files"
            );
            let serve_dir = ServeDir::new(&static_files.dir);
            router = if static_files.path == "/" {
                router.fallback_service(serve_dir)
            } else {
                router.nest_service(&static_files.path, serve_dir)
            };
        }

        // base64 图片随 JSON 一起上传，限制整个请求体
        router
            .layer(DefaultBodyLimit::max(self.config.max_body_size))
            .layer(middleware::from_fn(request_logging_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// 启动服务器
    pub async fn run(self) -> Result<(), std::io::Error> {
        let router = self.build_router();
        let addr = self.config.addr();

        info!("Starting HTTP server on {}", addr);

        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }

    /// 启动服务器（带优雅关闭）
    pub async fn run_with_shutdown<F>(self, shutdown_signal: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();
        let addr = self.config.addr();

        info!("Starting HTTP server on {} (with graceful shutdown)", addr);

        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    use crate::infrastructure::adapters::ScriptedInferenceClient;
    use crate::infrastructure::memory::{AvailabilityMonitor, AvailabilityMonitorConfig};
    use crate::infrastructure::worker::{TaskOrchestrator, TaskOrchestratorConfig};

    fn state() -> AppState {
        let engine = Arc::new(ScriptedInferenceClient::new());
        let (monitor, _) =
            AvailabilityMonitor::new(AvailabilityMonitorConfig::default(), engine.clone());
        let orchestrator = TaskOrchestrator::new(TaskOrchestratorConfig::default(), engine);
        AppState::new(Arc::new(orchestrator), monitor.arc())
    }

    fn static_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), "hola").unwrap();
        dir
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    #[test]
    fn test_from_app_config() {
        let mut app = crate::config::ServerConfig::default();
        app.port = 8080;
        app.max_upload_size = 1024;

        let config = ServerConfig::from(&app);
        assert_eq!(config.addr(), "0.0.0.0:8080");
        assert_eq!(config.max_body_size, 1024);
        assert!(config.static_files.is_none());

        app.static_files.enabled = true;
        let config = ServerConfig::from(&app);
        assert_eq!(config.static_files.unwrap().path, "/");
    }

    #[tokio::test]
    async fn test_static_files_at_root_keep_api() {
        let dir = static_dir();
        let config = ServerConfig::default().with_static_files(dir.path(), "/");
        let router = HttpServer::new(config, state()).build_router();

        let (status, body) = get(router.clone(), "/hello.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "hola");

        let (status, body) = get(router, "/api/ping").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"status\":\"ok\""));
    }

    #[tokio::test]
    async fn test_static_files_nested() {
        let dir = static_dir();
        let config = ServerConfig::default().with_static_files(dir.path(), "/ui");
        let router = HttpServer::new(config, state()).build_router();

        let (status, body) = get(router.clone(), "/ui/hello.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "hola");

        let (status, _) = get(router, "/hello.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_body_limit() {
        let config = ServerConfig {
            max_body_size: 16,
            ..ServerConfig::default()
        };
        let router = HttpServer::new(config, state()).build_router();

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/translate")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::json!({ "text": "a long enough sentence to overflow" })
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
