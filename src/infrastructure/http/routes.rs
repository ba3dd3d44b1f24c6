//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping              GET   进程存活检查
//! - /api/status            GET   推理服务可用性快照
//! - /api/status/refresh    POST  请求一次探测
//! - /api/process           POST  处理图片（JSON）
//! - /api/process/upload    POST  处理图片（multipart）
//! - /api/translate         POST  翻译文本
//! - /ws/process            WS    带进度的单次动作
//! - /ws/status             WS    可用性推送

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/process", get(handlers::process_websocket_handler))
        .route("/ws/status", get(handlers::status_websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/status", status_routes())
        .nest("/process", process_routes())
        .route("/translate", post(handlers::translate_text))
}

/// Status 路由
fn status_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::get_status))
        .route("/refresh", post(handlers::refresh_status))
}

/// Process 路由
fn process_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(handlers::process_image))
        .route("/upload", post(handlers::upload_image))
}
