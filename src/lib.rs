//! Polyglot - 本地推理服务之上的图片文字识别、描述与翻译
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - 图片负载校验、语言检测、翻译方向、提示词、任务状态机、结果聚合
//!
//! 应用层 (application/):
//! - Ports: InferenceEngine, TaskDispatcher, Availability
//! - Commands: 用户动作（处理图片、翻译文本、刷新可用性）
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: Ollama HTTP 客户端与回复规范化
//! - Worker: 每个任务一个独立执行单元
//! - Memory: 推理服务可用性监视器
//! - HTTP: RESTful API + WebSocket

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
