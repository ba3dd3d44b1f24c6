//! Domain Layer - 领域层
//!
//! 纯逻辑，不做 I/O:
//! - payload: 图片负载校验
//! - language: 启发式语言检测
//! - translation: 翻译方向与回复清理
//! - prompts: 各任务提示词
//! - task: 任务与状态机
//! - result: 结果聚合

pub mod language;
pub mod payload;
pub mod prompts;
pub mod result;
pub mod task;
pub mod translation;

pub use language::{detect, language_name, Language};
pub use payload::{clean, encode_image, PayloadError, PayloadValidator};
pub use result::{ResultAggregator, TaskResult, BACKEND_TAG};
pub use task::{Task, TaskError, TaskInput, TaskKind, TaskStatus};
pub use translation::{clean_translation, TranslationOutcome, TranslationPlan};
