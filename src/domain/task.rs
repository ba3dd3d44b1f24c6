//! Task - 单次用户操作产生的任务
//!
//! 不变量:
//! - 每个任务只有一种 kind
//! - 状态只能 Pending → Running → {Succeeded, Failed}
//! - 多模态任务必须携带图片，翻译任务必须携带文本

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// 任务错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    #[error("Missing input for {0}: {1}")]
    MissingInput(TaskKind, &'static str),
}

/// 任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    RecognizeText,
    DescribeImage,
    ExtractKeywords,
    TranslateText,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::RecognizeText => "recognize_text",
            TaskKind::DescribeImage => "describe_image",
            TaskKind::ExtractKeywords => "extract_keywords",
            TaskKind::TranslateText => "translate_text",
        }
    }

    /// 是否需要发送图片到多模态模型
    pub fn is_multimodal(&self) -> bool {
        !matches!(self, TaskKind::TranslateText)
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Succeeded | TaskStatus::Failed)
    }

    fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::Running)
                | (TaskStatus::Running, TaskStatus::Succeeded)
                | (TaskStatus::Running, TaskStatus::Failed)
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 任务输入
#[derive(Debug, Clone)]
pub enum TaskInput {
    /// base64 或 data URL 形式的图片
    Image(String),
    /// 待翻译文本
    Text(String),
}

/// 任务
#[derive(Debug, Clone)]
pub struct Task {
    pub task_id: String,
    pub kind: TaskKind,
    pub input: TaskInput,
    pub target_lang: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(
        kind: TaskKind,
        input: TaskInput,
        target_lang: impl Into<String>,
    ) -> Result<Self, TaskError> {
        match (&input, kind.is_multimodal()) {
            (TaskInput::Image(_), true) | (TaskInput::Text(_), false) => {}
            (TaskInput::Text(_), true) => return Err(TaskError::MissingInput(kind, "image")),
            (TaskInput::Image(_), false) => return Err(TaskError::MissingInput(kind, "text")),
        }

        Ok(Self {
            task_id: Uuid::new_v4().to_string(),
            kind,
            input,
            target_lang: target_lang.into(),
            status: TaskStatus::Pending,
            created_at: Utc::now(),
        })
    }

    pub fn image(
        kind: TaskKind,
        image: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Result<Self, TaskError> {
        Self::new(kind, TaskInput::Image(image.into()), target_lang)
    }

    pub fn text(
        text: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Result<Self, TaskError> {
        Self::new(TaskKind::TranslateText, TaskInput::Text(text.into()), target_lang)
    }

    /// 状态迁移
    pub fn transition(&mut self, next: TaskStatus) -> Result<(), TaskError> {
        if !self.status.can_transition_to(next) {
            return Err(TaskError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    pub fn image_payload(&self) -> Option<&str> {
        match &self.input {
            TaskInput::Image(data) => Some(data),
            TaskInput::Text(_) => None,
        }
    }

    pub fn text_input(&self) -> Option<&str> {
        match &self.input {
            TaskInput::Text(text) => Some(text),
            TaskInput::Image(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let mut task = Task::text("hola", "en").unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        task.transition(TaskStatus::Running).unwrap();
        task.transition(TaskStatus::Succeeded).unwrap();
        assert!(task.status.is_terminal());
    }

    #[test]
    fn test_illegal_transitions() {
        let mut task = Task::image(TaskKind::DescribeImage, "AAAA", "es").unwrap();
        assert!(task.transition(TaskStatus::Succeeded).is_err());

        task.transition(TaskStatus::Running).unwrap();
        task.transition(TaskStatus::Failed).unwrap();
        let err = task.transition(TaskStatus::Running).unwrap_err();
        assert_eq!(
            err,
            TaskError::InvalidTransition {
                from: TaskStatus::Failed,
                to: TaskStatus::Running
            }
        );
    }

    #[test]
    fn test_input_must_match_kind() {
        assert!(Task::new(TaskKind::RecognizeText, TaskInput::Text("x".into()), "es").is_err());
        assert!(Task::new(TaskKind::TranslateText, TaskInput::Image("x".into()), "es").is_err());

        let task = Task::image(TaskKind::ExtractKeywords, "AAAA", "en").unwrap();
        assert_eq!(task.image_payload(), Some("AAAA"));
        assert_eq!(task.text_input(), None);
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&TaskKind::ExtractKeywords).unwrap();
        assert_eq!(json, "\"extract_keywords\"");
        assert!(TaskKind::RecognizeText.is_multimodal());
        assert!(!TaskKind::TranslateText.is_multimodal());
    }
}
