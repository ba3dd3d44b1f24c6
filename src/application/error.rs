//! 应用层错误定义
//!
//! 统一的命令错误类型

use thiserror::Error;

use crate::domain::TaskError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 执行单元报告的失败，消息原样透传给调用方
    #[error("{0}")]
    TaskFailed(String),
}

impl ApplicationError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

impl From<TaskError> for ApplicationError {
    fn from(err: TaskError) -> Self {
        Self::ValidationError(err.to_string())
    }
}
