//! Task Dispatcher Port - 后台执行单元
//!
//! 每个任务一个独立执行单元，单元与调用方之间只通过消息通信:
//! - progress: 任意次数
//! - success / error: 恰好一次，之后单元结束

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::{Task, TaskKind, TaskResult};

/// 执行单元消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum UnitMessage {
    Progress {
        status: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        progress: Option<u8>,
    },
    Success(TaskResult),
    Error {
        message: String,
    },
}

impl UnitMessage {
    pub fn progress(status: impl Into<String>, progress: Option<u8>) -> Self {
        Self::Progress {
            status: status.into(),
            progress,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, UnitMessage::Progress { .. })
    }
}

/// 执行单元句柄
///
/// 丢弃句柄即终止单元，不会交付部分结果
pub struct UnitHandle {
    task_id: String,
    kind: TaskKind,
    receiver: mpsc::Receiver<UnitMessage>,
    join: JoinHandle<()>,
}

impl UnitHandle {
    pub fn new(
        task_id: String,
        kind: TaskKind,
        receiver: mpsc::Receiver<UnitMessage>,
        join: JoinHandle<()>,
    ) -> Self {
        Self {
            task_id,
            kind,
            receiver,
            join,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// 接收下一条消息
    pub async fn recv(&mut self) -> Option<UnitMessage> {
        self.receiver.recv().await
    }

    /// 等待终止消息，期间的 progress 交给回调
    ///
    /// 单元在发出终止消息前消失时返回错误消息
    pub async fn wait<F>(mut self, mut on_progress: F) -> Result<TaskResult, String>
    where
        F: FnMut(&UnitMessage),
    {
        while let Some(message) = self.receiver.recv().await {
            match message {
                UnitMessage::Success(result) => return Ok(result),
                UnitMessage::Error { message } => return Err(message),
                progress @ UnitMessage::Progress { .. } => on_progress(&progress),
            }
        }

        tracing::warn!(
            task_id = %self.task_id,
            kind = %self.kind,
            "Unit ended without a terminal message"
        );
        Err(format!("{} unit terminated without a result", self.kind))
    }
}

impl Drop for UnitHandle {
    fn drop(&mut self) {
        self.join.abort();
    }
}

/// Task Dispatcher Port
pub trait TaskDispatcherPort: Send + Sync {
    /// 为任务创建一个新的执行单元
    fn dispatch(&self, task: Task) -> UnitHandle;
}
