//! Availability Port - 推理服务可用性
//!
//! 进程内唯一的共享状态，由监视器整体替换，读者只拿快照

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

/// 可用性状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityState {
    Checking,
    Available,
    Unavailable,
}

impl AvailabilityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityState::Checking => "checking",
            AvailabilityState::Available => "available",
            AvailabilityState::Unavailable => "unavailable",
        }
    }
}

/// 可用性快照
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilitySnapshot {
    pub state: AvailabilityState,
    /// 已安装的模型
    pub models: Vec<String>,
    /// 配置要求但未安装的模型
    pub missing_models: Vec<String>,
    pub checked_at: Option<DateTime<Utc>>,
}

impl AvailabilitySnapshot {
    pub fn checking() -> Self {
        Self {
            state: AvailabilityState::Checking,
            models: Vec::new(),
            missing_models: Vec::new(),
            checked_at: None,
        }
    }

    /// 根据探测结果构建快照
    pub fn from_probe(available: bool, models: Vec<String>, required: &[String]) -> Self {
        if !available {
            return Self {
                state: AvailabilityState::Unavailable,
                models: Vec::new(),
                missing_models: Vec::new(),
                checked_at: Some(Utc::now()),
            };
        }

        let missing_models = required
            .iter()
            .filter(|model| !models.contains(model))
            .cloned()
            .collect();

        Self {
            state: AvailabilityState::Available,
            models,
            missing_models,
            checked_at: Some(Utc::now()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.state == AvailabilityState::Available
    }
}

/// Availability Port
///
/// 只读 + 刷新两个入口
pub trait AvailabilityPort: Send + Sync {
    /// 当前快照
    fn snapshot(&self) -> AvailabilitySnapshot;

    /// 请求一次探测；已有探测在进行中时丢弃并返回 false
    fn request_probe(&self) -> bool;

    /// 订阅快照变化
    fn subscribe(&self) -> watch::Receiver<AvailabilitySnapshot>;
}
