//! Result Aggregator - 汇总最终结果
//!
//! 时长只在聚合开始时计时一次，包含所有链式调用，不是各次 HTTP 延迟之和。

use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::language::Language;
use super::translation::TranslationOutcome;

/// 结果中的后端标记
pub const BACKEND_TAG: &str = "inference";

/// 最终任务结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub original_text: String,
    pub translated_text: String,
    pub duration_ms: u64,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_source_lang: Option<Language>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_target_lang: Option<String>,
}

/// 结果聚合器
#[derive(Debug, Clone, Copy)]
pub struct ResultAggregator {
    started: Instant,
}

impl ResultAggregator {
    /// 从任务提交时刻开始计时
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn started_at(started: Instant) -> Self {
        Self { started }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// 组合主任务文本与可选的翻译结果
    pub fn finish(
        &self,
        original_text: String,
        translation: Option<TranslationOutcome>,
    ) -> TaskResult {
        let duration_ms = self.elapsed_ms();

        match translation {
            Some(outcome) => TaskResult {
                original_text,
                translated_text: outcome.translated_text,
                duration_ms,
                backend: BACKEND_TAG.to_string(),
                detected_source_lang: Some(outcome.detected_source_lang),
                actual_target_lang: Some(outcome.actual_target_lang),
            },
            None => TaskResult {
                translated_text: original_text.clone(),
                original_text,
                duration_ms,
                backend: BACKEND_TAG.to_string(),
                detected_source_lang: None,
                actual_target_lang: None,
            },
        }
    }
}
