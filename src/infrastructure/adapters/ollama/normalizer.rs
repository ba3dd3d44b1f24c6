//! Response Normalizer - 生成接口回复的容错解析
//!
//! 推理服务根据配置可能返回单个 JSON 对象、逐行 JSON（流式）或纯文本。
//! 按顺序尝试以下策略，第一个适用的策略给出结果:
//! 1. 整体解析为单个对象，取 `response`
//! 2. 逐行解析流式对象，拼接所有 `response`
//! 3. 原样文本

use serde::Deserialize;

use crate::application::ports::InferenceError;

/// 单个生成对象（流式时每行一个）
#[derive(Debug, Deserialize)]
struct GenerateChunk {
    response: String,
    #[serde(default)]
    #[allow(dead_code)]
    done: bool,
}

/// 解析策略：`None` 表示该形态不适用，交给下一个策略
type Strategy = fn(&str) -> Option<String>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("single_object", single_object),
    ("streaming_lines", streaming_lines),
    ("plain_text", plain_text),
];

/// 从原始回复中提取生成文本
pub fn normalize(body: &str) -> Result<String, InferenceError> {
    for (name, strategy) in STRATEGIES {
        if let Some(text) = strategy(body) {
            tracing::debug!(strategy = name, len = text.len(), "Response normalized");
            let text = text.trim();
            if text.is_empty() {
                return Err(InferenceError::EmptyResponse);
            }
            return Ok(text.to_string());
        }
    }

    Err(InferenceError::EmptyResponse)
}

fn single_object(body: &str) -> Option<String> {
    serde_json::from_str::<GenerateChunk>(body.trim())
        .ok()
        .map(|chunk| chunk.response)
}

fn looks_like_stream(body: &str) -> bool {
    body.contains("{\"model\":") && body.contains("\"response\":")
}

fn streaming_lines(body: &str) -> Option<String> {
    if !looks_like_stream(body) {
        return None;
    }

    let mut combined = String::new();
    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match serde_json::from_str::<GenerateChunk>(line) {
            Ok(chunk) => combined.push_str(&chunk.response),
            Err(e) => {
                let preview: String = line.chars().take(50).collect();
                tracing::debug!(error = %e, line = %preview, "Skipping invalid stream line");
            }
        }
    }

    // 空白片段仍算作流式结果，由 normalize 的 trim 判定为空
    if combined.is_empty() {
        None
    } else {
        Some(combined)
    }
}

fn plain_text(body: &str) -> Option<String> {
    Some(body.to_string())
}
