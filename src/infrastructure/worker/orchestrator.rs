//! Task Orchestrator - 每个任务一个后台执行单元

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::ports::{InferenceEnginePort, TaskDispatcherPort, UnitHandle, UnitMessage};
use crate::domain::{ResultAggregator, Task, TaskStatus};

use super::tasks::{self, UnitContext};

/// 各任务类型使用的模型
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitModels {
    pub recognize_text: String,
    pub describe_image: String,
    pub extract_keywords: String,
    pub translation: String,
}

impl Default for UnitModels {
    fn default() -> Self {
        Self {
            recognize_text: "minicpm-v:latest".to_string(),
            describe_image: "minicpm-v:latest".to_string(),
            extract_keywords: "minicpm-v:latest".to_string(),
            translation: "llama3.1:8b-instruct-q5_k_m".to_string(),
        }
    }
}

/// Orchestrator 配置
#[derive(Debug, Clone)]
pub struct TaskOrchestratorConfig {
    pub models: UnitModels,
    /// 单元消息通道容量
    pub channel_capacity: usize,
}

impl Default for TaskOrchestratorConfig {
    fn default() -> Self {
        Self {
            models: UnitModels::default(),
            channel_capacity: 16,
        }
    }
}

/// Task Orchestrator
///
/// 单元之间不共享状态，只通过消息通道向调用方汇报
pub struct TaskOrchestrator {
    config: TaskOrchestratorConfig,
    engine: Arc<dyn InferenceEnginePort>,
}

impl TaskOrchestrator {
    pub fn new(config: TaskOrchestratorConfig, engine: Arc<dyn InferenceEnginePort>) -> Self {
        Self { config, engine }
    }

    /// 单元主体：执行任务并发出恰好一条终止消息
    async fn run_unit(mut task: Task, ctx: UnitContext) {
        let aggregator = ResultAggregator::start();

        if let Err(e) = task.transition(TaskStatus::Running) {
            tracing::error!(task_id = %task.task_id, error = %e, "Failed to start unit");
            ctx.send(UnitMessage::error(e.to_string())).await;
            return;
        }

        tracing::info!(
            task_id = %task.task_id,
            kind = %task.kind,
            target_lang = %task.target_lang,
            "Unit started"
        );

        let message = match tasks::execute(&task, &ctx, &aggregator).await {
            Ok(result) => match task.transition(TaskStatus::Succeeded) {
                Ok(()) => {
                    tracing::info!(
                        task_id = %task.task_id,
                        kind = %task.kind,
                        duration_ms = result.duration_ms,
                        "Unit succeeded"
                    );
                    UnitMessage::Success(result)
                }
                Err(e) => UnitMessage::error(e.to_string()),
            },
            Err(e) => {
                tracing::warn!(
                    task_id = %task.task_id,
                    kind = %task.kind,
                    error = %e,
                    "Unit failed"
                );
                match task.transition(TaskStatus::Failed) {
                    Ok(()) => UnitMessage::error(e.to_string()),
                    Err(state_err) => UnitMessage::error(state_err.to_string()),
                }
            }
        };

        ctx.send(message).await;
    }
}

impl TaskDispatcherPort for TaskOrchestrator {
    fn dispatch(&self, task: Task) -> UnitHandle {
        let (sender, receiver) = mpsc::channel(self.config.channel_capacity.max(1));
        let task_id = task.task_id.clone();
        let kind = task.kind;

        let ctx = UnitContext {
            engine: self.engine.clone(),
            models: self.config.models.clone(),
            sender,
        };

        tracing::debug!(task_id = %task_id, kind = %kind, "Dispatching unit");
        let join = tokio::spawn(Self::run_unit(task, ctx));

        UnitHandle::new(task_id, kind, receiver, join)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::InferenceError;
    use crate::domain::{encode_image, Language, TaskKind};
    use crate::infrastructure::adapters::{ScriptedCall, ScriptedInferenceClient};

    fn orchestrator(engine: Arc<ScriptedInferenceClient>) -> TaskOrchestrator {
        TaskOrchestrator::new(TaskOrchestratorConfig::default(), engine)
    }

    fn image() -> String {
        encode_image(&[9u8; 120])
    }

    async fn collect(
        handle: UnitHandle,
    ) -> (Vec<UnitMessage>, Result<crate::domain::TaskResult, String>) {
        let mut progress = Vec::new();
        let result = handle.wait(|m| progress.push(m.clone())).await;
        (progress, result)
    }

    #[tokio::test]
    async fn test_translate_auto_flips_to_english() {
        let engine = Arc::new(
            ScriptedInferenceClient::new()
                .with_text_reply(Ok("Translation: \"The cat is in the house\"".to_string())),
        );
        let task = Task::text("El gato está en la casa", "es").unwrap();
        let (_, result) = collect(orchestrator(engine.clone()).dispatch(task)).await;

        let result = result.unwrap();
        assert_eq!(result.detected_source_lang, Some(Language::Es));
        assert_eq!(result.actual_target_lang.as_deref(), Some("en"));
        assert_eq!(result.translated_text, "The cat is in the house");
        assert_eq!(result.original_text, "El gato está en la casa");

        let requests = engine.generate_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "llama3.1:8b-instruct-q5_k_m");
        assert!(requests[0].prompt.contains("inglés"));
        assert_eq!(requests[0].options.num_predict, Some(200));
    }

    #[tokio::test]
    async fn test_translate_empty_input_skips_network() {
        let engine = Arc::new(ScriptedInferenceClient::unavailable());
        let task = Task::text("   ", "en").unwrap();
        let (_, result) = collect(orchestrator(engine.clone()).dispatch(task)).await;

        let result = result.unwrap();
        assert_eq!(result.translated_text, "");
        assert_eq!(result.detected_source_lang, None);
        assert_eq!(result.actual_target_lang, None);
        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn test_translate_requires_available_service() {
        let engine = Arc::new(ScriptedInferenceClient::unavailable());
        let task = Task::text("hello there", "es").unwrap();
        let (_, result) = collect(orchestrator(engine.clone()).dispatch(task)).await;

        assert_eq!(result.unwrap_err(), InferenceError::Unavailable.to_string());
        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn test_translate_empty_after_cleanup() {
        let engine =
            Arc::new(ScriptedInferenceClient::new().with_text_reply(Ok("\"\"".to_string())));
        let task = Task::text("the dog", "es").unwrap();
        let (_, result) = collect(orchestrator(engine).dispatch(task)).await;

        assert_eq!(result.unwrap_err(), InferenceError::EmptyResponse.to_string());
    }

    #[tokio::test]
    async fn test_keywords_translation_failure_is_swallowed() {
        let keywords = "sunset over the mountains, trees, river, sky, clouds";
        let engine = Arc::new(
            ScriptedInferenceClient::new()
                .with_image_reply(Ok(keywords.to_string()))
                .with_text_reply(Err(InferenceError::http(500, "boom"))),
        );
        let task = Task::image(TaskKind::ExtractKeywords, image(), "es").unwrap();
        let (_, result) = collect(orchestrator(engine.clone()).dispatch(task)).await;

        let result = result.unwrap();
        assert_eq!(result.original_text, keywords);
        assert_eq!(result.translated_text, keywords);
        assert_eq!(result.detected_source_lang, None);

        let requests = engine.generate_requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.contains("español"));
    }

    #[tokio::test]
    async fn test_keywords_translated_when_languages_differ() {
        let engine = Arc::new(
            ScriptedInferenceClient::new()
                .with_image_reply(Ok("the beach, sand, waves".to_string()))
                .with_text_reply(Ok("la playa, arena, olas".to_string())),
        );
        let task = Task::image(TaskKind::ExtractKeywords, image(), "es").unwrap();
        let (_, result) = collect(orchestrator(engine).dispatch(task)).await;

        let result = result.unwrap();
        assert_eq!(result.translated_text, "la playa, arena, olas");
        assert_eq!(result.detected_source_lang, Some(Language::En));
        assert_eq!(result.actual_target_lang.as_deref(), Some("es"));
    }

    #[tokio::test]
    async fn test_keywords_same_language_not_translated() {
        let engine = Arc::new(
            ScriptedInferenceClient::new()
                .with_image_reply(Ok("la playa, arena, olas".to_string())),
        );
        let task = Task::image(TaskKind::ExtractKeywords, image(), "es").unwrap();
        let (_, result) = collect(orchestrator(engine.clone()).dispatch(task)).await;

        assert_eq!(result.unwrap().translated_text, "la playa, arena, olas");
        assert!(engine.generate_requests().is_empty());
    }

    #[tokio::test]
    async fn test_recognize_text_uses_ocr_prompt() {
        let engine = Arc::new(
            ScriptedInferenceClient::new().with_image_reply(Ok("  STOP  ".to_string())),
        );
        let task = Task::image(TaskKind::RecognizeText, image(), "en").unwrap();
        let (progress, result) = collect(orchestrator(engine.clone()).dispatch(task)).await;

        let result = result.unwrap();
        assert_eq!(result.original_text, "STOP");
        assert_eq!(result.translated_text, "STOP");
        assert_eq!(result.backend, "inference");
        assert!(!progress.is_empty());

        match &engine.calls()[0] {
            ScriptedCall::DescribeImage { prompt, model } => {
                assert_eq!(prompt, crate::domain::prompts::RECOGNIZE_TEXT_PROMPT);
                assert_eq!(model, "minicpm-v:latest");
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_describe_image_prompt_follows_language() {
        let engine = Arc::new(
            ScriptedInferenceClient::new().with_image_reply(Ok("Un perro".to_string())),
        );
        let task = Task::image(TaskKind::DescribeImage, image(), "es").unwrap();
        let (_, result) = collect(orchestrator(engine.clone()).dispatch(task)).await;

        assert_eq!(result.unwrap().original_text, "Un perro");
        assert!(matches!(
            &engine.calls()[0],
            ScriptedCall::DescribeImage { prompt, .. } if prompt.starts_with("Describe esta imagen")
        ));
    }

    #[tokio::test]
    async fn test_failure_emits_single_error() {
        let engine = Arc::new(
            ScriptedInferenceClient::new().with_image_reply(Err(InferenceError::EmptyResponse)),
        );
        let task = Task::image(TaskKind::DescribeImage, image(), "en").unwrap();
        let mut handle = orchestrator(engine).dispatch(task);

        let mut terminal = Vec::new();
        while let Some(message) = handle.recv().await {
            if message.is_terminal() {
                terminal.push(message);
            }
        }

        assert_eq!(
            terminal,
            vec![UnitMessage::error(InferenceError::EmptyResponse.to_string())]
        );
    }

    #[tokio::test]
    async fn test_units_are_independent() {
        let engine = Arc::new(
            ScriptedInferenceClient::new()
                .with_text_reply(Ok("uno".to_string()))
                .with_text_reply(Ok("dos".to_string())),
        );
        let orchestrator = orchestrator(engine);
        let first = orchestrator.dispatch(Task::text("one", "es").unwrap());
        let second = orchestrator.dispatch(Task::text("two", "es").unwrap());
        assert_ne!(first.task_id(), second.task_id());

        let (_, a) = collect(first).await;
        let (_, b) = collect(second).await;
        let mut texts = vec![a.unwrap().translated_text, b.unwrap().translated_text];
        texts.sort();
        assert_eq!(texts, vec!["dos".to_string(), "uno".to_string()]);
    }
}
