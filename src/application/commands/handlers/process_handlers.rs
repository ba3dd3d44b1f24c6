//! Process Command Handlers
//!
//! 主单元总是先结束，链式的翻译单元之后才启动

use std::sync::Arc;

use crate::application::commands::process_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{AvailabilityPort, TaskDispatcherPort};
use crate::domain::{Language, ResultAggregator, Task, TaskKind, TaskResult, TranslationOutcome};

/// 派发一个单元并等待其终止消息
async fn run_unit(
    dispatcher: &dyn TaskDispatcherPort,
    task: Task,
    relay: &ProgressRelay,
) -> Result<TaskResult, ApplicationError> {
    let handle = dispatcher.dispatch(task);
    tracing::debug!(task_id = %handle.task_id(), kind = %handle.kind(), "Waiting for unit");
    handle
        .wait(|message| relay.forward(message))
        .await
        .map_err(ApplicationError::TaskFailed)
}

/// ProcessImage Handler - 处理图片
pub struct ProcessImageHandler {
    dispatcher: Arc<dyn TaskDispatcherPort>,
}

impl ProcessImageHandler {
    pub fn new(dispatcher: Arc<dyn TaskDispatcherPort>) -> Self {
        Self { dispatcher }
    }

    pub async fn handle(
        &self,
        cmd: ProcessImageCommand,
        relay: &ProgressRelay,
    ) -> Result<TaskResult, ApplicationError> {
        if cmd.image.trim().is_empty() {
            return Err(ApplicationError::validation("Image is required"));
        }

        let target_lang = normalize_target_lang(&cmd.target_lang);
        tracing::info!(
            mode = %cmd.mode,
            target_lang = %target_lang,
            image_len = cmd.image.len(),
            "Processing image"
        );

        match cmd.mode {
            Mode::Translate => self.recognize_and_translate(cmd.image, target_lang, relay).await,
            Mode::Caption => {
                let task = Task::image(TaskKind::DescribeImage, cmd.image, target_lang)?;
                run_unit(self.dispatcher.as_ref(), task, relay).await
            }
            Mode::Keywords => {
                let task = Task::image(TaskKind::ExtractKeywords, cmd.image, target_lang)?;
                run_unit(self.dispatcher.as_ref(), task, relay).await
            }
        }
    }

    async fn recognize_and_translate(
        &self,
        image: String,
        target_lang: String,
        relay: &ProgressRelay,
    ) -> Result<TaskResult, ApplicationError> {
        let aggregator = ResultAggregator::start();

        let task = Task::image(TaskKind::RecognizeText, image, target_lang.clone())?;
        let recognized = run_unit(self.dispatcher.as_ref(), task, relay).await?;
        let text = recognized.original_text;

        if text.trim().is_empty() || target_lang == AUTO_TARGET_LANG {
            tracing::debug!(target_lang = %target_lang, "Skipping translation of recognized text");
            return Ok(aggregator.finish(text, None));
        }

        let task = Task::text(text.clone(), target_lang.clone())?;
        let translated = run_unit(self.dispatcher.as_ref(), task, relay).await?;

        let outcome = TranslationOutcome {
            translated_text: translated.translated_text,
            detected_source_lang: translated
                .detected_source_lang
                .unwrap_or(Language::Unknown),
            actual_target_lang: translated.actual_target_lang.unwrap_or(target_lang),
        };

        let result = aggregator.finish(text, Some(outcome));
        tracing::info!(
            duration_ms = result.duration_ms,
            detected = ?result.detected_source_lang,
            actual_target = ?result.actual_target_lang,
            "Recognized text translated"
        );
        Ok(result)
    }
}

/// TranslateText Handler - 翻译文本
pub struct TranslateTextHandler {
    dispatcher: Arc<dyn TaskDispatcherPort>,
}

impl TranslateTextHandler {
    pub fn new(dispatcher: Arc<dyn TaskDispatcherPort>) -> Self {
        Self { dispatcher }
    }

    pub async fn handle(
        &self,
        cmd: TranslateTextCommand,
        relay: &ProgressRelay,
    ) -> Result<TaskResult, ApplicationError> {
        let target_lang = normalize_target_lang(&cmd.target_lang);
        tracing::info!(
            text_len = cmd.text.len(),
            target_lang = %target_lang,
            "Translating text"
        );

        let task = Task::text(cmd.text, target_lang)?;
        run_unit(self.dispatcher.as_ref(), task, relay).await
    }
}

/// RefreshAvailability Handler - 刷新推理服务状态
pub struct RefreshAvailabilityHandler {
    availability: Arc<dyn AvailabilityPort>,
}

impl RefreshAvailabilityHandler {
    pub fn new(availability: Arc<dyn AvailabilityPort>) -> Self {
        Self { availability }
    }

    pub fn handle(&self, _cmd: RefreshAvailabilityCommand) -> RefreshAvailabilityResponse {
        let accepted = self.availability.request_probe();
        tracing::info!(accepted = accepted, "Availability refresh requested");

        RefreshAvailabilityResponse {
            accepted,
            status: self.availability.snapshot(),
        }
    }
}
