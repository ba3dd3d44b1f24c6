//! Unit bodies - 各任务类型的执行逻辑
//!
//! 每个函数只做一次主推理调用，翻译类任务最多再链式调用一次文本生成

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::ports::{
    GenerateOptions, GenerateRequest, InferenceEnginePort, InferenceError, UnitMessage,
};
use crate::domain::prompts::{
    describe_image_prompt, translation_prompt, EXTRACT_KEYWORDS_PROMPT, RECOGNIZE_TEXT_PROMPT,
};
use crate::domain::{
    clean_translation, detect, language_name, Language, ResultAggregator, Task, TaskKind,
    TaskResult, TranslationOutcome, TranslationPlan,
};

use super::orchestrator::UnitModels;

/// 单元执行上下文
pub(super) struct UnitContext {
    pub engine: Arc<dyn InferenceEnginePort>,
    pub models: UnitModels,
    pub sender: mpsc::Sender<UnitMessage>,
}

impl UnitContext {
    pub async fn send(&self, message: UnitMessage) {
        if self.sender.send(message).await.is_err() {
            tracing::debug!("Unit receiver dropped, message discarded");
        }
    }

    async fn progress(&self, status: impl Into<String>, progress: u8) {
        self.send(UnitMessage::progress(status, Some(progress))).await;
    }
}

/// 执行任务主体
pub(super) async fn execute(
    task: &Task,
    ctx: &UnitContext,
    aggregator: &ResultAggregator,
) -> Result<TaskResult, InferenceError> {
    match task.kind {
        TaskKind::RecognizeText => recognize_text(task, ctx, aggregator).await,
        TaskKind::DescribeImage => describe_image(task, ctx, aggregator).await,
        TaskKind::ExtractKeywords => extract_keywords(task, ctx, aggregator).await,
        TaskKind::TranslateText => translate_text(task, ctx, aggregator).await,
    }
}

fn image_of(task: &Task) -> Result<&str, InferenceError> {
    task.image_payload()
        .ok_or_else(|| InferenceError::InvalidPayload(format!("{} requires an image", task.kind)))
}

async fn recognize_text(
    task: &Task,
    ctx: &UnitContext,
    aggregator: &ResultAggregator,
) -> Result<TaskResult, InferenceError> {
    let image = image_of(task)?;
    ctx.progress("Recognizing text", 0).await;

    let text = ctx
        .engine
        .describe_image(image, RECOGNIZE_TEXT_PROMPT, &ctx.models.recognize_text)
        .await?;
    let text = text.trim();
    if text.is_empty() {
        return Err(InferenceError::EmptyResponse);
    }

    ctx.progress("Text recognized", 100).await;
    Ok(aggregator.finish(text.to_string(), None))
}

async fn describe_image(
    task: &Task,
    ctx: &UnitContext,
    aggregator: &ResultAggregator,
) -> Result<TaskResult, InferenceError> {
    let image = image_of(task)?;
    ctx.progress(
        format!("Describing image in {}", language_name(&task.target_lang)),
        30,
    )
    .await;

    let description = ctx
        .engine
        .describe_image(
            image,
            describe_image_prompt(&task.target_lang),
            &ctx.models.describe_image,
        )
        .await?;

    Ok(aggregator.finish(description.trim().to_string(), None))
}

async fn extract_keywords(
    task: &Task,
    ctx: &UnitContext,
    aggregator: &ResultAggregator,
) -> Result<TaskResult, InferenceError> {
    let image = image_of(task)?;
    ctx.progress("Extracting keywords", 0).await;

    let keywords = ctx
        .engine
        .describe_image(image, EXTRACT_KEYWORDS_PROMPT, &ctx.models.extract_keywords)
        .await?;
    let keywords = keywords.trim().to_string();

    let detected = detect(&keywords);
    let target = Language::from_code(&task.target_lang);
    tracing::debug!(
        task_id = %task.task_id,
        detected = %detected,
        target = %task.target_lang,
        "Keywords language detected"
    );

    let translation = if detected.is_known() && target.is_known() && detected != target {
        ctx.progress(
            format!("Translating keywords to {}", language_name(target.code())),
            60,
        )
        .await;

        match translate(ctx, &keywords, target.code()).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::warn!(
                    task_id = %task.task_id,
                    error = %e,
                    "Keyword translation failed, keeping untranslated keywords"
                );
                None
            }
        }
    } else {
        None
    };

    Ok(aggregator.finish(keywords, translation))
}

async fn translate_text(
    task: &Task,
    ctx: &UnitContext,
    aggregator: &ResultAggregator,
) -> Result<TaskResult, InferenceError> {
    let text = task.text_input().unwrap_or_default();

    // 空输入不调用推理服务，结果不带语言字段
    if text.trim().is_empty() {
        return Ok(aggregator.finish(String::new(), None));
    }

    ctx.progress("Starting translation with language detection", 0).await;

    if !ctx.engine.probe_availability().await {
        return Err(InferenceError::Unavailable);
    }

    let outcome = translate(ctx, text, &task.target_lang).await?;

    ctx.progress(
        format!(
            "Translated from {} to {}",
            language_name(outcome.detected_source_lang.code()),
            language_name(&outcome.actual_target_lang)
        ),
        100,
    )
    .await;

    Ok(aggregator.finish(text.to_string(), Some(outcome)))
}

/// 翻译一段文本，不做可用性探测
async fn translate(
    ctx: &UnitContext,
    text: &str,
    requested_target: &str,
) -> Result<TranslationOutcome, InferenceError> {
    let plan = TranslationPlan::resolve(text, requested_target);

    let request = GenerateRequest::text(
        ctx.models.translation.clone(),
        translation_prompt(text, &plan.actual_target),
    )
    .with_options(GenerateOptions::translation());

    let reply = ctx.engine.generate_text(request).await?;
    let translated_text = clean_translation(&reply);
    if translated_text.is_empty() {
        return Err(InferenceError::EmptyResponse);
    }

    Ok(TranslationOutcome {
        translated_text,
        detected_source_lang: plan.detected_source,
        actual_target_lang: plan.actual_target,
    })
}
