//! Process HTTP Handlers

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;

use crate::application::{Mode, ProcessImageCommand, ProgressRelay};
use crate::domain::{encode_image, TaskResult};
use crate::infrastructure::http::dto::{ApiResponse, ProcessImageRequest, TranslateRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 处理图片（JSON，image 为 base64 或 data URL）
pub async fn process_image(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessImageRequest>,
) -> Result<Json<ApiResponse<TaskResult>>, ApiError> {
    let result = state
        .process_image_handler
        .handle(req.into(), &ProgressRelay::none())
        .await?;
    Ok(Json(ApiResponse::success(result)))
}

/// 处理上传的图片文件
///
/// multipart 字段: `mode`, `target_lang`, `file`
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<TaskResult>>, ApiError> {
    let mut mode: Option<Mode> = None;
    let mut target_lang = String::new();
    let mut image_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "mode" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read mode: {}", e)))?;
                mode = Some(value.parse().map_err(ApiError::BadRequest)?);
            }
            "target_lang" => {
                target_lang = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read target_lang: {}", e))
                })?;
            }
            "file" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
                image_data = Some(data.to_vec());
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    let mode = mode.ok_or_else(|| ApiError::BadRequest("Missing field: mode".to_string()))?;
    let image_data =
        image_data.ok_or_else(|| ApiError::BadRequest("Missing field: file".to_string()))?;
    if image_data.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }

    tracing::info!(mode = %mode, size = image_data.len(), "Image uploaded");

    let cmd = ProcessImageCommand {
        mode,
        image: encode_image(&image_data),
        target_lang,
    };
    let result = state
        .process_image_handler
        .handle(cmd, &ProgressRelay::none())
        .await?;
    Ok(Json(ApiResponse::success(result)))
}

/// 翻译文本
pub async fn translate_text(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TranslateRequest>,
) -> Result<Json<ApiResponse<TaskResult>>, ApiError> {
    let result = state
        .translate_text_handler
        .handle(req.into(), &ProgressRelay::none())
        .await?;
    Ok(Json(ApiResponse::success(result)))
}
