//! HTTP Error Handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const TASK_FAILED: i32 = 422;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// 执行单元失败，消息原样返回
    TaskFailed(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let response = match &self {
            ApiError::BadRequest(msg) => {
                tracing::warn!(errno = errno::BAD_REQUEST, error = %msg, "Bad request");
                ErrorResponse::new(errno::BAD_REQUEST, msg.clone())
            }
            ApiError::TaskFailed(msg) => {
                tracing::warn!(errno = errno::TASK_FAILED, error = %msg, "Task failed");
                ErrorResponse::new(errno::TASK_FAILED, msg.clone())
            }
        };

        (StatusCode::OK, Json(response)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            ApplicationError::TaskFailed(msg) => ApiError::TaskFailed(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_task_failure_envelope() {
        let err: ApiError =
            ApplicationError::TaskFailed("Inference service is not available".into()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["errno"], 422);
        assert_eq!(json["error"], "Inference service is not available");
        assert!(json["data"].is_null());
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err: ApiError = ApplicationError::validation("Image is required").into();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg == "Image is required"));
    }
}
