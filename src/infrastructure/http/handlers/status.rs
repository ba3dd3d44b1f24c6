//! Availability HTTP Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{
    AvailabilitySnapshot, RefreshAvailabilityCommand, RefreshAvailabilityResponse,
};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::state::AppState;

/// 当前可用性快照
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<AvailabilitySnapshot>> {
    Json(ApiResponse::success(state.availability.snapshot()))
}

/// 请求一次探测
pub async fn refresh_status(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<RefreshAvailabilityResponse>> {
    let response = state
        .refresh_availability_handler
        .handle(RefreshAvailabilityCommand);
    Json(ApiResponse::success(response))
}
