//! Health HTTP Handler

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{GetHealth, HealthReport};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 健康检查：引擎状态、缓存模式与统计
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HealthReport>>, ApiError> {
    let report = state.health_handler.handle(GetHealth).await?;
    Ok(Json(ApiResponse::success(report)))
}
