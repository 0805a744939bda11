//! Prefetch HTTP Handler

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::PrefetchResponse;
use crate::infrastructure::http::dto::{ApiResponse, PrefetchRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 预取短语包的干声缓存
pub async fn prefetch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PrefetchRequest>,
) -> Result<Json<ApiResponse<PrefetchResponse>>, ApiError> {
    let result = state.prefetch_handler.handle(req.into()).await?;

    tracing::info!(
        voice_id = %result.voice_id,
        phraseset = %result.phraseset,
        count = result.count,
        "Phrase set prefetched"
    );

    Ok(Json(ApiResponse::success(result)))
}
