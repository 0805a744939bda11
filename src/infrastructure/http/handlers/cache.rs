//! Cache HTTP Handlers

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::application::{CacheRecord, CacheStats, ClearCache, GetCacheStats, ListRecentCache};
use crate::infrastructure::http::dto::{ApiResponse, RecentCacheQuery, StatusResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 缓存统计
pub async fn cache_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<CacheStats>>, ApiError> {
    let stats = state.cache_stats_handler.handle(GetCacheStats).await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// 最近活跃的缓存条目
pub async fn recent_cache(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecentCacheQuery>,
) -> Result<Json<ApiResponse<Vec<CacheRecord>>>, ApiError> {
    let records = state
        .recent_cache_handler
        .handle(ListRecentCache { limit: query.limit })
        .await?;
    Ok(Json(ApiResponse::success(records)))
}

/// 清空缓存
pub async fn clear_cache(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<StatusResponse>>, ApiError> {
    state.clear_cache_handler.handle(ClearCache).await?;
    Ok(Json(ApiResponse::success(StatusResponse { status: "cleared" })))
}
