//! HTTP Routes
//!
//! API Endpoints:
//! - /tts                          POST  合成语音（audio/wav）
//! - /prefetch                     POST  预取短语包
//! - /cache/stats                  GET   缓存统计
//! - /cache/recent?limit=          GET   最近活跃的缓存条目
//! - /cache/clear                  POST  清空缓存
//! - /voices                       GET   音色、无线电预设、席位、短语包
//! - /voices/:voice_id/reference   GET   音色参考音频
//! - /transcribe                   POST  语音识别（multipart `file`）
//! - /health                       GET   健康检查

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tts", post(handlers::synthesize))
        .route("/prefetch", post(handlers::prefetch))
        .route("/transcribe", post(handlers::transcribe))
        .route("/health", get(handlers::health))
        .nest("/cache", cache_routes())
        .nest("/voices", voice_routes())
}

/// Cache 路由
fn cache_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stats", get(handlers::cache_stats))
        .route("/recent", get(handlers::recent_cache))
        .route("/clear", post(handlers::clear_cache))
}

/// Voice 路由
fn voice_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::list_voices))
        .route("/:voice_id/reference", get(handlers::voice_reference))
}
