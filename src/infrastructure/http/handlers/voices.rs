//! Voice HTTP Handlers

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::application::{GetVoiceReference, ListVoices, VoicesOverview};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 音色、无线电预设、席位、短语包
pub async fn list_voices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<VoicesOverview>>, ApiError> {
    let overview = state.list_voices_handler.handle(ListVoices).await?;
    Ok(Json(ApiResponse::success(overview)))
}

/// 下载音色参考音频（远端合成服务以 URL 方式拉取）
pub async fn voice_reference(
    State(state): State<Arc<AppState>>,
    Path(voice_id): Path<String>,
) -> Result<Response, ApiError> {
    let reference = state
        .voice_reference_handler
        .handle(GetVoiceReference {
            voice_id: voice_id.clone(),
        })
        .await?;

    let file = File::open(&reference.path)
        .await
        .map_err(|e| ApiError::NotFound(format!("Voice reference unavailable: {}", e)))?;
    let stream = ReaderStream::new(file);

    tracing::debug!(
        voice_id = %voice_id,
        bytes = reference.bytes,
        "Streaming voice reference"
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "audio/wav")
        .header(header::CONTENT_LENGTH, reference.bytes)
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
