//! Synthesis HTTP Handler

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::application::SynthesizeResponse;
use crate::infrastructure::http::dto::SynthesizeRequest;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 合成语音，返回 audio/wav，缓存情况写在响应头里
pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SynthesizeRequest>,
) -> Result<Response, ApiError> {
    let result = state.synthesize_handler.handle(req.into()).await?;
    build_wav_response(result)
}

fn build_wav_response(result: SynthesizeResponse) -> Result<Response, ApiError> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "audio/wav")
        .header(header::CONTENT_LENGTH, result.audio_data.len())
        .header("X-Cache-Mode", result.cache_mode.as_str())
        .header("X-Cache", result.cache_status.as_str())
        .header("X-Cache-Segments", result.segments)
        .header("X-Cache-Hits", result.hits)
        .header("X-Resolved-Engine", result.engine.as_str())
        .header(
            "X-Pronunciation-Applied",
            if result.pronunciation_applied { "true" } else { "false" },
        );

    if let Some(key) = &result.cache_key {
        builder = builder.header("X-Cache-Key", key.as_str());
    }
    if let Some(delimiter) = result.delimiter {
        builder = builder.header("X-Segment-Delimiter", delimiter.as_str());
    }
    if result.voice_id.is_ascii() {
        builder = builder.header("X-Resolved-Voice-Id", result.voice_id.as_str());
    }
    if result.normalized {
        builder = builder.header("X-Normalized", "1");
    }

    builder
        .body(Body::from(result.audio_data))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
