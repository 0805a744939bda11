//! Transcribe HTTP Handler

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;

use crate::application::{TranscribeCommand, TranscribeResponse};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 识别上传的 WAV（multipart 字段 `file`）
pub async fn transcribe(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<TranscribeResponse>>, ApiError> {
    let mut upload: Option<TranscribeCommand> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(|s| s.to_string());
        let audio_data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?
            .to_vec();
        upload = Some(TranscribeCommand {
            audio_data,
            file_name,
        });
    }

    let command =
        upload.ok_or_else(|| ApiError::BadRequest("Audio file is required".to_string()))?;
    let result = state.transcribe_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(result)))
}
