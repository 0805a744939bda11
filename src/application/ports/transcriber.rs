//! Transcriber Port - 语音识别抽象

use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 识别结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transcript {
    pub text: String,
    pub language: Option<String>,
}

#[async_trait]
pub trait TranscriberPort: Send + Sync {
    /// 识别本地 WAV 文件
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript, TranscribeError>;

    async fn health_check(&self) -> bool {
        true
    }
}
