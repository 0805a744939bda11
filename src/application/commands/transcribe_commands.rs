//! Transcribe Commands - 语音识别

use serde::Serialize;

/// 识别上传的音频
#[derive(Debug, Clone)]
pub struct TranscribeCommand {
    pub audio_data: Vec<u8>,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscribeResponse {
    pub text: String,
    pub language: Option<String>,
}
