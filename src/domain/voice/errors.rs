//! Voice Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("音色不存在: {0}")]
    NotFound(String),

    #[error("没有可用的音色")]
    NoEligibleVoice,

    #[error("无效的参考音频: {0}")]
    InvalidReferenceAudio(String),

    #[error("无效的音色元数据: {0}")]
    InvalidMeta(String),
}
