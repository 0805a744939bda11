//! Audio Context - Errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AudioError {
    #[error("没有可拼接的音频片段")]
    NoChunks,

    #[error("停顿数量不匹配: 期望 {expected}, 实际 {actual}")]
    PauseCountMismatch { expected: usize, actual: usize },

    #[error("语速必须为正数")]
    NonPositiveSpeed,

    #[error("无效的采样率: {0}")]
    InvalidSampleRate(u32),
}
