//! Audio Codec Port - PCM 编解码抽象
//!
//! 解码 WAV 为 16-bit 单声道 PCM，编码为标准 44 字节头的 WAV。
//! 编解码是 CPU 密集操作，调用方在 spawn_blocking 中使用。

use serde::Serialize;
use thiserror::Error;

use crate::domain::audio::{AudioError, PcmAudio};

/// 编解码错误
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

impl From<AudioError> for CodecError {
    fn from(err: AudioError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// 音频信息（仅解析文件头）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioInfo {
    pub duration_ms: u64,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub data_size: usize,
}

impl AudioInfo {
    /// 是否为无需转换即可处理的 16-bit 单声道
    pub fn is_mono_pcm16(&self) -> bool {
        self.channels == 1 && self.bits_per_sample == 16
    }
}

/// Audio Codec Port
pub trait AudioCodecPort: Send + Sync {
    /// 解码为单声道 PCM；target_rate 给定且不同时线性重采样
    fn decode(&self, data: &[u8], target_rate: Option<u32>) -> Result<PcmAudio, CodecError>;

    /// 编码为 16-bit 单声道 WAV
    fn encode(&self, pcm: &PcmAudio) -> Result<Vec<u8>, CodecError>;

    /// 获取音频信息（不解码）
    fn info(&self, data: &[u8]) -> Result<AudioInfo, CodecError>;
}
