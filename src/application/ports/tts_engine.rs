//! TTS Engine Port - TTS 推理引擎抽象
//!
//! 定义 TTS 推理的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::voice::VoiceEngine;

/// TTS 错误
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Engine not configured: {0}")]
    EngineUnavailable(String),
}

/// TTS 推理请求
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// 要合成的文本内容
    pub text: String,
    /// 音色 ID
    pub voice_id: String,
    /// 参考音频的 URL 或路径（参数模型为 None）
    pub voice_ref: Option<String>,
    pub language: String,
    pub speed: f64,
}

/// TTS 推理响应
#[derive(Debug, Clone)]
pub struct SynthesisResponse {
    /// WAV 音频数据
    pub audio_data: Vec<u8>,
    pub duration_ms: Option<u64>,
    pub sample_rate: Option<u32>,
}

/// TTS Engine Port
///
/// 外部 TTS 服务的抽象接口
#[async_trait]
pub trait TtsEnginePort: Send + Sync {
    /// 执行 TTS 推理
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResponse, TtsError>;

    /// 模型版本，参与缓存 key 计算
    fn model_version(&self) -> String;

    /// 引擎是否自行处理语速
    ///
    /// Some(true) 时不再做后期变速；None 表示未知，按不支持处理。
    fn native_speed(&self) -> Option<bool> {
        None
    }

    /// 检查 TTS 服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}

/// 按音色引擎类型选择 TTS 引擎
pub trait EngineRegistryPort: Send + Sync {
    /// 未配置该类型引擎时返回 None
    fn engine(&self, kind: VoiceEngine) -> Option<Arc<dyn TtsEnginePort>>;

    /// 所有已配置的引擎
    fn engines(&self) -> Vec<(VoiceEngine, Arc<dyn TtsEnginePort>)>;
}
