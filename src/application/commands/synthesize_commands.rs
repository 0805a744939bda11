//! Synthesize Commands - 合成相关命令

use serde::{Deserialize, Serialize};

use crate::domain::voice::VoiceEngine;
use crate::domain::DelimiterMode;

/// 缓存粒度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheGranularity {
    /// 整句一个条目，无线电效果另存派生条目
    Full,
    /// 每个分段一个条目，请求时重新拼接
    #[default]
    Segment,
}

impl CacheGranularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Segment => "segment",
        }
    }
}

/// 本次请求实际使用的缓存模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    Full,
    Segment,
    Disabled,
}

impl CacheMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Segment => "segment",
            Self::Disabled => "disabled",
        }
    }
}

/// 缓存命中情况
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    Mixed,
    Off,
}

impl CacheStatus {
    /// 根据命中数计算
    pub fn from_hits(hits: usize, total: usize) -> Self {
        if total > 0 && hits == total {
            Self::Hit
        } else if hits == 0 {
            Self::Miss
        } else {
            Self::Mixed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
            Self::Mixed => "MIXED",
            Self::Off => "OFF",
        }
    }
}

/// 合成参数（启动时由配置构造）
#[derive(Debug, Clone)]
pub struct SynthesisSettings {
    pub granularity: CacheGranularity,
    pub cache_enabled: bool,
    pub hard_pause_ms: u32,
    pub soft_pause_ms: u32,
    pub crossfade_ms: u32,
    pub max_parallel_segments: usize,
    pub default_language: String,
    /// 配置后参考音频以 URL 形式传给合成服务，否则传本地路径
    pub reference_base_url: Option<String>,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            granularity: CacheGranularity::Segment,
            cache_enabled: true,
            hard_pause_ms: crate::domain::DEFAULT_HARD_PAUSE_MS,
            soft_pause_ms: crate::domain::DEFAULT_SOFT_PAUSE_MS,
            crossfade_ms: crate::domain::audio::DEFAULT_CROSSFADE_MS,
            max_parallel_segments: 1,
            default_language: "en".to_string(),
            reference_base_url: None,
        }
    }
}

/// 合成命令
#[derive(Debug, Clone, Default)]
pub struct SynthesizeCommand {
    pub text: String,
    /// 具体音色 ID 或 "auto"
    pub voice_id: String,
    pub role: Option<String>,
    pub language: Option<String>,
    pub speed: f64,
    pub radio_profile: Option<String>,
    pub radio_intensity: Option<f64>,
    /// 覆盖全局缓存开关
    pub cache_enabled: Option<bool>,
    pub format: String,
    pub hard_pause_ms: Option<i64>,
    pub soft_pause_ms: Option<i64>,
    pub airport_icao: Option<String>,
    pub region_prefix: Option<String>,
    pub iso_country: Option<String>,
    pub iso_region: Option<String>,
}

/// 合成结果
#[derive(Debug, Clone)]
pub struct SynthesizeResponse {
    /// WAV 音频
    pub audio_data: Vec<u8>,
    pub cache_mode: CacheMode,
    pub cache_status: CacheStatus,
    pub segments: usize,
    pub hits: usize,
    /// full 模式下最终条目的 key
    pub cache_key: Option<String>,
    /// segment 模式下的分隔方式
    pub delimiter: Option<DelimiterMode>,
    pub voice_id: String,
    pub engine: VoiceEngine,
    pub normalized: bool,
    pub pronunciation_applied: bool,
}
