//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::{PrefetchCommand, SynthesizeCommand};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

fn default_speed() -> f64 {
    1.0
}

fn default_format() -> String {
    "wav".to_string()
}

// ============================================================================
// Synthesis DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
    pub voice_id: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub radio_profile: Option<String>,
    #[serde(default)]
    pub radio_intensity: Option<f64>,
    #[serde(default)]
    pub cache_enabled: Option<bool>,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default)]
    pub hard_pause_ms: Option<i64>,
    #[serde(default)]
    pub soft_pause_ms: Option<i64>,
    #[serde(default)]
    pub airport_icao: Option<String>,
    #[serde(default)]
    pub region_prefix: Option<String>,
    #[serde(default)]
    pub iso_country: Option<String>,
    #[serde(default)]
    pub iso_region: Option<String>,
}

impl From<SynthesizeRequest> for SynthesizeCommand {
    fn from(req: SynthesizeRequest) -> Self {
        Self {
            text: req.text,
            voice_id: req.voice_id,
            role: req.role,
            language: req.language,
            speed: req.speed,
            radio_profile: req.radio_profile,
            radio_intensity: req.radio_intensity,
            cache_enabled: req.cache_enabled,
            format: req.format,
            hard_pause_ms: req.hard_pause_ms,
            soft_pause_ms: req.soft_pause_ms,
            airport_icao: req.airport_icao,
            region_prefix: req.region_prefix,
            iso_country: req.iso_country,
            iso_region: req.iso_region,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PrefetchRequest {
    pub voice_id: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub radio_profile: Option<String>,
    pub phraseset: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl From<PrefetchRequest> for PrefetchCommand {
    fn from(req: PrefetchRequest) -> Self {
        Self {
            voice_id: req.voice_id,
            role: req.role,
            language: req.language,
            speed: req.speed,
            radio_profile: req.radio_profile,
            phraseset: req.phraseset,
            limit: req.limit,
        }
    }
}

// ============================================================================
// Cache DTOs
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct RecentCacheQuery {
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}
