//! Prefetch Commands - 短语包预取

use serde::Serialize;
use std::path::PathBuf;

/// 预取命令：为短语包中的每句生成干声缓存
#[derive(Debug, Clone, Default)]
pub struct PrefetchCommand {
    pub voice_id: String,
    pub role: Option<String>,
    pub language: Option<String>,
    pub speed: f64,
    /// 只做校验，预取只缓存干声
    pub radio_profile: Option<String>,
    pub phraseset: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrefetchItem {
    pub text: String,
    pub key: String,
    pub path: PathBuf,
    pub from_cache: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrefetchResponse {
    pub voice_id: String,
    pub phraseset: String,
    pub count: usize,
    pub items: Vec<PrefetchItem>,
}
