//! Audio Cache Port - 音频缓存管理
//!
//! 两级缓存：索引（Sled）+ 分片文件树（见 BlobStoragePort）。
//! 索引记录存在 ⇔ 音频文件存在；记录存在但文件缺失视为未命中。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::CacheKeyFields;

/// Audio Cache 错误
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// 缓存索引记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub key: String,
    pub model_version: String,
    pub voice_id: String,
    pub role: Option<String>,
    pub radio_profile: Option<String>,
    pub speed: f64,
    pub language: String,
    pub text_norm: String,
    pub bytes: u64,
    pub created_at: DateTime<Utc>,
    pub last_hit: Option<DateTime<Utc>>,
    pub hit_count: u64,
    pub path: PathBuf,
}

impl CacheRecord {
    pub fn new(key: String, fields: &CacheKeyFields, bytes: u64, path: PathBuf) -> Self {
        Self {
            key,
            model_version: fields.model_version.clone(),
            voice_id: fields.voice_id.clone(),
            role: fields.role.clone(),
            radio_profile: fields.radio_profile.clone(),
            speed: fields.speed,
            language: fields.language.clone(),
            text_norm: fields.text_norm.clone(),
            bytes,
            created_at: Utc::now(),
            last_hit: None,
            hit_count: 0,
            path,
        }
    }

    /// 最近活跃时间（未命中过则为创建时间）
    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_hit.unwrap_or(self.created_at)
    }
}

/// 缓存读取结果
#[derive(Debug, Clone)]
pub struct CachedAudio {
    pub key: String,
    pub path: PathBuf,
    pub audio_data: Vec<u8>,
    pub from_cache: bool,
}

/// 缓存统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub items: u64,
    pub bytes: u64,
    /// 进程启动以来的命中次数
    pub hits: u64,
    pub misses: u64,
}

/// Audio Cache Port
#[async_trait]
pub trait AudioCachePort: Send + Sync {
    /// 查找缓存
    ///
    /// 命中需要索引记录与可读的音频文件同时存在；命中时更新 hit_count / last_hit。
    /// 记录存在但文件缺失时删除记录并返回 None。
    async fn lookup(&self, fields: &CacheKeyFields) -> Result<Option<CachedAudio>, CacheError>;

    /// 写入缓存：先写文件（临时文件 + rename），再写索引
    async fn store(&self, fields: &CacheKeyFields, audio_data: Vec<u8>) -> Result<CachedAudio, CacheError>;

    async fn stats(&self) -> Result<CacheStats, CacheError>;

    /// 最近活跃的记录，按 last_hit（缺省 created_at）倒序
    async fn recent(&self, limit: usize) -> Result<Vec<CacheRecord>, CacheError>;

    /// 清空：先清索引，再删文件树
    async fn clear(&self) -> Result<(), CacheError>;
}

/// 查缓存，未命中时调用 generator 生成并写入
///
/// generator 在未命中时恰好调用一次。并发的相同未命中可能各自生成，后写者覆盖。
pub async fn get_or_generate<F, Fut, E>(
    cache: &dyn AudioCachePort,
    fields: &CacheKeyFields,
    generator: F,
) -> Result<CachedAudio, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<u8>, E>>,
    E: From<CacheError>,
{
    if let Some(hit) = cache.lookup(fields).await? {
        return Ok(hit);
    }
    let audio_data = generator().await?;
    Ok(cache.store(fields, audio_data).await?)
}
