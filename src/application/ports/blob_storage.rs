//! Blob Storage Port - 出站端口
//!
//! 缓存音频文件的分片存储：`{root}/{voice_id}/{key[0..2]}/{key[2..4]}/{key}.wav`

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 音频存储错误
#[derive(Debug, Error)]
pub enum BlobStorageError {
    #[error("Invalid cache key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Blob Storage Port - 出站端口
#[async_trait]
pub trait BlobStoragePort: Send + Sync {
    /// 计算音频文件路径（不访问文件系统）
    fn blob_path(&self, voice_id: &str, key: &str) -> Result<PathBuf, BlobStorageError>;

    /// 写入音频：同目录临时文件 + 原子 rename，中断的写入不会留下可见文件
    async fn write(&self, voice_id: &str, key: &str, data: &[u8]) -> Result<PathBuf, BlobStorageError>;

    /// 读取音频，文件不存在时返回 None
    async fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, BlobStorageError>;

    /// 删除整个文件树
    async fn clear(&self) -> Result<(), BlobStorageError>;
}
