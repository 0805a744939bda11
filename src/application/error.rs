//! 应用层错误定义
//!
//! 统一的命令/查询错误类型，各端口错误在此折叠

use thiserror::Error;

use crate::application::ports::{
    BlobStorageError, CacheError, CodecError, TranscribeError, TtsError, VoiceCatalogError,
};
use crate::domain::audio::AudioError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 请求参数或输入音频无效
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 音色或短语包不存在
    #[error("Not found: {0}")]
    NotFound(String),

    /// 合成或识别服务失败
    #[error("Collaborator failure: {0}")]
    CollaboratorFailure(String),

    /// 缓存索引或文件系统错误
    #[error("Cache failure: {0}")]
    CacheFailure(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// 创建参数错误
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: &str) -> Self {
        Self::NotFound(format!("{} not found: {}", resource_type, id))
    }

    /// 创建外部服务错误
    pub fn collaborator(message: impl Into<String>) -> Self {
        Self::CollaboratorFailure(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<CacheError> for ApplicationError {
    fn from(err: CacheError) -> Self {
        Self::CacheFailure(err.to_string())
    }
}

impl From<BlobStorageError> for ApplicationError {
    fn from(err: BlobStorageError) -> Self {
        Self::CacheFailure(err.to_string())
    }
}

impl From<TtsError> for ApplicationError {
    fn from(err: TtsError) -> Self {
        Self::CollaboratorFailure(err.to_string())
    }
}

impl From<TranscribeError> for ApplicationError {
    fn from(err: TranscribeError) -> Self {
        Self::CollaboratorFailure(err.to_string())
    }
}

impl From<CodecError> for ApplicationError {
    fn from(err: CodecError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<AudioError> for ApplicationError {
    fn from(err: AudioError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<VoiceCatalogError> for ApplicationError {
    fn from(err: VoiceCatalogError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApplicationError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("blocking task failed: {}", err))
    }
}
