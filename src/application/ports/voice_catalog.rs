//! Voice Catalog Port - 音色目录

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::voice::VoiceDescriptor;

#[derive(Debug, Error)]
pub enum VoiceCatalogError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Invalid metadata: {0}")]
    InvalidMeta(String),
}

#[async_trait]
pub trait VoiceCatalogPort: Send + Sync {
    /// 所有音色，按 id 排序
    async fn list(&self) -> Result<Vec<VoiceDescriptor>, VoiceCatalogError>;

    async fn get(&self, voice_id: &str) -> Result<Option<VoiceDescriptor>, VoiceCatalogError> {
        Ok(self.list().await?.into_iter().find(|v| v.id == voice_id))
    }
}
