//! Cache Command Handlers

use std::sync::Arc;

use crate::application::commands::ClearCache;
use crate::application::error::ApplicationError;
use crate::application::ports::AudioCachePort;

/// ClearCache Handler
pub struct ClearCacheHandler {
    cache: Arc<dyn AudioCachePort>,
}

impl ClearCacheHandler {
    pub fn new(cache: Arc<dyn AudioCachePort>) -> Self {
        Self { cache }
    }

    pub async fn handle(&self, _cmd: ClearCache) -> Result<(), ApplicationError> {
        let before = self.cache.stats().await?;
        self.cache.clear().await?;
        tracing::info!(items = before.items, bytes = before.bytes, "Cache cleared");
        Ok(())
    }
}
