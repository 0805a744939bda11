//! Cache Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{AudioCachePort, CacheRecord, CacheStats};
use crate::application::queries::{GetCacheStats, ListRecentCache};

/// GetCacheStats Handler
pub struct GetCacheStatsHandler {
    cache: Arc<dyn AudioCachePort>,
}

impl GetCacheStatsHandler {
    pub fn new(cache: Arc<dyn AudioCachePort>) -> Self {
        Self { cache }
    }

    pub async fn handle(&self, _query: GetCacheStats) -> Result<CacheStats, ApplicationError> {
        Ok(self.cache.stats().await?)
    }
}

/// ListRecentCache Handler
pub struct ListRecentCacheHandler {
    cache: Arc<dyn AudioCachePort>,
}

impl ListRecentCacheHandler {
    pub fn new(cache: Arc<dyn AudioCachePort>) -> Self {
        Self { cache }
    }

    pub async fn handle(&self, query: ListRecentCache) -> Result<Vec<CacheRecord>, ApplicationError> {
        Ok(self.cache.recent(query.effective_limit()).await?)
    }
}
