//! Health Query Handler

use serde::Serialize;
use std::sync::Arc;

use crate::application::commands::CacheGranularity;
use crate::application::error::ApplicationError;
use crate::application::ports::{AudioCachePort, CacheStats, EngineRegistryPort, TranscriberPort};
use crate::application::queries::GetHealth;
use crate::domain::voice::VoiceEngine;

#[derive(Debug, Clone, Serialize)]
pub struct EngineHealth {
    pub engine: VoiceEngine,
    pub model_version: String,
    pub healthy: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub engines: Vec<EngineHealth>,
    pub transcriber_healthy: bool,
    pub cache_mode: CacheGranularity,
    pub cache_enabled: bool,
    pub cache: CacheStats,
}

/// GetHealth Handler
pub struct GetHealthHandler {
    engines: Arc<dyn EngineRegistryPort>,
    transcriber: Arc<dyn TranscriberPort>,
    cache: Arc<dyn AudioCachePort>,
    cache_mode: CacheGranularity,
    cache_enabled: bool,
}

impl GetHealthHandler {
    pub fn new(
        engines: Arc<dyn EngineRegistryPort>,
        transcriber: Arc<dyn TranscriberPort>,
        cache: Arc<dyn AudioCachePort>,
        cache_mode: CacheGranularity,
        cache_enabled: bool,
    ) -> Self {
        Self {
            engines,
            transcriber,
            cache,
            cache_mode,
            cache_enabled,
        }
    }

    pub async fn handle(&self, _query: GetHealth) -> Result<HealthReport, ApplicationError> {
        let mut engines = Vec::new();
        for (kind, engine) in self.engines.engines() {
            engines.push(EngineHealth {
                engine: kind,
                model_version: engine.model_version(),
                healthy: engine.health_check().await,
            });
        }
        let transcriber_healthy = self.transcriber.health_check().await;
        let cache = self.cache.stats().await?;

        let status = if !engines.is_empty() && engines.iter().all(|e| e.healthy) {
            "ok"
        } else {
            "degraded"
        };

        Ok(HealthReport {
            status,
            engines,
            transcriber_healthy,
            cache_mode: self.cache_mode,
            cache_enabled: self.cache_enabled,
            cache,
        })
    }
}
