//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::{
    // Command handlers
    ClearCacheHandler, PrefetchHandler, SynthesizeHandler, TranscribeHandler,
    // Query handlers
    GetCacheStatsHandler, GetHealthHandler, GetVoiceReferenceHandler, ListRecentCacheHandler,
    ListVoicesHandler,
    // Ports
    AudioCachePort, AudioCodecPort, EngineRegistryPort, SynthesisSettings, TranscriberPort,
    VoiceCatalogPort,
};
use crate::domain::AtcNormalizer;

/// 应用状态的外部依赖
pub struct AppDeps {
    pub catalog: Arc<dyn VoiceCatalogPort>,
    pub engines: Arc<dyn EngineRegistryPort>,
    pub cache: Arc<dyn AudioCachePort>,
    pub codec: Arc<dyn AudioCodecPort>,
    pub transcriber: Arc<dyn TranscriberPort>,
    pub normalizer: Arc<AtcNormalizer>,
    pub settings: SynthesisSettings,
    /// 识别上传的临时目录
    pub upload_dir: PathBuf,
}

/// 应用状态
pub struct AppState {
    // ========== Command Handlers ==========
    pub synthesize_handler: SynthesizeHandler,
    pub prefetch_handler: PrefetchHandler,
    pub clear_cache_handler: ClearCacheHandler,
    pub transcribe_handler: TranscribeHandler,

    // ========== Query Handlers ==========
    pub cache_stats_handler: GetCacheStatsHandler,
    pub recent_cache_handler: ListRecentCacheHandler,
    pub list_voices_handler: ListVoicesHandler,
    pub voice_reference_handler: GetVoiceReferenceHandler,
    pub health_handler: GetHealthHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(deps: AppDeps) -> Self {
        let AppDeps {
            catalog,
            engines,
            cache,
            codec,
            transcriber,
            normalizer,
            settings,
            upload_dir,
        } = deps;

        Self {
            // Command handlers
            prefetch_handler: PrefetchHandler::new(
                catalog.clone(),
                engines.clone(),
                cache.clone(),
                normalizer.clone(),
                &settings,
            ),
            clear_cache_handler: ClearCacheHandler::new(cache.clone()),
            transcribe_handler: TranscribeHandler::new(transcriber.clone(), codec.clone(), upload_dir),

            // Query handlers
            cache_stats_handler: GetCacheStatsHandler::new(cache.clone()),
            recent_cache_handler: ListRecentCacheHandler::new(cache.clone()),
            list_voices_handler: ListVoicesHandler::new(catalog.clone()),
            voice_reference_handler: GetVoiceReferenceHandler::new(catalog.clone()),
            health_handler: GetHealthHandler::new(
                engines.clone(),
                transcriber,
                cache.clone(),
                settings.granularity,
                settings.cache_enabled,
            ),

            synthesize_handler: SynthesizeHandler::new(
                catalog, engines, cache, codec, normalizer, settings,
            ),
        }
    }
}
