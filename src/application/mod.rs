//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（AudioCache、BlobStorage、AudioCodec、TtsEngine、Transcriber、VoiceCatalog）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    // Synthesize
    CacheGranularity,
    CacheMode,
    CacheStatus,
    SynthesisSettings,
    SynthesizeCommand,
    SynthesizeResponse,
    // Prefetch
    PrefetchCommand,
    PrefetchItem,
    PrefetchResponse,
    // Cache
    ClearCache,
    // Transcribe
    TranscribeCommand,
    TranscribeResponse,
    // Handlers
    handlers::{
        apply_radio_to_wav, ClearCacheHandler, PrefetchHandler, SynthesizeHandler,
        TranscribeHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Audio cache
    get_or_generate,
    AudioCachePort,
    CacheError,
    CacheRecord,
    CacheStats,
    CachedAudio,
    // Blob storage
    BlobStorageError,
    BlobStoragePort,
    // Codec
    AudioCodecPort,
    AudioInfo,
    CodecError,
    // Transcriber
    TranscribeError,
    Transcript,
    TranscriberPort,
    // TTS engine
    EngineRegistryPort,
    SynthesisRequest,
    SynthesisResponse,
    TtsEnginePort,
    TtsError,
    // Voice catalog
    VoiceCatalogError,
    VoiceCatalogPort,
};

pub use queries::{
    GetCacheStats,
    GetHealth,
    GetVoiceReference,
    ListRecentCache,
    ListVoices,
    // Handlers
    handlers::{
        GetCacheStatsHandler, GetHealthHandler, GetVoiceReferenceHandler, HealthReport,
        ListRecentCacheHandler, ListVoicesHandler, VoiceReference, VoicesOverview,
    },
};
