//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_cache;
mod audio_codec;
mod blob_storage;
mod transcriber;
mod tts_engine;
mod voice_catalog;

pub use audio_cache::{
    get_or_generate, AudioCachePort, CacheError, CacheRecord, CacheStats, CachedAudio,
};
pub use audio_codec::{AudioCodecPort, AudioInfo, CodecError};
pub use blob_storage::{BlobStorageError, BlobStoragePort};
pub use transcriber::{TranscribeError, Transcript, TranscriberPort};
pub use tts_engine::{
    EngineRegistryPort, SynthesisRequest, SynthesisResponse, TtsEnginePort, TtsError,
};
pub use voice_catalog::{VoiceCatalogError, VoiceCatalogPort};
