//! Sled 存储实现

mod audio_cache;

pub use audio_cache::SledAudioCache;
