//! Persistence Layer - 数据持久化
//!
//! Sled 缓存索引实现

pub mod sled;

pub use self::sled::SledAudioCache;
