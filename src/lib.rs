//! Voxcast - 空管无线电语音合成核心
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Audio: PCM 处理（重采样、裁剪、变速、拼接）
//! - Radio: 无线电信道模拟（VHF / HF / 拥塞频道）
//! - Voice: 音色元数据与 auto 解析
//! - 文本：分段、ATC 规范化、缓存键、短语包
//!
//! 应用层 (application/):
//! - Ports: 端口定义（AudioCache, BlobStorage, AudioCodec, TtsEngine, Transcriber, VoiceCatalog）
//! - Commands: 合成、预取、清缓存、识别
//! - Queries: 缓存统计、音色列表、健康检查
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Persistence: Sled 缓存索引
//! - Adapters: WAV 编解码、分片文件存储、TTS / 识别客户端、音色目录

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
