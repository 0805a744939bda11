//! Domain Layer - 领域层
//!
//! 包含以下限界上下文:
//! - Audio Context: PCM 处理（重采样、裁剪、变速、拼接）
//! - Radio Context: 无线电信道模拟
//! - Voice Context: 音色元数据与 auto 解析
//!
//! 以及共享的文本处理：分段、ATC 规范化、缓存键、短语包

pub mod audio;
pub mod phrase_packs;
pub mod radio;
pub mod voice;

mod cache_key;
mod text_normalizer;
mod text_segmenter;

pub use cache_key::CacheKeyFields;
pub use text_normalizer::{fold_diacritics, normalize_atc, AtcNormalizer, NormalizedText};
pub use text_segmenter::{
    normalize_whitespace, segment_text, BoundaryType, DelimiterMode, SegmentationResult,
    DEFAULT_HARD_PAUSE_MS, DEFAULT_SOFT_PAUSE_MS, MAX_SEGMENT_CHARS,
};
