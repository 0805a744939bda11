//! Voice Context - 音色限界上下文
//!
//! 职责:
//! - 音色元数据（meta.json）解析
//! - 参考音频可用性判定
//! - auto 音色解析（按角色、地区稳定挑选）

mod errors;
mod resolver;
mod value_objects;

pub use errors::VoiceError;
pub use resolver::{resolve_voice, VoiceSelector, AUTO_VOICE_ID};
pub use value_objects::{
    VoiceDescriptor, VoiceEngine, VoiceMeta, DEFAULT_ROLES, MIN_REFERENCE_BYTES,
};
