//! TTS Adapter - 合成引擎实现

mod engine_registry;
mod http_tts_client;
mod tone_tts_client;

pub use engine_registry::EngineRegistry;
pub use http_tts_client::*;
pub use tone_tts_client::ToneTtsClient;
