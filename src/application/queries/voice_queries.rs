//! Voice Queries

/// 音色、无线电预设、席位、短语包总览
#[derive(Debug, Clone, Default)]
pub struct ListVoices;

/// 获取音色参考音频
#[derive(Debug, Clone)]
pub struct GetVoiceReference {
    pub voice_id: String,
}
