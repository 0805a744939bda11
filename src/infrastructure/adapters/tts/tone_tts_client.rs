//! Tone TTS Client - 无模型时的占位引擎
//!
//! 生成 440 Hz 正弦音，时长随文本长度变化，保证整条流水线在没有模型时可运行。

use async_trait::async_trait;

use crate::application::ports::{SynthesisRequest, SynthesisResponse, TtsEnginePort, TtsError};
use crate::domain::audio::PcmAudio;
use crate::infrastructure::adapters::codec::WavCodec;

const TONE_SAMPLE_RATE: u32 = 22050;
const TONE_FREQ_HZ: f64 = 440.0;
const TONE_AMPLITUDE: f64 = 0.2;

/// Tone TTS Client
pub struct ToneTtsClient {
    model_version: String,
}

impl ToneTtsClient {
    pub fn new() -> Self {
        Self {
            model_version: "tone-440".to_string(),
        }
    }

    /// 时长 clamp(字符数 / 24, 0.6, 3.0) 秒，再除以语速
    pub fn frame_count(text: &str, speed: f64) -> usize {
        let seconds = (text.chars().count() as f64 / 24.0).clamp(0.6, 3.0);
        (seconds * TONE_SAMPLE_RATE as f64 / speed.max(0.1)) as usize
    }

    fn render(text: &str, speed: f64) -> PcmAudio {
        let frames = Self::frame_count(text, speed);
        let samples = (0..frames)
            .map(|i| {
                let t = i as f64 / TONE_SAMPLE_RATE as f64;
                (32767.0 * TONE_AMPLITUDE * (2.0 * std::f64::consts::PI * TONE_FREQ_HZ * t).sin()) as i16
            })
            .collect();
        PcmAudio::new(samples, TONE_SAMPLE_RATE)
    }
}

impl Default for ToneTtsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TtsEnginePort for ToneTtsClient {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResponse, TtsError> {
        if request.text.trim().is_empty() {
            return Err(TtsError::InvalidResponse("Text is empty".to_string()));
        }
        let pcm = Self::render(&request.text, request.speed);
        let duration_ms = pcm.duration_ms();
        let audio_data = WavCodec::encode_pcm16(&pcm);

        tracing::debug!(
            voice_id = %request.voice_id,
            text_len = request.text.len(),
            duration_ms = duration_ms,
            "Tone placeholder rendered"
        );

        Ok(SynthesisResponse {
            audio_data,
            duration_ms: Some(duration_ms),
            sample_rate: Some(TONE_SAMPLE_RATE),
        })
    }

    fn model_version(&self) -> String {
        self.model_version.clone()
    }

    fn native_speed(&self) -> Option<bool> {
        Some(true)
    }
}
