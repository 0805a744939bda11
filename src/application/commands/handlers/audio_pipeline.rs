//! 合成后处理：解码 → 裁剪 → 拼接 → 变速 → 无线电效果 → 编码
//!
//! 全部为同步 CPU 计算，由调用方放进 spawn_blocking。

use crate::application::error::ApplicationError;
use crate::application::ports::AudioCodecPort;
use crate::domain::audio::{
    adjust_speed, stitch, trim_silence, PcmAudio, DEFAULT_PAD_MS, DEFAULT_THRESHOLD_DB,
};
use crate::domain::radio::{apply_profile, is_effect_profile};

/// 无线电效果参数
#[derive(Debug, Clone)]
pub struct RadioSettings {
    pub profile: String,
    pub intensity: f64,
}

/// 拼接参数
#[derive(Debug, Clone)]
pub struct RenderPlan {
    pub pauses_ms: Vec<u32>,
    pub crossfade_ms: u32,
    /// 需要后期变速时为 Some
    pub speed: Option<f64>,
    pub radio: Option<RadioSettings>,
}

/// 对 WAV 施加无线电效果
///
/// 非 16-bit 单声道或无法解码时原样返回；输出长度与采样率不变。
pub fn apply_radio_to_wav(
    codec: &dyn AudioCodecPort,
    wav: Vec<u8>,
    profile: &str,
    intensity: f64,
) -> Vec<u8> {
    if !is_effect_profile(Some(profile)) {
        return wav;
    }
    match codec.info(&wav) {
        Ok(info) if info.is_mono_pcm16() => {}
        Ok(info) => {
            tracing::debug!(
                channels = info.channels,
                bits_per_sample = info.bits_per_sample,
                "Radio effect skipped for non mono 16-bit audio"
            );
            return wav;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Radio effect skipped, cannot parse audio");
            return wav;
        }
    }

    let pcm = match codec.decode(&wav, None) {
        Ok(pcm) => pcm,
        Err(e) => {
            tracing::warn!(error = %e, "Radio effect skipped, decode failed");
            return wav;
        }
    };
    let processed = apply_profile(&pcm, profile, intensity);
    match codec.encode(&processed) {
        Ok(out) => out,
        Err(e) => {
            tracing::warn!(error = %e, "Radio effect skipped, encode failed");
            wav
        }
    }
}

/// 拼接分段音频并完成后处理
pub fn render_segments(
    codec: &dyn AudioCodecPort,
    chunks: &[Vec<u8>],
    plan: &RenderPlan,
) -> Result<Vec<u8>, ApplicationError> {
    let (first, rest) = chunks
        .split_first()
        .ok_or_else(|| ApplicationError::invalid("No audio segments to stitch"))?;

    let first = codec.decode(first, None)?;
    let sample_rate = first.sample_rate;
    let mut decoded = Vec::with_capacity(chunks.len());
    decoded.push(first);
    for chunk in rest {
        decoded.push(codec.decode(chunk, Some(sample_rate))?);
    }

    let trimmed: Vec<Vec<i16>> = decoded
        .into_iter()
        .map(|pcm| {
            let cut = trim_silence(&pcm, DEFAULT_THRESHOLD_DB, DEFAULT_PAD_MS);
            if cut.is_empty() {
                pcm.samples
            } else {
                cut.samples
            }
        })
        .collect();

    let samples = stitch(&trimmed, sample_rate, &plan.pauses_ms, plan.crossfade_ms)?;
    let mut pcm = PcmAudio::new(samples, sample_rate);

    if let Some(speed) = plan.speed {
        match adjust_speed(&pcm, speed) {
            Ok(adjusted) => pcm = adjusted,
            Err(e) => {
                tracing::warn!(speed = speed, error = %e, "Speed adjust failed, keeping original tempo");
            }
        }
    }

    if let Some(radio) = &plan.radio {
        pcm = apply_profile(&pcm, &radio.profile, radio.intensity);
    }

    Ok(codec.encode(&pcm)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::codec::WavCodec;

    fn tone(len: usize, sample_rate: u32) -> Vec<u8> {
        let samples = (0..len)
            .map(|i| ((i as f64 * 0.07).sin() * 12000.0) as i16)
            .collect();
        WavCodec::new().encode(&PcmAudio::new(samples, sample_rate)).unwrap()
    }

    #[test]
    fn test_render_inserts_pause() {
        let codec = WavCodec::new();
        let chunks = vec![tone(2000, 22050), tone(1000, 22050)];
        let plan = RenderPlan {
            pauses_ms: vec![140],
            crossfade_ms: 15,
            speed: None,
            radio: None,
        };
        let out = render_segments(&codec, &chunks, &plan).unwrap();
        let pcm = codec.decode(&out, None).unwrap();
        assert_eq!(pcm.sample_rate, 22050);
        assert!(pcm.len() >= 3000 + 3087 - 4);
    }

    #[test]
    fn test_render_resamples_to_first_rate() {
        let codec = WavCodec::new();
        let chunks = vec![tone(1600, 16000), tone(2205, 22050)];
        let plan = RenderPlan {
            pauses_ms: vec![0],
            crossfade_ms: 0,
            speed: None,
            radio: None,
        };
        let out = render_segments(&codec, &chunks, &plan).unwrap();
        assert_eq!(codec.info(&out).unwrap().sample_rate, 16000);
    }

    #[test]
    fn test_render_with_radio_keeps_length() {
        let codec = WavCodec::new();
        let chunks = vec![tone(4000, 22050)];
        let clean = render_segments(
            &codec,
            &chunks,
            &RenderPlan { pauses_ms: vec![], crossfade_ms: 15, speed: None, radio: None },
        )
        .unwrap();
        let radio = render_segments(
            &codec,
            &chunks,
            &RenderPlan {
                pauses_ms: vec![],
                crossfade_ms: 15,
                speed: None,
                radio: Some(RadioSettings { profile: "vhf".into(), intensity: 0.5 }),
            },
        )
        .unwrap();
        assert_eq!(clean.len(), radio.len());
        assert_ne!(clean, radio);
    }

    #[test]
    fn test_render_rejects_empty() {
        let codec = WavCodec::new();
        let plan = RenderPlan { pauses_ms: vec![], crossfade_ms: 15, speed: None, radio: None };
        assert!(matches!(
            render_segments(&codec, &[], &plan),
            Err(ApplicationError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_apply_radio_passthrough() {
        let codec = WavCodec::new();
        let wav = tone(2000, 22050);
        assert_eq!(apply_radio_to_wav(&codec, wav.clone(), "clean", 0.5), wav);
        assert_eq!(apply_radio_to_wav(&codec, wav.clone(), "unknown", 0.5), wav);
        assert_eq!(apply_radio_to_wav(&codec, b"garbage".to_vec(), "vhf", 0.5), b"garbage".to_vec());

        let processed = apply_radio_to_wav(&codec, wav.clone(), "congested", 1.0);
        assert_eq!(processed.len(), wav.len());
        assert_ne!(processed, wav);
    }
}
