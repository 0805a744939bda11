//! 音频编辑：静音裁剪、变速

use super::{ms_to_frames, resample_linear, AudioError, PcmAudio};

/// 静音判定阈值默认值（dBFS）
pub const DEFAULT_THRESHOLD_DB: f64 = -45.0;

/// 裁剪后保留的首尾余量（毫秒）
pub const DEFAULT_PAD_MS: u32 = 5;

/// 语速下限
pub const MIN_SPEED: f64 = 0.5;

/// 语速上限
pub const MAX_SPEED: f64 = 1.5;

/// 裁剪首尾静音
///
/// 找到第一个和最后一个超过阈值的样本，两侧各保留 pad_ms 余量。
/// 没有样本超过阈值时原样返回。
pub fn trim_silence(pcm: &PcmAudio, threshold_db: f64, pad_ms: u32) -> PcmAudio {
    let samples = &pcm.samples;
    if samples.is_empty() {
        return pcm.clone();
    }

    let threshold = ((32767.0 * 10f64.powf(threshold_db / 20.0)) as i32).max(1);
    let loud = |s: &i16| (*s as i32).abs() > threshold;

    let (start, end) = match (samples.iter().position(loud), samples.iter().rposition(loud)) {
        (Some(start), Some(end)) => (start, end),
        _ => return pcm.clone(),
    };

    let pad = ms_to_frames(pcm.sample_rate, pad_ms);
    let start = start.saturating_sub(pad);
    let end = (end + pad).min(samples.len() - 1);
    if end <= start {
        return pcm.clone();
    }

    PcmAudio::new(samples[start..=end].to_vec(), pcm.sample_rate)
}

/// 调整语速
///
/// 以 sr / speed 为目标采样率重采样帧数，但保持声明的采样率不变，
/// 因此音高会随之变化。speed 钳制到 [0.5, 1.5]，与 1.0 相差小于 1e-3 时不处理。
pub fn adjust_speed(pcm: &PcmAudio, speed: f64) -> Result<PcmAudio, AudioError> {
    if speed.is_nan() || speed <= 0.0 {
        return Err(AudioError::NonPositiveSpeed);
    }
    let speed = speed.clamp(MIN_SPEED, MAX_SPEED);
    if (speed - 1.0).abs() < 1e-3 {
        return Ok(pcm.clone());
    }

    let target_rate = ((pcm.sample_rate as f64 / speed) as u32).clamp(8000, 96000);
    let samples = resample_linear(&pcm.samples, pcm.sample_rate, target_rate)?;
    Ok(PcmAudio::new(samples, pcm.sample_rate))
}
