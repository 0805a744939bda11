//! 无线电信道模拟处理链
//!
//! 处理顺序：
//! 高通 → 低通 → 比特压缩 → 软削波 → 底噪 → 静电脉冲 → 干湿混合
//! → 丢包 → 增益 → 峰值归一化 → 尾部淡出 → 幅度抖动
//!
//! 输出长度与采样率始终等于输入，每一步都钳制到 i16 范围。

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use std::f64::consts::PI;

use super::profiles::{find_profile, RadioParams};
use crate::domain::audio::PcmAudio;

/// 默认强度
pub const DEFAULT_INTENSITY: f64 = 0.5;

/// 峰值归一化目标（满幅比例）
const PEAK_TARGET: f64 = 0.92;

#[inline]
fn clamp_i16(x: f64) -> i16 {
    x.clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

/// 强度钳制到 [0, 1]，NaN 视为默认值
pub fn clamp_intensity(intensity: f64) -> f64 {
    if intensity.is_nan() {
        return DEFAULT_INTENSITY;
    }
    intensity.clamp(0.0, 1.0)
}

/// 由预设名、强度和输入长度派生随机种子，相同输入得到相同输出
fn derive_seed(profile: &str, intensity: f64, len: usize) -> u64 {
    let digest = md5::compute(format!("{}|{:.2}|{}", profile, intensity, len));
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest.0[..8]);
    u64::from_le_bytes(bytes)
}

fn highpass(samples: &[i16], alpha: f64) -> Vec<i16> {
    let mut y_prev = 0.0;
    let mut x_prev = 0.0;
    samples
        .iter()
        .map(|&x| {
            let x = x as f64;
            y_prev = alpha * (y_prev + x - x_prev);
            x_prev = x;
            clamp_i16(y_prev)
        })
        .collect()
}

fn lowpass(samples: &[i16], alpha: f64) -> Vec<i16> {
    let mut y_prev = 0.0;
    samples
        .iter()
        .map(|&x| {
            y_prev += alpha * (x as f64 - y_prev);
            clamp_i16(y_prev)
        })
        .collect()
}

fn bitcrush(samples: &mut [i16], drop_bits: u32) {
    if drop_bits == 0 {
        return;
    }
    let mask = !((1i16 << drop_bits.min(15)) - 1);
    for s in samples.iter_mut() {
        *s &= mask;
    }
}

fn soft_clip(samples: &mut [i16], drive: f64) {
    for s in samples.iter_mut() {
        *s = clamp_i16((drive * (*s as f64 / 32767.0)).tanh() * 32767.0);
    }
}

fn add_noise(samples: &mut [i16], level: f64, rng: &mut Pcg32) {
    if level <= 0.0 {
        return;
    }
    for s in samples.iter_mut() {
        let noise = rng.gen_range(-1.0..=1.0) * 32767.0 * level;
        *s = clamp_i16(*s as f64 + noise);
    }
}

/// 静电脉冲：每个样本以 probability 触发一次固定长度的噪声脉冲，脉冲后跳过
fn add_static_bursts(samples: &mut [i16], level: f64, probability: f64, burst_len: usize, rng: &mut Pcg32) {
    if level <= 0.0 || probability <= 0.0 {
        return;
    }
    let n = samples.len();
    let mut i = 0;
    while i < n {
        if rng.gen::<f64>() < probability {
            let end = (i + burst_len).min(n);
            for s in &mut samples[i..end] {
                let noise = rng.gen_range(-1.0..=1.0) * 32767.0 * level;
                *s = clamp_i16(*s as f64 + noise);
            }
            i = end;
        } else {
            i += 1;
        }
    }
}

fn mix(dry: &[i16], wet: &[i16], wet_mix: f64) -> Vec<i16> {
    let wet_mix = wet_mix.clamp(0.0, 1.0);
    let dry_mix = 1.0 - wet_mix;
    dry.iter()
        .zip(wet)
        .map(|(&a, &b)| clamp_i16(a as f64 * dry_mix + b as f64 * wet_mix))
        .collect()
}

/// 丢包：随机将 1..=max_len 个样本置零
fn apply_dropouts(samples: &mut [i16], probability: f64, max_len: usize, rng: &mut Pcg32) {
    if probability <= 0.0 || max_len == 0 {
        return;
    }
    let n = samples.len();
    let mut i = 0;
    while i < n {
        if rng.gen::<f64>() < probability {
            let end = (i + rng.gen_range(1..=max_len)).min(n);
            samples[i..end].fill(0);
            i = end;
        } else {
            i += 1;
        }
    }
}

fn apply_gain(samples: &mut [i16], gain: f64) {
    if gain == 1.0 {
        return;
    }
    for s in samples.iter_mut() {
        *s = clamp_i16(*s as f64 * gain);
    }
}

fn normalize_peak(samples: &mut [i16], target: f64) {
    let peak = samples.iter().map(|&s| (s as i32).abs()).max().unwrap_or(0);
    if peak == 0 {
        return;
    }
    let scale = target * 32767.0 / peak as f64;
    for s in samples.iter_mut() {
        *s = clamp_i16(*s as f64 * scale);
    }
}

fn fade_tail(samples: &mut [i16], sample_rate: u32, tail_seconds: f64) {
    let count = (sample_rate as f64 * tail_seconds) as usize;
    if count == 0 || count > samples.len() {
        return;
    }
    let start = samples.len() - count;
    for (i, s) in samples[start..].iter_mut().enumerate() {
        let factor = (1.0 - i as f64 / count as f64).max(0.0);
        *s = (*s as f64 * factor) as i16;
    }
}

fn am_wobble(samples: &mut [i16], sample_rate: u32, depth: f64, rate_hz: f64) {
    if depth <= 0.0 || rate_hz <= 0.0 || sample_rate == 0 {
        return;
    }
    let depth = depth.min(1.0);
    let two_pi_f = 2.0 * PI * rate_hz;
    for (idx, s) in samples.iter_mut().enumerate() {
        let t = idx as f64 / sample_rate as f64;
        let modulation = 1.0 - depth * (0.5 - 0.5 * (two_pi_f * t).cos());
        *s = clamp_i16(*s as f64 * modulation);
    }
}

/// 按强度缩放预设
///
/// 强度 0.5 等于原始预设；湿信号比例在 [0, 0.5] 内线性增至预设值，
/// 在 [0.5, 1] 内线性增至 1.0。噪声、脉冲与丢包幅度按 2 × 强度缩放。
fn scale_params(params: &RadioParams, intensity: f64) -> RadioParams {
    let wet = if intensity <= 0.5 {
        params.wet * (intensity / 0.5)
    } else {
        params.wet + (1.0 - params.wet) * ((intensity - 0.5) / 0.5)
    };
    let noise_scale = intensity * 2.0;

    RadioParams {
        wet,
        hiss: params.hiss * noise_scale,
        burst_level: params.burst_level * noise_scale,
        drop_prob: params.drop_prob * noise_scale,
        ..*params
    }
}

/// 对 PCM 应用无线电效果
///
/// clean、未知预设名和空输入原样返回，不会报错。
pub fn apply_profile(pcm: &PcmAudio, profile: &str, intensity: f64) -> PcmAudio {
    let params = match find_profile(profile).and_then(|p| p.params) {
        Some(params) => params,
        None => return pcm.clone(),
    };
    if pcm.is_empty() || pcm.sample_rate == 0 {
        return pcm.clone();
    }

    let intensity = clamp_intensity(intensity);
    let p = scale_params(&params, intensity);
    let sr = pcm.sample_rate;
    let mut rng = Pcg32::seed_from_u64(derive_seed(profile, intensity, pcm.len()));

    let dt = 1.0 / sr as f64;
    let hp_rc = 1.0 / (2.0 * PI * p.hp);
    let lp_rc = 1.0 / (2.0 * PI * p.lp);
    let hp_alpha = hp_rc / (hp_rc + dt);
    let lp_alpha = dt / (lp_rc + dt);

    let band = lowpass(&highpass(&pcm.samples, hp_alpha), lp_alpha);

    let mut wet = band.clone();
    bitcrush(&mut wet, p.crush);
    soft_clip(&mut wet, p.drive);
    add_noise(&mut wet, p.hiss, &mut rng);
    let burst_prob = p.bursts_per_s / sr as f64;
    let burst_len = ((sr as f64 * p.burst_len_s) as usize).max(1);
    add_static_bursts(&mut wet, p.burst_level, burst_prob, burst_len, &mut rng);

    let mut out = mix(&band, &wet, p.wet);

    if p.drop_prob > 0.0 && p.drop_len_s > 0.0 {
        let max_drop = ((sr as f64 * p.drop_len_s) as usize).max(1);
        apply_dropouts(&mut out, p.drop_prob, max_drop, &mut rng);
    }

    apply_gain(&mut out, p.gain);
    normalize_peak(&mut out, PEAK_TARGET);
    fade_tail(&mut out, sr, p.tail);
    am_wobble(&mut out, sr, p.wobble_depth, p.wobble_hz);

    PcmAudio::new(out, sr)
}
