//! 片段拼接
//!
//! 停顿 > 0：前一段尾部淡出，插入精确长度的静音，下一段头部淡入。
//! 停顿 = 0：两段在重叠区间内线性交叉淡化。

use super::{ms_to_frames, AudioError};

/// 默认交叉淡化时长（毫秒）
pub const DEFAULT_CROSSFADE_MS: u32 = 15;

fn fade_out(samples: &mut [i16], frames: usize) {
    let frames = frames.min(samples.len());
    if frames == 0 {
        return;
    }
    let offset = samples.len() - frames;
    for (idx, sample) in samples[offset..].iter_mut().enumerate() {
        let scale = (frames - idx) as f64 / frames as f64;
        *sample = (*sample as f64 * scale) as i16;
    }
}

fn fade_in(samples: &mut [i16], frames: usize) {
    let frames = frames.min(samples.len());
    if frames == 0 {
        return;
    }
    for (idx, sample) in samples[..frames].iter_mut().enumerate() {
        let scale = (idx + 1) as f64 / frames as f64;
        *sample = (*sample as f64 * scale) as i16;
    }
}

/// 拼接 PCM 片段
///
/// 所有片段必须已经处于同一采样率，`pauses_ms.len()` 必须等于 `chunks.len() - 1`。
pub fn stitch(
    chunks: &[Vec<i16>],
    sample_rate: u32,
    pauses_ms: &[u32],
    crossfade_ms: u32,
) -> Result<Vec<i16>, AudioError> {
    let (first, rest) = chunks.split_first().ok_or(AudioError::NoChunks)?;
    if pauses_ms.len() != rest.len() {
        return Err(AudioError::PauseCountMismatch {
            expected: rest.len(),
            actual: pauses_ms.len(),
        });
    }

    let crossfade = ms_to_frames(sample_rate, crossfade_ms);
    let mut stitched = first.clone();

    for (next, &pause_ms) in rest.iter().zip(pauses_ms) {
        let pause = ms_to_frames(sample_rate, pause_ms);

        if pause > 0 {
            fade_out(&mut stitched, crossfade);
            stitched.resize(stitched.len() + pause, 0);
            let start = stitched.len();
            stitched.extend_from_slice(next);
            fade_in(&mut stitched[start..], crossfade);
            continue;
        }

        let overlap = crossfade.min(stitched.len()).min(next.len());
        let offset = stitched.len() - overlap;
        for i in 0..overlap {
            let t = (i + 1) as f64 / overlap as f64;
            let mixed = stitched[offset + i] as f64 * (1.0 - t) + next[i] as f64 * t;
            stitched[offset + i] = mixed as i16;
        }
        stitched.extend_from_slice(&next[overlap..]);
    }

    Ok(stitched)
}
