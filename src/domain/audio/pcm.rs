//! PCM 音频缓冲

use super::AudioError;

/// 16-bit 单声道 PCM 音频
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PcmAudio {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl PcmAudio {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 时长（毫秒）
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1000 / self.sample_rate as u64
    }

    /// 重采样到目标采样率（相同则原样返回）
    pub fn resampled(self, target_rate: u32) -> Result<Self, AudioError> {
        if target_rate == self.sample_rate {
            return Ok(self);
        }
        let samples = resample_linear(&self.samples, self.sample_rate, target_rate)?;
        Ok(Self::new(samples, target_rate))
    }
}

/// 毫秒转帧数（向下取整）
#[inline]
pub fn ms_to_frames(sample_rate: u32, ms: u32) -> usize {
    (sample_rate as u64 * ms as u64 / 1000) as usize
}

/// 线性插值重采样
///
/// 输出长度 = round(len * dst / src)，首尾样本与输入对齐。
pub fn resample_linear(samples: &[i16], src_rate: u32, dst_rate: u32) -> Result<Vec<i16>, AudioError> {
    if src_rate == 0 {
        return Err(AudioError::InvalidSampleRate(src_rate));
    }
    if dst_rate == 0 {
        return Err(AudioError::InvalidSampleRate(dst_rate));
    }
    if src_rate == dst_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let len = samples.len();
    let out_len = ((len as f64 * dst_rate as f64 / src_rate as f64).round() as usize).max(1);
    let scale = (len - 1) as f64 / (out_len.saturating_sub(1)).max(1) as f64;

    let out = (0..out_len)
        .map(|i| {
            let pos = i as f64 * scale;
            let idx = (pos as usize).min(len - 1);
            let frac = pos - idx as f64;
            let a = samples[idx] as f64;
            let b = samples[(idx + 1).min(len - 1)] as f64;
            (a + (b - a) * frac) as i16
        })
        .collect();

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resample_same_rate_is_identity() {
        let samples = vec![1, 2, 3, 4];
        assert_eq!(resample_linear(&samples, 22050, 22050).unwrap(), samples);
    }

    #[test]
    fn test_resample_length() {
        let samples = vec![0i16; 2205];
        let out = resample_linear(&samples, 22050, 16000).unwrap();
        assert_eq!(out.len(), 1600);

        let out = resample_linear(&samples, 22050, 44100).unwrap();
        assert_eq!(out.len(), 4410);
    }

    #[test]
    fn test_resample_keeps_endpoints() {
        let samples: Vec<i16> = (0..100).map(|i| i * 100).collect();
        let out = resample_linear(&samples, 8000, 16000).unwrap();
        assert_eq!(out[0], 0);
        assert!(*out.last().unwrap() >= 9899);
    }

    #[test]
    fn test_resample_invalid_rate() {
        assert_eq!(
            resample_linear(&[1, 2], 0, 16000),
            Err(AudioError::InvalidSampleRate(0))
        );
    }

    #[test]
    fn test_ms_to_frames() {
        assert_eq!(ms_to_frames(22050, 140), 3087);
        assert_eq!(ms_to_frames(22050, 15), 330);
        assert_eq!(ms_to_frames(16000, 0), 0);
    }

    #[test]
    fn test_duration() {
        let pcm = PcmAudio::new(vec![0; 22050], 22050);
        assert_eq!(pcm.duration_ms(), 1000);
    }
}
