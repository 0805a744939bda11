//! WAV Codec - 基于 symphonia 的 PCM 编解码器
//!
//! 支持：
//! - 16-bit PCM 直接读取（无损）
//! - 其它位深 / 浮点 WAV 经 symphonia 转为 16-bit
//! - 立体声折叠为单声道，按需线性重采样
//! - 编码为标准 44 字节头的 16-bit 单声道 WAV

use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{AudioCodecPort, AudioInfo, CodecError};
use crate::domain::audio::PcmAudio;

const WAVE_FORMAT_PCM: u16 = 1;
const WAV_HEADER_LEN: usize = 44;

/// WAV 编解码器
#[derive(Debug, Clone, Default)]
pub struct WavCodec;

impl WavCodec {
    pub fn new() -> Self {
        Self
    }

    /// 将 16-bit 单声道 PCM 写成 WAV
    pub fn encode_pcm16(pcm: &PcmAudio) -> Vec<u8> {
        let bits_per_sample: u16 = 16;
        let num_channels: u16 = 1;
        let byte_rate = pcm.sample_rate * num_channels as u32 * (bits_per_sample / 8) as u32;
        let block_align = num_channels * (bits_per_sample / 8);

        let data_size = pcm.samples.len() * 2;
        let file_size = 36 + data_size;

        let mut wav = Vec::with_capacity(WAV_HEADER_LEN + data_size);

        // RIFF header
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(file_size as u32).to_le_bytes());
        wav.extend_from_slice(b"WAVE");

        // fmt chunk
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&WAVE_FORMAT_PCM.to_le_bytes());
        wav.extend_from_slice(&num_channels.to_le_bytes());
        wav.extend_from_slice(&pcm.sample_rate.to_le_bytes());
        wav.extend_from_slice(&byte_rate.to_le_bytes());
        wav.extend_from_slice(&block_align.to_le_bytes());
        wav.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&(data_size as u32).to_le_bytes());
        for sample in &pcm.samples {
            wav.extend_from_slice(&sample.to_le_bytes());
        }

        wav
    }

    /// 解析 WAV 文件头
    fn parse_wav_header(&self, data: &[u8]) -> Result<WavHeader, CodecError> {
        if data.len() < WAV_HEADER_LEN {
            return Err(CodecError::InvalidInput("WAV data too short".to_string()));
        }
        if &data[0..4] != b"RIFF" {
            return Err(CodecError::InvalidInput(
                "Invalid WAV: missing RIFF header".to_string(),
            ));
        }
        if &data[8..12] != b"WAVE" {
            return Err(CodecError::InvalidInput(
                "Invalid WAV: missing WAVE identifier".to_string(),
            ));
        }

        let mut pos = 12;
        let mut fmt_chunk: Option<FmtChunk> = None;
        let mut data_chunk: Option<(usize, usize)> = None;

        while pos + 8 <= data.len() {
            let chunk_id = &data[pos..pos + 4];
            let chunk_size =
                u32::from_le_bytes([data[pos + 4], data[pos + 5], data[pos + 6], data[pos + 7]])
                    as usize;

            match chunk_id {
                b"fmt " => {
                    if chunk_size < 16 || pos + 8 + 16 > data.len() {
                        return Err(CodecError::InvalidInput(
                            "Invalid fmt chunk size".to_string(),
                        ));
                    }
                    let fmt = &data[pos + 8..pos + 8 + 16];
                    fmt_chunk = Some(FmtChunk {
                        audio_format: u16::from_le_bytes([fmt[0], fmt[1]]),
                        num_channels: u16::from_le_bytes([fmt[2], fmt[3]]),
                        sample_rate: u32::from_le_bytes([fmt[4], fmt[5], fmt[6], fmt[7]]),
                        bits_per_sample: u16::from_le_bytes([fmt[14], fmt[15]]),
                    });
                }
                b"data" => {
                    let start = pos + 8;
                    // 流式写出的 WAV 可能带占位长度，截到实际字节数
                    let size = chunk_size.min(data.len() - start);
                    data_chunk = Some((start, size));
                    break;
                }
                _ => {}
            }

            pos = pos.saturating_add(8).saturating_add(chunk_size);
            // 对齐到偶数字节
            if chunk_size % 2 != 0 {
                pos = pos.saturating_add(1);
            }
        }

        let fmt = fmt_chunk.ok_or_else(|| {
            CodecError::InvalidInput("Invalid WAV: missing fmt chunk".to_string())
        })?;
        let (data_start, data_size) = data_chunk.ok_or_else(|| {
            CodecError::InvalidInput("Invalid WAV: missing data chunk".to_string())
        })?;

        if fmt.num_channels == 0 {
            return Err(CodecError::InvalidInput(
                "Invalid WAV: zero channels".to_string(),
            ));
        }
        if fmt.sample_rate == 0 {
            return Err(CodecError::InvalidInput(
                "Invalid WAV: zero sample rate".to_string(),
            ));
        }

        Ok(WavHeader {
            fmt,
            data_start,
            data_size,
        })
    }

    /// 16-bit PCM 直接读取交错样本
    fn read_pcm16(data: &[u8], header: &WavHeader) -> Vec<i16> {
        data[header.data_start..header.data_start + header.data_size]
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect()
    }

    /// 使用 symphonia 解码为交错 16-bit 样本
    fn decode_with_symphonia(&self, data: &[u8]) -> Result<Vec<i16>, CodecError> {
        let cursor = Cursor::new(data.to_vec());
        let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

        let mut hint = Hint::new();
        hint.with_extension("wav");

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| CodecError::UnsupportedFormat(format!("Probe failed: {}", e)))?;

        let mut format = probed.format;
        let track = format
            .default_track()
            .ok_or_else(|| CodecError::DecodingError("No audio track found".to_string()))?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| CodecError::UnsupportedFormat(format!("Decoder creation failed: {}", e)))?;

        let track_id = track.id;
        let mut samples: Vec<i16> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(symphonia::core::errors::Error::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    return Err(CodecError::DecodingError(format!(
                        "Packet read error: {}",
                        e
                    )));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(e) => {
                    tracing::warn!("Decode error (skipping packet): {}", e);
                    continue;
                }
            };

            let spec = *decoded.spec();
            let num_frames = decoded.frames();
            let mut sample_buf = SampleBuffer::<i16>::new(num_frames as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);
            let actual_samples = num_frames * spec.channels.count();
            samples.extend(&sample_buf.samples()[..actual_samples]);
        }

        Ok(samples)
    }
}

/// 交错样本折叠为单声道（立体声取平均）
fn fold_to_mono(interleaved: Vec<i16>, channels: u16) -> Vec<i16> {
    if channels == 1 {
        return interleaved;
    }
    interleaved
        .chunks_exact(channels as usize)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

#[derive(Debug)]
struct WavHeader {
    fmt: FmtChunk,
    data_start: usize,
    data_size: usize,
}

#[derive(Debug)]
struct FmtChunk {
    audio_format: u16,
    num_channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

impl AudioCodecPort for WavCodec {
    fn decode(&self, data: &[u8], target_rate: Option<u32>) -> Result<PcmAudio, CodecError> {
        let header = self.parse_wav_header(data)?;
        let channels = header.fmt.num_channels;
        if channels > 2 {
            return Err(CodecError::InvalidInput(format!(
                "Unsupported channel count: {}",
                channels
            )));
        }

        let interleaved =
            if header.fmt.audio_format == WAVE_FORMAT_PCM && header.fmt.bits_per_sample == 16 {
                Self::read_pcm16(data, &header)
            } else {
                tracing::debug!(
                    audio_format = header.fmt.audio_format,
                    bits_per_sample = header.fmt.bits_per_sample,
                    "Decoding non 16-bit WAV via symphonia"
                );
                self.decode_with_symphonia(data)?
            };

        let pcm = PcmAudio::new(fold_to_mono(interleaved, channels), header.fmt.sample_rate);
        match target_rate {
            Some(rate) => Ok(pcm.resampled(rate)?),
            None => Ok(pcm),
        }
    }

    fn encode(&self, pcm: &PcmAudio) -> Result<Vec<u8>, CodecError> {
        if pcm.sample_rate == 0 {
            return Err(CodecError::EncodingError(
                "Sample rate must be positive".to_string(),
            ));
        }
        if pcm.samples.len() * 2 > (u32::MAX as usize - 36) {
            return Err(CodecError::EncodingError(
                "Audio too long for WAV container".to_string(),
            ));
        }
        Ok(Self::encode_pcm16(pcm))
    }

    fn info(&self, data: &[u8]) -> Result<AudioInfo, CodecError> {
        let header = self.parse_wav_header(data)?;

        let bytes_per_frame =
            (header.fmt.bits_per_sample as usize / 8) * header.fmt.num_channels as usize;
        let frames = if bytes_per_frame > 0 {
            header.data_size / bytes_per_frame
        } else {
            0
        };

        Ok(AudioInfo {
            duration_ms: (frames as u64 * 1000) / header.fmt.sample_rate as u64,
            sample_rate: header.fmt.sample_rate,
            channels: header.fmt.num_channels,
            bits_per_sample: header.fmt.bits_per_sample,
            data_size: header.data_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 构造任意位深 / 声道的 PCM WAV，样本为原始字节
    fn raw_wav(sample_rate: u32, channels: u16, bits: u16, payload: &[u8]) -> Vec<u8> {
        let block_align = channels * (bits / 8);
        let byte_rate = sample_rate * block_align as u32;
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&((36 + payload.len()) as u32).to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes());
        wav.extend_from_slice(&channels.to_le_bytes());
        wav.extend_from_slice(&sample_rate.to_le_bytes());
        wav.extend_from_slice(&byte_rate.to_le_bytes());
        wav.extend_from_slice(&block_align.to_le_bytes());
        wav.extend_from_slice(&bits.to_le_bytes());
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        wav.extend_from_slice(payload);
        wav
    }

    #[test]
    fn test_pcm16_roundtrip_is_lossless() {
        let codec = WavCodec::new();
        let samples: Vec<i16> = (0..16000).map(|i| ((i * 37) % 65536 - 32768) as i16).collect();
        let pcm = PcmAudio::new(samples, 16000);

        let wav = codec.encode(&pcm).unwrap();
        assert_eq!(wav.len(), 44 + 32000);
        assert_eq!(codec.decode(&wav, None).unwrap(), pcm);

        let info = codec.info(&wav).unwrap();
        assert_eq!(info.sample_rate, 16000);
        assert_eq!(info.channels, 1);
        assert_eq!(info.bits_per_sample, 16);
        assert_eq!(info.duration_ms, 1000);
        assert!(info.is_mono_pcm16());
    }

    #[test]
    fn test_stereo_folds_to_mono() {
        let codec = WavCodec::new();
        let mut payload = Vec::new();
        for (l, r) in [(1000i16, 3000i16), (-4000, 0), (32767, 32767)] {
            payload.extend_from_slice(&l.to_le_bytes());
            payload.extend_from_slice(&r.to_le_bytes());
        }
        let wav = raw_wav(22050, 2, 16, &payload);

        let pcm = codec.decode(&wav, None).unwrap();
        assert_eq!(pcm.samples, vec![2000, -2000, 32767]);
        assert_eq!(pcm.sample_rate, 22050);
        assert!(!codec.info(&wav).unwrap().is_mono_pcm16());
    }

    #[test]
    fn test_decode_24bit_via_symphonia() {
        let codec = WavCodec::new();
        let mut payload = Vec::new();
        for value in [1000i32 << 8, -(2000i32 << 8)] {
            payload.extend_from_slice(&value.to_le_bytes()[..3]);
        }
        payload.resize(3 * 1600, 0);
        let wav = raw_wav(16000, 1, 24, &payload);

        let pcm = codec.decode(&wav, None).unwrap();
        assert_eq!(pcm.len(), 1600);
        assert!((pcm.samples[0] as i32 - 1000).abs() <= 1);
        assert!((pcm.samples[1] as i32 + 2000).abs() <= 1);
        assert_eq!(pcm.samples[2], 0);
    }

    #[test]
    fn test_decode_resamples_to_target() {
        let codec = WavCodec::new();
        let wav = codec.encode(&PcmAudio::new(vec![100; 22050], 22050)).unwrap();
        let pcm = codec.decode(&wav, Some(16000)).unwrap();
        assert_eq!(pcm.sample_rate, 16000);
        assert!((pcm.len() as i64 - 16000).abs() <= 1);
    }

    #[test]
    fn test_rejects_malformed_input() {
        let codec = WavCodec::new();
        assert!(matches!(
            codec.decode(b"definitely not a wav file, just some text here....", None),
            Err(CodecError::InvalidInput(_))
        ));
        assert!(matches!(codec.info(b"RIFF"), Err(CodecError::InvalidInput(_))));

        let surround = raw_wav(16000, 6, 16, &[0u8; 24]);
        assert!(matches!(
            codec.decode(&surround, None),
            Err(CodecError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_encode_rejects_zero_rate() {
        let codec = WavCodec::new();
        assert!(codec.encode(&PcmAudio::new(vec![1, 2, 3], 0)).is_err());
    }
}
