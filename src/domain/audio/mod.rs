//! Audio Context - PCM 音频处理
//!
//! 纯函数实现，全部基于 16-bit 单声道 PCM：
//! - pcm: 音频缓冲与线性重采样
//! - edit: 静音裁剪、变速
//! - stitch: 片段拼接（交叉淡化 + 静音间隔）

mod edit;
mod errors;
mod pcm;
mod stitch;

pub use edit::{adjust_speed, trim_silence, DEFAULT_PAD_MS, DEFAULT_THRESHOLD_DB, MAX_SPEED, MIN_SPEED};
pub use errors::AudioError;
pub use pcm::{ms_to_frames, resample_linear, PcmAudio};
pub use stitch::{stitch, DEFAULT_CROSSFADE_MS};
