//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::application::{CacheGranularity, SynthesisSettings};
use crate::domain::audio::DEFAULT_CROSSFADE_MS;
use crate::domain::{DEFAULT_HARD_PAUSE_MS, DEFAULT_SOFT_PAUSE_MS};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// TTS 引擎配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 语音识别配置
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// 缓存配置
    #[serde(default)]
    pub cache: CacheConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 合成参数
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// 合成处理器参数
    ///
    /// http 后端时参考音频以本服务的 URL 形式交给合成服务
    pub fn synthesis_settings(&self) -> SynthesisSettings {
        SynthesisSettings {
            granularity: self.cache.mode,
            cache_enabled: self.cache.enabled,
            hard_pause_ms: self.synthesis.hard_pause_ms,
            soft_pause_ms: self.synthesis.soft_pause_ms,
            crossfade_ms: self.synthesis.crossfade_ms,
            max_parallel_segments: self.synthesis.max_parallel_segments,
            default_language: self.synthesis.default_language.clone(),
            reference_base_url: match self.tts.backend {
                TtsBackend::Http => Some(self.server.public_base_url()),
                TtsBackend::Tone => None,
            },
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 公开访问的 Base URL（合成服务通过它拉取参考音频）
    /// 如果未设置，则使用 http://{host}:{port}
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 获取公开的 Base URL
    pub fn public_base_url(&self) -> String {
        self.base_url
            .clone()
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| {
                let host = if self.host == "0.0.0.0" {
                    "localhost"
                } else {
                    &self.host
                };
                format!("http://{}:{}", host, self.port)
            })
    }
}

/// 合成后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsBackend {
    /// 外部 HTTP 合成服务
    #[default]
    Http,
    /// 内置正弦波占位引擎
    Tone,
}

/// TTS 引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    #[serde(default)]
    pub backend: TtsBackend,

    /// 神经（xtts）合成服务基础 URL
    #[serde(default = "default_tts_url")]
    pub url: String,

    /// 参数（coqui_vits）合成服务 URL，未设置时与 url 相同
    #[serde(default)]
    pub parametric_url: Option<String>,

    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// 模型版本，参与缓存 key
    #[serde(default = "default_model_version")]
    pub model_version: String,

    /// 推理设备：cuda / cpu
    #[serde(default = "default_device")]
    pub device: String,

    /// cuda 失败后用 cpu 重试一次
    #[serde(default = "default_true")]
    pub cpu_fallback: bool,

    /// 合成服务是否自行处理语速；未设置时由本服务变速
    #[serde(default)]
    pub native_speed: Option<bool>,

    /// 发音替换表（.toml / .json）
    #[serde(default)]
    pub pronunciation_map: Option<PathBuf>,
}

fn default_tts_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_model_version() -> String {
    "xtts_v2".to_string()
}

fn default_device() -> String {
    "cuda".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            backend: TtsBackend::default(),
            url: default_tts_url(),
            parametric_url: None,
            timeout_secs: default_timeout(),
            model_version: default_model_version(),
            device: default_device(),
            cpu_fallback: true,
            native_speed: None,
            pronunciation_map: None,
        }
    }
}

impl TtsConfig {
    pub fn parametric_url(&self) -> &str {
        self.parametric_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(&self.url)
    }
}

/// 语音识别配置
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionConfig {
    #[serde(default = "default_transcription_url")]
    pub url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_device")]
    pub device: String,

    #[serde(default = "default_true")]
    pub cpu_fallback: bool,
}

fn default_transcription_url() -> String {
    "http://localhost:8001".to_string()
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            url: default_transcription_url(),
            timeout_secs: default_timeout(),
            device: default_device(),
            cpu_fallback: true,
        }
    }
}

/// 缓存配置
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// full：整句缓存；segment：分段缓存
    #[serde(default)]
    pub mode: CacheGranularity,

    /// 全局开关，请求可单独覆盖
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            mode: CacheGranularity::default(),
            enabled: true,
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 缓存索引与音频文件根目录
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// 音色目录
    #[serde(default = "default_voices_dir")]
    pub voices_dir: PathBuf,

    /// 上传文件最大大小（字节），默认 25MB
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_voices_dir() -> PathBuf {
    PathBuf::from("voices")
}

fn default_max_upload_size() -> u64 {
    25 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            voices_dir: default_voices_dir(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

impl StorageConfig {
    /// Sled 索引路径
    pub fn cache_index_path(&self) -> PathBuf {
        self.data_dir.join("cache.sled")
    }

    /// 缓存音频根目录
    pub fn cache_audio_dir(&self) -> PathBuf {
        self.data_dir.join("cache_audio")
    }

    /// 识别上传临时目录
    pub fn upload_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }
}

/// 合成参数配置
#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisConfig {
    #[serde(default = "default_hard_pause_ms")]
    pub hard_pause_ms: u32,

    #[serde(default = "default_soft_pause_ms")]
    pub soft_pause_ms: u32,

    #[serde(default = "default_crossfade_ms")]
    pub crossfade_ms: u32,

    /// 分段缓存解析的并发度
    #[serde(default = "default_max_parallel_segments")]
    pub max_parallel_segments: usize,

    #[serde(default = "default_language")]
    pub default_language: String,
}

fn default_hard_pause_ms() -> u32 {
    DEFAULT_HARD_PAUSE_MS
}

fn default_soft_pause_ms() -> u32 {
    DEFAULT_SOFT_PAUSE_MS
}

fn default_crossfade_ms() -> u32 {
    DEFAULT_CROSSFADE_MS
}

fn default_max_parallel_segments() -> usize {
    1
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            hard_pause_ms: default_hard_pause_ms(),
            soft_pause_ms: default_soft_pause_ms(),
            crossfade_ms: default_crossfade_ms(),
            max_parallel_segments: default_max_parallel_segments(),
            default_language: default_language(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
