//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml / config.local.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, TtsBackend};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// # 环境变量示例
/// - `VOXCAST_SERVER__PORT=8080`
/// - `VOXCAST_TTS__URL=http://tts-server:8000`
/// - `VOXCAST_CACHE__MODE=full`
/// - `VOXCAST_STORAGE__DATA_DIR=/data`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("tts.backend", "http")?
        .set_default("tts.url", "http://localhost:8000")?
        .set_default("tts.timeout_secs", 120)?
        .set_default("tts.model_version", "xtts_v2")?
        .set_default("tts.device", "cuda")?
        .set_default("tts.cpu_fallback", true)?
        .set_default("transcription.url", "http://localhost:8001")?
        .set_default("transcription.timeout_secs", 120)?
        .set_default("transcription.device", "cuda")?
        .set_default("transcription.cpu_fallback", true)?
        .set_default("cache.mode", "segment")?
        .set_default("cache.enabled", true)?
        .set_default("storage.data_dir", "data")?
        .set_default("storage.voices_dir", "voices")?
        .set_default("storage.max_upload_size", 25 * 1024 * 1024)?
        .set_default("synthesis.max_parallel_segments", 1)?
        .set_default("synthesis.default_language", "en")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级），前缀 VOXCAST_，层级分隔符 __
    builder = builder.add_source(
        Environment::with_prefix("VOXCAST")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.tts.backend == TtsBackend::Http && config.tts.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "TTS URL cannot be empty for the http backend".to_string(),
        ));
    }

    if config.transcription.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Transcription URL cannot be empty".to_string(),
        ));
    }

    if config.synthesis.max_parallel_segments == 0 {
        return Err(ConfigError::ValidationError(
            "synthesis.max_parallel_segments must be at least 1".to_string(),
        ));
    }

    if config.synthesis.default_language.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "synthesis.default_language cannot be empty".to_string(),
        ));
    }

    if config.storage.max_upload_size == 0 {
        return Err(ConfigError::ValidationError(
            "storage.max_upload_size cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 读取发音替换表
///
/// `.json` 按 JSON 对象解析，其它扩展名按 TOML（`word = "replacement"`）解析
pub fn load_pronunciation_map(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::LoadError(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

    let map: HashMap<String, String> = if is_json {
        serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?
    } else {
        toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?
    };

    Ok(map
        .into_iter()
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, v)| !k.is_empty() && !v.is_empty())
        .collect())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Public Base URL: {}", config.server.public_base_url());
    tracing::info!("TTS Backend: {:?}", config.tts.backend);
    tracing::info!("TTS URL: {}", config.tts.url);
    tracing::info!("TTS Parametric URL: {}", config.tts.parametric_url());
    tracing::info!("TTS Model Version: {}", config.tts.model_version);
    tracing::info!("TTS Device: {} (cpu fallback: {})", config.tts.device, config.tts.cpu_fallback);
    if let Some(map) = &config.tts.pronunciation_map {
        tracing::info!("Pronunciation Map: {:?}", map);
    }
    tracing::info!("Transcription URL: {}", config.transcription.url);
    tracing::info!("Cache Mode: {} (enabled: {})", config.cache.mode.as_str(), config.cache.enabled);
    tracing::info!("Data Directory: {:?}", config.storage.data_dir);
    tracing::info!("Voices Directory: {:?}", config.storage.voices_dir);
    tracing::info!("Max Parallel Segments: {}", config.synthesis.max_parallel_segments);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
