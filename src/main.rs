//! Voxcast - 空管无线电语音合成服务
//!
//! 启动流程：加载配置 → 初始化日志 → 组装端口实现 → 启动 HTTP 服务

use std::sync::Arc;

use voxcast::application::{EngineRegistryPort, TtsEnginePort};
use voxcast::config::{load_config, load_pronunciation_map, print_config, AppConfig, TtsBackend};
use voxcast::domain::voice::VoiceEngine;
use voxcast::domain::AtcNormalizer;
use voxcast::infrastructure::adapters::{
    EngineRegistry, FileVoiceCatalog, HttpTranscriber, HttpTranscriberConfig, HttpTtsClient,
    HttpTtsClientConfig, ShardedBlobStorage, ToneTtsClient, WavCodec,
};
use voxcast::infrastructure::http::{AppDeps, AppState, HttpServer, ServerConfig};
use voxcast::infrastructure::SledAudioCache;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Voxcast - ATC radio speech synthesis");
    print_config(&config);

    // 确保数据目录存在
    tokio::fs::create_dir_all(&config.storage.data_dir).await?;
    tokio::fs::create_dir_all(config.storage.upload_dir()).await?;

    // 缓存：分片文件树 + Sled 索引
    let blobs = Arc::new(ShardedBlobStorage::new(config.storage.cache_audio_dir()).await?);
    let cache = Arc::new(SledAudioCache::open(config.storage.cache_index_path(), blobs)?);

    let catalog = Arc::new(FileVoiceCatalog::new(&config.storage.voices_dir));
    let engines = build_engines(&config)?;

    let transcriber = Arc::new(HttpTranscriber::new(
        HttpTranscriberConfig::new(&config.transcription.url)
            .with_timeout(config.transcription.timeout_secs)
            .with_device(&config.transcription.device, config.transcription.cpu_fallback),
    )?);

    let normalizer = match &config.tts.pronunciation_map {
        Some(path) => {
            let map = load_pronunciation_map(path)?;
            tracing::info!(entries = map.len(), path = ?path, "Loaded pronunciation map");
            AtcNormalizer::with_pronunciations(map)?
        }
        None => AtcNormalizer::new(),
    };

    let state = AppState::new(AppDeps {
        catalog,
        engines,
        cache,
        codec: Arc::new(WavCodec::new()),
        transcriber,
        normalizer: Arc::new(normalizer),
        settings: config.synthesis_settings(),
        upload_dir: config.storage.upload_dir(),
    });

    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_max_body_bytes(config.storage.max_upload_size as usize);
    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},voxcast={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// 按配置的后端创建两类合成引擎
fn build_engines(config: &AppConfig) -> anyhow::Result<Arc<dyn EngineRegistryPort>> {
    let (neural, parametric): (Arc<dyn TtsEnginePort>, Arc<dyn TtsEnginePort>) =
        match config.tts.backend {
            TtsBackend::Http => {
                let client_config = |url: &str| {
                    HttpTtsClientConfig::new(url)
                        .with_timeout(config.tts.timeout_secs)
                        .with_model_version(&config.tts.model_version)
                        .with_device(&config.tts.device, config.tts.cpu_fallback)
                        .with_native_speed(config.tts.native_speed)
                };
                (
                    Arc::new(HttpTtsClient::new(client_config(&config.tts.url))?),
                    Arc::new(HttpTtsClient::new(client_config(config.tts.parametric_url()))?),
                )
            }
            TtsBackend::Tone => {
                tracing::warn!("Using tone backend, synthesized audio is a placeholder");
                (Arc::new(ToneTtsClient::new()), Arc::new(ToneTtsClient::new()))
            }
        };

    Ok(Arc::new(
        EngineRegistry::new()
            .with_engine(VoiceEngine::Neural, neural)
            .with_engine(VoiceEngine::Parametric, parametric),
    ))
}
