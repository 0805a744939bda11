//! HTTP TTS Client - 调用外部 TTS HTTP 服务
//!
//! 实现 TtsEnginePort trait，通过 HTTP 调用外部 TTS 服务
//!
//! 外部 TTS API:
//! POST http://localhost:8000/api/tts/infer
//! Request: {"text": "...", "voice_id": "...", "voice_ref": "http://...", "language": "en", "speed": 1.0, "device": "cuda"}
//! Response: audio/wav binary, metadata in headers

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{SynthesisRequest, SynthesisResponse, TtsEnginePort, TtsError};

/// TTS 推理请求体 (JSON)
#[derive(Debug, Clone, Serialize)]
struct TtsHttpRequest<'a> {
    text: &'a str,
    voice_id: &'a str,
    /// 参考音频的 URL 或路径（TTS 服务自行下载/读取并缓存）
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_ref: Option<&'a str>,
    language: &'a str,
    speed: f64,
    device: &'a str,
}

/// HTTP TTS 客户端配置
#[derive(Debug, Clone)]
pub struct HttpTtsClientConfig {
    /// TTS 服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 模型版本（参与缓存 key）
    pub model_version: String,
    /// 推理设备：cuda / cpu
    pub device: String,
    /// cuda 推理失败时是否用 cpu 重试一次
    pub cpu_fallback: bool,
    /// 服务端是否自行处理语速
    pub native_speed: Option<bool>,
}

impl Default for HttpTtsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 120,
            model_version: "xtts_v2".to_string(),
            device: "cuda".to_string(),
            cpu_fallback: true,
            native_speed: None,
        }
    }
}

impl HttpTtsClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_model_version(mut self, model_version: impl Into<String>) -> Self {
        self.model_version = model_version.into();
        self
    }

    pub fn with_device(mut self, device: impl Into<String>, cpu_fallback: bool) -> Self {
        self.device = device.into();
        self.cpu_fallback = cpu_fallback;
        self
    }

    pub fn with_native_speed(mut self, native_speed: Option<bool>) -> Self {
        self.native_speed = native_speed;
        self
    }

    fn should_fallback(&self) -> bool {
        self.cpu_fallback && self.device.eq_ignore_ascii_case("cuda")
    }
}

/// HTTP TTS 客户端
///
/// 通过 HTTP 调用外部 TTS 服务
pub struct HttpTtsClient {
    client: Client,
    config: HttpTtsClientConfig,
}

impl HttpTtsClient {
    /// 创建新的 HTTP TTS 客户端
    pub fn new(config: HttpTtsClientConfig) -> Result<Self, TtsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 获取推理 URL
    fn infer_url(&self) -> String {
        format!("{}/api/tts/infer", self.config.base_url.trim_end_matches('/'))
    }

    /// 获取健康检查 URL
    fn health_url(&self) -> String {
        format!("{}/health", self.config.base_url.trim_end_matches('/'))
    }

    async fn infer_on(
        &self,
        request: &SynthesisRequest,
        device: &str,
    ) -> Result<SynthesisResponse, TtsError> {
        let http_request = TtsHttpRequest {
            text: &request.text,
            voice_id: &request.voice_id,
            voice_ref: request.voice_ref.as_deref(),
            language: &request.language,
            speed: request.speed,
            device,
        };

        tracing::debug!(
            url = %self.infer_url(),
            text_len = http_request.text.len(),
            voice_id = %request.voice_id,
            device = device,
            "Sending TTS infer request"
        );

        let response = self
            .client
            .post(self.infer_url())
            .json(&http_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout
                } else if e.is_connect() {
                    TtsError::NetworkError(format!("Cannot connect to TTS service: {}", e))
                } else {
                    TtsError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TtsError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        // 从 headers 提取元数据
        let headers = response.headers();
        let duration_ms = headers
            .get("X-TTS-Duration-Ms")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let sample_rate = headers
            .get("X-TTS-Sample-Rate")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| TtsError::InvalidResponse(format!("Failed to read audio: {}", e)))?
            .to_vec();
        if audio_data.is_empty() {
            return Err(TtsError::InvalidResponse("Empty audio body".to_string()));
        }

        tracing::info!(
            voice_id = %request.voice_id,
            duration_ms = ?duration_ms,
            sample_rate = ?sample_rate,
            audio_size = audio_data.len(),
            device = device,
            "TTS inference completed"
        );

        Ok(SynthesisResponse {
            audio_data,
            duration_ms,
            sample_rate,
        })
    }
}

#[async_trait]
impl TtsEnginePort for HttpTtsClient {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResponse, TtsError> {
        match self.infer_on(&request, &self.config.device).await {
            Ok(response) => Ok(response),
            Err(e) if self.config.should_fallback() => {
                tracing::warn!(error = %e, voice_id = %request.voice_id, "TTS failed on cuda, retrying on cpu");
                self.infer_on(&request, "cpu").await
            }
            Err(e) => Err(e),
        }
    }

    fn model_version(&self) -> String {
        self.config.model_version.clone()
    }

    fn native_speed(&self) -> Option<bool> {
        self.config.native_speed
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
