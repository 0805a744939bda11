//! HTTP Transcriber - 调用外部语音识别服务
//!
//! 外部 ASR API:
//! POST http://localhost:8001/transcribe
//! Request: {"wavPath": "/abs/path.wav", "device": "cuda"}
//! Response: {"ok": true, "text": "...", "language": "en"}

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::application::ports::{TranscribeError, Transcript, TranscriberPort};

#[derive(Debug, Serialize)]
struct TranscribeHttpRequest<'a> {
    #[serde(rename = "wavPath")]
    wav_path: &'a str,
    device: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranscribeHttpResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl TranscribeHttpResponse {
    fn into_transcript(self) -> Result<Transcript, TranscribeError> {
        if !self.ok {
            return Err(TranscribeError::ServiceError(
                self.error.unwrap_or_else(|| "transcription failed".to_string()),
            ));
        }
        let text = self
            .text
            .ok_or_else(|| TranscribeError::InvalidResponse("missing text".to_string()))?;
        Ok(Transcript {
            text: text.trim().to_string(),
            language: self.language.filter(|l| !l.is_empty()),
        })
    }
}

/// 识别服务客户端配置
#[derive(Debug, Clone)]
pub struct HttpTranscriberConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub device: String,
    pub cpu_fallback: bool,
}

impl Default for HttpTranscriberConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout_secs: 120,
            device: "cuda".to_string(),
            cpu_fallback: true,
        }
    }
}

impl HttpTranscriberConfig {
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

    pub fn with_device(mut self, device: impl Into<String>, cpu_fallback: bool) -> Self {
        self.device = device.into();
        self.cpu_fallback = cpu_fallback;
        self
    }

    fn should_fallback(&self) -> bool {
        self.cpu_fallback && self.device.eq_ignore_ascii_case("cuda")
    }
}

/// HTTP 语音识别客户端
pub struct HttpTranscriber {
    client: Client,
    config: HttpTranscriberConfig,
}

impl HttpTranscriber {
    pub fn new(config: HttpTranscriberConfig) -> Result<Self, TranscribeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TranscribeError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn transcribe_url(&self) -> String {
        format!("{}/transcribe", self.config.base_url.trim_end_matches('/'))
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.config.base_url.trim_end_matches('/'))
    }

    async fn transcribe_on(&self, wav_path: &str, device: &str) -> Result<Transcript, TranscribeError> {
        let response = self
            .client
            .post(self.transcribe_url())
            .json(&TranscribeHttpRequest { wav_path, device })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TranscribeError::Timeout
                } else {
                    TranscribeError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TranscribeError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: TranscribeHttpResponse = response
            .json()
            .await
            .map_err(|e| TranscribeError::InvalidResponse(e.to_string()))?;
        body.into_transcript()
    }
}

#[async_trait]
impl TranscriberPort for HttpTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript, TranscribeError> {
        let wav_path = audio_path.to_string_lossy();

        let result = match self.transcribe_on(&wav_path, &self.config.device).await {
            Err(e) if self.config.should_fallback() => {
                tracing::warn!(error = %e, "Transcription failed on cuda, retrying on cpu");
                self.transcribe_on(&wav_path, "cpu").await
            }
            other => other,
        }?;

        tracing::info!(
            text_len = result.text.len(),
            language = ?result.language,
            "Transcription completed"
        );
        Ok(result)
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
