//! Transcribe Command Handler
//!
//! 上传的音频先落盘为临时 WAV（识别服务按路径读取），识别后删除。

use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::{TranscribeCommand, TranscribeResponse};
use crate::application::error::ApplicationError;
use crate::application::ports::{AudioCodecPort, TranscriberPort};

/// Transcribe Handler
pub struct TranscribeHandler {
    transcriber: Arc<dyn TranscriberPort>,
    codec: Arc<dyn AudioCodecPort>,
    upload_dir: PathBuf,
}

impl TranscribeHandler {
    pub fn new(
        transcriber: Arc<dyn TranscriberPort>,
        codec: Arc<dyn AudioCodecPort>,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            transcriber,
            codec,
            upload_dir: upload_dir.into(),
        }
    }

    pub async fn handle(&self, cmd: TranscribeCommand) -> Result<TranscribeResponse, ApplicationError> {
        if cmd.audio_data.is_empty() {
            return Err(ApplicationError::invalid("Uploaded file is empty"));
        }
        let info = self.codec.info(&cmd.audio_data)?;

        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|e| ApplicationError::internal(format!("create upload dir: {}", e)))?;
        let path = self.upload_dir.join(format!("{}.wav", Uuid::new_v4()));
        tokio::fs::write(&path, &cmd.audio_data)
            .await
            .map_err(|e| ApplicationError::internal(format!("write upload: {}", e)))?;

        tracing::debug!(
            file_name = ?cmd.file_name,
            duration_ms = info.duration_ms,
            path = %path.display(),
            "Transcribing upload"
        );

        let result = self.transcriber.transcribe(&path).await;
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove upload");
        }
        let transcript = result?;

        Ok(TranscribeResponse {
            text: transcript.text,
            language: transcript.language,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{TranscribeError, Transcript};
    use crate::domain::audio::PcmAudio;
    use crate::infrastructure::adapters::codec::WavCodec;
    use async_trait::async_trait;
    use std::path::Path;
    use tempfile::tempdir;

    struct EchoTranscriber;

    #[async_trait]
    impl TranscriberPort for EchoTranscriber {
        async fn transcribe(&self, audio_path: &Path) -> Result<Transcript, TranscribeError> {
            assert!(audio_path.exists());
            Ok(Transcript {
                text: "roger".to_string(),
                language: Some("en".to_string()),
            })
        }
    }

    #[tokio::test]
    async fn test_transcribe_cleans_up_upload() {
        let dir = tempdir().unwrap();
        let codec = Arc::new(WavCodec::new());
        let wav = codec.encode(&PcmAudio::new(vec![100; 1600], 16000)).unwrap();
        let handler = TranscribeHandler::new(Arc::new(EchoTranscriber), codec, dir.path().join("uploads"));

        let res = handler
            .handle(TranscribeCommand {
                audio_data: wav,
                file_name: Some("clip.wav".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(res.text, "roger");
        assert_eq!(std::fs::read_dir(dir.path().join("uploads")).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_transcribe_rejects_non_wav() {
        let dir = tempdir().unwrap();
        let handler = TranscribeHandler::new(Arc::new(EchoTranscriber), Arc::new(WavCodec::new()), dir.path());
        let res = handler
            .handle(TranscribeCommand {
                audio_data: b"not a wav file at all".to_vec(),
                file_name: None,
            })
            .await;
        assert!(matches!(res, Err(ApplicationError::InvalidInput(_))));
    }
}
