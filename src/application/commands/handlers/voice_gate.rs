//! 请求音色解析与参考音频校验（合成与预取共用）

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{EngineRegistryPort, TtsEnginePort, VoiceCatalogPort};
use crate::domain::voice::{resolve_voice, VoiceDescriptor, VoiceSelector, AUTO_VOICE_ID};

/// 已解析的音色及其引擎
pub(crate) struct ResolvedVoice {
    pub voice: VoiceDescriptor,
    pub engine: Arc<dyn TtsEnginePort>,
    /// 传给合成服务的参考音频（URL 或路径）
    pub voice_ref: Option<String>,
}

pub(crate) struct VoiceGate {
    catalog: Arc<dyn VoiceCatalogPort>,
    engines: Arc<dyn EngineRegistryPort>,
    reference_base_url: Option<String>,
}

impl VoiceGate {
    pub fn new(
        catalog: Arc<dyn VoiceCatalogPort>,
        engines: Arc<dyn EngineRegistryPort>,
        reference_base_url: Option<String>,
    ) -> Self {
        Self {
            catalog,
            engines,
            reference_base_url,
        }
    }

    /// 按 id 或 auto 规则查找音色，音色不存在返回 NotFound
    pub async fn find(
        &self,
        voice_id: &str,
        selector: &VoiceSelector<'_>,
    ) -> Result<VoiceDescriptor, ApplicationError> {
        if voice_id.trim().eq_ignore_ascii_case(AUTO_VOICE_ID) {
            let voices = self.catalog.list().await?;
            let picked = resolve_voice(&voices, selector)
                .ok_or_else(|| ApplicationError::not_found("Voice", AUTO_VOICE_ID))?;
            tracing::debug!(
                voice_id = %picked.id,
                role = ?selector.role,
                airport_icao = ?selector.airport_icao,
                "Auto voice resolved"
            );
            return Ok(picked.clone());
        }

        self.catalog
            .get(voice_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Voice", voice_id))
    }

    /// 校验参考音频并选择引擎
    pub fn prepare(&self, voice: VoiceDescriptor) -> Result<ResolvedVoice, ApplicationError> {
        let voice_ref = if voice.engine.requires_reference() {
            if !voice.has_usable_reference() {
                return Err(ApplicationError::invalid(format!(
                    "Voice '{}' is missing a usable reference audio (reference.wav or ref.wav)",
                    voice.id
                )));
            }
            Some(self.reference_for(&voice))
        } else {
            None
        };

        let engine = self.engines.engine(voice.engine).ok_or_else(|| {
            ApplicationError::collaborator(format!("No engine configured for {}", voice.engine))
        })?;

        Ok(ResolvedVoice {
            voice,
            engine,
            voice_ref,
        })
    }

    fn reference_for(&self, voice: &VoiceDescriptor) -> String {
        match &self.reference_base_url {
            Some(base) => format!("{}/voices/{}/reference", base.trim_end_matches('/'), voice.id),
            None => voice
                .reference
                .as_ref()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_default(),
        }
    }
}
