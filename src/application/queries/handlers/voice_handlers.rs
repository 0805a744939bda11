//! Voice Query Handlers

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::VoiceCatalogPort;
use crate::application::queries::{GetVoiceReference, ListVoices};
use crate::domain::phrase_packs::{list_sets, PhrasePackInfo};
use crate::domain::radio::{list_profiles, RadioProfileInfo};
use crate::domain::voice::{VoiceDescriptor, VoiceEngine, DEFAULT_ROLES};

// ============================================================================
// Response DTOs
// ============================================================================

/// 单个音色
#[derive(Debug, Clone, Serialize)]
pub struct VoiceView {
    pub id: String,
    pub name: String,
    pub engine: VoiceEngine,
    pub roles: Vec<String>,
    pub tags: Vec<String>,
    pub region_codes: Vec<String>,
    pub language: Option<String>,
    /// 是否可用于合成
    pub available: bool,
}

impl From<VoiceDescriptor> for VoiceView {
    fn from(voice: VoiceDescriptor) -> Self {
        let available = voice.is_eligible();
        Self {
            id: voice.id,
            name: voice.name,
            engine: voice.engine,
            roles: voice.roles,
            tags: voice.tags,
            region_codes: voice.region_codes,
            language: voice.language,
            available,
        }
    }
}

/// 总览
#[derive(Debug, Clone, Serialize)]
pub struct VoicesOverview {
    pub voices: Vec<VoiceView>,
    pub radio_profiles: Vec<RadioProfileInfo>,
    pub roles: Vec<&'static str>,
    pub phrasesets: Vec<PhrasePackInfo>,
}

/// 参考音频位置
#[derive(Debug, Clone)]
pub struct VoiceReference {
    pub path: PathBuf,
    pub bytes: u64,
}

// ============================================================================
// Handlers
// ============================================================================

/// ListVoices Handler
pub struct ListVoicesHandler {
    catalog: Arc<dyn VoiceCatalogPort>,
}

impl ListVoicesHandler {
    pub fn new(catalog: Arc<dyn VoiceCatalogPort>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, _query: ListVoices) -> Result<VoicesOverview, ApplicationError> {
        let voices = self.catalog.list().await?;
        Ok(VoicesOverview {
            voices: voices.into_iter().map(VoiceView::from).collect(),
            radio_profiles: list_profiles(),
            roles: DEFAULT_ROLES.to_vec(),
            phrasesets: list_sets(),
        })
    }
}

/// GetVoiceReference Handler
pub struct GetVoiceReferenceHandler {
    catalog: Arc<dyn VoiceCatalogPort>,
}

impl GetVoiceReferenceHandler {
    pub fn new(catalog: Arc<dyn VoiceCatalogPort>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, query: GetVoiceReference) -> Result<VoiceReference, ApplicationError> {
        let voice = self
            .catalog
            .get(&query.voice_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Voice", &query.voice_id))?;
        let path = voice
            .reference
            .ok_or_else(|| ApplicationError::not_found("Voice reference", &query.voice_id))?;
        Ok(VoiceReference {
            path,
            bytes: voice.reference_bytes,
        })
    }
}
