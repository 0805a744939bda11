//! Prefetch Command Handler - 短语包预取
//!
//! 只缓存干声（不拼接、不加效果）。短语先经过与合成相同的规范化，
//! 因此与 segment 模式单段条目、full 模式干声条目共用 key。

use std::sync::Arc;

use super::voice_gate::VoiceGate;
use crate::application::commands::{
    PrefetchCommand, PrefetchItem, PrefetchResponse, SynthesisSettings,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    get_or_generate, AudioCachePort, EngineRegistryPort, SynthesisRequest, VoiceCatalogPort,
};
use crate::domain::phrase_packs::get_phrases;
use crate::domain::radio::is_known_profile;
use crate::domain::voice::VoiceSelector;
use crate::domain::{normalize_whitespace, AtcNormalizer, CacheKeyFields};

/// Prefetch Handler
pub struct PrefetchHandler {
    gate: VoiceGate,
    cache: Arc<dyn AudioCachePort>,
    normalizer: Arc<AtcNormalizer>,
    default_language: String,
    cache_enabled: bool,
}

impl PrefetchHandler {
    pub fn new(
        catalog: Arc<dyn VoiceCatalogPort>,
        engines: Arc<dyn EngineRegistryPort>,
        cache: Arc<dyn AudioCachePort>,
        normalizer: Arc<AtcNormalizer>,
        settings: &SynthesisSettings,
    ) -> Self {
        Self {
            gate: VoiceGate::new(catalog, engines, settings.reference_base_url.clone()),
            cache,
            normalizer,
            default_language: settings.default_language.clone(),
            cache_enabled: settings.cache_enabled,
        }
    }

    pub async fn handle(&self, cmd: PrefetchCommand) -> Result<PrefetchResponse, ApplicationError> {
        if !self.cache_enabled {
            return Err(ApplicationError::invalid("Cache is disabled"));
        }
        if !cmd.speed.is_finite() || cmd.speed <= 0.0 {
            return Err(ApplicationError::invalid("Speed must be a positive number"));
        }
        let selector = VoiceSelector {
            role: cmd.role.as_deref(),
            ..Default::default()
        };
        let voice = self.gate.find(&cmd.voice_id, &selector).await?;

        if let Some(profile) = cmd.radio_profile.as_deref().filter(|p| !p.trim().is_empty()) {
            if !is_known_profile(profile.trim()) {
                return Err(ApplicationError::invalid(format!("Unknown radio profile: {}", profile)));
            }
        }

        let phrases = get_phrases(&cmd.phraseset, cmd.limit);
        if phrases.is_empty() {
            return Err(ApplicationError::not_found("Phrase set", &cmd.phraseset));
        }

        let resolved = self.gate.prepare(voice)?;
        let language = cmd
            .language
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| self.default_language.clone());
        let role = cmd.role.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        let model_version = resolved.engine.model_version();

        let mut items = Vec::with_capacity(phrases.len());
        for phrase in phrases {
            let text = normalize_whitespace(&self.normalizer.normalize(phrase).text);
            if text.is_empty() {
                continue;
            }
            let fields = CacheKeyFields::new(
                model_version.clone(),
                resolved.voice.id.clone(),
                language.clone(),
                cmd.speed,
                &text,
            )
            .with_role(role.clone());

            let cached = get_or_generate(self.cache.as_ref(), &fields, || async {
                let request = SynthesisRequest {
                    text: text.clone(),
                    voice_id: resolved.voice.id.clone(),
                    voice_ref: resolved.voice_ref.clone(),
                    language: language.clone(),
                    speed: cmd.speed,
                };
                let response = resolved.engine.synthesize(request).await?;
                Ok::<_, ApplicationError>(response.audio_data)
            })
            .await?;

            items.push(PrefetchItem {
                text,
                key: cached.key,
                path: cached.path,
                from_cache: cached.from_cache,
            });
        }

        let cached_before = items.iter().filter(|i| i.from_cache).count();
        tracing::info!(
            voice_id = %resolved.voice.id,
            phraseset = %cmd.phraseset,
            count = items.len(),
            already_cached = cached_before,
            "Phrase set prefetched"
        );

        Ok(PrefetchResponse {
            voice_id: resolved.voice.id,
            phraseset: cmd.phraseset,
            count: items.len(),
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::{CacheGranularity, CacheStatus, SynthesizeCommand};
    use crate::application::commands::handlers::SynthesizeHandler;
    use crate::application::ports::VoiceCatalogError;
    use crate::domain::voice::{VoiceDescriptor, VoiceEngine, VoiceMeta};
    use crate::infrastructure::adapters::codec::WavCodec;
    use crate::infrastructure::adapters::storage::ShardedBlobStorage;
    use crate::infrastructure::adapters::tts::{EngineRegistry, ToneTtsClient};
    use crate::infrastructure::persistence::sled::SledAudioCache;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tempfile::{tempdir, TempDir};

    struct StaticCatalog(Vec<VoiceDescriptor>);

    #[async_trait]
    impl VoiceCatalogPort for StaticCatalog {
        async fn list(&self) -> Result<Vec<VoiceDescriptor>, VoiceCatalogError> {
            Ok(self.0.clone())
        }
    }

    struct Fixture {
        _dir: TempDir,
        catalog: Arc<dyn VoiceCatalogPort>,
        engines: Arc<dyn EngineRegistryPort>,
        cache: Arc<dyn AudioCachePort>,
        normalizer: Arc<AtcNormalizer>,
    }

    impl Fixture {
        fn prefetch(&self, settings: &SynthesisSettings) -> PrefetchHandler {
            PrefetchHandler::new(
                self.catalog.clone(),
                self.engines.clone(),
                self.cache.clone(),
                self.normalizer.clone(),
                settings,
            )
        }

        fn synthesize(&self, granularity: CacheGranularity) -> SynthesizeHandler {
            SynthesizeHandler::new(
                self.catalog.clone(),
                self.engines.clone(),
                self.cache.clone(),
                Arc::new(WavCodec::new()),
                self.normalizer.clone(),
                SynthesisSettings {
                    granularity,
                    ..Default::default()
                },
            )
        }
    }

    async fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let blobs = ShardedBlobStorage::new(dir.path().join("cache_audio")).await.unwrap();
        let cache: Arc<dyn AudioCachePort> =
            Arc::new(SledAudioCache::open(dir.path().join("cache.sled"), Arc::new(blobs)).unwrap());

        let meta: VoiceMeta = serde_json::from_str(r#"{"engine": "coqui_vits"}"#).unwrap();
        let catalog = StaticCatalog(vec![VoiceDescriptor::from_meta("tower_vits", meta, None, 0).unwrap()]);
        let engines = EngineRegistry::new().with_engine(VoiceEngine::Parametric, Arc::new(ToneTtsClient::new()));

        let pronunciations = HashMap::from([("Ghost".to_string(), "Goast".to_string())]);
        let normalizer = AtcNormalizer::with_pronunciations(pronunciations).unwrap();

        Fixture {
            _dir: dir,
            catalog: Arc::new(catalog),
            engines: Arc::new(engines),
            cache,
            normalizer: Arc::new(normalizer),
        }
    }

    fn command(phraseset: &str, limit: Option<usize>) -> PrefetchCommand {
        PrefetchCommand {
            voice_id: "tower_vits".to_string(),
            speed: 1.0,
            phraseset: phraseset.to_string(),
            limit,
            ..Default::default()
        }
    }

    fn synth_command(text: &str) -> SynthesizeCommand {
        SynthesizeCommand {
            text: text.to_string(),
            voice_id: "tower_vits".to_string(),
            speed: 1.0,
            format: "wav".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_prefetch_then_all_cached() {
        let fx = fixture().await;
        let handler = fx.prefetch(&SynthesisSettings::default());

        let first = handler.handle(command("callouts", Some(3))).await.unwrap();
        assert_eq!(first.count, 3);
        assert!(first.items.iter().all(|i| !i.from_cache));
        assert_eq!(first.items[0].text, "Passing through ten thousand feet.");

        let second = handler.handle(command("callouts", Some(3))).await.unwrap();
        assert!(second.items.iter().all(|i| i.from_cache));
        assert_eq!(fx.cache.stats().await.unwrap().items, 3);
    }

    #[tokio::test]
    async fn test_prefetch_warms_synthesis_keys() {
        let fx = fixture().await;
        fx.prefetch(&SynthesisSettings::default())
            .handle(command("atc_checkin", None))
            .await
            .unwrap();

        // 规范化会改写的短语（ILS 拼读、发音替换）与原样短语都应命中
        let phrases = [
            "Ready for the ILS approach runway one eight.",
            "Tower, this is Ghost Rider requesting a flyby.",
            "Cleared for takeoff, runway two seven right.",
        ];
        for granularity in [CacheGranularity::Segment, CacheGranularity::Full] {
            let synth = fx.synthesize(granularity);
            for phrase in phrases {
                let res = synth.handle(synth_command(phrase)).await.unwrap();
                assert_eq!(res.cache_status, CacheStatus::Hit, "{:?}: {}", granularity, phrase);
                assert_eq!(res.hits, 1);
            }
        }
    }

    #[tokio::test]
    async fn test_prefetch_rejected_when_cache_disabled() {
        let fx = fixture().await;
        let settings = SynthesisSettings {
            cache_enabled: false,
            ..Default::default()
        };

        assert!(matches!(
            fx.prefetch(&settings).handle(command("callouts", None)).await,
            Err(ApplicationError::InvalidInput(_))
        ));
        assert_eq!(fx.cache.stats().await.unwrap().items, 0);
    }

    #[tokio::test]
    async fn test_prefetch_errors() {
        let fx = fixture().await;
        let handler = fx.prefetch(&SynthesisSettings::default());

        assert!(matches!(
            handler.handle(command("weather", None)).await,
            Err(ApplicationError::NotFound(_))
        ));

        let mut bad_radio = command("callouts", None);
        bad_radio.radio_profile = Some("shortwave".to_string());
        assert!(matches!(handler.handle(bad_radio).await, Err(ApplicationError::InvalidInput(_))));

        let mut bad_speed = command("callouts", None);
        bad_speed.speed = 0.0;
        assert!(matches!(handler.handle(bad_speed).await, Err(ApplicationError::InvalidInput(_))));
    }
}
