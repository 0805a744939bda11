//! Synthesize Command Handler - 合成编排
//!
//! full 模式：整句干声一个条目，无线电效果从干声派生并另存。
//! segment 模式：逐段查缓存/合成，按顺序拼接后再做变速与无线电效果。

use futures_util::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;

use super::audio_pipeline::{apply_radio_to_wav, render_segments, RadioSettings, RenderPlan};
use super::voice_gate::{ResolvedVoice, VoiceGate};
use crate::application::commands::{
    CacheGranularity, CacheMode, CacheStatus, SynthesisSettings, SynthesizeCommand,
    SynthesizeResponse,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    get_or_generate, AudioCachePort, AudioCodecPort, CachedAudio, EngineRegistryPort,
    SynthesisRequest, VoiceCatalogPort,
};
use crate::domain::radio::{clamp_intensity, is_effect_profile, is_known_profile, DEFAULT_INTENSITY, RADIO_DSP_VERSION};
use crate::domain::voice::VoiceSelector;
use crate::domain::{normalize_whitespace, segment_text, AtcNormalizer, CacheKeyFields};

/// 已校验的请求参数
struct Prepared {
    resolved: ResolvedVoice,
    text: String,
    language: String,
    speed: f64,
    role: Option<String>,
    radio: Option<RadioSettings>,
    normalized: bool,
    pronunciation_applied: bool,
}

/// 单段合成结果
struct SegmentAudio {
    audio_data: Vec<u8>,
    from_cache: bool,
}

/// Synthesize Handler
pub struct SynthesizeHandler {
    gate: VoiceGate,
    cache: Arc<dyn AudioCachePort>,
    codec: Arc<dyn AudioCodecPort>,
    normalizer: Arc<AtcNormalizer>,
    settings: SynthesisSettings,
}

impl SynthesizeHandler {
    pub fn new(
        catalog: Arc<dyn VoiceCatalogPort>,
        engines: Arc<dyn EngineRegistryPort>,
        cache: Arc<dyn AudioCachePort>,
        codec: Arc<dyn AudioCodecPort>,
        normalizer: Arc<AtcNormalizer>,
        settings: SynthesisSettings,
    ) -> Self {
        Self {
            gate: VoiceGate::new(catalog, engines, settings.reference_base_url.clone()),
            cache,
            codec,
            normalizer,
            settings,
        }
    }

    pub async fn handle(&self, cmd: SynthesizeCommand) -> Result<SynthesizeResponse, ApplicationError> {
        let cache_enabled = cmd.cache_enabled.unwrap_or(self.settings.cache_enabled);
        let hard_pause_ms = cmd.hard_pause_ms;
        let soft_pause_ms = cmd.soft_pause_ms;
        let prepared = self.prepare(cmd).await?;

        tracing::info!(
            voice_id = %prepared.resolved.voice.id,
            engine = %prepared.resolved.voice.engine,
            granularity = self.settings.granularity.as_str(),
            cache_enabled = cache_enabled,
            radio_profile = ?prepared.radio.as_ref().map(|r| r.profile.as_str()),
            "Synthesize request"
        );

        match self.settings.granularity {
            CacheGranularity::Full => self.synthesize_full(prepared, cache_enabled).await,
            CacheGranularity::Segment => {
                self.synthesize_segments(prepared, cache_enabled, hard_pause_ms, soft_pause_ms)
                    .await
            }
        }
    }

    /// 参数校验顺序：格式 → 音色 → 无线电预设 → 文本规范化 → 参考音频
    async fn prepare(&self, cmd: SynthesizeCommand) -> Result<Prepared, ApplicationError> {
        if !cmd.format.trim().eq_ignore_ascii_case("wav") {
            return Err(ApplicationError::invalid("Only wav output is supported"));
        }
        if !cmd.speed.is_finite() || cmd.speed <= 0.0 {
            return Err(ApplicationError::invalid("Speed must be a positive number"));
        }

        let selector = VoiceSelector {
            role: cmd.role.as_deref(),
            airport_icao: cmd.airport_icao.as_deref(),
            region_prefix: cmd.region_prefix.as_deref(),
            iso_country: cmd.iso_country.as_deref(),
            iso_region: cmd.iso_region.as_deref(),
        };
        let voice = self.gate.find(&cmd.voice_id, &selector).await?;

        let profile = cmd
            .radio_profile
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());
        if let Some(p) = profile {
            if !is_known_profile(p) {
                return Err(ApplicationError::invalid(format!("Unknown radio profile: {}", p)));
            }
        }
        let radio = profile.filter(|p| is_effect_profile(Some(p))).map(|p| RadioSettings {
            profile: p.to_string(),
            intensity: clamp_intensity(cmd.radio_intensity.unwrap_or(DEFAULT_INTENSITY)),
        });

        let normalized = self.normalizer.normalize(&cmd.text);
        let resolved = self.gate.prepare(voice)?;

        let language = cmd
            .language
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| self.settings.default_language.clone());

        Ok(Prepared {
            resolved,
            text: normalized.text,
            language,
            speed: cmd.speed,
            role: cmd.role.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()),
            radio,
            normalized: normalized.changed,
            pronunciation_applied: normalized.pronunciation_applied,
        })
    }

    fn key_fields(&self, p: &Prepared, text: &str) -> CacheKeyFields {
        CacheKeyFields::new(
            p.resolved.engine.model_version(),
            p.resolved.voice.id.clone(),
            p.language.clone(),
            p.speed,
            text,
        )
        .with_role(p.role.clone())
    }

    async fn synthesize_text(&self, p: &Prepared, text: &str) -> Result<Vec<u8>, ApplicationError> {
        let request = SynthesisRequest {
            text: text.to_string(),
            voice_id: p.resolved.voice.id.clone(),
            voice_ref: p.resolved.voice_ref.clone(),
            language: p.language.clone(),
            speed: p.speed,
        };
        let response = p.resolved.engine.synthesize(request).await?;
        Ok(response.audio_data)
    }

    async fn resolve_segment(
        &self,
        p: &Prepared,
        text: &str,
        cache_enabled: bool,
    ) -> Result<SegmentAudio, ApplicationError> {
        if !cache_enabled {
            return Ok(SegmentAudio {
                audio_data: self.synthesize_text(p, text).await?,
                from_cache: false,
            });
        }
        let fields = self.key_fields(p, text);
        let cached: CachedAudio = get_or_generate(self.cache.as_ref(), &fields, || {
            self.synthesize_text(p, &fields.text_norm)
        })
        .await?;
        tracing::debug!(
            cache_key = %cached.key,
            from_cache = cached.from_cache,
            "Segment resolved"
        );
        Ok(SegmentAudio {
            audio_data: cached.audio_data,
            from_cache: cached.from_cache,
        })
    }

    async fn synthesize_full(
        &self,
        p: Prepared,
        cache_enabled: bool,
    ) -> Result<SynthesizeResponse, ApplicationError> {
        let text = normalize_whitespace(&p.text);
        if text.is_empty() {
            return Err(ApplicationError::invalid("Text is empty after normalization"));
        }

        if !cache_enabled {
            let clean = self.synthesize_text(&p, &text).await?;
            let audio_data = self.apply_radio(clean, p.radio.clone()).await?;
            return Ok(self.response(&p, audio_data, CacheMode::Disabled, CacheStatus::Off, 1, 0, None, None));
        }

        let clean_fields = self.key_fields(&p, &text);
        let clean = get_or_generate(self.cache.as_ref(), &clean_fields, || {
            self.synthesize_text(&p, &text)
        })
        .await?;

        let result = match &p.radio {
            None => clean,
            Some(radio) => {
                let derived_fields = clean_fields
                    .clone()
                    .with_model_version(format!(
                        "{}|radio_dsp:{}|ri:{:.2}",
                        clean_fields.model_version, RADIO_DSP_VERSION, radio.intensity
                    ))
                    .with_radio_profile(Some(radio.profile.clone()));
                let source = clean.audio_data;
                get_or_generate(self.cache.as_ref(), &derived_fields, || {
                    self.apply_radio(source, Some(radio.clone()))
                })
                .await?
            }
        };

        let status = if result.from_cache { CacheStatus::Hit } else { CacheStatus::Miss };
        let hits = usize::from(result.from_cache);
        Ok(self.response(
            &p,
            result.audio_data,
            CacheMode::Full,
            status,
            1,
            hits,
            Some(result.key),
            None,
        ))
    }

    async fn synthesize_segments(
        &self,
        p: Prepared,
        cache_enabled: bool,
        hard_pause_ms: Option<i64>,
        soft_pause_ms: Option<i64>,
    ) -> Result<SynthesizeResponse, ApplicationError> {
        let seg = segment_text(
            &p.text,
            Some(hard_pause_ms.unwrap_or(self.settings.hard_pause_ms as i64)),
            Some(soft_pause_ms.unwrap_or(self.settings.soft_pause_ms as i64)),
        );
        if seg.is_empty() {
            return Err(ApplicationError::invalid("Text is empty after segmentation"));
        }

        let parallel = self.settings.max_parallel_segments.max(1);
        let prepared = &p;
        let resolved: Vec<SegmentAudio> = stream::iter(seg.segments.clone())
            .map(|text| async move { self.resolve_segment(prepared, &text, cache_enabled).await })
            .buffered(parallel)
            .try_collect()
            .await?;

        let total = resolved.len();
        let hits = resolved.iter().filter(|s| s.from_cache).count();
        let (mode, status) = if cache_enabled {
            (CacheMode::Segment, CacheStatus::from_hits(hits, total))
        } else {
            (CacheMode::Disabled, CacheStatus::Off)
        };

        let speed = (p.resolved.engine.native_speed() != Some(true) && (p.speed - 1.0).abs() > 1e-3)
            .then_some(p.speed);
        let plan = RenderPlan {
            pauses_ms: seg.pauses_ms.clone(),
            crossfade_ms: self.settings.crossfade_ms,
            speed,
            radio: p.radio.clone(),
        };
        let chunks: Vec<Vec<u8>> = resolved.into_iter().map(|s| s.audio_data).collect();
        let codec = self.codec.clone();
        let audio_data =
            tokio::task::spawn_blocking(move || render_segments(codec.as_ref(), &chunks, &plan))
                .await??;

        tracing::info!(
            voice_id = %p.resolved.voice.id,
            segments = total,
            hits = hits,
            delimiter = %seg.delimiter,
            "Segments stitched"
        );

        Ok(self.response(&p, audio_data, mode, status, total, hits, None, Some(seg.delimiter)))
    }

    async fn apply_radio(
        &self,
        wav: Vec<u8>,
        radio: Option<RadioSettings>,
    ) -> Result<Vec<u8>, ApplicationError> {
        let Some(radio) = radio else {
            return Ok(wav);
        };
        let codec = self.codec.clone();
        let out = tokio::task::spawn_blocking(move || {
            apply_radio_to_wav(codec.as_ref(), wav, &radio.profile, radio.intensity)
        })
        .await?;
        Ok(out)
    }

    #[allow(clippy::too_many_arguments)]
    fn response(
        &self,
        p: &Prepared,
        audio_data: Vec<u8>,
        cache_mode: CacheMode,
        cache_status: CacheStatus,
        segments: usize,
        hits: usize,
        cache_key: Option<String>,
        delimiter: Option<crate::domain::DelimiterMode>,
    ) -> SynthesizeResponse {
        SynthesizeResponse {
            audio_data,
            cache_mode,
            cache_status,
            segments,
            hits,
            cache_key,
            delimiter,
            voice_id: p.resolved.voice.id.clone(),
            engine: p.resolved.voice.engine,
            normalized: p.normalized,
            pronunciation_applied: p.pronunciation_applied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        CacheStats, SynthesisResponse, TtsEnginePort, TtsError, VoiceCatalogError,
    };
    use crate::domain::voice::{VoiceDescriptor, VoiceEngine, VoiceMeta, MIN_REFERENCE_BYTES};
    use crate::infrastructure::adapters::codec::WavCodec;
    use crate::infrastructure::adapters::storage::ShardedBlobStorage;
    use crate::infrastructure::adapters::tts::{EngineRegistry, ToneTtsClient};
    use crate::infrastructure::persistence::sled::SledAudioCache;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};

    struct StaticCatalog(Vec<VoiceDescriptor>);

    #[async_trait]
    impl VoiceCatalogPort for StaticCatalog {
        async fn list(&self) -> Result<Vec<VoiceDescriptor>, VoiceCatalogError> {
            Ok(self.0.clone())
        }
    }

    fn voices() -> Vec<VoiceDescriptor> {
        let parametric: VoiceMeta =
            serde_json::from_str(r#"{"engine": "coqui_vits", "roles": ["tower"]}"#).unwrap();
        vec![
            VoiceDescriptor::from_meta("tower_vits", parametric, None, 0).unwrap(),
            VoiceDescriptor::from_meta(
                "ground_xtts",
                VoiceMeta::default(),
                Some(PathBuf::from("voices/ground_xtts/reference.wav")),
                MIN_REFERENCE_BYTES,
            )
            .unwrap(),
            VoiceDescriptor::from_meta(
                "no_ref",
                VoiceMeta::default(),
                Some(PathBuf::from("voices/no_ref/placeholder.wav")),
                MIN_REFERENCE_BYTES,
            )
            .unwrap(),
        ]
    }

    /// 文本越长返回越慢，让并行解析的完成顺序与输入顺序相反
    struct SlowForLongText(ToneTtsClient);

    #[async_trait]
    impl TtsEnginePort for SlowForLongText {
        async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResponse, TtsError> {
            let delay = request.text.chars().count() as u64;
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
            self.0.synthesize(request).await
        }

        fn model_version(&self) -> String {
            self.0.model_version()
        }
    }

    async fn setup(granularity: CacheGranularity) -> (TempDir, SynthesizeHandler, Arc<dyn AudioCachePort>) {
        let settings = SynthesisSettings {
            granularity,
            ..Default::default()
        };
        setup_with(settings, Arc::new(ToneTtsClient::new())).await
    }

    async fn setup_with(
        settings: SynthesisSettings,
        tone: Arc<dyn TtsEnginePort>,
    ) -> (TempDir, SynthesizeHandler, Arc<dyn AudioCachePort>) {
        let dir = tempdir().unwrap();
        let blobs = ShardedBlobStorage::new(dir.path().join("cache_audio")).await.unwrap();
        let cache: Arc<dyn AudioCachePort> =
            Arc::new(SledAudioCache::open(dir.path().join("cache.sled"), Arc::new(blobs)).unwrap());
        let engines = EngineRegistry::new()
            .with_engine(VoiceEngine::Neural, tone.clone())
            .with_engine(VoiceEngine::Parametric, tone);
        let handler = SynthesizeHandler::new(
            Arc::new(StaticCatalog(voices())),
            Arc::new(engines),
            cache.clone(),
            Arc::new(WavCodec::new()),
            Arc::new(AtcNormalizer::new()),
            settings,
        );
        (dir, handler, cache)
    }

    fn command(text: &str, voice_id: &str) -> SynthesizeCommand {
        SynthesizeCommand {
            text: text.to_string(),
            voice_id: voice_id.to_string(),
            speed: 1.0,
            format: "wav".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_segment_mode_miss_then_hit() {
        let (_dir, handler, cache) = setup(CacheGranularity::Segment).await;

        let first = handler.handle(command("Tower | ready | for departure", "tower_vits")).await.unwrap();
        assert_eq!(first.cache_mode, CacheMode::Segment);
        assert_eq!(first.cache_status, CacheStatus::Miss);
        assert_eq!(first.segments, 3);
        assert_eq!(first.delimiter, Some(crate::domain::DelimiterMode::Pipe));
        assert_eq!(&first.audio_data[..4], b"RIFF");

        let second = handler.handle(command("Tower | ready | for departure", "tower_vits")).await.unwrap();
        assert_eq!(second.cache_status, CacheStatus::Hit);
        assert_eq!(second.hits, 3);
        assert_eq!(first.audio_data, second.audio_data);

        let third = handler.handle(command("Tower | cleared", "tower_vits")).await.unwrap();
        assert_eq!(third.cache_status, CacheStatus::Mixed);

        let stats: CacheStats = cache.stats().await.unwrap();
        assert_eq!(stats.items, 4);
    }

    #[tokio::test]
    async fn test_parallel_segments_keep_input_order() {
        let text = "Lufthansa four two one heavy, descend and maintain one two thousand | Roger | Wilco | Unable";
        let reversed = "Unable | Wilco | Roger | Lufthansa four two one heavy, descend and maintain one two thousand";
        let settings = |parallel| SynthesisSettings {
            max_parallel_segments: parallel,
            ..Default::default()
        };

        let (_pdir, parallel, _) =
            setup_with(settings(4), Arc::new(SlowForLongText(ToneTtsClient::new()))).await;
        let (_sdir, sequential, _) =
            setup_with(settings(1), Arc::new(SlowForLongText(ToneTtsClient::new()))).await;

        let first = parallel.handle(command(text, "tower_vits")).await.unwrap();
        assert_eq!(first.segments, 4);
        assert_eq!(first.hits, 0);
        assert_eq!(first.cache_status, CacheStatus::Miss);

        let baseline = sequential.handle(command(text, "tower_vits")).await.unwrap();
        assert_eq!(first.audio_data, baseline.audio_data);

        let flipped = sequential.handle(command(reversed, "tower_vits")).await.unwrap();
        assert_ne!(first.audio_data, flipped.audio_data);

        let again = parallel.handle(command(text, "tower_vits")).await.unwrap();
        assert_eq!(again.cache_status, CacheStatus::Hit);
        assert_eq!(again.hits, 4);
        assert_eq!(again.audio_data, first.audio_data);

        let mixed = parallel.handle(command("Roger | Standby", "tower_vits")).await.unwrap();
        assert_eq!(mixed.segments, 2);
        assert_eq!(mixed.hits, 1);
        assert_eq!(mixed.cache_status, CacheStatus::Mixed);
    }

    #[tokio::test]
    async fn test_full_mode_derived_radio_entry() {
        let (_dir, handler, cache) = setup(CacheGranularity::Full).await;

        let clean = handler.handle(command("Cleared to land", "tower_vits")).await.unwrap();
        assert_eq!(clean.cache_mode, CacheMode::Full);
        assert_eq!(clean.cache_status, CacheStatus::Miss);
        assert!(clean.cache_key.is_some());

        let mut radio_cmd = command("Cleared to land", "tower_vits");
        radio_cmd.radio_profile = Some("vhf".to_string());
        let radio = handler.handle(radio_cmd.clone()).await.unwrap();
        assert_eq!(radio.cache_status, CacheStatus::Miss);
        assert_ne!(radio.cache_key, clean.cache_key);
        assert_eq!(radio.audio_data.len(), clean.audio_data.len());

        let again = handler.handle(radio_cmd).await.unwrap();
        assert_eq!(again.cache_status, CacheStatus::Hit);
        assert_eq!(again.audio_data, radio.audio_data);
        assert_eq!(cache.stats().await.unwrap().items, 2);
    }

    #[tokio::test]
    async fn test_cache_disabled_per_request() {
        let (_dir, handler, cache) = setup(CacheGranularity::Segment).await;
        let mut cmd = command("Hold short runway 27", "tower_vits");
        cmd.cache_enabled = Some(false);

        let res = handler.handle(cmd).await.unwrap();
        assert_eq!(res.cache_mode, CacheMode::Disabled);
        assert_eq!(res.cache_status, CacheStatus::Off);
        assert!(res.normalized);
        assert_eq!(cache.stats().await.unwrap().items, 0);
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let (_dir, handler, _cache) = setup(CacheGranularity::Segment).await;

        let mut mp3 = command("hello", "tower_vits");
        mp3.format = "mp3".to_string();
        assert!(matches!(handler.handle(mp3).await, Err(ApplicationError::InvalidInput(_))));

        assert!(matches!(
            handler.handle(command("hello", "nobody")).await,
            Err(ApplicationError::NotFound(_))
        ));

        let mut bad_radio = command("hello", "tower_vits");
        bad_radio.radio_profile = Some("shortwave".to_string());
        assert!(matches!(handler.handle(bad_radio).await, Err(ApplicationError::InvalidInput(_))));

        assert!(matches!(
            handler.handle(command("hello", "no_ref")).await,
            Err(ApplicationError::InvalidInput(_))
        ));

        assert!(matches!(
            handler.handle(command("   ", "tower_vits")).await,
            Err(ApplicationError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_auto_voice_resolution() {
        let (_dir, handler, _cache) = setup(CacheGranularity::Segment).await;
        let mut cmd = command("Line up and wait", "auto");
        cmd.role = Some("tower".to_string());
        cmd.airport_icao = Some("EDDF".to_string());

        let res = handler.handle(cmd).await.unwrap();
        assert_eq!(res.voice_id, "tower_vits");
        assert_eq!(res.engine, VoiceEngine::Parametric);
    }
}
