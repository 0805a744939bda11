//! File Voice Catalog - 基于目录的音色目录
//!
//! 布局：`{voices_dir}/{voice_id}/meta.json` + `reference.wav` | `ref.wav`

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{VoiceCatalogError, VoiceCatalogPort};
use crate::domain::voice::{VoiceDescriptor, VoiceMeta};

const META_FILE: &str = "meta.json";
const REFERENCE_FILES: &[&str] = &["reference.wav", "ref.wav"];

/// 目录音色库
pub struct FileVoiceCatalog {
    voices_dir: PathBuf,
}

impl FileVoiceCatalog {
    pub fn new(voices_dir: impl Into<PathBuf>) -> Self {
        Self {
            voices_dir: voices_dir.into(),
        }
    }

    pub fn voices_dir(&self) -> &Path {
        &self.voices_dir
    }

    /// 读取单个音色目录；既无 meta.json 也无参考音频时返回 None
    async fn load_voice(&self, dir: &Path, dir_name: &str) -> Result<Option<VoiceDescriptor>, VoiceCatalogError> {
        let meta_path = dir.join(META_FILE);
        let meta = match fs::read(&meta_path).await {
            Ok(bytes) => Some(
                serde_json::from_slice::<VoiceMeta>(&bytes)
                    .map_err(|e| VoiceCatalogError::InvalidMeta(format!("{}: {}", meta_path.display(), e)))?,
            ),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(VoiceCatalogError::IoError(e.to_string())),
        };

        let mut reference = None;
        for name in REFERENCE_FILES {
            let candidate = dir.join(name);
            if let Ok(metadata) = fs::metadata(&candidate).await {
                if metadata.is_file() {
                    reference = Some((candidate, metadata.len()));
                    break;
                }
            }
        }

        if meta.is_none() && reference.is_none() {
            return Ok(None);
        }

        let (reference, reference_bytes) = match reference {
            Some((path, bytes)) => (Some(path), bytes),
            None => (None, 0),
        };

        VoiceDescriptor::from_meta(dir_name, meta.unwrap_or_default(), reference, reference_bytes)
            .map(Some)
            .map_err(|e| VoiceCatalogError::InvalidMeta(e.to_string()))
    }
}

#[async_trait]
impl VoiceCatalogPort for FileVoiceCatalog {
    async fn list(&self) -> Result<Vec<VoiceDescriptor>, VoiceCatalogError> {
        let mut entries = match fs::read_dir(&self.voices_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(voices_dir = %self.voices_dir.display(), "Voices directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(VoiceCatalogError::IoError(e.to_string())),
        };

        let mut voices = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| VoiceCatalogError::IoError(e.to_string()))?
        {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let dir_name = entry.file_name().to_string_lossy().to_string();
            if dir_name.starts_with('.') {
                continue;
            }

            match self.load_voice(&path, &dir_name).await {
                Ok(Some(voice)) => voices.push(voice),
                Ok(None) => {}
                // 单个坏目录不影响整个目录
                Err(e) => tracing::warn!(voice_dir = %dir_name, error = %e, "Skipping voice"),
            }
        }

        voices.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(voices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::voice::{VoiceEngine, MIN_REFERENCE_BYTES};
    use tempfile::tempdir;

    fn write_voice(root: &Path, id: &str, meta: Option<&str>, reference: Option<(&str, u64)>) {
        let dir = root.join(id);
        std::fs::create_dir_all(&dir).unwrap();
        if let Some(meta) = meta {
            std::fs::write(dir.join(META_FILE), meta).unwrap();
        }
        if let Some((name, size)) = reference {
            std::fs::write(dir.join(name), vec![0u8; size as usize]).unwrap();
        }
    }

    #[tokio::test]
    async fn test_list_scans_directories() {
        let dir = tempdir().unwrap();
        write_voice(
            dir.path(),
            "tower_us",
            Some(r#"{"engine":"xtts","roles":["tower","ground"],"tags":["us"]}"#),
            Some(("reference.wav", MIN_REFERENCE_BYTES)),
        );
        write_voice(
            dir.path(),
            "approach_de",
            Some(r#"{"engine":"coqui_vits","role":"approach","region_codes":["ED"]}"#),
            None,
        );
        write_voice(dir.path(), "ground_fr", None, Some(("ref.wav", 1024)));
        write_voice(dir.path(), "empty_dir", None, None);
        std::fs::write(dir.path().join("README.txt"), "not a voice").unwrap();

        let catalog = FileVoiceCatalog::new(dir.path());
        let voices = catalog.list().await.unwrap();
        let ids: Vec<&str> = voices.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["approach_de", "ground_fr", "tower_us"]);

        let tower = &voices[2];
        assert_eq!(tower.engine, VoiceEngine::Neural);
        assert_eq!(tower.roles, vec!["tower", "ground"]);
        assert!(tower.is_eligible());

        let approach = &voices[0];
        assert_eq!(approach.engine, VoiceEngine::Parametric);
        assert!(approach.is_eligible());

        // 参考音频过小
        let ground = &voices[1];
        assert_eq!(ground.reference_bytes, 1024);
        assert!(!ground.is_eligible());
    }

    #[tokio::test]
    async fn test_bad_meta_is_skipped() {
        let dir = tempdir().unwrap();
        write_voice(dir.path(), "broken", Some("{not json"), None);
        write_voice(dir.path(), "alien", Some(r#"{"engine":"wavenet"}"#), None);
        write_voice(dir.path(), "ok", Some(r#"{"engine":"vits"}"#), None);

        let catalog = FileVoiceCatalog::new(dir.path());
        let voices = catalog.list().await.unwrap();
        assert_eq!(voices.len(), 1);
        assert_eq!(catalog.get("ok").await.unwrap().unwrap().id, "ok");
        assert!(catalog.get("broken").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_root_is_empty() {
        let dir = tempdir().unwrap();
        let catalog = FileVoiceCatalog::new(dir.path().join("nope"));
        assert!(catalog.list().await.unwrap().is_empty());
    }
}
