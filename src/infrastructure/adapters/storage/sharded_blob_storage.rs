//! Sharded Blob Storage - 文件系统分片音频存储
//!
//! 实现 BlobStoragePort trait，布局：`{root}/{voice}/{aa}/{bb}/{key}.wav`

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::application::ports::{BlobStorageError, BlobStoragePort};

/// 分片音频存储
pub struct ShardedBlobStorage {
    /// 存储根目录
    root: PathBuf,
}

impl ShardedBlobStorage {
    /// 创建存储，确保根目录存在
    pub async fn new(root: impl AsRef<Path>) -> Result<Self, BlobStorageError> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(&root)
            .await
            .map_err(|e| BlobStorageError::IoError(e.to_string()))?;

        Ok(Self { root })
    }

    /// 获取存储根目录
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// 音色目录名只保留安全字符
fn sanitize_segment(voice_id: &str) -> String {
    let cleaned: String = voice_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

fn validate_key(key: &str) -> Result<(), BlobStorageError> {
    if key.len() < 4 || !key.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(BlobStorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[async_trait]
impl BlobStoragePort for ShardedBlobStorage {
    fn blob_path(&self, voice_id: &str, key: &str) -> Result<PathBuf, BlobStorageError> {
        validate_key(key)?;
        Ok(self
            .root
            .join(sanitize_segment(voice_id))
            .join(&key[0..2])
            .join(&key[2..4])
            .join(format!("{}.wav", key)))
    }

    async fn write(&self, voice_id: &str, key: &str, data: &[u8]) -> Result<PathBuf, BlobStorageError> {
        let path = self.blob_path(voice_id, key)?;
        let dir = path
            .parent()
            .ok_or_else(|| BlobStorageError::InvalidKey(key.to_string()))?;

        fs::create_dir_all(dir)
            .await
            .map_err(|e| BlobStorageError::IoError(e.to_string()))?;

        let tmp_path = dir.join(format!(".{}.tmp", Uuid::new_v4()));
        if let Err(e) = fs::write(&tmp_path, data).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(BlobStorageError::IoError(e.to_string()));
        }
        if let Err(e) = fs::rename(&tmp_path, &path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(BlobStorageError::IoError(e.to_string()));
        }

        tracing::debug!(
            voice_id = %voice_id,
            key = %key,
            size = data.len(),
            "Saved cached audio"
        );

        Ok(path)
    }

    async fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, BlobStorageError> {
        match fs::read(path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BlobStorageError::IoError(e.to_string())),
        }
    }

    async fn clear(&self) -> Result<(), BlobStorageError> {
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(BlobStorageError::IoError(e.to_string())),
        }
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| BlobStorageError::IoError(e.to_string()))?;

        tracing::info!(root = %self.root.display(), "Cleared audio blob tree");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_and_read_blob() {
        let temp_dir = tempdir().unwrap();
        let storage = ShardedBlobStorage::new(temp_dir.path()).await.unwrap();

        let path = storage.write("tower_en", "abcdef0123", b"fake wav").await.unwrap();
        assert_eq!(
            path,
            temp_dir.path().join("tower_en").join("ab").join("cd").join("abcdef0123.wav")
        );
        assert_eq!(storage.read(&path).await.unwrap().unwrap(), b"fake wav");

        // 覆盖写入
        storage.write("tower_en", "abcdef0123", b"newer").await.unwrap();
        assert_eq!(storage.read(&path).await.unwrap().unwrap(), b"newer");

        // 没有残留临时文件
        let mut entries = fs::read_dir(path.parent().unwrap()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        assert_eq!(names, vec!["abcdef0123.wav".to_string()]);
    }

    #[tokio::test]
    async fn test_read_missing_returns_none() {
        let temp_dir = tempdir().unwrap();
        let storage = ShardedBlobStorage::new(temp_dir.path()).await.unwrap();
        let path = storage.blob_path("v", "00112233").unwrap();
        assert!(storage.read(&path).await.unwrap().is_none());
    }

    #[test]
    fn test_blob_path_validation() {
        let storage = ShardedBlobStorage {
            root: PathBuf::from("/cache"),
        };
        assert!(matches!(
            storage.blob_path("v", "abc"),
            Err(BlobStorageError::InvalidKey(_))
        ));
        assert!(matches!(
            storage.blob_path("v", "../../etc"),
            Err(BlobStorageError::InvalidKey(_))
        ));

        let path = storage.blob_path("../evil voice", "deadbeef").unwrap();
        assert_eq!(
            path,
            PathBuf::from("/cache/___evil_voice/de/ad/deadbeef.wav")
        );
    }

    #[tokio::test]
    async fn test_clear_recreates_root() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path().join("audio");
        let storage = ShardedBlobStorage::new(&root).await.unwrap();

        let path = storage.write("v", "0123abcd", b"data").await.unwrap();
        storage.clear().await.unwrap();

        assert!(!path.exists());
        assert!(root.exists());
        assert_eq!(storage.root(), root.as_path());
    }
}
