//! Sled-based Audio Cache Index
//!
//! 索引记录存 Sled（`cache:{key}` → bincode(CacheRecord)），音频本体交给 BlobStoragePort。

use async_trait::async_trait;
use chrono::Utc;
use sled::Db;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::application::ports::{
    AudioCachePort, BlobStoragePort, CacheError, CacheRecord, CacheStats, CachedAudio,
};
use crate::domain::CacheKeyFields;

const RECORD_PREFIX: &str = "cache:";

/// Sled 音频缓存
pub struct SledAudioCache {
    db: Db,
    blobs: Arc<dyn BlobStoragePort>,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl SledAudioCache {
    /// 打开（或创建）缓存索引
    pub fn open<P: AsRef<Path>>(path: P, blobs: Arc<dyn BlobStoragePort>) -> Result<Self, CacheError> {
        let db = sled::open(path.as_ref()).map_err(|e| CacheError::DatabaseError(e.to_string()))?;

        tracing::info!(
            db_path = %path.as_ref().display(),
            entries = db.scan_prefix(RECORD_PREFIX).count(),
            "SledAudioCache initialized"
        );

        Ok(Self {
            db,
            blobs,
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        })
    }

    fn record_key(key: &str) -> String {
        format!("{}{}", RECORD_PREFIX, key)
    }

    fn put_record(&self, record: &CacheRecord) -> Result<(), CacheError> {
        let bytes =
            bincode::serialize(record).map_err(|e| CacheError::SerializationError(e.to_string()))?;
        self.db
            .insert(Self::record_key(&record.key), bytes)
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn remove_record(&self, key: &str) -> Result<(), CacheError> {
        self.db
            .remove(Self::record_key(key))
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    /// 遍历所有可解析的索引记录
    fn records(&self) -> Result<Vec<CacheRecord>, CacheError> {
        let mut records = Vec::new();
        for item in self.db.scan_prefix(RECORD_PREFIX) {
            let (_, value) = item.map_err(|e| CacheError::DatabaseError(e.to_string()))?;
            match bincode::deserialize::<CacheRecord>(&value) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(error = %e, "Skipping unreadable cache record"),
            }
        }
        Ok(records)
    }

    /// 原子地累加 hit_count 并更新 last_hit
    ///
    /// 记录已被删除（例如并发 clear）时返回 None，不会重新写回
    fn bump_hit(&self, key: &str) -> Result<Option<CacheRecord>, CacheError> {
        let now = Utc::now();
        let updated = self
            .db
            .update_and_fetch(Self::record_key(key), |old| {
                let mut record: CacheRecord = bincode::deserialize(old?).ok()?;
                record.hit_count += 1;
                record.last_hit = Some(now);
                bincode::serialize(&record).ok()
            })
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?;

        updated
            .map(|bytes| bincode::deserialize::<CacheRecord>(&bytes))
            .transpose()
            .map_err(|e| CacheError::SerializationError(e.to_string()))
    }

    fn miss(&self) -> Result<Option<CachedAudio>, CacheError> {
        self.miss_count.fetch_add(1, Ordering::Relaxed);
        Ok(None)
    }

    /// 刷新数据库
    pub fn flush(&self) -> Result<(), CacheError> {
        self.db
            .flush()
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl AudioCachePort for SledAudioCache {
    async fn lookup(&self, fields: &CacheKeyFields) -> Result<Option<CachedAudio>, CacheError> {
        let key = fields.cache_key();

        let data = match self.db.get(Self::record_key(&key)) {
            Ok(Some(data)) => data,
            Ok(None) => return self.miss(),
            Err(e) => return Err(CacheError::DatabaseError(e.to_string())),
        };

        let record: CacheRecord = match bincode::deserialize(&data) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Dropping corrupt cache record");
                self.remove_record(&key)?;
                return self.miss();
            }
        };

        let audio_data = match self
            .blobs
            .read(&record.path)
            .await
            .map_err(|e| CacheError::IoError(e.to_string()))?
        {
            Some(audio_data) => audio_data,
            None => {
                tracing::warn!(
                    key = %key,
                    path = %record.path.display(),
                    "Cached audio file missing, dropping record"
                );
                self.remove_record(&key)?;
                return self.miss();
            }
        };

        let Some(record) = self.bump_hit(&key)? else {
            tracing::debug!(key = %key, "Cache record removed during lookup");
            return self.miss();
        };
        self.hit_count.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(key = %key, hit_count = record.hit_count, "Cache hit");

        Ok(Some(CachedAudio {
            key,
            path: record.path,
            audio_data,
            from_cache: true,
        }))
    }

    async fn store(&self, fields: &CacheKeyFields, audio_data: Vec<u8>) -> Result<CachedAudio, CacheError> {
        let key = fields.cache_key();

        let path = self
            .blobs
            .write(&fields.voice_id, &key, &audio_data)
            .await
            .map_err(|e| CacheError::IoError(e.to_string()))?;

        let record = CacheRecord::new(key.clone(), fields, audio_data.len() as u64, path.clone());
        self.put_record(&record)?;

        tracing::debug!(
            key = %key,
            size_bytes = record.bytes,
            "Audio cached"
        );

        Ok(CachedAudio {
            key,
            path,
            audio_data,
            from_cache: false,
        })
    }

    async fn stats(&self) -> Result<CacheStats, CacheError> {
        let records = self.records()?;
        Ok(CacheStats {
            items: records.len() as u64,
            bytes: records.iter().map(|r| r.bytes).sum(),
            hits: self.hit_count.load(Ordering::Relaxed),
            misses: self.miss_count.load(Ordering::Relaxed),
        })
    }

    async fn recent(&self, limit: usize) -> Result<Vec<CacheRecord>, CacheError> {
        let mut records = self.records()?;
        records.sort_by(|a, b| b.last_active().cmp(&a.last_active()));
        records.truncate(limit);
        Ok(records)
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.db
            .clear()
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?;
        self.flush()?;
        self.blobs
            .clear()
            .await
            .map_err(|e| CacheError::IoError(e.to_string()))?;

        tracing::info!("Audio cache cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::storage::ShardedBlobStorage;
    use tempfile::tempdir;

    async fn open_cache(dir: &Path) -> SledAudioCache {
        let blobs = ShardedBlobStorage::new(dir.join("audio")).await.unwrap();
        SledAudioCache::open(dir.join("index.sled"), Arc::new(blobs)).unwrap()
    }

    fn fields(text: &str) -> CacheKeyFields {
        CacheKeyFields::new("tone-440", "tower_en", "en", 1.0, text)
    }

    #[tokio::test]
    async fn test_store_then_hit() {
        let dir = tempdir().unwrap();
        let cache = open_cache(dir.path()).await;
        let f = fields("cleared to land runway two seven");

        assert!(cache.lookup(&f).await.unwrap().is_none());

        let stored = cache.store(&f, vec![1, 2, 3, 4]).await.unwrap();
        assert!(!stored.from_cache);
        assert!(stored.path.exists());

        let hit = cache.lookup(&f).await.unwrap().unwrap();
        assert!(hit.from_cache);
        assert_eq!(hit.audio_data, vec![1, 2, 3, 4]);
        assert_eq!(hit.key, stored.key);

        let stats = cache.stats().await.unwrap();
        assert_eq!(
            stats,
            CacheStats {
                items: 1,
                bytes: 4,
                hits: 1,
                misses: 1
            }
        );

        let recent = cache.recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].hit_count, 1);
        assert!(recent[0].last_hit.is_some());
        assert_eq!(recent[0].voice_id, "tower_en");
    }

    #[tokio::test]
    async fn test_missing_blob_is_a_miss() {
        let dir = tempdir().unwrap();
        let cache = open_cache(dir.path()).await;
        let f = fields("squawk seven seven zero zero");

        let stored = cache.store(&f, vec![9; 16]).await.unwrap();
        std::fs::remove_file(&stored.path).unwrap();

        assert!(cache.lookup(&f).await.unwrap().is_none());
        assert_eq!(cache.stats().await.unwrap().items, 0);
    }

    #[tokio::test]
    async fn test_recent_orders_by_activity() {
        let dir = tempdir().unwrap();
        let cache = open_cache(dir.path()).await;

        cache.store(&fields("one"), vec![1]).await.unwrap();
        cache.store(&fields("two"), vec![2]).await.unwrap();
        cache.store(&fields("three"), vec![3]).await.unwrap();
        cache.lookup(&fields("one")).await.unwrap().unwrap();

        let recent = cache.recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].text_norm, "one");
        assert_eq!(recent[1].text_norm, "three");
    }

    #[tokio::test]
    async fn test_clear_removes_index_and_files() {
        let dir = tempdir().unwrap();
        let cache = open_cache(dir.path()).await;
        let stored = cache.store(&fields("hold short"), vec![5; 8]).await.unwrap();

        cache.clear().await.unwrap();

        assert!(!stored.path.exists());
        assert_eq!(cache.stats().await.unwrap().items, 0);
        assert!(cache.lookup(&fields("hold short")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_hits_are_all_counted() {
        let dir = tempdir().unwrap();
        let cache = Arc::new(open_cache(dir.path()).await);
        cache.store(&fields("line up and wait"), vec![3; 8]).await.unwrap();

        let lookups: Vec<_> = (0..16)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.lookup(&fields("line up and wait")).await })
            })
            .collect();
        for lookup in lookups {
            assert!(lookup.await.unwrap().unwrap().is_some());
        }

        let recent = cache.recent(1).await.unwrap();
        assert_eq!(recent[0].hit_count, 16);
        assert_eq!(cache.stats().await.unwrap().hits, 16);
    }

    #[tokio::test]
    async fn test_hit_update_does_not_resurrect_cleared_record() {
        let dir = tempdir().unwrap();
        let cache = open_cache(dir.path()).await;
        let stored = cache.store(&fields("taxi via alpha"), vec![4; 8]).await.unwrap();

        assert_eq!(cache.bump_hit(&stored.key).unwrap().unwrap().hit_count, 1);

        cache.clear().await.unwrap();
        assert!(cache.bump_hit(&stored.key).unwrap().is_none());
        assert_eq!(cache.stats().await.unwrap().items, 0);
    }

    #[tokio::test]
    async fn test_index_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let cache = open_cache(dir.path()).await;
            cache.store(&fields("contact ground"), vec![7; 4]).await.unwrap();
            cache.flush().unwrap();
        }

        let cache = open_cache(dir.path()).await;
        let hit = cache.lookup(&fields("contact ground")).await.unwrap().unwrap();
        assert_eq!(hit.audio_data, vec![7; 4]);
    }
}
