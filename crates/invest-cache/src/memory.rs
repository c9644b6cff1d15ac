//! An in-memory `CacheBackend`, the reference implementation for tests and
//! single-process deployments (§4.C "Add" in SPEC_FULL).

use crate::backend::{CacheBackend, CacheKey};
use crate::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use invest_core::model::CachedResult;

/// `dashmap`-backed cache storage. Concurrent readers and writers are
/// handled by `DashMap`'s internal sharding; the last-writer-wins rule is
/// enforced explicitly in `put`.
#[derive(Default)]
pub struct InMemoryCacheBackend {
    rows: DashMap<CacheKey, CachedResult>,
}

impl InMemoryCacheBackend {
    /// An empty backend.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheBackend for InMemoryCacheBackend {
    async fn get(&self, key: &CacheKey) -> Result<Option<CachedResult>> {
        Ok(self.rows.get(key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, row: CachedResult) -> Result<()> {
        let key = row.key();
        match self.rows.get(&key) {
            Some(existing) if existing.acquired_at >= row.acquired_at => {}
            _ => {
                self.rows.insert(key, row);
            }
        }
        Ok(())
    }

    async fn invalidate(&self, key: &CacheKey) -> Result<()> {
        self.rows.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use invest_core::model::{DataOrigin, InfoType};
    use invest_core::Id;

    fn row(entity_id: Id, acquired_at: chrono::DateTime<Utc>) -> CachedResult {
        CachedResult {
            entity_id,
            provider_id: "p1".to_string(),
            check_type: InfoType::Identity,
            data_origin: DataOrigin::PaidExternal,
            tenant_scope: None,
            acquired_at,
            fresh_until: acquired_at + chrono::Duration::hours(1),
            stale_until: acquired_at + chrono::Duration::hours(2),
            raw_encrypted: Vec::new(),
            normalized: serde_json::Value::Null,
            cost: 1.0,
        }
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let backend = InMemoryCacheBackend::new();
        let entity_id = Id::new();
        let written = row(entity_id, Utc::now());
        let key = written.key();
        backend.put(written.clone()).await.unwrap();
        let read = backend.get(&key).await.unwrap().unwrap();
        assert_eq!(read.normalized, written.normalized);
    }

    #[tokio::test]
    async fn put_is_last_writer_wins_by_acquired_at() {
        let backend = InMemoryCacheBackend::new();
        let entity_id = Id::new();
        let now = Utc::now();
        let older = row(entity_id, now - chrono::Duration::hours(1));
        let newer = row(entity_id, now);

        backend.put(newer.clone()).await.unwrap();
        backend.put(older).await.unwrap();

        let read = backend.get(&newer.key()).await.unwrap().unwrap();
        assert_eq!(read.acquired_at, newer.acquired_at);
    }

    #[tokio::test]
    async fn invalidate_removes_the_row() {
        let backend = InMemoryCacheBackend::new();
        let entity_id = Id::new();
        let written = row(entity_id, Utc::now());
        let key = written.key();
        backend.put(written).await.unwrap();
        backend.invalidate(&key).await.unwrap();
        assert!(backend.get(&key).await.unwrap().is_none());
    }
}
