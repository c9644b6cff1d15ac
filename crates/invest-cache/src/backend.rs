//! The storage abstraction behind the cache-aside layer (§4.C).

use crate::error::Result;
use async_trait::async_trait;
use invest_core::model::{CachedResult, InfoType};
use invest_core::Id;

/// The cache key: `(entity_id, check_type, tenant_scope)` (§4.C). A shared
/// row has `tenant_scope = None`; a tenant-isolated row has
/// `tenant_scope = Some(tenant_id)`.
pub type CacheKey = (Id, InfoType, Option<String>);

/// Storage behind the cache-aside layer. Concurrent readers; single-writer
/// per key (§5 "Shared-resource policy"); upserts are last-writer-wins
/// keyed by `acquired_at`, which `put` is responsible for enforcing.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Look up the most recent row for `key`, if any.
    async fn get(&self, key: &CacheKey) -> Result<Option<CachedResult>>;

    /// Write a new row (§4.C write policy: append, never update-in-place).
    /// If an existing row for the same key has a later or equal
    /// `acquired_at`, the write is a no-op (last-writer-wins).
    async fn put(&self, row: CachedResult) -> Result<()>;

    /// Remove a row outright, e.g. after a `DataIntegrity` failure.
    async fn invalidate(&self, key: &CacheKey) -> Result<()>;
}
