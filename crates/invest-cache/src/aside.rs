//! Cache-aside decisioning: freshness policy, tier-policy application, and
//! tenant-scope enforcement (§4.C).

use crate::backend::{CacheBackend, CacheKey};
use crate::error::{CacheError, Result};
use chrono::{DateTime, Utc};
use invest_config::{FreshnessWindows, StaleAction, TierPolicyMatrix};
use invest_core::context::CacheScope;
use invest_core::model::{CacheState, CachedResult, DataOrigin, InfoType, Tier};
use invest_core::Id;
use std::sync::Arc;

/// The outcome of a cache-aside lookup, already filtered through the
/// tier-policy matrix (§4.C states).
#[derive(Debug, Clone)]
pub enum CacheDecision {
    /// Use the row as-is; nothing else to do.
    Use(CachedResult),
    /// Use the row now, but the caller must queue a best-effort
    /// asynchronous refresh before anyone else reads this key again
    /// (§8 invariant 4).
    UseAndQueueRefresh(CachedResult),
    /// No usable row; fall through to a provider query.
    Fallthrough,
}

/// Cache-aside orchestration over a [`CacheBackend`]. Knows nothing about
/// providers; the caller is responsible for invoking the provider router
/// on [`CacheDecision::Fallthrough`] or [`CacheDecision::UseAndQueueRefresh`]
/// and calling [`CacheAside::write`] with the fresh result.
pub struct CacheAside {
    backend: Arc<dyn CacheBackend>,
    tier_policy: TierPolicyMatrix,
    freshness: FreshnessWindows,
}

impl CacheAside {
    /// Build a cache-aside layer over `backend`, governed by `tier_policy`
    /// and `freshness`.
    pub fn new(backend: Arc<dyn CacheBackend>, tier_policy: TierPolicyMatrix, freshness: FreshnessWindows) -> Self {
        Self { backend, tier_policy, freshness }
    }

    fn key_for(entity_id: Id, check_type: InfoType, scope: &CacheScope, tenant_id: &str) -> CacheKey {
        match scope {
            CacheScope::Shared => (entity_id, check_type, None),
            CacheScope::TenantIsolated => (entity_id, check_type, Some(tenant_id.to_string())),
        }
    }

    /// Look up `(entity_id, check_type)` under `scope`, applying the
    /// tier-policy matrix to any STALE row found. A shared lookup can
    /// never surface a `CustomerProvided` row (§8 invariant 5) — such a
    /// row is treated as absent and logged, since it should never have
    /// been written there in the first place.
    pub async fn lookup(&self, entity_id: Id, check_type: InfoType, scope: &CacheScope, tenant_id: &str, tier: Tier, now: DateTime<Utc>) -> Result<CacheDecision> {
        let key = Self::key_for(entity_id, check_type, scope, tenant_id);
        let Some(row) = self.backend.get(&key).await? else {
            return Ok(CacheDecision::Fallthrough);
        };

        if matches!(scope, CacheScope::Shared) && row.data_origin == DataOrigin::CustomerProvided {
            tracing::error!(?check_type, %entity_id, "shared cache row carries customer-provided data; refusing to surface it");
            return Err(CacheError::TenantIsolationViolation);
        }

        match row.state_at(now) {
            CacheState::Fresh => Ok(CacheDecision::Use(row)),
            CacheState::Stale => {
                let policy = self.tier_policy.entry(check_type).and_then(|entry| match tier {
                    Tier::Standard => entry.standard,
                    Tier::Enhanced => entry.enhanced,
                });
                match policy {
                    Some(StaleAction::UseAndFlag) => Ok(CacheDecision::UseAndQueueRefresh(row)),
                    Some(StaleAction::BlockAndRefresh) | None => Ok(CacheDecision::Fallthrough),
                }
            }
            CacheState::Expired => Ok(CacheDecision::Fallthrough),
        }
    }

    /// Write a freshly-acquired result, computing `fresh_until`/
    /// `stale_until` from the configured freshness window. `stale_hours =
    /// None` (e.g. education) is represented as a window far enough in the
    /// future to never practically expire.
    pub async fn write(&self, mut row: CachedResult) -> Result<()> {
        if let Some(window) = self.freshness.window(row.check_type) {
            row.fresh_until = row.acquired_at + chrono::Duration::hours(window.freshness_hours);
            row.stale_until = match window.stale_hours {
                Some(hours) => row.acquired_at + chrono::Duration::hours(hours),
                None => row.acquired_at + chrono::Duration::days(365 * 100),
            };
        }
        self.backend.put(row).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryCacheBackend;
    use invest_config::{FreshnessWindow, TierPolicyEntry};

    fn cache_aside() -> CacheAside {
        let tier_policy = TierPolicyMatrix::new(vec![TierPolicyEntry { info_type: InfoType::Criminal, standard: Some(StaleAction::UseAndFlag), enhanced: Some(StaleAction::BlockAndRefresh) }]);
        let freshness = FreshnessWindows::new(vec![FreshnessWindow { info_type: InfoType::Criminal, freshness_hours: 1, stale_hours: Some(4) }]);
        CacheAside::new(Arc::new(InMemoryCacheBackend::new()), tier_policy, freshness)
    }

    fn base_row(entity_id: Id, acquired_at: DateTime<Utc>) -> CachedResult {
        CachedResult {
            entity_id,
            provider_id: "p1".to_string(),
            check_type: InfoType::Criminal,
            data_origin: DataOrigin::PaidExternal,
            tenant_scope: None,
            acquired_at,
            fresh_until: acquired_at,
            stale_until: acquired_at,
            raw_encrypted: Vec::new(),
            normalized: serde_json::Value::Null,
            cost: 2.0,
        }
    }

    #[tokio::test]
    async fn fresh_write_then_read_hits() {
        let aside = cache_aside();
        let entity_id = Id::new();
        let now = Utc::now();
        aside.write(base_row(entity_id, now)).await.unwrap();

        let decision = aside.lookup(entity_id, InfoType::Criminal, &CacheScope::Shared, "tenant-a", Tier::Standard, now).await.unwrap();
        assert!(matches!(decision, CacheDecision::Use(_)));
    }

    #[tokio::test]
    async fn stale_standard_tier_uses_and_flags() {
        let aside = cache_aside();
        let entity_id = Id::new();
        let written_at = Utc::now() - chrono::Duration::hours(2);
        aside.write(base_row(entity_id, written_at)).await.unwrap();

        let decision = aside.lookup(entity_id, InfoType::Criminal, &CacheScope::Shared, "tenant-a", Tier::Standard, Utc::now()).await.unwrap();
        assert!(matches!(decision, CacheDecision::UseAndQueueRefresh(_)));
    }

    #[tokio::test]
    async fn stale_enhanced_tier_blocks_and_refreshes() {
        let aside = cache_aside();
        let entity_id = Id::new();
        let written_at = Utc::now() - chrono::Duration::hours(2);
        aside.write(base_row(entity_id, written_at)).await.unwrap();

        let decision = aside.lookup(entity_id, InfoType::Criminal, &CacheScope::Shared, "tenant-a", Tier::Enhanced, Utc::now()).await.unwrap();
        assert!(matches!(decision, CacheDecision::Fallthrough));
    }

    #[tokio::test]
    async fn expired_row_falls_through() {
        let aside = cache_aside();
        let entity_id = Id::new();
        let written_at = Utc::now() - chrono::Duration::hours(10);
        aside.write(base_row(entity_id, written_at)).await.unwrap();

        let decision = aside.lookup(entity_id, InfoType::Criminal, &CacheScope::Shared, "tenant-a", Tier::Standard, Utc::now()).await.unwrap();
        assert!(matches!(decision, CacheDecision::Fallthrough));
    }

    #[tokio::test]
    async fn shared_lookup_never_surfaces_customer_provided_row() {
        let aside = cache_aside();
        let entity_id = Id::new();
        let mut tainted = base_row(entity_id, Utc::now());
        tainted.data_origin = DataOrigin::CustomerProvided;
        aside.backend.put(tainted).await.unwrap();

        let decision = aside.lookup(entity_id, InfoType::Criminal, &CacheScope::Shared, "tenant-a", Tier::Standard, Utc::now()).await;
        assert!(decision.is_err());
    }
}
