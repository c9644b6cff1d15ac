use super::sar_state::InfoType;
use crate::id::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provenance of a cached row, distinct from [`super::entity::DataOriginTag`]
/// on the entity itself: one entity can accumulate both shared
/// paid-external rows and tenant-scoped customer-provided rows over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataOrigin {
    /// Paid for from an external provider; eligible for the shared cache.
    PaidExternal,
    /// Supplied by the customer; must stay tenant-isolated (§4.C, §8
    /// invariant 5).
    CustomerProvided,
}

/// Lifecycle state of a cached row at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheState {
    /// `now <= fresh_until`: use as-is.
    Fresh,
    /// `fresh_until < now <= stale_until`: tier-policy decides.
    Stale,
    /// `now > stale_until`: must re-fetch.
    Expired,
}

/// A single provider result, cached for reuse across investigations (when
/// shared) or within a tenant (when customer-scoped).
///
/// Cache rows are append-only: a refresh writes a new row rather than
/// mutating this one (§4.C write policy).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResult {
    /// The entity this result is about.
    pub entity_id: Id,
    /// The provider that produced this result.
    pub provider_id: String,
    /// The information type this result satisfies.
    pub check_type: InfoType,
    /// Provenance of this row.
    pub data_origin: DataOrigin,
    /// `None` for shared rows; `Some(tenant_id)` for tenant-isolated rows.
    pub tenant_scope: Option<String>,
    /// When this row was written.
    pub acquired_at: DateTime<Utc>,
    /// End of the FRESH window.
    pub fresh_until: DateTime<Utc>,
    /// End of the STALE window; beyond this the row is EXPIRED.
    pub stale_until: DateTime<Utc>,
    /// Encrypted raw provider payload.
    pub raw_encrypted: Vec<u8>,
    /// Normalized payload, used by the rest of the system.
    pub normalized: serde_json::Value,
    /// What this result cost to acquire, in USD.
    pub cost: f64,
}

impl CachedResult {
    /// Compute the lifecycle state of this row at `now`.
    pub fn state_at(&self, now: DateTime<Utc>) -> CacheState {
        if now <= self.fresh_until {
            CacheState::Fresh
        } else if now <= self.stale_until {
            CacheState::Stale
        } else {
            CacheState::Expired
        }
    }

    /// The cache key this row answers: `(entity_id, check_type, tenant_scope)`.
    pub fn key(&self) -> (Id, InfoType, Option<String>) {
        (self.entity_id, self.check_type, self.tenant_scope.clone())
    }
}
