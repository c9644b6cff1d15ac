//! The immutable request context that flows through every call (§4.A).

use crate::compliance::ComplianceDecision;
use crate::error::{CoreError, Result};
use crate::id::Id;
use crate::model::{Degree, InfoType, Tier};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Where the cache-aside layer should look up/write results for this
/// context (§4.C).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheScope {
    /// Read/write the shared, cross-tenant cache (paid-external data only).
    Shared,
    /// Read/write only this tenant's isolated cache rows.
    TenantIsolated,
}

/// Immutable request context, frozen after construction (§3, §4.A).
///
/// Every field except the cost accumulator is fixed for the lifetime of the
/// request. The accumulator is shared (`Arc`) across every clone of this
/// context so that cost charged by one call is visible to the next
/// `assert_budget_available` anywhere in the investigation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique id for this request.
    pub request_id: Id,
    /// Tenant the request belongs to.
    pub tenant_id: String,
    /// Authenticated actor who submitted the request.
    pub actor: String,
    /// Locale governing compliance rules.
    pub locale: String,
    /// Checks this context is permitted to perform.
    pub permitted_checks: HashSet<InfoType>,
    /// Providers this context is permitted to reach.
    pub permitted_sources: HashSet<String>,
    /// Opaque consent token reference.
    pub consent_token: String,
    /// Scopes the subject consented to.
    pub consent_scope: HashSet<String>,
    /// When consent expires.
    pub consent_expiry: DateTime<Utc>,
    /// Service tier.
    pub tier: Tier,
    /// Network expansion degree.
    pub degree: Degree,
    /// Audit id tying every event in this investigation together.
    pub audit_id: Id,
    /// When this context was constructed.
    pub initiated_at: DateTime<Utc>,
    /// Optional hard budget ceiling in USD.
    pub budget_limit: Option<f64>,
    /// Cache scope for this request.
    pub cache_scope: CacheScope,
    cost_accumulated: Arc<Mutex<f64>>,
}

/// Inputs needed to construct a [`RequestContext`]. Grouped into one type
/// so construction reads as a single, auditable act rather than a long
/// positional argument list.
pub struct RequestContextInit {
    /// Tenant the request belongs to.
    pub tenant_id: String,
    /// Authenticated actor who submitted the request.
    pub actor: String,
    /// Locale governing compliance rules.
    pub locale: String,
    /// Compliance decision already evaluated for this (locale, role, tier).
    pub compliance: ComplianceDecision,
    /// Providers this context is permitted to reach, independent of the
    /// compliance decision's check-type permissions (provider identity is
    /// outside `invest-core`'s knowledge).
    pub permitted_sources: HashSet<String>,
    /// Opaque consent token reference.
    pub consent_token: String,
    /// Scopes the subject consented to.
    pub consent_scope: HashSet<String>,
    /// When consent expires.
    pub consent_expiry: DateTime<Utc>,
    /// Service tier.
    pub tier: Tier,
    /// Network expansion degree.
    pub degree: Degree,
    /// Optional hard budget ceiling in USD.
    pub budget_limit: Option<f64>,
    /// Cache scope for this request.
    pub cache_scope: CacheScope,
}

impl RequestContext {
    /// Build a frozen context from its constituent parts.
    pub fn new(init: RequestContextInit) -> Self {
        Self {
            request_id: Id::new(),
            tenant_id: init.tenant_id,
            actor: init.actor,
            locale: init.locale,
            permitted_checks: init.compliance.permitted_checks,
            permitted_sources: init.permitted_sources,
            consent_token: init.consent_token,
            consent_scope: init.consent_scope,
            consent_expiry: init.consent_expiry,
            tier: init.tier,
            degree: init.degree,
            audit_id: Id::new(),
            initiated_at: Utc::now(),
            budget_limit: init.budget_limit,
            cache_scope: init.cache_scope,
            cost_accumulated: Arc::new(Mutex::new(0.0)),
        }
    }

    /// Total cost charged so far under this context.
    pub fn cost_accumulated(&self) -> f64 {
        *self.cost_accumulated.lock()
    }

    /// `ComplianceBlocked` unless `check` is in `permitted_checks`.
    pub fn assert_check_permitted(&self, check: InfoType) -> Result<()> {
        if self.permitted_checks.contains(&check) {
            Ok(())
        } else {
            Err(CoreError::ComplianceBlocked {
                reason: format!("{check:?} not permitted for locale {}", self.locale),
            })
        }
    }

    /// `ComplianceBlocked` unless `provider_id` is in `permitted_sources`.
    pub fn assert_source_permitted(&self, provider_id: &str) -> Result<()> {
        if self.permitted_sources.contains(provider_id) {
            Ok(())
        } else {
            Err(CoreError::ComplianceBlocked {
                reason: format!("provider {provider_id} not permitted for this tenant/locale"),
            })
        }
    }

    /// `BudgetExceeded` if `cost_accumulated + cost > budget_limit`, when a
    /// limit is set. Read-only: does not charge anything.
    pub fn assert_budget_available(&self, cost: f64) -> Result<()> {
        if let Some(limit) = self.budget_limit {
            let accumulated = self.cost_accumulated();
            if accumulated + cost > limit {
                return Err(CoreError::BudgetExceeded {
                    accumulated,
                    requested: cost,
                    limit,
                });
            }
        }
        Ok(())
    }

    /// `ConsentExpired` if `now` is past `consent_expiry`.
    pub fn assert_consent_valid(&self, now: DateTime<Utc>) -> Result<()> {
        if now > self.consent_expiry {
            Err(CoreError::ConsentExpired {
                expired_at: self.consent_expiry.to_rfc3339(),
            })
        } else {
            Ok(())
        }
    }

    /// Atomically check-then-increment the cost accumulator (§5: "budget
    /// check + increment is a single critical section"). This is the only
    /// way `cost_accumulated` may change, and it may only grow.
    pub fn charge(&self, cost: f64) -> Result<()> {
        let mut accumulated = self.cost_accumulated.lock();
        if let Some(limit) = self.budget_limit {
            if *accumulated + cost > limit {
                return Err(CoreError::BudgetExceeded {
                    accumulated: *accumulated,
                    requested: cost,
                    limit,
                });
            }
        }
        *accumulated += cost;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ctx(budget_limit: Option<f64>) -> RequestContext {
        RequestContext::new(RequestContextInit {
            tenant_id: "tenant-a".into(),
            actor: "actor-a".into(),
            locale: "US".into(),
            compliance: ComplianceDecision {
                permitted_checks: [InfoType::Identity].into_iter().collect(),
                ..Default::default()
            },
            permitted_sources: ["provider-a".to_string()].into_iter().collect(),
            consent_token: "tok".into(),
            consent_scope: HashSet::new(),
            consent_expiry: Utc::now() + Duration::days(1),
            tier: Tier::Standard,
            degree: Degree::D1,
            budget_limit,
            cache_scope: CacheScope::Shared,
        })
    }

    #[test]
    fn unpermitted_check_is_blocked() {
        let context = ctx(None);
        assert!(context.assert_check_permitted(InfoType::Identity).is_ok());
        assert!(context.assert_check_permitted(InfoType::Criminal).is_err());
    }

    #[test]
    fn budget_invariant_holds_at_every_commit() {
        let context = ctx(Some(10.0));
        assert!(context.charge(6.0).is_ok());
        assert!(context.charge(3.0).is_ok());
        assert!(context.charge(2.0).is_err());
        assert!(context.cost_accumulated() <= 10.0);
    }

    #[test]
    fn clones_share_the_same_cost_accumulator() {
        let context = ctx(Some(10.0));
        let clone = context.clone();
        clone.charge(4.0).unwrap();
        assert_eq!(context.cost_accumulated(), 4.0);
    }

    #[test]
    fn consent_expiry_is_enforced() {
        let context = ctx(None);
        assert!(context.assert_consent_valid(Utc::now()).is_ok());
        assert!(context
            .assert_consent_valid(Utc::now() + Duration::days(2))
            .is_err());
    }
}
