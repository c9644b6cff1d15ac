//! Builders for the inputs every investigation needs: a subject, a
//! resolved entity, and a frozen request context. Each follows the same
//! `with_*`-consuming-`self` shape as the rest of this crate so tests read
//! as a short chain rather than a field-by-field struct literal.

use chrono::{Duration, Utc};
use invest_core::model::{DataOriginTag, Degree, Entity, EntityKind, IdentifierKind, IdentifierRecord, InfoType, Tier};
use invest_core::{CacheScope, ComplianceDecision, Id, RequestContext, RequestContextInit};
use invest_resolver::SubjectInput;
use std::collections::HashSet;

/// Build a [`SubjectInput`] for a named individual, defaulting to a US
/// tenant and customer-provided data.
pub fn subject(tenant_id: impl Into<String>, first_name: impl Into<String>, last_name: impl Into<String>) -> SubjectInput {
    let first_name = first_name.into();
    let last_name = last_name.into();
    SubjectInput {
        identifiers: Vec::new(),
        name: format!("{first_name} {last_name}"),
        last_name,
        first_name,
        date_of_birth: None,
        address: None,
        tenant_id: tenant_id.into(),
        data_origin: DataOriginTag::CustomerProvided,
    }
}

/// Attach a normalized identifier to a [`SubjectInput`], e.g. an SSN used
/// to drive exact-match resolution.
pub fn with_identifier(mut subject: SubjectInput, entity_id: Id, kind: IdentifierKind, raw: impl Into<String>) -> SubjectInput {
    subject.identifiers.push(IdentifierRecord::new(entity_id, kind, raw, 1.0, "intake"));
    subject
}

/// A bare individual [`Entity`] for a tenant, with no identifiers yet.
pub fn entity(tenant_id: impl Into<String>) -> Entity {
    Entity::new(EntityKind::Individual, tenant_id, DataOriginTag::CustomerProvided)
}

/// Everything [`RequestContext::new`] needs, pre-filled with permissive
/// defaults: every [`InfoType`] permitted, consent valid for a year,
/// Standard tier, subject-only degree, no budget ceiling, shared cache.
pub struct RequestContextBuilder {
    init: RequestContextInit,
}

impl RequestContextBuilder {
    /// Start a builder for `tenant_id`, permitting every check and source
    /// given.
    pub fn new(tenant_id: impl Into<String>, permitted_sources: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let compliance = ComplianceDecision {
            permitted_checks: InfoType::all().iter().copied().collect(),
            ..ComplianceDecision::default()
        };
        Self {
            init: RequestContextInit {
                tenant_id: tenant_id.into(),
                actor: "test-actor".to_string(),
                locale: "US".to_string(),
                compliance,
                permitted_sources: permitted_sources.into_iter().map(Into::into).collect(),
                consent_token: "consent-token".to_string(),
                consent_scope: InfoType::all().iter().map(|t| format!("{t:?}")).collect(),
                consent_expiry: Utc::now() + Duration::days(365),
                tier: Tier::Standard,
                degree: Degree::D1,
                budget_limit: None,
                cache_scope: CacheScope::Shared,
            },
        }
    }

    /// Restrict the permitted checks to exactly this set.
    pub fn with_permitted_checks(mut self, checks: impl IntoIterator<Item = InfoType>) -> Self {
        self.init.compliance.permitted_checks = checks.into_iter().collect::<HashSet<_>>();
        self
    }

    /// Override the service tier.
    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.init.tier = tier;
        self
    }

    /// Override the network expansion degree.
    pub fn with_degree(mut self, degree: Degree) -> Self {
        self.init.degree = degree;
        self
    }

    /// Set a hard budget ceiling in USD.
    pub fn with_budget_limit(mut self, limit: f64) -> Self {
        self.init.budget_limit = Some(limit);
        self
    }

    /// Set consent to have already expired, for testing the expiry gate.
    pub fn with_expired_consent(mut self) -> Self {
        self.init.consent_expiry = Utc::now() - Duration::days(1);
        self
    }

    /// Use a tenant-isolated cache scope instead of the shared default.
    pub fn with_tenant_isolated_cache(mut self) -> Self {
        self.init.cache_scope = CacheScope::TenantIsolated;
        self
    }

    /// Build the frozen [`RequestContext`].
    pub fn build(self) -> RequestContext {
        RequestContext::new(self.init)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context_permits_every_check() {
        let ctx = RequestContextBuilder::new("tenant-1", vec!["stub-1"]).build();
        assert!(ctx.assert_check_permitted(InfoType::Sanctions).is_ok());
        assert!(ctx.assert_source_permitted("stub-1").is_ok());
        assert!(ctx.assert_source_permitted("unknown").is_err());
    }

    #[test]
    fn restricted_checks_are_enforced() {
        let ctx = RequestContextBuilder::new("tenant-1", vec!["stub-1"])
            .with_permitted_checks(vec![InfoType::Identity])
            .build();
        assert!(ctx.assert_check_permitted(InfoType::Identity).is_ok());
        assert!(ctx.assert_check_permitted(InfoType::Criminal).is_err());
    }

    #[test]
    fn expired_consent_fails_the_gate() {
        let ctx = RequestContextBuilder::new("tenant-1", vec!["stub-1"]).with_expired_consent().build();
        assert!(ctx.assert_consent_valid(Utc::now()).is_err());
    }
}
