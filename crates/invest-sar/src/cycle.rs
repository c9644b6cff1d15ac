//! Drives one information type through repeated SEARCH → ASSESS → REFINE
//! iterations until it reaches a terminal [`SarPhase`] (§4.F).

use chrono::Utc;
use tracing::{info, instrument};

use invest_cache::CacheAside;
use invest_config::{AssessWeights, SarThresholds};
use invest_core::model::{CachedResult, DataOrigin, InfoType, KnowledgeBase, SarPhase, SarTypeState};
use invest_core::{CacheScope, Id, RequestContext};
use invest_providers::{ProviderResult, ProviderRouter};

use crate::assessor;
use crate::error::Result;
use crate::planner;
use crate::refiner::{self, RefineOutcome};

/// Everything one cycle needs that isn't per-call state. Every field is a
/// shared reference, so this is cheap to copy per type within a phase.
#[derive(Clone, Copy)]
pub struct CycleDeps<'a> {
    /// Routes queries the cache can't satisfy to a live provider.
    pub router: &'a ProviderRouter,
    /// Cache-aside layer consulted before every provider call.
    pub cache: &'a CacheAside,
    /// Shared investigation knowledge, updated as facts are learned.
    pub kb: &'a KnowledgeBase,
    /// Confidence/iteration thresholds, keyed by Foundation vs. the rest.
    pub thresholds: &'a SarThresholds,
    /// Weights for the ASSESS step's `type_confidence` formula.
    pub assess_weights: &'a AssessWeights,
    /// Concurrency bound for this phase's provider calls.
    pub phase_concurrency: usize,
}

/// What one type's full cycle (all iterations) produced.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    /// The type's final state: phase, confidence, gaps, etc.
    pub state: SarTypeState,
    /// Entities discovered across all iterations, for the network phase.
    pub discovered_entities: Vec<Id>,
    /// Inconsistencies noticed across all iterations, for reconciliation.
    pub inconsistencies: Vec<String>,
}

/// Run `info_type`'s SEARCH → ASSESS → REFINE loop to a terminal phase.
#[instrument(skip(context, deps), fields(info_type = ?info_type))]
pub async fn run_cycle(context: &RequestContext, subject_entity_id: Id, info_type: InfoType, deps: CycleDeps<'_>) -> Result<CycleOutcome> {
    let is_foundation = matches!(info_type.phase(), invest_core::model::Phase::Foundation);
    let type_thresholds = deps.thresholds.for_phase(is_foundation);

    let mut state = SarTypeState::new(info_type);
    let mut previous_confidence = 0.0;
    let mut all_discovered = Vec::new();
    let mut all_inconsistencies = Vec::new();
    let mut pending_gaps: Vec<String> = Vec::new();

    loop {
        let snapshot = deps.kb.snapshot();
        let planned = planner::plan_queries(context, subject_entity_id, info_type, &snapshot, &pending_gaps);
        let attempted = planned.len();

        let mut results: Vec<ProviderResult> = Vec::with_capacity(attempted);
        for check_request in &planned {
            if let Some(result) = run_one_query(context, subject_entity_id, info_type, check_request, &deps).await? {
                results.push(result);
            }
        }
        let executed = results.len();
        absorb_results_into_kb(deps.kb, &results);

        let outcome = assessor::assess(
            info_type,
            &results,
            executed,
            attempted,
            deps.assess_weights,
            Vec::new(),
            Vec::new(),
        );

        state.iteration = state.iteration.max(1);
        state.raise_confidence(outcome.type_confidence);
        state.info_gain_rate = outcome.info_gain_rate;
        state.gaps = outcome.gaps.clone();
        state.queries.extend(planned.iter().map(|q| format!("{:?}:{:?}", q.check_type, q.params)));
        state.updated_at = Utc::now();

        all_discovered.extend(outcome.discovered_entities.iter().copied());
        all_inconsistencies.extend(outcome.inconsistencies.iter().cloned());

        let decision = refiner::refine(
            &type_thresholds,
            state.iteration,
            state.confidence,
            previous_confidence,
            outcome.info_gain_rate,
            outcome.gaps,
        );
        previous_confidence = state.confidence;

        match decision {
            RefineOutcome::Continue { gaps } => {
                pending_gaps = gaps;
                state.iteration += 1;
                continue;
            }
            terminal => {
                state.phase = terminal.terminal_phase().unwrap_or(SarPhase::Capped);
                info!(phase = ?state.phase, confidence = state.confidence, "type cycle terminated");
                break;
            }
        }
    }

    Ok(CycleOutcome {
        state,
        discovered_entities: all_discovered,
        inconsistencies: all_inconsistencies,
    })
}

/// Fold a batch of provider results into the shared KnowledgeBase under
/// one `observe_then_add` transaction, so facts discovered this iteration
/// are visible to every subsequent SEARCH planner (§4.F, §5).
fn absorb_results_into_kb(kb: &KnowledgeBase, results: &[ProviderResult]) {
    kb.observe_then_add(|snapshot| {
        for result in results {
            let Some(object) = result.normalized_payload.as_object() else {
                continue;
            };
            if let Some(name) = object.get("legal_name").and_then(|v| v.as_str()) {
                snapshot.name_variants.insert(name.to_string());
            }
            if let Some(address) = object.get("address").and_then(|v| v.as_str()) {
                snapshot.addresses.insert(address.to_string());
            }
            if let Some(jurisdiction) = object.get("jurisdiction").and_then(|v| v.as_str()) {
                snapshot.jurisdictions.insert(jurisdiction.to_string());
            }
            if let Some(employer) = object.get("employer").and_then(|v| v.as_str()) {
                if !snapshot.employers.iter().any(|e| e.name == employer) {
                    snapshot.employers.push(invest_core::model::EmployerRecord {
                        name: employer.to_string(),
                        title: object.get("title").and_then(|v| v.as_str()).map(str::to_string),
                        start: None,
                        end: None,
                    });
                }
            }
            if let Some(institution) = object.get("institution").and_then(|v| v.as_str()) {
                if !snapshot.educations.iter().any(|e| e.institution == institution) {
                    snapshot.educations.push(invest_core::model::EducationRecord {
                        institution: institution.to_string(),
                        degree: object.get("degree").and_then(|v| v.as_str()).map(str::to_string),
                        graduation_year: None,
                    });
                }
            }
        }
    });
}

/// Serve one query from the cache if possible, otherwise route it to a
/// live provider and write the result back.
async fn run_one_query(
    context: &RequestContext,
    subject_entity_id: Id,
    info_type: InfoType,
    check_request: &invest_providers::CheckRequest,
    deps: &CycleDeps<'_>,
) -> Result<Option<ProviderResult>> {
    use invest_cache::CacheDecision;

    let now = Utc::now();
    let decision = deps
        .cache
        .lookup(subject_entity_id, info_type, &context.cache_scope, &context.tenant_id, context.tier, now)
        .await?;

    let cached = match decision {
        CacheDecision::Use(row) => Some(row),
        CacheDecision::UseAndQueueRefresh(row) => Some(row),
        CacheDecision::Fallthrough => None,
    };

    if let Some(row) = cached {
        return Ok(Some(ProviderResult {
            provider_id: row.provider_id,
            raw_payload: serde_json::Value::Null,
            normalized_payload: row.normalized,
            cost: 0.0,
        }));
    }

    let result = deps.router.route(context, check_request).await?;

    let cache_row = CachedResult {
        entity_id: subject_entity_id,
        provider_id: result.provider_id.clone(),
        check_type: info_type,
        data_origin: DataOrigin::PaidExternal,
        tenant_scope: match context.cache_scope {
            CacheScope::TenantIsolated => Some(context.tenant_id.clone()),
            CacheScope::Shared => None,
        },
        acquired_at: now,
        fresh_until: now,
        stale_until: now,
        raw_encrypted: Vec::new(),
        normalized: result.normalized_payload.clone(),
        cost: result.cost,
    };
    deps.cache.write(cache_row).await?;

    Ok(Some(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use invest_cache::InMemoryCacheBackend;
    use invest_config::{FreshnessWindows, RetryConfig, TierPolicyMatrix};
    use invest_core::compliance::ComplianceDecision;
    use invest_core::context::RequestContextInit;
    use invest_core::model::{Degree, Tier};
    use invest_providers::{ProviderAdapter, ProviderCategory, ProviderHealth, ProviderMetadata, ProviderRateLimiter, ProviderRegistry, RateLimit};
    use std::collections::HashSet;

    struct StubAdapter(ProviderMetadata);

    #[async_trait]
    impl ProviderAdapter for StubAdapter {
        fn metadata(&self) -> &ProviderMetadata {
            &self.0
        }

        async fn execute_check(&self, _request: &invest_providers::CheckRequest) -> std::result::Result<ProviderResult, (invest_providers::FailureKind, String)> {
            Ok(ProviderResult {
                provider_id: self.0.id.clone(),
                raw_payload: serde_json::json!({"legal_name": "Jane Doe"}),
                normalized_payload: serde_json::json!({"legal_name": "Jane Doe"}),
                cost: 1.0,
            })
        }

        async fn health_check(&self) -> ProviderHealth {
            ProviderHealth::Healthy
        }
    }

    fn test_context() -> RequestContext {
        RequestContext::new(RequestContextInit {
            tenant_id: "tenant-a".to_string(),
            actor: "tester".to_string(),
            locale: "US".to_string(),
            permitted_checks: [InfoType::Identity].into_iter().collect(),
            permitted_sources: HashSet::new(),
            consent_token: "token".to_string(),
            consent_scope: HashSet::new(),
            consent_expiry: Utc::now() + chrono::Duration::days(1),
            tier: Tier::Standard,
            degree: Degree::D1,
            budget_limit: None,
            cache_scope: CacheScope::Shared,
            compliance: ComplianceDecision::default(),
        })
    }

    #[tokio::test]
    async fn identity_cycle_reaches_a_terminal_phase() {
        let mut registry = ProviderRegistry::new();
        registry.register(
            Arc::new(StubAdapter(ProviderMetadata {
                id: "stub".to_string(),
                category: ProviderCategory::Core,
                supported_checks: vec![InfoType::Identity],
                supported_locales: vec!["US".to_string()],
                cost_tier: 1.0,
            })),
            invest_config::CircuitBreakerConfig::defaults(),
        );
        let router = ProviderRouter::new(
            Arc::new(registry),
            Arc::new(ProviderRateLimiter::new(RateLimit { tokens_per_second: 100.0, burst_capacity: 100 })),
            RetryConfig::defaults(),
            Duration::from_secs(5),
        );
        let cache = CacheAside::new(Arc::new(InMemoryCacheBackend::new()), TierPolicyMatrix::defaults(), FreshnessWindows::defaults());
        let kb = KnowledgeBase::new();
        let thresholds = SarThresholds::defaults();
        let assess_weights = AssessWeights::defaults();

        let context = test_context();
        let outcome = run_cycle(
            &context,
            Id::new(),
            InfoType::Identity,
            CycleDeps {
                router: &router,
                cache: &cache,
                kb: &kb,
                thresholds: &thresholds,
                assess_weights: &assess_weights,
                phase_concurrency: 4,
            },
        )
        .await
        .unwrap();

        assert!(outcome.state.phase.is_terminal());
    }
}
