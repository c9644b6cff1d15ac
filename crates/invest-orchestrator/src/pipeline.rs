//! Wires every subsystem into one investigation pipeline: entity
//! resolution, compliance, the SAR engine, the risk analyzer, profile
//! versioning, audit, and outbound events (§2 control flow, §4).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::json;
use tracing::{info, instrument};

use invest_ai::{AiModel, RawFact};
use invest_core::context::{RequestContext, RequestContextInit};
use invest_core::model::{EntityProfile, ProfileDelta, ProfileTrigger};
use invest_core::{AuditEventInit, AuditLedger, Id};
use invest_resolver::{discover_neighbors, resolve_or_create, EntityStore, MatchDecision, Neighbor};
use invest_risk::RiskAnalyzer;
use invest_sar::checkpoint::Checkpointer;
use invest_sar::engine::{InvestigationCheckpointState, SarEngine};

use invest_config::AppConfig;

use crate::error::{OrchestratorError, Result};
use crate::events::{DomainEvent, SharedEventPublisher};
use crate::service::{InvestigationRecord, InvestigationReport, InvestigationService, SubmissionRequest};
use crate::status::InvestigationStatus;

/// Ties every subsystem together for one deployment: the SAR engine
/// (itself already wired over a provider router, cache, and
/// checkpointer), the risk analyzer, the entity store, the audit ledger,
/// and the outbound event publisher.
pub struct InvestigationPipeline<C: Checkpointer<InvestigationCheckpointState>> {
    engine: SarEngine<C>,
    risk_analyzer: RiskAnalyzer,
    ai_model: Arc<dyn AiModel>,
    store: Arc<EntityStore>,
    audit: Arc<AuditLedger>,
    events: SharedEventPublisher,
    config: Arc<AppConfig>,
    per_hop_cap: usize,
    records: Mutex<HashMap<String, InvestigationRecord>>,
}

impl<C: Checkpointer<InvestigationCheckpointState>> InvestigationPipeline<C> {
    /// Assemble a pipeline from already-configured subsystems, mirroring
    /// `SarEngine::new`'s own "wire pre-built components" shape.
    pub fn new(engine: SarEngine<C>, risk_analyzer: RiskAnalyzer, ai_model: Arc<dyn AiModel>, store: Arc<EntityStore>, audit: Arc<AuditLedger>, events: SharedEventPublisher, config: Arc<AppConfig>, per_hop_cap: usize) -> Self {
        Self { engine, risk_analyzer, ai_model, store, audit, events, config, per_hop_cap, records: Mutex::new(HashMap::new()) }
    }

    fn set_status(&self, investigation_id: &str, tenant_id: &str, status: InvestigationStatus) {
        let mut records = self.records.lock();
        records
            .entry(investigation_id.to_string())
            .and_modify(|record| record.status = status)
            .or_insert_with(|| InvestigationRecord { investigation_id: investigation_id.to_string(), tenant_id: tenant_id.to_string(), status, report: None });
    }

    /// Derive representative [`RawFact`]s for the risk analyzer from the
    /// SAR engine's checkpointed knowledge base and reconciliation
    /// report. The SAR engine's own accumulator is structured, not
    /// text-shaped, so the pipeline synthesizes short natural-language
    /// facts from it rather than invest-risk reaching into
    /// `KnowledgeBaseSnapshot` directly (see DESIGN.md).
    fn derive_facts(state: &InvestigationCheckpointState, inconsistencies: &[String]) -> Vec<RawFact> {
        let snapshot = &state.kb_snapshot;
        let mut facts = Vec::new();

        for employer in &snapshot.employers {
            let text = match (&employer.title, employer.end) {
                (Some(title), None) => format!("subject currently employed as {title} at {}", employer.name),
                (Some(title), Some(_)) => format!("subject formerly employed as {title} at {}", employer.name),
                (None, _) => format!("subject employment record at {}", employer.name),
            };
            facts.push(RawFact { source: "employment-record".to_string(), text, event_date: employer.start });
        }

        for education in &snapshot.educations {
            let text = format!("subject education record at {}", education.institution);
            facts.push(RawFact { source: "education-record".to_string(), text, event_date: None });
        }

        for license in &snapshot.licenses {
            let text = if license.active {
                format!("subject holds an active license from {}", license.issuer)
            } else {
                format!("subject holds an inactive/revoked license from {}", license.issuer)
            };
            facts.push(RawFact { source: "license-record".to_string(), text, event_date: None });
        }

        for inconsistency in inconsistencies {
            facts.push(RawFact { source: "reconciliation".to_string(), text: inconsistency.clone(), event_date: None });
        }

        facts
    }

    fn audit(&self, audit_id: Id, kind: &str, detail: serde_json::Value) {
        self.audit.append(AuditEventInit::new(audit_id, kind).with_detail(detail));
    }

    /// Run one investigation end to end, synchronously (§2: in a real
    /// deployment this is spawned off `submit` onto a background task;
    /// the service trait's shape doesn't require that split, and the
    /// reference pipeline here keeps it inline for testability).
    #[instrument(skip(self, request), fields(investigation_id))]
    async fn execute(&self, investigation_id: String, request: SubmissionRequest) -> Result<InvestigationReport> {
        let decision = self.config.compliance_ruleset().evaluate(&request.locale, &request.role_category, request.tier);

        let permitted_sources: HashSet<String> = HashSet::new();
        let context = RequestContext::new(RequestContextInit {
            tenant_id: request.tenant_id.clone(),
            actor: request.actor.clone(),
            locale: request.locale.clone(),
            compliance: decision,
            permitted_sources,
            consent_token: request.consent_token.clone(),
            consent_scope: request.consent_scope.iter().cloned().collect(),
            consent_expiry: request.consent_expiry,
            tier: request.tier,
            degree: request.degree,
            budget_limit: request.budget_limit,
            cache_scope: request.cache_scope,
        });
        context.assert_consent_valid(Utc::now())?;

        self.audit(context.audit_id, "investigation.started", json!({"investigation_id": investigation_id, "tenant_id": request.tenant_id}));
        self.events
            .publish(DomainEvent::ScreeningStarted { investigation_id: investigation_id.clone(), subject_entity_id: Id::new() })
            .await
            .map_err(OrchestratorError::EventPublish)?;

        let decision = resolve_or_create(&self.store, &request.subject, &self.config.fuzzy_match_weights, &self.config.match_thresholds)?;
        let subject_entity_id = match decision {
            MatchDecision::Canonical(id) => id,
            MatchDecision::AutoMatchOrReview { candidate, .. } => candidate,
            MatchDecision::DuplicateCandidate { new_entity, .. } => new_entity,
            MatchDecision::NewEntity(id) => id,
        };

        self.set_status(&investigation_id, &request.tenant_id, InvestigationStatus::Collecting);
        let outcome = self.engine.run(&investigation_id, &context, subject_entity_id, &self.store).await?;
        self.audit(
            context.audit_id,
            "collection.completed",
            json!({"foundation_blocked": outcome.foundation_blocked, "deception_score": outcome.reconciliation.deception_score}),
        );

        self.set_status(&investigation_id, &request.tenant_id, InvestigationStatus::Analyzing);
        let checkpoint_state = self
            .engine
            .resume_state(&investigation_id)
            .await?
            .ok_or_else(|| OrchestratorError::NotFound(investigation_id.clone()))?;

        let inconsistency_texts: Vec<String> = outcome.reconciliation.inconsistencies.iter().map(|i| format!("{i:?}")).collect();
        let facts = Self::derive_facts(&checkpoint_state, &inconsistency_texts);

        let mut neighbors: Vec<Neighbor> = outcome.network.d2_neighbors.clone();
        neighbors.extend(outcome.network.d3_neighbors.clone());
        if neighbors.is_empty() {
            neighbors = discover_neighbors(&self.store, subject_entity_id, request.degree, self.per_hop_cap);
        }

        let assessment = self
            .risk_analyzer
            .analyze(
                self.ai_model.as_ref(),
                facts,
                subject_entity_id,
                Some(request.role_category.as_str()),
                outcome.reconciliation.deception_score,
                &neighbors,
                &HashMap::new(),
            )
            .await;

        self.audit(
            context.audit_id,
            "risk.scored",
            json!({"final_score": assessment.final_score, "level": format!("{:?}", assessment.level), "auto_escalated": assessment.auto_escalated}),
        );

        if assessment.auto_escalated {
            self.set_status(&investigation_id, &request.tenant_id, InvestigationStatus::AwaitingReview);
            self.events
                .publish(DomainEvent::ReviewRequired { investigation_id: investigation_id.clone(), level: format!("{:?}", assessment.level) })
                .await
                .map_err(OrchestratorError::EventPublish)?;
        }

        let previous_profile = self.store.latest_profile(subject_entity_id)?;
        let next_version = previous_profile.as_ref().map(|p| p.version + 1).unwrap_or(1);
        let mut profile = EntityProfile {
            id: Id::new(),
            entity_id: subject_entity_id,
            version: next_version,
            created_at: Utc::now(),
            trigger: ProfileTrigger::InitialScreening,
            findings: assessment.findings.clone(),
            risk_score: assessment.final_score,
            connections: neighbors.iter().map(|n| n.entity_id).collect(),
            sources_used: vec!["sar-engine".to_string()],
            stale_sources: vec![],
            evolution_signals: vec![],
            previous_version: previous_profile.as_ref().map(|p| p.id),
            delta: None,
        };
        if let Some(previous) = &previous_profile {
            profile.delta = Some(ProfileDelta::compute(previous, &profile));
        }
        self.store.commit_profile(profile.clone())?;

        self.audit(context.audit_id, "profile.committed", json!({"profile_id": profile.id, "version": profile.version}));
        self.events
            .publish(DomainEvent::ScreeningComplete { investigation_id: investigation_id.clone(), risk_score: assessment.final_score })
            .await
            .map_err(OrchestratorError::EventPublish)?;

        if !assessment.auto_escalated {
            self.set_status(&investigation_id, &request.tenant_id, InvestigationStatus::Complete);
        }

        info!(investigation_id = %investigation_id, final_score = assessment.final_score, "investigation complete");

        Ok(InvestigationReport { investigation_id, subject_entity_id, profile_id: profile.id, profile_version: profile.version, risk_assessment: assessment })
    }
}

#[async_trait]
impl<C: Checkpointer<InvestigationCheckpointState> + Send + Sync> InvestigationService for InvestigationPipeline<C> {
    async fn submit(&self, request: SubmissionRequest) -> Result<String> {
        let investigation_id = Id::new().to_string();
        self.set_status(&investigation_id, &request.tenant_id, InvestigationStatus::PendingConsent);

        match self.execute(investigation_id.clone(), request).await {
            Ok(report) => {
                let mut records = self.records.lock();
                if let Some(record) = records.get_mut(&investigation_id) {
                    record.report = Some(report);
                }
            }
            Err(error) => {
                tracing::error!(investigation_id = %investigation_id, %error, "investigation failed");
                let mut records = self.records.lock();
                if let Some(record) = records.get_mut(&investigation_id) {
                    record.status = InvestigationStatus::Failed;
                }
            }
        }

        Ok(investigation_id)
    }

    async fn get(&self, investigation_id: &str) -> Result<InvestigationRecord> {
        self.records.lock().get(investigation_id).cloned().ok_or_else(|| OrchestratorError::NotFound(investigation_id.to_string()))
    }

    async fn cancel(&self, investigation_id: &str) -> Result<()> {
        let mut records = self.records.lock();
        let record = records.get_mut(investigation_id).ok_or_else(|| OrchestratorError::NotFound(investigation_id.to_string()))?;
        if record.status.is_terminal() {
            return Err(OrchestratorError::AlreadyTerminal { investigation_id: investigation_id.to_string(), status: record.status.to_string() });
        }
        record.status = InvestigationStatus::Cancelled;
        Ok(())
    }

    async fn list(&self, tenant_id: &str) -> Result<Vec<InvestigationRecord>> {
        Ok(self.records.lock().values().filter(|r| r.tenant_id == tenant_id).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::InMemoryEventPublisher;
    use chrono::Duration;
    use invest_ai::RuleBasedAiModel;
    use invest_cache::{CacheAside, InMemoryCacheBackend};
    use invest_core::model::{DataOriginTag, Degree as CoreDegree, Tier as CoreTier};
    use invest_providers::{ProviderRateLimiter, ProviderRegistry, ProviderRouter, RateLimit};
    use invest_resolver::SubjectInput;
    use invest_sar::checkpoint::InMemoryCheckpointer;
    use invest_sar::engine::PhaseConcurrency;
    use std::time::Duration as StdDuration;

    fn pipeline() -> InvestigationPipeline<InMemoryCheckpointer<InvestigationCheckpointState>> {
        let config = Arc::new(AppConfig::defaults());
        let registry = Arc::new(ProviderRegistry::new());
        let rate_limiter = Arc::new(ProviderRateLimiter::new(RateLimit::default()));
        let router = ProviderRouter::new(registry, rate_limiter, config.retry, StdDuration::from_secs(5));
        let cache = CacheAside::new(Arc::new(InMemoryCacheBackend::default()), config.tier_policy.clone(), config.freshness.clone());
        let engine = SarEngine::new(
            router,
            cache,
            config.sar_thresholds.clone(),
            config.assess_weights,
            config.pattern_modifiers,
            PhaseConcurrency::default(),
            5,
            0.5,
            InMemoryCheckpointer::new(),
        );
        let risk_analyzer = RiskAnalyzer::from_config(&config);
        let store = Arc::new(EntityStore::new());
        let audit = Arc::new(AuditLedger::new(b"test-key".to_vec()));
        let events: SharedEventPublisher = Arc::new(InMemoryEventPublisher::new());
        InvestigationPipeline::new(engine, risk_analyzer, Arc::new(RuleBasedAiModel::new()), store, audit, events, config, 5)
    }

    fn request() -> SubmissionRequest {
        SubmissionRequest {
            tenant_id: "tenant-a".to_string(),
            actor: "actor-a".to_string(),
            locale: "US".to_string(),
            role_category: "general".to_string(),
            subject: SubjectInput {
                identifiers: vec![],
                name: "Jane Doe".to_string(),
                last_name: "Doe".to_string(),
                first_name: "Jane".to_string(),
                date_of_birth: chrono::NaiveDate::from_ymd_opt(1990, 1, 1),
                address: None,
                tenant_id: "tenant-a".to_string(),
                data_origin: DataOriginTag::CustomerProvided,
            },
            consent_token: "tok-1".to_string(),
            consent_scope: vec!["criminal".to_string(), "employment".to_string()],
            consent_expiry: Utc::now() + Duration::days(30),
            tier: CoreTier::Standard,
            degree: CoreDegree::D1,
            budget_limit: None,
            cache_scope: CacheScope::Shared,
        }
    }

    #[tokio::test]
    async fn submit_produces_a_retrievable_completed_record() {
        let pipeline = pipeline();
        let investigation_id = pipeline.submit(request()).await.unwrap();
        let record = pipeline.get(&investigation_id).await.unwrap();
        assert!(record.status == InvestigationStatus::Complete || record.status == InvestigationStatus::AwaitingReview);
        assert!(record.report.is_some());
    }

    #[tokio::test]
    async fn list_only_returns_the_requesting_tenant() {
        let pipeline = pipeline();
        pipeline.submit(request()).await.unwrap();
        let mut other = request();
        other.tenant_id = "tenant-b".to_string();
        other.subject.tenant_id = "tenant-b".to_string();
        pipeline.submit(other).await.unwrap();

        let tenant_a = pipeline.list("tenant-a").await.unwrap();
        assert_eq!(tenant_a.len(), 1);
        assert_eq!(tenant_a[0].tenant_id, "tenant-a");
    }

    #[tokio::test]
    async fn cancel_rejects_an_already_terminal_investigation() {
        let pipeline = pipeline();
        let investigation_id = pipeline.submit(request()).await.unwrap();
        assert!(pipeline.cancel(&investigation_id).await.is_err());
    }

    #[tokio::test]
    async fn get_on_unknown_id_is_not_found() {
        let pipeline = pipeline();
        assert!(pipeline.get("does-not-exist").await.is_err());
    }
}
