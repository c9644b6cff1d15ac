//! Assembles a runnable [`InvestigationPipeline`] from default config and
//! in-memory backends, registering a couple of stub provider adapters so
//! `invest submit` produces a non-trivial result with nothing external to
//! configure (this crate never speaks to a real transport; see DESIGN.md).

use std::sync::Arc;
use std::time::Duration;

use invest_ai::RuleBasedAiModel;
use invest_cache::{CacheAside, InMemoryCacheBackend};
use invest_core::model::InfoType;
use invest_core::AuditLedger;
use invest_orchestrator::InvestigationPipeline;
use invest_providers::{ProviderRateLimiter, ProviderRegistry, ProviderRouter, RateLimit};
use invest_resolver::EntityStore;
use invest_risk::RiskAnalyzer;
use invest_sar::checkpoint::InMemoryCheckpointer;
use invest_sar::engine::{InvestigationCheckpointState, PhaseConcurrency, SarEngine};
use invest_testing::StubProviderAdapter;

use invest_config::AppConfig;
use invest_orchestrator::events::SharedEventPublisher;
use invest_orchestrator::InMemoryEventPublisher;

/// The demo pipeline type this binary drives.
pub type DemoPipeline = InvestigationPipeline<InMemoryCheckpointer<InvestigationCheckpointState>>;

/// Build a pipeline over default config, an in-memory checkpointer/cache,
/// and a handful of stub core-tier providers covering every check type so
/// a local run can exercise every SAR phase.
pub fn build_demo_pipeline() -> DemoPipeline {
    let config = Arc::new(AppConfig::defaults());

    let mut registry = ProviderRegistry::new();
    for check in InfoType::all() {
        let provider_id = format!("demo-{check:?}");
        let adapter = Arc::new(
            StubProviderAdapter::new(provider_id, *check, "US")
                .with_response(serde_json::json!({"status": "clear"}), 0.10),
        );
        registry.register(adapter, config.circuit_breaker);
    }

    let rate_limiter = Arc::new(ProviderRateLimiter::new(RateLimit::default()));
    let router = ProviderRouter::new(Arc::new(registry), rate_limiter, config.retry, Duration::from_secs(5));
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
    let audit = Arc::new(AuditLedger::new(b"invest-cli-demo-key".to_vec()));
    let events: SharedEventPublisher = Arc::new(InMemoryEventPublisher::new());

    InvestigationPipeline::new(engine, risk_analyzer, Arc::new(RuleBasedAiModel::new()), store, audit, events, config, 5)
}
