//! Provider registry and candidate selection (§4.B).

use crate::adapter::{ProviderAdapter, ProviderCategory, ProviderHealth};
use crate::circuit_breaker::CircuitBreaker;
use invest_config::CircuitBreakerConfig;
use invest_core::model::{InfoType, Tier};
use std::collections::HashMap;
use std::sync::Arc;

struct Registration {
    adapter: Arc<dyn ProviderAdapter>,
    breaker: Arc<CircuitBreaker>,
    error_rate: std::sync::atomic::AtomicU64, // fixed-point, per-mille
    p95_latency_ms: std::sync::atomic::AtomicU64,
}

/// Holds every registered provider adapter plus its circuit breaker and
/// rolling health stats, and answers "which providers can serve this
/// `(check, context)`?" (§4.B "Registry").
pub struct ProviderRegistry {
    providers: HashMap<String, Registration>,
}

impl ProviderRegistry {
    /// Start an empty registry.
    pub fn new() -> Self {
        Self { providers: HashMap::new() }
    }

    /// Register a provider adapter with a fresh, CLOSED circuit breaker.
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>, breaker_config: CircuitBreakerConfig) {
        let id = adapter.metadata().id.clone();
        let breaker = Arc::new(CircuitBreaker::new(id.clone(), breaker_config));
        self.providers.insert(id, Registration { adapter, breaker, error_rate: std::sync::atomic::AtomicU64::new(0), p95_latency_ms: std::sync::atomic::AtomicU64::new(0) });
    }

    /// Record an outcome for rolling health stats, independent of the
    /// circuit breaker's own window.
    pub fn record_outcome(&self, provider_id: &str, success: bool, latency_ms: u64) {
        if let Some(registration) = self.providers.get(provider_id) {
            registration.breaker.record(success);
            // Exponential moving average, expressed in fixed-point per-mille.
            let previous = registration.error_rate.load(std::sync::atomic::Ordering::Relaxed);
            let sample = if success { 0 } else { 1000 };
            let updated = (previous * 7 + sample * 3) / 10;
            registration.error_rate.store(updated, std::sync::atomic::Ordering::Relaxed);
            registration.p95_latency_ms.store(latency_ms, std::sync::atomic::Ordering::Relaxed);
        }
    }

    /// The breaker for a given provider, if registered.
    pub fn breaker(&self, provider_id: &str) -> Option<Arc<CircuitBreaker>> {
        self.providers.get(provider_id).map(|r| r.breaker.clone())
    }

    /// The adapter for a given provider, if registered.
    pub fn adapter(&self, provider_id: &str) -> Option<Arc<dyn ProviderAdapter>> {
        self.providers.get(provider_id).map(|r| r.adapter.clone())
    }

    /// Compute the primary + fallbacks list for `(check, locale, tier,
    /// permitted_sources)`, sorted by: circuit state (OPEN excluded),
    /// tier eligibility, locale support, cost ascending, ties broken by
    /// lower error-rate then lower p95 latency (§4.B "Selection").
    pub fn select(&self, check: InfoType, locale: &str, tier: Tier, permitted_sources: &std::collections::HashSet<String>) -> Vec<String> {
        let mut candidates: Vec<(&String, &Registration)> = self
            .providers
            .iter()
            .filter(|(id, registration)| {
                permitted_sources.contains(id.as_str())
                    && registration.breaker.state() != crate::circuit_breaker::CircuitState::Open
                    && registration.adapter.metadata().supported_checks.contains(&check)
                    && registration.adapter.metadata().supported_locales.iter().any(|l| l == locale)
                    && (tier == Tier::Enhanced || registration.adapter.metadata().category == ProviderCategory::Core)
            })
            .collect();

        candidates.sort_by(|(_, a), (_, b)| {
            let cost = a.adapter.metadata().cost_tier.partial_cmp(&b.adapter.metadata().cost_tier).unwrap_or(std::cmp::Ordering::Equal);
            if cost != std::cmp::Ordering::Equal {
                return cost;
            }
            let error_rate_a = a.error_rate.load(std::sync::atomic::Ordering::Relaxed);
            let error_rate_b = b.error_rate.load(std::sync::atomic::Ordering::Relaxed);
            let error_cmp = error_rate_a.cmp(&error_rate_b);
            if error_cmp != std::cmp::Ordering::Equal {
                return error_cmp;
            }
            a.p95_latency_ms.load(std::sync::atomic::Ordering::Relaxed).cmp(&b.p95_latency_ms.load(std::sync::atomic::Ordering::Relaxed))
        });

        candidates.into_iter().map(|(id, _)| id.clone()).collect()
    }

    /// Snapshot health across all registered providers.
    pub async fn health_snapshot(&self) -> HashMap<String, ProviderHealth> {
        let mut snapshot = HashMap::new();
        for (id, registration) in &self.providers {
            snapshot.insert(id.clone(), registration.adapter.health_check().await);
        }
        snapshot
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{CheckRequest, ProviderMetadata, ProviderResult};
    use crate::error::FailureKind;
    use async_trait::async_trait;

    struct StubAdapter {
        metadata: ProviderMetadata,
    }

    #[async_trait]
    impl ProviderAdapter for StubAdapter {
        fn metadata(&self) -> &ProviderMetadata {
            &self.metadata
        }

        async fn execute_check(&self, _request: &CheckRequest) -> Result<ProviderResult, (FailureKind, String)> {
            Ok(ProviderResult { provider_id: self.metadata.id.clone(), raw_payload: serde_json::Value::Null, normalized_payload: serde_json::Value::Null, cost: 1.0 })
        }

        async fn health_check(&self) -> ProviderHealth {
            ProviderHealth::Healthy
        }
    }

    fn registry_with(providers: Vec<(&str, f64)>) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        for (id, cost_tier) in providers {
            let adapter = Arc::new(StubAdapter {
                metadata: ProviderMetadata { id: id.to_string(), category: ProviderCategory::Core, supported_checks: vec![InfoType::Identity], supported_locales: vec!["US".to_string()], cost_tier },
            });
            registry.register(adapter, CircuitBreakerConfig { window: 20, failure_rate_threshold: 0.5, min_volume: 5, cooldown: std::time::Duration::from_secs(30), half_open_success_threshold: 3 });
        }
        registry
    }

    #[test]
    fn selects_cheapest_candidate_first() {
        let registry = registry_with(vec![("expensive", 2.0), ("cheap", 1.0)]);
        let permitted: std::collections::HashSet<String> = ["expensive".to_string(), "cheap".to_string()].into_iter().collect();
        let selection = registry.select(InfoType::Identity, "US", Tier::Standard, &permitted);
        assert_eq!(selection.first(), Some(&"cheap".to_string()));
    }

    #[test]
    fn excludes_providers_not_in_permitted_sources() {
        let registry = registry_with(vec![("p1", 1.0)]);
        let permitted: std::collections::HashSet<String> = std::collections::HashSet::new();
        let selection = registry.select(InfoType::Identity, "US", Tier::Standard, &permitted);
        assert!(selection.is_empty());
    }

    #[test]
    fn excludes_providers_with_open_circuit() {
        let registry = registry_with(vec![("p1", 1.0)]);
        for _ in 0..10 {
            registry.record_outcome("p1", false, 10);
        }
        let permitted: std::collections::HashSet<String> = ["p1".to_string()].into_iter().collect();
        let selection = registry.select(InfoType::Identity, "US", Tier::Standard, &permitted);
        assert!(selection.is_empty());
    }
}
