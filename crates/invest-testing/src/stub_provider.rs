//! A configurable stub [`ProviderAdapter`]: queue a response, force a
//! failure on the next call, and inspect how many times it was invoked.

use async_trait::async_trait;
use invest_core::model::InfoType;
use invest_providers::{CheckRequest, FailureKind, ProviderAdapter, ProviderCategory, ProviderHealth, ProviderMetadata, ProviderResult};
use parking_lot::Mutex;

/// A stub provider adapter for wiring tests that don't care about a real
/// transport. Defaults to one supported check, one locale, core category,
/// and a fixed successful response.
pub struct StubProviderAdapter {
    metadata: ProviderMetadata,
    fixed_payload: serde_json::Value,
    cost: f64,
    health: Mutex<ProviderHealth>,
    should_fail: Mutex<Option<(FailureKind, String)>>,
    call_count: Mutex<usize>,
    received: Mutex<Vec<CheckRequest>>,
}

impl StubProviderAdapter {
    /// A stub registered for a single check type and locale.
    pub fn new(id: impl Into<String>, check: InfoType, locale: impl Into<String>) -> Self {
        Self {
            metadata: ProviderMetadata {
                id: id.into(),
                category: ProviderCategory::Core,
                supported_checks: vec![check],
                supported_locales: vec![locale.into()],
                cost_tier: 1.0,
            },
            fixed_payload: serde_json::json!({}),
            cost: 0.5,
            health: Mutex::new(ProviderHealth::Healthy),
            should_fail: Mutex::new(None),
            call_count: Mutex::new(0),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Mark this stub as premium-tier.
    pub fn premium(mut self) -> Self {
        self.metadata.category = ProviderCategory::Premium;
        self
    }

    /// Support additional check types beyond the one given to `new`.
    pub fn also_supports(mut self, check: InfoType) -> Self {
        self.metadata.supported_checks.push(check);
        self
    }

    /// Support additional locales beyond the one given to `new`.
    pub fn also_locale(mut self, locale: impl Into<String>) -> Self {
        self.metadata.supported_locales.push(locale.into());
        self
    }

    /// Set the relative cost tier used to break selection ties.
    pub fn with_cost_tier(mut self, cost_tier: f64) -> Self {
        self.metadata.cost_tier = cost_tier;
        self
    }

    /// Set the normalized payload and USD cost returned on success.
    pub fn with_response(mut self, payload: serde_json::Value, cost: f64) -> Self {
        self.fixed_payload = payload;
        self.cost = cost;
        self
    }

    /// Force the next `execute_check` call to fail with `kind`/`message`,
    /// then resume succeeding.
    pub fn fail_next(&self, kind: FailureKind, message: impl Into<String>) {
        *self.should_fail.lock() = Some((kind, message.into()));
    }

    /// Set the health this stub reports from `health_check`.
    pub fn set_health(&self, health: ProviderHealth) {
        *self.health.lock() = health;
    }

    /// How many times `execute_check` has been called.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock()
    }

    /// Every request this stub has received, in order.
    pub fn received(&self) -> Vec<CheckRequest> {
        self.received.lock().clone()
    }
}

#[async_trait]
impl ProviderAdapter for StubProviderAdapter {
    fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    async fn execute_check(&self, request: &CheckRequest) -> Result<ProviderResult, (FailureKind, String)> {
        *self.call_count.lock() += 1;
        self.received.lock().push(request.clone());

        if let Some((kind, message)) = self.should_fail.lock().take() {
            return Err((kind, message));
        }

        Ok(ProviderResult {
            provider_id: self.metadata.id.clone(),
            raw_payload: self.fixed_payload.clone(),
            normalized_payload: self.fixed_payload.clone(),
            cost: self.cost,
        })
    }

    async fn health_check(&self) -> ProviderHealth {
        *self.health.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invest_core::Id;

    fn request() -> CheckRequest {
        CheckRequest {
            check_type: InfoType::Criminal,
            subject_entity_id: Id::new(),
            params: Default::default(),
            locale: "US".to_string(),
        }
    }

    #[tokio::test]
    async fn succeeds_and_counts_calls_by_default() {
        let stub = StubProviderAdapter::new("stub-1", InfoType::Criminal, "US");
        stub.execute_check(&request()).await.unwrap();
        stub.execute_check(&request()).await.unwrap();
        assert_eq!(stub.call_count(), 2);
        assert_eq!(stub.received().len(), 2);
    }

    #[tokio::test]
    async fn fail_next_fails_exactly_once() {
        let stub = StubProviderAdapter::new("stub-1", InfoType::Criminal, "US");
        stub.fail_next(FailureKind::Timeout, "boom");

        let first = stub.execute_check(&request()).await;
        assert!(matches!(first, Err((FailureKind::Timeout, _))));

        let second = stub.execute_check(&request()).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn reports_configured_health() {
        let stub = StubProviderAdapter::new("stub-1", InfoType::Criminal, "US");
        stub.set_health(ProviderHealth::Down);
        assert_eq!(stub.health_check().await, ProviderHealth::Down);
    }
}
