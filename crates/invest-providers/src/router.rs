//! The provider router: selection, rate limiting, retry/fallback, cost
//! accounting (§4.B "Router algorithm", "Batched routing").

use crate::adapter::{CheckRequest, ProviderResult};
use crate::error::{FailureKind, ProviderError, Result};
use crate::rate_limiter::ProviderRateLimiter;
use crate::registry::ProviderRegistry;
use invest_config::RetryConfig;
use invest_core::context::RequestContext;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// How long a call may wait for a rate-limit token before giving up on a
/// candidate (§4.B "Rate limiter" budget-slack).
const DEFAULT_RATE_LIMIT_SLACK: Duration = Duration::from_millis(500);

/// Ties the registry, rate limiter, and retry policy together into the
/// single entry point phase handlers call (§4.B "Router algorithm").
pub struct ProviderRouter {
    registry: Arc<ProviderRegistry>,
    rate_limiter: Arc<ProviderRateLimiter>,
    retry: RetryConfig,
    per_call_timeout: Duration,
}

impl ProviderRouter {
    /// Build a router over an already-populated registry.
    pub fn new(registry: Arc<ProviderRegistry>, rate_limiter: Arc<ProviderRateLimiter>, retry: RetryConfig, per_call_timeout: Duration) -> Self {
        Self { registry, rate_limiter, retry, per_call_timeout }
    }

    /// Run one check to completion: select candidates, try each in order
    /// with local retry on transient failure, and either return a result
    /// or a typed absence (§4.B steps 1-5, §4.H).
    #[tracing::instrument(skip(self, context, request), fields(check = ?request.check_type))]
    pub async fn route(&self, context: &RequestContext, request: &CheckRequest) -> Result<ProviderResult> {
        context.assert_check_permitted(request.check_type)?;

        let candidates = self.registry.select(request.check_type, &request.locale, context.tier, &context.permitted_sources);
        if candidates.is_empty() {
            return Err(self.absence_error(request.check_type, 0));
        }

        let mut attempted = 0usize;
        for provider_id in &candidates {
            if context.assert_source_permitted(provider_id).is_err() {
                continue;
            }
            attempted += 1;
            match self.try_candidate(context, provider_id, request).await {
                Ok(result) => return Ok(result),
                Err(ProviderError::CircuitOpen { .. }) | Err(ProviderError::RateLimited { .. }) => continue,
                Err(ProviderError::Adapter { kind, .. }) if !kind.is_transient() => continue,
                Err(_) => continue,
            }
        }

        Err(self.absence_error(request.check_type, attempted))
    }

    fn absence_error(&self, check: invest_core::model::InfoType, attempted: usize) -> ProviderError {
        if check.is_high_priority() {
            ProviderError::HighPriorityUnavailable { check }
        } else {
            ProviderError::Incomplete { check, attempted }
        }
    }

    async fn try_candidate(&self, context: &RequestContext, provider_id: &str, request: &CheckRequest) -> Result<ProviderResult> {
        let breaker = self.registry.breaker(provider_id).expect("selected provider must be registered");
        if !breaker.allow() {
            return Err(ProviderError::CircuitOpen { provider_id: provider_id.to_string() });
        }

        for attempt in 1..=self.retry.max_attempts {
            if !self.rate_limiter.acquire(provider_id, DEFAULT_RATE_LIMIT_SLACK).await {
                return Err(ProviderError::RateLimited { provider_id: provider_id.to_string() });
            }

            let adapter = self.registry.adapter(provider_id).expect("selected provider must be registered");
            let started = Instant::now();
            let outcome = tokio::time::timeout(self.per_call_timeout, adapter.execute_check(request)).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match outcome {
                Ok(Ok(result)) => {
                    context.charge(result.cost).map_err(ProviderError::Compliance)?;
                    self.registry.record_outcome(provider_id, true, elapsed_ms);
                    breaker.record(true);
                    info!(provider_id, attempt, cost = result.cost, "provider call succeeded");
                    return Ok(result);
                }
                Ok(Err((kind, message))) => {
                    self.registry.record_outcome(provider_id, false, elapsed_ms);
                    breaker.record(false);
                    warn!(provider_id, attempt, ?kind, message, "provider call failed");
                    if !kind.is_transient() || attempt == self.retry.max_attempts {
                        return Err(ProviderError::Adapter { provider_id: provider_id.to_string(), kind, message });
                    }
                    tokio::time::sleep(self.backoff_with_jitter(attempt)).await;
                }
                Err(_elapsed) => {
                    self.registry.record_outcome(provider_id, false, elapsed_ms);
                    breaker.record(false);
                    warn!(provider_id, attempt, "provider call timed out");
                    if attempt == self.retry.max_attempts {
                        return Err(ProviderError::Adapter { provider_id: provider_id.to_string(), kind: FailureKind::Timeout, message: "call timed out".to_string() });
                    }
                    tokio::time::sleep(self.backoff_with_jitter(attempt)).await;
                }
            }
        }
        unreachable!("loop always returns by the final attempt")
    }

    fn backoff_with_jitter(&self, attempt: u32) -> Duration {
        let base = self.retry.base_delay_for_attempt(attempt);
        let jitter_range = base.as_secs_f64() * self.retry.jitter_fraction;
        let jitter = rand::random::<f64>() * jitter_range;
        base + Duration::from_secs_f64(jitter)
    }

    /// Run many `(context, request)` pairs concurrently, bounded by
    /// `concurrency` (§4.B "Batched routing").
    pub async fn route_batch(&self, requests: Vec<(RequestContext, CheckRequest)>, concurrency: usize) -> Vec<Result<ProviderResult>> {
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let futures = requests.into_iter().map(|(context, request)| {
            let semaphore = semaphore.clone();
            async move {
                let _permit = semaphore.acquire().await.expect("semaphore not closed");
                self.route(&context, &request).await
            }
        });
        futures::future::join_all(futures).await
    }
}
