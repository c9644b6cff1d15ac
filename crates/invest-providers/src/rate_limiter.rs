//! Per-provider token-bucket rate limiting (§4.B).

use prometheus::{register_int_counter_vec, IntCounterVec};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

static RATE_LIMIT_EXCEEDED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!("invest_rate_limit_exceeded_total", "Total provider calls rejected by the rate limiter", &["provider"]).expect("metric registration")
});

const MAX_SAFE_PROVIDER_LABEL_LEN: usize = 64;
const MAX_PROVIDER_BUCKETS: usize = 10_000;

fn is_safe_provider_label(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_SAFE_PROVIDER_LABEL_LEN
        && value.bytes().all(|b| matches!(b, b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.'))
}

fn provider_label_value(provider_id: &str) -> Cow<'_, str> {
    if is_safe_provider_label(provider_id) {
        return Cow::Borrowed(provider_id);
    }
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(provider_id.as_bytes());
    let digest_hex = hex::encode(hasher.finalize());
    Cow::Owned(format!("provider_{}", &digest_hex[..12]))
}

/// Per-provider rate limit: tokens per second and burst capacity.
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    /// Steady-state tokens granted per second.
    pub tokens_per_second: f64,
    /// Maximum burst size.
    pub burst_capacity: u64,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self { tokens_per_second: 10.0, burst_capacity: 20 }
    }
}

struct TokenBucket {
    capacity: u64,
    tokens: f64,
    refill_rate: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(limit: RateLimit) -> Self {
        Self { capacity: limit.burst_capacity, tokens: limit.burst_capacity as f64, refill_rate: limit.tokens_per_second, last_refill: Instant::now() }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).clamp(0.0, self.capacity as f64);
        self.last_refill = now;
    }

    fn try_consume(&mut self) -> bool {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Per-provider token-bucket rate limiter. A call either gets a token
/// immediately, waits up to `budget_slack`, or fails fast with a rejection
/// (§4.B "Rate limiter").
pub struct ProviderRateLimiter {
    default_limit: RateLimit,
    custom_limits: RwLock<HashMap<String, RateLimit>>,
    buckets: RwLock<HashMap<String, TokenBucket>>,
}

impl ProviderRateLimiter {
    /// Build a limiter applying `default_limit` unless a provider has a
    /// custom limit set via [`Self::set_limit`].
    pub fn new(default_limit: RateLimit) -> Self {
        Self { default_limit, custom_limits: RwLock::new(HashMap::new()), buckets: RwLock::new(HashMap::new()) }
    }

    /// Override the limit for one provider.
    pub async fn set_limit(&self, provider_id: impl Into<String>, limit: RateLimit) {
        self.custom_limits.write().await.insert(provider_id.into(), limit);
    }

    async fn limit_for(&self, provider_id: &str) -> RateLimit {
        self.custom_limits.read().await.get(provider_id).copied().unwrap_or(self.default_limit)
    }

    /// Try to acquire a token for `provider_id` immediately, without
    /// waiting. Returns `false` if none is available.
    pub async fn try_acquire(&self, provider_id: &str) -> bool {
        {
            let mut buckets = self.buckets.write().await;
            if buckets.len() >= MAX_PROVIDER_BUCKETS && !buckets.contains_key(provider_id) {
                tracing::warn!(provider_id, "rate limiter bucket table at capacity; denying new provider");
                return false;
            }
            if !buckets.contains_key(provider_id) {
                let limit = self.limit_for(provider_id).await;
                buckets.insert(provider_id.to_string(), TokenBucket::new(limit));
            }
            let bucket = buckets.get_mut(provider_id).expect("just inserted");
            if bucket.try_consume() {
                return true;
            }
        }
        RATE_LIMIT_EXCEEDED.with_label_values(&[&provider_label_value(provider_id)]).inc();
        false
    }

    /// Wait up to `budget_slack` for a token, polling at a fixed interval.
    /// Fails fast once the slack is exhausted (§4.B).
    pub async fn acquire(&self, provider_id: &str, budget_slack: Duration) -> bool {
        let deadline = Instant::now() + budget_slack;
        loop {
            if self.try_acquire(provider_id).await {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exhausts_burst_then_refuses() {
        let limiter = ProviderRateLimiter::new(RateLimit { tokens_per_second: 0.0, burst_capacity: 2 });
        assert!(limiter.try_acquire("p1").await);
        assert!(limiter.try_acquire("p1").await);
        assert!(!limiter.try_acquire("p1").await);
    }

    #[tokio::test]
    async fn refills_over_time() {
        let limiter = ProviderRateLimiter::new(RateLimit { tokens_per_second: 1000.0, burst_capacity: 1 });
        assert!(limiter.try_acquire("p1").await);
        assert!(!limiter.try_acquire("p1").await);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(limiter.try_acquire("p1").await);
    }

    #[tokio::test]
    async fn custom_limit_overrides_default() {
        let limiter = ProviderRateLimiter::new(RateLimit { tokens_per_second: 0.0, burst_capacity: 1 });
        limiter.set_limit("p1", RateLimit { tokens_per_second: 0.0, burst_capacity: 5 }).await;
        for _ in 0..5 {
            assert!(limiter.try_acquire("p1").await);
        }
        assert!(!limiter.try_acquire("p1").await);
    }
}
