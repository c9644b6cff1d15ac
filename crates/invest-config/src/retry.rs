//! Retry, circuit-breaker, and timeout constants (§4.B, §5).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exponential backoff with jitter, applied to transient provider errors
/// (§4.B step 4).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts against the same candidate before falling back.
    pub max_attempts: u32,
    /// Base delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Multiplier applied to the delay after each attempt.
    pub factor: f64,
    /// Fraction of the computed delay to randomize, in `[0, 1]`.
    pub jitter_fraction: f64,
}

impl RetryConfig {
    /// The defaults named in §4.B: 3 attempts, 200ms base, factor 2.
    pub fn defaults() -> Self {
        Self { max_attempts: 3, base_delay_ms: 200, factor: 2.0, jitter_fraction: 0.2 }
    }

    /// The un-jittered delay before attempt `attempt` (1-indexed: the delay
    /// before the *second* call).
    pub fn base_delay_for_attempt(&self, attempt: u32) -> Duration {
        let millis = self.base_delay_ms as f64 * self.factor.powi(attempt.saturating_sub(1) as i32);
        Duration::from_millis(millis.round() as u64)
    }
}

/// Circuit-breaker thresholds (§4.B).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Rolling window size, in calls.
    pub window: u32,
    /// Failure rate over the window that trips CLOSED → OPEN.
    pub failure_rate_threshold: f64,
    /// Minimum calls in the window before the failure rate is trusted.
    pub min_volume: u32,
    /// Cool-down before OPEN → HALF_OPEN.
    pub cooldown: Duration,
    /// Consecutive successes in HALF_OPEN needed to close.
    pub half_open_success_threshold: u32,
}

impl CircuitBreakerConfig {
    /// The defaults named in §4.B: N=20, F=0.5, T=30s, K=3. `min_volume`
    /// is left unspecified there; 5 is used until validated (see
    /// DESIGN.md).
    pub fn defaults() -> Self {
        Self {
            window: 20,
            failure_rate_threshold: 0.5,
            min_volume: 5,
            cooldown: Duration::from_secs(30),
            half_open_success_threshold: 3,
        }
    }
}

/// Per-call and per-scope timeout caps (§5).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Per-provider-call timeout.
    pub per_call: Duration,
    /// Per-info-type wall-clock cap.
    pub per_type: Duration,
    /// Per-investigation wall-clock cap, Standard tier.
    pub per_investigation_standard: Duration,
    /// Per-investigation wall-clock cap, Enhanced tier.
    pub per_investigation_enhanced: Duration,
}

impl TimeoutConfig {
    /// The defaults named in §5: 30s per call, 10min per type, 60min
    /// Standard / 120min Enhanced per investigation.
    pub fn defaults() -> Self {
        Self {
            per_call: Duration::from_secs(30),
            per_type: Duration::from_secs(10 * 60),
            per_investigation_standard: Duration::from_secs(60 * 60),
            per_investigation_enhanced: Duration::from_secs(120 * 60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_delay_grows_exponentially() {
        let retry = RetryConfig::defaults();
        assert_eq!(retry.base_delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(retry.base_delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(retry.base_delay_for_attempt(3), Duration::from_millis(800));
    }

    #[test]
    fn enhanced_investigations_get_double_the_standard_wall_clock() {
        let timeouts = TimeoutConfig::defaults();
        assert_eq!(timeouts.per_investigation_enhanced, timeouts.per_investigation_standard * 2);
    }
}
