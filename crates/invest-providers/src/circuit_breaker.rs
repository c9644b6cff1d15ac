//! Per-provider circuit breaker (§4.B).

use invest_config::CircuitBreakerConfig;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Instant;
use tracing::info;

/// The circuit state for one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls are allowed through.
    Closed,
    /// Calls are rejected without attempting the provider.
    Open,
    /// A single trial call is allowed through to decide CLOSED vs OPEN.
    HalfOpen,
}

struct Inner {
    state: CircuitState,
    window: VecDeque<bool>,
    opened_at: Option<Instant>,
    half_open_successes: u32,
}

/// A per-provider circuit breaker. Thread-safe; cheap to share via `Arc`.
pub struct CircuitBreaker {
    provider_id: String,
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Start a fresh, CLOSED breaker for `provider_id`.
    pub fn new(provider_id: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            provider_id: provider_id.into(),
            config,
            inner: Mutex::new(Inner { state: CircuitState::Closed, window: VecDeque::new(), opened_at: None, half_open_successes: 0 }),
        }
    }

    /// Whether a call should be allowed right now. OPEN breakers past
    /// their cooldown transition to HALF_OPEN as a side effect of this
    /// check, since that transition has no external trigger otherwise.
    pub fn allow(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.state == CircuitState::Open {
            if let Some(opened_at) = inner.opened_at {
                if opened_at.elapsed() >= self.config.cooldown {
                    inner.state = CircuitState::HalfOpen;
                    inner.half_open_successes = 0;
                    info!(provider_id = %self.provider_id, "circuit transition: OPEN -> HALF_OPEN (cooldown elapsed)");
                }
            }
        }
        inner.state != CircuitState::Open
    }

    /// Record the outcome of a call that `allow()` permitted.
    pub fn record(&self, success: bool) {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::HalfOpen => {
                if success {
                    inner.half_open_successes += 1;
                    if inner.half_open_successes >= self.config.half_open_success_threshold {
                        inner.state = CircuitState::Closed;
                        inner.window.clear();
                        info!(provider_id = %self.provider_id, "circuit transition: HALF_OPEN -> CLOSED (recovered)");
                    }
                } else {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(Instant::now());
                    info!(provider_id = %self.provider_id, "circuit transition: HALF_OPEN -> OPEN (trial call failed)");
                }
            }
            CircuitState::Closed => {
                inner.window.push_back(success);
                if inner.window.len() > self.config.window as usize {
                    inner.window.pop_front();
                }
                let volume = inner.window.len() as u32;
                if volume >= self.config.min_volume {
                    let failures = inner.window.iter().filter(|ok| !**ok).count() as f64;
                    let failure_rate = failures / volume as f64;
                    if failure_rate > self.config.failure_rate_threshold {
                        inner.state = CircuitState::Open;
                        inner.opened_at = Some(Instant::now());
                        info!(provider_id = %self.provider_id, failure_rate, "circuit transition: CLOSED -> OPEN (failure rate exceeded)");
                    }
                }
            }
            CircuitState::Open => {}
        }
    }

    /// The current state, without side effects.
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CircuitBreakerConfig {
        CircuitBreakerConfig { window: 10, failure_rate_threshold: 0.5, min_volume: 4, cooldown: std::time::Duration::from_millis(10), half_open_success_threshold: 2 }
    }

    #[test]
    fn opens_after_failure_rate_exceeds_threshold() {
        let breaker = CircuitBreaker::new("p1", config());
        for _ in 0..3 {
            breaker.record(false);
        }
        breaker.record(true);
        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(!breaker.allow());
    }

    #[test]
    fn half_opens_after_cooldown_then_closes_on_successes() {
        let breaker = CircuitBreaker::new("p1", config());
        for _ in 0..4 {
            breaker.record(false);
        }
        assert_eq!(breaker.state(), CircuitState::Open);
        std::thread::sleep(std::time::Duration::from_millis(20));
        assert!(breaker.allow());
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
        breaker.record(true);
        breaker.record(true);
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[test]
    fn any_half_open_failure_reopens() {
        let breaker = CircuitBreaker::new("p1", config());
        for _ in 0..4 {
            breaker.record(false);
        }
        std::thread::sleep(std::time::Duration::from_millis(20));
        breaker.allow();
        breaker.record(false);
        assert_eq!(breaker.state(), CircuitState::Open);
    }

    #[test]
    fn below_minimum_volume_never_opens() {
        let breaker = CircuitBreaker::new("p1", config());
        breaker.record(false);
        breaker.record(false);
        assert_eq!(breaker.state(), CircuitState::Closed);
    }
}
