//! Provider registry, router, circuit breaker, and rate limiter (§4.B).
//!
//! This crate knows nothing about caching or cost budgets beyond charging
//! `RequestContext::charge` for a successful call; cache-aside composition
//! (check cache, call the router on miss, write the result back) lives one
//! layer up, in the SAR phase handlers, so this crate stays swappable
//! without pulling in cache-backend concerns.

pub mod adapter;
pub mod circuit_breaker;
pub mod error;
pub mod rate_limiter;
pub mod registry;
pub mod router;

pub use adapter::{CheckRequest, ProviderAdapter, ProviderCategory, ProviderHealth, ProviderMetadata, ProviderResult};
pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use error::{FailureKind, ProviderError, Result};
pub use rate_limiter::{ProviderRateLimiter, RateLimit};
pub use registry::ProviderRegistry;
pub use router::ProviderRouter;
