//! The provider adapter interface (§6 external interfaces).

use crate::error::FailureKind;
use async_trait::async_trait;
use invest_core::model::InfoType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which tier of source this provider belongs to (§4.B registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderCategory {
    /// Available to every tier.
    Core,
    /// Enhanced tier only (behavioral, OSINT, dark-web, etc.).
    Premium,
}

/// Normalized input to a provider call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    /// The check type requested.
    pub check_type: InfoType,
    /// The subject entity id.
    pub subject_entity_id: invest_core::Id,
    /// Free-form, provider-understood query parameters (name, DOB,
    /// address, employer, etc. — whatever the planner enriched in).
    pub params: HashMap<String, String>,
    /// Locale governing this check.
    pub locale: String,
}

/// Normalized output from a provider call, before fact extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResult {
    /// The provider that produced this result.
    pub provider_id: String,
    /// Raw payload, as returned by the source (to be encrypted at rest by
    /// the cache layer).
    pub raw_payload: serde_json::Value,
    /// Normalized payload the rest of the system consumes.
    pub normalized_payload: serde_json::Value,
    /// The cost of this call, in USD.
    pub cost: f64,
}

/// Provider health, as reported by `health_check` or inferred from recent
/// call outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderHealth {
    /// Healthy and reachable.
    Healthy,
    /// Reachable but degraded (elevated latency/errors).
    Degraded,
    /// Unreachable or failing.
    Down,
}

/// Static metadata about a registered provider (§4.B, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// Unique provider id.
    pub id: String,
    /// Core vs. premium.
    pub category: ProviderCategory,
    /// Check types this provider can service.
    pub supported_checks: Vec<InfoType>,
    /// Locales this provider can service.
    pub supported_locales: Vec<String>,
    /// Relative cost tier used to break selection ties (lower sorts first).
    pub cost_tier: f64,
}

/// One external data source (§6 "provider adapter interface"). Adapters
/// own the concrete transport; this crate only ever sees the normalized
/// shape.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// This provider's static metadata.
    fn metadata(&self) -> &ProviderMetadata;

    /// Execute a check. Adapter-internal errors are surfaced as `(kind,
    /// message)` so the router can decide whether to retry, fall back, or
    /// open the circuit.
    async fn execute_check(&self, request: &CheckRequest) -> Result<ProviderResult, (FailureKind, String)>;

    /// A lightweight liveness probe, independent of any specific check.
    async fn health_check(&self) -> ProviderHealth;
}
