//! The top-level error enum: every sibling crate's error composed into
//! one type via `#[from]` (§7).

use thiserror::Error;

/// Errors surfaced by the investigation service and pipeline. Every
/// variant wraps a sibling crate's own error type unchanged; nothing here
/// re-derives detail that crate already carries.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Request context construction, compliance, budget, or consent
    /// failures (§4.A).
    #[error(transparent)]
    Core(#[from] invest_core::CoreError),
    /// Entity resolution/store failures (§4.E).
    #[error(transparent)]
    Resolver(#[from] invest_resolver::ResolverError),
    /// Provider gateway failures surfaced directly (most are absorbed
    /// into a degraded/capped SAR outcome instead).
    #[error(transparent)]
    Provider(#[from] invest_providers::ProviderError),
    /// Cache-aside failures.
    #[error(transparent)]
    Cache(#[from] invest_cache::CacheError),
    /// Cost-ledger failures.
    #[error(transparent)]
    Cost(#[from] invest_cost::CostError),
    /// SAR engine failures.
    #[error(transparent)]
    Sar(#[from] invest_sar::SarError),
    /// Risk-analyzer failures.
    #[error(transparent)]
    Risk(#[from] invest_risk::RiskError),
    /// The requested investigation id is unknown to this service.
    #[error("investigation {0} not found")]
    NotFound(String),
    /// The investigation is already in a terminal state and cannot be
    /// cancelled.
    #[error("investigation {investigation_id} is already terminal ({status})")]
    AlreadyTerminal {
        /// The investigation that was asked to cancel.
        investigation_id: String,
        /// Its current terminal status.
        status: String,
    },
    /// An outbound event failed to publish after every retry.
    #[error("event publish failed after retries: {0}")]
    EventPublish(String),
}

/// Convenience alias used across `invest-orchestrator`.
pub type Result<T> = std::result::Result<T, OrchestratorError>;
