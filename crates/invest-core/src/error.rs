use thiserror::Error;

/// Errors raised directly by the request context / compliance gate (§4.A,
/// §7). Every other crate's error enum composes with this one via `#[from]`
/// at the orchestrator boundary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// A check or source was attempted outside what the compliance
    /// ruleset permits for this context. Recoverable at planning time: the
    /// query is simply dropped, unless it excludes an entire tier.
    #[error("compliance blocked: {reason}")]
    ComplianceBlocked {
        /// Human-readable reason (rule id / category).
        reason: String,
    },
    /// The consent token backing this investigation has expired. Fatal for
    /// the in-flight request.
    #[error("consent expired at {expired_at}")]
    ConsentExpired {
        /// RFC3339 timestamp the consent expired.
        expired_at: String,
    },
    /// Would exceed the tenant's configured budget limit. Fatal; the
    /// current investigation aborts cleanly with a partial profile.
    #[error("budget exceeded: {accumulated} + {requested} > {limit}")]
    BudgetExceeded {
        /// Cost already accumulated this request.
        accumulated: f64,
        /// Cost this call would add.
        requested: f64,
        /// The configured limit.
        limit: f64,
    },
    /// The inbound request itself is malformed. Rejected at ingress; no
    /// audit cost is incurred.
    #[error("validation failed: {0}")]
    Validation(String),
    /// An invariant that must never fail, failed. No partial publication;
    /// this should page someone.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}

/// Convenience alias used across `invest-core`.
pub type Result<T> = std::result::Result<T, CoreError>;
