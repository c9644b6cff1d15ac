use thiserror::Error;

/// Errors raised by the cache-aside layer.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A cached row's encrypted payload could not be decrypted, or its
    /// structure is otherwise invalid. The row is discarded and treated
    /// as a miss (§7 "DataIntegrity").
    #[error("cache row corrupt for key {key}: {reason}")]
    DataIntegrity {
        /// The key whose row was discarded.
        key: String,
        /// What went wrong.
        reason: String,
    },
    /// A shared-cache lookup would have surfaced a customer-provided row;
    /// refused before the caller ever sees it (§8 invariant 5).
    #[error("refused to surface customer-provided row from the shared cache")]
    TenantIsolationViolation,
}

/// Convenience alias used across `invest-cache`.
pub type Result<T> = std::result::Result<T, CacheError>;
