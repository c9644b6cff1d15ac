use thiserror::Error;

/// A classification of why a provider call failed (§4.B step 4, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The call took too long.
    Timeout,
    /// The provider is currently rate-limiting us.
    RateLimited,
    /// A 5xx-equivalent remote error, presumed transient.
    RemoteError,
    /// A connectivity-level failure, presumed transient.
    Network,
    /// A 4xx-equivalent error: auth, contract violation, bad request.
    Permanent,
}

impl FailureKind {
    /// Transient failures are retried locally; permanent failures open the
    /// circuit and move to the next candidate (§4.B step 4, §7).
    pub fn is_transient(self) -> bool {
        !matches!(self, Self::Permanent)
    }
}

/// Errors raised by the provider gateway.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No provider is permitted/registered for this `(check, locale)`.
    #[error("no candidate providers for check {check:?} in locale {locale}")]
    NoCandidates {
        /// The requested check.
        check: invest_core::model::InfoType,
        /// The requested locale.
        locale: String,
    },
    /// Every candidate was exhausted without success.
    #[error("check {check:?} incomplete: all {attempted} candidate(s) failed")]
    Incomplete {
        /// The requested check.
        check: invest_core::model::InfoType,
        /// How many candidates were attempted.
        attempted: usize,
    },
    /// A HIGH-PRIORITY check could not be completed by any candidate; this
    /// is fatal to the investigation (§4.H, §8 boundary tests).
    #[error("high-priority check {check:?} unavailable: all candidates failed or circuit-open")]
    HighPriorityUnavailable {
        /// The requested check.
        check: invest_core::model::InfoType,
    },
    /// The rate limiter would not grant a token within the configured
    /// budget-slack.
    #[error("rate limited: provider {provider_id}")]
    RateLimited {
        /// The provider that rejected the call.
        provider_id: String,
    },
    /// The circuit for this provider is open.
    #[error("circuit open: provider {provider_id}")]
    CircuitOpen {
        /// The provider whose circuit is open.
        provider_id: String,
    },
    /// The compliance gate rejected this provider for this context.
    #[error(transparent)]
    Compliance(#[from] invest_core::CoreError),
    /// The adapter itself returned an error, classified as `kind`.
    #[error("provider {provider_id} failed ({kind:?}): {message}")]
    Adapter {
        /// The provider that failed.
        provider_id: String,
        /// The failure classification.
        kind: FailureKind,
        /// The adapter's error message.
        message: String,
    },
}

/// Convenience alias used across `invest-providers`.
pub type Result<T> = std::result::Result<T, ProviderError>;
