use thiserror::Error;

/// Errors raised by the risk analyzer (§4.G). AI-model failures never
/// surface here: the extractor always falls back to the rule-based model,
/// so this enum only covers genuinely invariant-breaking conditions.
#[derive(Debug, Error)]
pub enum RiskError {
    /// An AI-model call failed and the rule-based fallback also produced
    /// nothing usable. Should not happen in practice since the fallback is
    /// infallible, but the extractor surfaces it rather than panicking.
    #[error("finding extraction produced no candidates and no fallback was available: {0}")]
    ExtractionUnavailable(#[from] invest_ai::AiError),

    /// A category weight, severity weight, or threshold was configured
    /// outside its valid range.
    #[error("invalid risk configuration: {0}")]
    InvalidConfiguration(String),
}

/// Convenience alias used across `invest-risk`.
pub type Result<T> = std::result::Result<T, RiskError>;
