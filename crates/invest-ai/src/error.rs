use thiserror::Error;

/// Errors raised by an [`crate::AiModel`] implementation.
///
/// The rule-based fallback never returns [`AiError::Unavailable`]; only a
/// real model-backed implementation (not included in this crate, since the
/// transport is out of scope) would surface transport/parse failures this
/// way, which is exactly the case the extractor's fallback path exists for
/// (§4.G "Finding extraction").
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AiError {
    /// The model could not be reached, or its response could not be parsed.
    #[error("AI model unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, AiError>;
