//! The AI-model interface: a text-in, structured-out trait for finding
//! extraction, classification, and severity scoring, plus a deterministic
//! mock and an always-available rule-based fallback (§4.G).
//!
//! `invest-risk`'s extractor calls a real model-backed `AiModel` when one
//! is configured, and falls back to [`RuleBasedAiModel`] on
//! [`AiError::Unavailable`] or low confidence, so the investigation always
//! produces a finding set even with no AI configured at all. This crate
//! does not implement a real model-backed adapter: the AI-model transport
//! is explicitly out of scope (§1).

pub mod error;
pub mod mock;
pub mod model;
pub mod rule_based;

pub use error::{AiError, Result};
pub use mock::MockAiModel;
pub use model::{AiModel, ClassificationRequest, ClassificationResponse, ExtractedCandidate, ExtractionRequest, ExtractionResponse, RawFact, ScoreRequest, ScoreResponse};
pub use rule_based::RuleBasedAiModel;
