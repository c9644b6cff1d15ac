//! The `AiModel` trait and its request/response types (§4.G).
//!
//! Every method is text-in, structured-out: the orchestrator never hands
//! an implementation anything but plain facts and gets back typed
//! candidates it can choose to trust or discard. None of these types name
//! a transport; a real model-backed implementation lives outside this
//! crate (§1 "AI-model transport" is out of scope) and would implement
//! this same trait.

use async_trait::async_trait;
use chrono::NaiveDate;
use invest_core::model::Severity;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One unstructured fact gathered from a provider response, ready for
/// extraction into candidate findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFact {
    /// The provider or source this fact came from.
    pub source: String,
    /// Free text describing the fact (e.g. a court record summary).
    pub text: String,
    /// The date the underlying event occurred, if the source states one.
    pub event_date: Option<NaiveDate>,
}

/// Input to [`AiModel::extract`]: a batch of raw facts gathered for one
/// information type, to turn into structured finding candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRequest {
    /// The facts to extract from.
    pub facts: Vec<RawFact>,
}

/// A single structured candidate produced by extraction, prior to
/// classification and severity assignment (§4.G "Finding extraction").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedCandidate {
    /// The fact this candidate was derived from (index into the request's
    /// `facts`).
    pub source_fact_index: usize,
    /// One-line summary.
    pub summary: String,
    /// Full detail text, usually the source fact text itself.
    pub detail: String,
    /// Confidence that this text actually describes a reportable fact, in
    /// `[0, 1]`.
    pub confidence: f64,
}

/// Output of [`AiModel::extract`].
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExtractionResponse {
    /// The extracted candidates, zero or more per input fact.
    pub candidates: Vec<ExtractedCandidate>,
}

/// Input to [`AiModel::classify`]: a single candidate's text, to be
/// assigned a category and sub-category (§4.G "Classification").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRequest {
    /// The candidate's summary.
    pub summary: String,
    /// The candidate's detail text.
    pub detail: String,
}

/// Output of [`AiModel::classify`]. The caller (a rule-based classifier in
/// `invest-risk`) only adopts this when `confidence` clears a configured
/// threshold; below it, the rule-based rubric's own category wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResponse {
    /// Suggested top-level category.
    pub category: String,
    /// Suggested sub-category.
    pub sub_category: String,
    /// Confidence in this classification, in `[0, 1]`.
    pub confidence: f64,
}

/// Input to [`AiModel::score`]: a classified candidate, to suggest a
/// severity (§4.G "Severity").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    /// The candidate's category.
    pub category: String,
    /// The candidate's sub-category.
    pub sub_category: String,
    /// The candidate's detail text.
    pub detail: String,
}

/// Output of [`AiModel::score`]. Like classification, this is advisory:
/// the rule-based severity mapping is authoritative unless this
/// suggestion's confidence clears a configured threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    /// Suggested severity.
    pub severity: Severity,
    /// Confidence in this suggestion, in `[0, 1]`.
    pub confidence: f64,
}

/// An AI-model-backed assistant for finding extraction, classification,
/// and severity scoring (§4.G).
///
/// Every method must be infallible in the "always produces a result"
/// sense *at the system level*: implementations may return
/// [`crate::AiError::Unavailable`] for transport/parse failures, but
/// `invest-risk` always has [`crate::RuleBasedAiModel`] to fall back to,
/// so the investigation as a whole never stalls for lack of AI.
#[async_trait]
pub trait AiModel: Send + Sync {
    /// Extract structured candidates from a batch of raw facts.
    async fn extract(&self, request: ExtractionRequest) -> Result<ExtractionResponse>;

    /// Suggest a category/sub-category for one candidate.
    async fn classify(&self, request: ClassificationRequest) -> Result<ClassificationResponse>;

    /// Suggest a severity for one classified candidate.
    async fn score(&self, request: ScoreRequest) -> Result<ScoreResponse>;
}
