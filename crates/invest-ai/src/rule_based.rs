//! A deterministic, keyword-driven `AiModel` that never calls out to
//! anything external. This is the fallback `invest-risk`'s extractor
//! falls back to on transport/parse failure, and it is also a legitimate
//! standalone choice for deployments with no AI model configured at all
//! (§4.G "Finding extraction": "the system always produces a finding
//! set").

use async_trait::async_trait;
use invest_core::model::Severity;

use crate::error::Result;
use crate::model::{AiModel, ClassificationRequest, ClassificationResponse, ExtractedCandidate, ExtractionRequest, ExtractionResponse, ScoreRequest, ScoreResponse};

/// `(category, sub_category, keywords)` rows, checked in order; the first
/// row whose keywords appear in the text wins.
const CATEGORY_RULES: &[(&str, &str, &[&str])] = &[
    ("sanctions", "ofac-match", &["sanctions", "ofac", "sdn list", "sanctioned"]),
    ("criminal", "felony-conviction", &["felony", "convicted", "conviction"]),
    ("criminal", "misdemeanor", &["misdemeanor", "petty offense"]),
    ("regulatory", "license-revocation", &["license revoked", "disbarred", "debarred"]),
    ("civil", "judgment", &["civil judgment", "lawsuit", "litigation"]),
    ("adverse_media", "negative-press", &["news", "article", "reported by"]),
    ("identity", "discrepancy", &["mismatch", "does not match", "inconsistent"]),
    ("employment", "gap", &["unemployment gap", "unexplained gap"]),
    ("education", "unverified", &["could not verify", "no record of enrollment"]),
];

/// `(sub_category_keyword, severity)` rows for severity assignment,
/// checked in order.
const SEVERITY_RULES: &[(&str, Severity)] = &[
    ("ofac-match", Severity::Critical),
    ("felony-conviction", Severity::High),
    ("license-revocation", Severity::High),
    ("judgment", Severity::Medium),
    ("misdemeanor", Severity::Medium),
    ("discrepancy", Severity::Medium),
    ("negative-press", Severity::Low),
    ("gap", Severity::Low),
    ("unverified", Severity::Low),
];

/// The always-available, non-AI fallback implementation of [`AiModel`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedAiModel;

impl RuleBasedAiModel {
    /// A new instance. Stateless; cheap to construct per call.
    pub fn new() -> Self {
        Self
    }

    fn classify_text(text: &str) -> (&'static str, &'static str) {
        let lowered = text.to_ascii_lowercase();
        for (category, sub_category, keywords) in CATEGORY_RULES {
            if keywords.iter().any(|kw| lowered.contains(kw)) {
                return (category, sub_category);
            }
        }
        ("uncategorized", "unspecified")
    }

    fn severity_for(sub_category: &str) -> Severity {
        SEVERITY_RULES.iter().find(|(kw, _)| *kw == sub_category).map(|(_, severity)| *severity).unwrap_or(Severity::Low)
    }
}

#[async_trait]
impl AiModel for RuleBasedAiModel {
    async fn extract(&self, request: ExtractionRequest) -> Result<ExtractionResponse> {
        let candidates = request
            .facts
            .iter()
            .enumerate()
            .filter(|(_, fact)| !fact.text.trim().is_empty())
            .map(|(index, fact)| {
                let summary = fact.text.chars().take(120).collect::<String>();
                ExtractedCandidate {
                    source_fact_index: index,
                    summary,
                    detail: fact.text.clone(),
                    confidence: 0.6,
                }
            })
            .collect();
        Ok(ExtractionResponse { candidates })
    }

    async fn classify(&self, request: ClassificationRequest) -> Result<ClassificationResponse> {
        let (category, sub_category) = Self::classify_text(&format!("{} {}", request.summary, request.detail));
        Ok(ClassificationResponse {
            category: category.to_string(),
            sub_category: sub_category.to_string(),
            confidence: if category == "uncategorized" { 0.3 } else { 0.7 },
        })
    }

    async fn score(&self, request: ScoreRequest) -> Result<ScoreResponse> {
        let severity = Self::severity_for(&request.sub_category);
        Ok(ScoreResponse { severity, confidence: 0.6 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawFact;

    #[tokio::test]
    async fn extract_skips_empty_facts() {
        let model = RuleBasedAiModel::new();
        let request = ExtractionRequest {
            facts: vec![RawFact { source: "s".to_string(), text: String::new(), event_date: None }, RawFact { source: "s".to_string(), text: "felony conviction for fraud".to_string(), event_date: None }],
        };
        let response = model.extract(request).await.unwrap();
        assert_eq!(response.candidates.len(), 1);
        assert_eq!(response.candidates[0].source_fact_index, 1);
    }

    #[tokio::test]
    async fn classify_matches_known_keyword() {
        let model = RuleBasedAiModel::new();
        let response = model
            .classify(ClassificationRequest {
                summary: "Felony conviction".to_string(),
                detail: "Subject was convicted of a felony in 2019".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(response.category, "criminal");
        assert_eq!(response.sub_category, "felony-conviction");
    }

    #[tokio::test]
    async fn classify_falls_back_to_uncategorized() {
        let model = RuleBasedAiModel::new();
        let response = model
            .classify(ClassificationRequest {
                summary: "Nothing notable".to_string(),
                detail: "Routine record with no flags".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(response.category, "uncategorized");
        assert!(response.confidence < 0.5);
    }

    #[tokio::test]
    async fn score_maps_sanctions_to_critical() {
        let model = RuleBasedAiModel::new();
        let response = model
            .score(ScoreRequest {
                category: "sanctions".to_string(),
                sub_category: "ofac-match".to_string(),
                detail: "matched OFAC SDN list".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(response.severity, Severity::Critical);
    }
}
