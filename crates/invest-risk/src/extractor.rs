//! Finding extraction: an AI-model call turns raw facts into candidate
//! findings; on transport/parse failure — or an unhelpful empty response —
//! the rule-based fallback produces the same shape, so the system always
//! produces a finding set (§4.G "Finding extraction").

use invest_ai::{AiModel, ExtractedCandidate, ExtractionRequest, RawFact, RuleBasedAiModel};

/// Extract candidates from `facts`, trying `model` first and falling back
/// to the always-available rule-based model on any error or empty result.
pub async fn extract_candidates(model: &dyn AiModel, facts: Vec<RawFact>) -> Vec<ExtractedCandidate> {
    if facts.is_empty() {
        return Vec::new();
    }

    let request = ExtractionRequest { facts: facts.clone() };
    match model.extract(request).await {
        Ok(response) if !response.candidates.is_empty() => response.candidates,
        _ => {
            let fallback = RuleBasedAiModel::new();
            fallback.extract(ExtractionRequest { facts }).await.map(|response| response.candidates).unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invest_ai::MockAiModel;

    #[tokio::test]
    async fn empty_facts_extract_nothing() {
        let model = RuleBasedAiModel::new();
        assert!(extract_candidates(&model, vec![]).await.is_empty());
    }

    #[tokio::test]
    async fn transport_failure_falls_back_to_rule_based() {
        let model = MockAiModel::new().with_extract_failure("transport down");
        let facts = vec![RawFact { source: "s".to_string(), text: "felony conviction for fraud".to_string(), event_date: None }];
        let candidates = extract_candidates(&model, facts).await;
        assert_eq!(candidates.len(), 1);
    }

    #[tokio::test]
    async fn empty_ai_response_falls_back_to_rule_based() {
        let model = MockAiModel::new().with_extract_response(invest_ai::ExtractionResponse::default());
        let facts = vec![RawFact { source: "s".to_string(), text: "felony conviction for fraud".to_string(), event_date: None }];
        let candidates = extract_candidates(&model, facts).await;
        assert_eq!(candidates.len(), 1);
    }
}
