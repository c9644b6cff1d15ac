//! Classification: a keyword/weighted rubric assigns category and
//! sub-category to each candidate; an AI-assisted suggestion may override
//! the rubric only when its confidence clears a configured threshold
//! (§4.G "Classification").

use invest_ai::{AiModel, ClassificationRequest};
use invest_config::AiThresholds;

/// `(category, sub_category, keywords)` rows, checked in order; the first
/// row whose keywords appear in the text wins. Mirrors the categories
/// `invest-ai`'s rule-based model recognizes, since a candidate that
/// reached extraction via that fallback should classify consistently.
const RUBRIC: &[(&str, &str, &[&str])] = &[
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

/// The rubric's own classification of `text`, independent of any AI call.
pub fn rubric_classify(text: &str) -> (String, String) {
    let lowered = text.to_ascii_lowercase();
    for (category, sub_category, keywords) in RUBRIC {
        if keywords.iter().any(|kw| lowered.contains(kw)) {
            return (category.to_string(), sub_category.to_string());
        }
    }
    ("uncategorized".to_string(), "unspecified".to_string())
}

/// Classify one candidate's summary/detail text. The rubric always runs;
/// `model`'s suggestion is adopted only if its confidence clears
/// `thresholds.classification_override_confidence`.
pub async fn classify(model: &dyn AiModel, summary: &str, detail: &str, thresholds: &AiThresholds) -> (String, String) {
    let (rubric_category, rubric_sub_category) = rubric_classify(&format!("{summary} {detail}"));

    let request = ClassificationRequest { summary: summary.to_string(), detail: detail.to_string() };
    match model.classify(request).await {
        Ok(response) if response.confidence >= thresholds.classification_override_confidence => (response.category, response.sub_category),
        _ => (rubric_category, rubric_sub_category),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invest_ai::{ClassificationResponse, MockAiModel};

    fn thresholds() -> AiThresholds {
        AiThresholds::defaults()
    }

    #[test]
    fn rubric_classifies_felony_as_criminal() {
        let (category, sub_category) = rubric_classify("Subject was convicted of a felony");
        assert_eq!(category, "criminal");
        assert_eq!(sub_category, "felony-conviction");
    }

    #[test]
    fn rubric_falls_back_to_uncategorized() {
        let (category, _) = rubric_classify("nothing notable here");
        assert_eq!(category, "uncategorized");
    }

    #[tokio::test]
    async fn low_confidence_ai_suggestion_is_ignored() {
        let model = MockAiModel::new().with_classify_response(ClassificationResponse {
            category: "adverse_media".to_string(),
            sub_category: "negative-press".to_string(),
            confidence: 0.2,
        });
        let (category, _) = classify(&model, "Felony conviction", "convicted of a felony", &thresholds()).await;
        assert_eq!(category, "criminal");
    }

    #[tokio::test]
    async fn high_confidence_ai_suggestion_overrides_rubric() {
        let model = MockAiModel::new().with_classify_response(ClassificationResponse {
            category: "regulatory".to_string(),
            sub_category: "license-revocation".to_string(),
            confidence: 0.95,
        });
        let (category, sub_category) = classify(&model, "ambiguous text", "no obvious keywords", &thresholds()).await;
        assert_eq!(category, "regulatory");
        assert_eq!(sub_category, "license-revocation");
    }
}
