//! Category-weighted composite scoring: for each category, a weighted
//! sum over findings of `severity_weight x recency_decay x
//! corroboration_bonus` (§4.G "Scoring").

use invest_config::{CategoryWeights, SeverityWeights};
use invest_core::model::Finding;
use std::collections::HashMap;

/// Linear recency decay from 1.0 at 1 year or less down to 0.5 at 7 years
/// or more (§4.G).
fn recency_decay(age_years: f64) -> f64 {
    if age_years <= 1.0 {
        1.0
    } else if age_years >= 7.0 {
        0.5
    } else {
        1.0 - (age_years - 1.0) / 6.0 * 0.5
    }
}

/// The corroboration bonus: 1.2x when a finding has two or more
/// independent sources, 1.0x otherwise (§4.G).
fn corroboration_bonus(finding: &Finding) -> f64 {
    if finding.corroborated {
        1.2
    } else {
        1.0
    }
}

/// Score `findings` per-category and sum into an overall `base_score`
/// (§4.G). Returns the per-category breakdown (sorted by category name
/// for deterministic output) alongside the total.
pub fn score_findings(findings: &[Finding], severity_weights: &SeverityWeights, category_weights: &CategoryWeights) -> (Vec<(String, f64)>, f64) {
    let mut by_category: HashMap<String, f64> = HashMap::new();
    for finding in findings {
        let contribution = severity_weights.weight_for(finding.severity) * recency_decay(finding.age_years()) * corroboration_bonus(finding);
        *by_category.entry(finding.category.clone()).or_insert(0.0) += contribution;
    }

    let mut category_scores: Vec<(String, f64)> = by_category.into_iter().map(|(category, raw)| (category.clone(), category_weights.weight_for(&category) * raw)).collect();
    category_scores.sort_by(|a, b| a.0.cmp(&b.0));

    let base_score = category_scores.iter().map(|(_, score)| *score).sum::<f64>().clamp(0.0, 100.0);
    (category_scores, base_score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use invest_core::model::Severity;
    use invest_core::Id;

    fn finding(category: &str, severity: Severity, age_years_ago: i64, corroborated: bool) -> Finding {
        Finding {
            id: Id::new(),
            category: category.to_string(),
            sub_category: "sub".to_string(),
            summary: "summary".to_string(),
            detail: "detail".to_string(),
            severity,
            confidence: 0.8,
            role_relevance: 0.5,
            sources: vec!["provider".to_string()],
            corroborated,
            finding_date: Some(Utc::now().date_naive() - chrono::Duration::days(age_years_ago * 365)),
            discovered_at: Utc::now(),
            subject_entity_id: Id::new(),
            connection_path: None,
        }
    }

    #[test]
    fn no_findings_score_zero() {
        let (scores, base) = score_findings(&[], &SeverityWeights::defaults(), &CategoryWeights::defaults());
        assert!(scores.is_empty());
        assert_eq!(base, 0.0);
    }

    #[test]
    fn corroborated_finding_scores_higher_than_uncorroborated() {
        let weights = SeverityWeights::defaults();
        let categories = CategoryWeights::defaults();
        let (_, corroborated_score) = score_findings(&[finding("civil", Severity::Medium, 0, true)], &weights, &categories);
        let (_, uncorroborated_score) = score_findings(&[finding("civil", Severity::Medium, 0, false)], &weights, &categories);
        assert!(corroborated_score > uncorroborated_score);
    }

    #[test]
    fn older_finding_scores_lower_than_recent() {
        let weights = SeverityWeights::defaults();
        let categories = CategoryWeights::defaults();
        let (_, recent_score) = score_findings(&[finding("civil", Severity::High, 0, false)], &weights, &categories);
        let (_, old_score) = score_findings(&[finding("civil", Severity::High, 8, false)], &weights, &categories);
        assert!(old_score < recent_score);
    }

    #[test]
    fn criminal_category_weight_outscores_unlisted_category() {
        let weights = SeverityWeights::defaults();
        let categories = CategoryWeights::defaults();
        let (_, criminal_score) = score_findings(&[finding("criminal", Severity::Medium, 0, false)], &weights, &categories);
        let (_, civil_score) = score_findings(&[finding("civil", Severity::Medium, 0, false)], &weights, &categories);
        assert!(criminal_score > civil_score);
    }
}
