//! The ASSESS step: turn provider results into type-tagged facts and
//! compute `type_confidence`, `info_gain_rate`, and the remaining gaps
//! (§4.F step 2).

use std::collections::{HashMap, HashSet};

use invest_core::model::InfoType;
use invest_core::Id;
use invest_config::sar_thresholds::AssessWeights;
use invest_providers::ProviderResult;

/// A single fact pulled out of a provider result, tagged the way §4.F
/// step 2 requires: source, confidence, and whether another source has
/// already reported the same fact.
#[derive(Debug, Clone)]
pub struct AssessedFact {
    /// A stable key identifying this fact (e.g. `"employer:acme-corp"`),
    /// used to detect corroboration across sources.
    pub key: String,
    /// The provider that reported this fact.
    pub source: String,
    /// The extractor's confidence in this fact.
    pub confidence: f64,
    /// Whether this exact key has been seen from another source too.
    pub corroborated: bool,
}

/// What the type's expected-fact template looks like: used to compute
/// completeness. Not exhaustive, just proportionate to what each type's
/// templates in [`crate::planner`] actually try to populate.
fn expected_fact_count(info_type: InfoType) -> usize {
    match info_type {
        InfoType::Identity => 3,
        InfoType::Employment => 4,
        InfoType::Education => 3,
        InfoType::Criminal | InfoType::Civil | InfoType::Financial => 2,
        InfoType::Licenses | InfoType::Regulatory | InfoType::Sanctions => 2,
        InfoType::AdverseMedia | InfoType::DigitalFootprint => 3,
    }
}

/// The declared-expected-facts set for a type, used to compute `gaps`
/// (expected ∖ observed) when a fact of that kind was never observed.
fn expected_fact_labels(info_type: InfoType) -> &'static [&'static str] {
    match info_type {
        InfoType::Identity => &["legal_name", "date_of_birth", "address"],
        InfoType::Employment => &["employer", "title", "start_date", "end_date"],
        InfoType::Education => &["institution", "degree", "graduation_year"],
        InfoType::Criminal | InfoType::Civil | InfoType::Financial => &["case_record", "jurisdiction"],
        InfoType::Licenses | InfoType::Regulatory | InfoType::Sanctions => &["record", "status"],
        InfoType::AdverseMedia | InfoType::DigitalFootprint => &["mention", "context", "date"],
    }
}

/// Extract facts from a batch of provider results. Each top-level key in
/// a result's `normalized_payload` object becomes one fact, keyed by
/// `"{key}:{value}"` so the same reported value from two providers
/// corroborates rather than producing two distinct facts.
pub fn extract_facts(results: &[ProviderResult]) -> Vec<AssessedFact> {
    let mut seen_keys: HashMap<String, usize> = HashMap::new();
    let mut facts = Vec::new();

    for result in results {
        let Some(object) = result.normalized_payload.as_object() else {
            continue;
        };
        for (field, value) in object {
            let key = format!("{field}:{}", value.to_string());
            *seen_keys.entry(key.clone()).or_insert(0) += 1;
            facts.push(AssessedFact {
                key,
                source: result.provider_id.clone(),
                confidence: 0.75,
                corroborated: false,
            });
        }
    }

    for fact in &mut facts {
        if seen_keys.get(&fact.key).copied().unwrap_or(0) >= 2 {
            fact.corroborated = true;
        }
    }

    facts
}

/// The full ASSESS output for one type's one iteration.
#[derive(Debug, Clone)]
pub struct AssessmentOutcome {
    /// The weighted `type_confidence` for this iteration (§4.F step 2).
    pub type_confidence: f64,
    /// New facts this iteration divided by queries executed.
    pub info_gain_rate: f64,
    /// Declared-expected-facts this type still hasn't observed.
    pub gaps: Vec<String>,
    /// Entities discovered in this iteration's facts, queued for the
    /// network phase.
    pub discovered_entities: Vec<Id>,
    /// Inconsistencies noticed this iteration, queued for reconciliation.
    pub inconsistencies: Vec<String>,
    /// How many distinct facts were observed this iteration.
    pub new_fact_count: usize,
}

/// Run the ASSESS step for one type's one iteration.
#[allow(clippy::too_many_arguments)]
pub fn assess(
    info_type: InfoType,
    results: &[ProviderResult],
    queries_executed: usize,
    queries_attempted: usize,
    weights: &AssessWeights,
    discovered_entities: Vec<Id>,
    inconsistencies: Vec<String>,
) -> AssessmentOutcome {
    let facts = extract_facts(results);
    let expected = expected_fact_count(info_type).max(1) as f64;
    let completeness = (facts.len() as f64 / expected).min(1.0);

    let corroborated_count = facts.iter().filter(|f| f.corroborated).count();
    let corroboration = if facts.is_empty() {
        0.0
    } else {
        corroborated_count as f64 / facts.len() as f64
    };

    let query_success_rate = if queries_attempted == 0 {
        0.0
    } else {
        queries_executed as f64 / queries_attempted as f64
    };

    let mean_fact_confidence = if facts.is_empty() {
        0.0
    } else {
        facts.iter().map(|f| f.confidence).sum::<f64>() / facts.len() as f64
    };

    let distinct_sources: HashSet<&str> = facts.iter().map(|f| f.source.as_str()).collect();
    let source_diversity = (distinct_sources.len() as f64 / 3.0).min(1.0);

    let type_confidence = weights.score(completeness, corroboration, query_success_rate, mean_fact_confidence, source_diversity);

    let observed_labels: HashSet<String> = facts
        .iter()
        .filter_map(|f| f.key.split(':').next().map(str::to_string))
        .collect();
    let gaps: Vec<String> = expected_fact_labels(info_type)
        .iter()
        .filter(|label| !observed_labels.contains(**label))
        .map(|label| label.to_string())
        .collect();

    let info_gain_rate = if queries_executed == 0 {
        0.0
    } else {
        facts.len() as f64 / queries_executed as f64
    };

    AssessmentOutcome {
        type_confidence,
        info_gain_rate,
        gaps,
        discovered_entities,
        inconsistencies,
        new_fact_count: facts.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(provider_id: &str, payload: serde_json::Value) -> ProviderResult {
        ProviderResult {
            provider_id: provider_id.to_string(),
            raw_payload: payload.clone(),
            normalized_payload: payload,
            cost: 1.0,
        }
    }

    #[test]
    fn facts_seen_from_two_providers_are_corroborated() {
        let results = vec![
            result("p1", serde_json::json!({"employer": "Acme"})),
            result("p2", serde_json::json!({"employer": "Acme"})),
        ];
        let facts = extract_facts(&results);
        assert!(facts.iter().all(|f| f.corroborated));
    }

    #[test]
    fn single_source_fact_is_not_corroborated() {
        let results = vec![result("p1", serde_json::json!({"employer": "Acme"}))];
        let facts = extract_facts(&results);
        assert!(!facts[0].corroborated);
    }

    #[test]
    fn gaps_lists_unobserved_expected_labels() {
        let weights = AssessWeights::defaults();
        let results = vec![result("p1", serde_json::json!({"employer": "Acme"}))];
        let outcome = assess(InfoType::Employment, &results, 1, 1, &weights, vec![], vec![]);
        assert!(outcome.gaps.contains(&"title".to_string()));
        assert!(!outcome.gaps.contains(&"employer".to_string()));
    }

    #[test]
    fn empty_results_yield_zero_confidence() {
        let weights = AssessWeights::defaults();
        let outcome = assess(InfoType::Identity, &[], 1, 1, &weights, vec![], vec![]);
        assert_eq!(outcome.type_confidence, 0.0);
    }
}
