//! Category/severity scoring weights, inconsistency pattern modifiers, and
//! fuzzy-match weights (§4.E, §4.G).

use invest_core::model::Severity;
use serde::{Deserialize, Serialize};

/// Per-category risk weight used in composite scoring (§4.G). Categories
/// not listed fall back to `default_weight`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryWeights {
    rows: Vec<(String, f64)>,
    /// Weight applied to a category with no explicit row.
    pub default_weight: f64,
}

impl CategoryWeights {
    /// The illustrative defaults from §4.G: criminal 1.5, regulatory 1.3,
    /// everything else 1.0.
    pub fn defaults() -> Self {
        Self {
            rows: vec![("criminal".to_string(), 1.5), ("regulatory".to_string(), 1.3), ("sanctions".to_string(), 2.0)],
            default_weight: 1.0,
        }
    }

    /// The weight for `category`, falling back to `default_weight`.
    pub fn weight_for(&self, category: &str) -> f64 {
        self.rows.iter().find(|(name, _)| name == category).map(|(_, w)| *w).unwrap_or(self.default_weight)
    }
}

/// Numeric weight per `Severity`, used before recency/corroboration
/// adjustments (§4.G).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeverityWeights {
    /// Weight for LOW.
    pub low: f64,
    /// Weight for MEDIUM.
    pub medium: f64,
    /// Weight for HIGH.
    pub high: f64,
    /// Weight for CRITICAL.
    pub critical: f64,
}

impl SeverityWeights {
    /// Defaults chosen so the four bands fall in a wide, well-separated
    /// range under the 0-100 composite score (see DESIGN.md).
    pub fn defaults() -> Self {
        Self { low: 5.0, medium: 15.0, high: 30.0, critical: 60.0 }
    }

    /// The weight for `severity`.
    pub fn weight_for(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
            Severity::Critical => self.critical,
        }
    }
}

/// Multipliers applied to a base deception score when an inconsistency
/// exhibits a named pattern (§4.F reconciliation).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PatternModifiers {
    /// 2-3 inconsistencies in the same field.
    pub same_field_two_to_three: f64,
    /// 2-3 inconsistencies across different fields.
    pub different_fields_two_to_three: f64,
    /// 4 or more inconsistencies.
    pub four_or_more: f64,
    /// Inconsistencies spanning 3 or more info-types.
    pub spans_three_or_more_info_types: f64,
    /// A directional bias (inconsistencies that all favor the subject).
    pub directional_bias: f64,
}

impl PatternModifiers {
    /// The defaults named in §4.F: ×1.3, ×1.5, ×2.0, ×1.5, ×1.8.
    pub fn defaults() -> Self {
        Self {
            same_field_two_to_three: 1.3,
            different_fields_two_to_three: 1.5,
            four_or_more: 2.0,
            spans_three_or_more_info_types: 1.5,
            directional_bias: 1.8,
        }
    }
}

/// Weights for the fuzzy entity-match formula (§4.E).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FuzzyMatchWeights {
    /// Weight for last-name Jaro-Winkler similarity.
    pub last_name: f64,
    /// Weight for first-name Jaro-Winkler similarity.
    pub first_name: f64,
    /// Weight for exact date-of-birth match (1.0 or 0.0).
    pub date_of_birth_exact: f64,
    /// Weight for address similarity.
    pub address_similarity: f64,
}

impl FuzzyMatchWeights {
    /// The defaults named in §4.E: 0.4/0.25/0.2/0.15.
    pub fn defaults() -> Self {
        Self { last_name: 0.4, first_name: 0.25, date_of_birth_exact: 0.2, address_similarity: 0.15 }
    }
}

/// Decision thresholds over the fuzzy-match score (§4.E).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatchThresholds {
    /// Score at or above which a match is canonical.
    pub canonical: f64,
    /// Score at or above which the tier-aware auto-match-or-review branch
    /// applies.
    pub auto_match_or_review: f64,
    /// Score at or above which a `DuplicateCandidate` is recorded.
    pub duplicate_candidate: f64,
}

impl MatchThresholds {
    /// The defaults named in §4.E: 0.95 / 0.85 / 0.70.
    pub fn defaults() -> Self {
        Self { canonical: 0.95, auto_match_or_review: 0.85, duplicate_candidate: 0.70 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlisted_category_falls_back_to_default_weight() {
        let weights = CategoryWeights::defaults();
        assert_eq!(weights.weight_for("civil"), weights.default_weight);
        assert_eq!(weights.weight_for("criminal"), 1.5);
    }

    #[test]
    fn severity_weights_are_strictly_increasing() {
        let weights = SeverityWeights::defaults();
        assert!(weights.low < weights.medium);
        assert!(weights.medium < weights.high);
        assert!(weights.high < weights.critical);
    }

    #[test]
    fn match_thresholds_are_ordered() {
        let thresholds = MatchThresholds::defaults();
        assert!(thresholds.duplicate_candidate < thresholds.auto_match_or_review);
        assert!(thresholds.auto_match_or_review < thresholds.canonical);
    }
}
