//! The Reconciliation phase: cross-type inconsistency detection and
//! deception scoring (§4.F "Reconciliation").

use std::collections::{HashMap, HashSet};

use invest_core::model::{InfoType, KnowledgeBaseSnapshot};
use invest_config::PatternModifiers;

/// One of the inconsistency kinds the reconciliation pass looks for.
/// §4.F names this list as non-exhaustive ("12+ kinds"); these are the
/// twelve this engine detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InconsistencyKind {
    /// Two sources disagree on a date for the same event.
    DateMismatch,
    /// A claimed title doesn't match the degree/credential on file.
    TitleDegreeMismatch,
    /// An unexplained gap between two employment records.
    HiddenEmploymentGap,
    /// A claimed credential exceeds what the issuing institution confirms.
    EducationInflation,
    /// An employer record that no external source corroborates at all.
    FabricatedEmployer,
    /// Two records can't both be true on the calendar (overlap, etc.).
    ImpossibleTimeline,
    /// More distinct legal identities than a normal record should have.
    MultipleIdentities,
    /// The same kind of discrepancy recurs across multiple records.
    SystematicPattern,
    /// Conflicting addresses reported for the same period.
    AddressMismatch,
    /// A license record contradicts another issuer's record.
    LicenseDiscrepancy,
    /// Two regulatory bodies report contradictory standing.
    RegulatoryContradiction,
    /// A sanctions-list alias matches a name variant on file.
    SanctionsAliasMatch,
}

impl InconsistencyKind {
    /// The base deception score before pattern modifiers (§4.F).
    fn base_score(self) -> f64 {
        match self {
            InconsistencyKind::DateMismatch => 10.0,
            InconsistencyKind::TitleDegreeMismatch => 15.0,
            InconsistencyKind::HiddenEmploymentGap => 15.0,
            InconsistencyKind::EducationInflation => 20.0,
            InconsistencyKind::FabricatedEmployer => 30.0,
            InconsistencyKind::ImpossibleTimeline => 30.0,
            InconsistencyKind::MultipleIdentities => 25.0,
            InconsistencyKind::SystematicPattern => 20.0,
            InconsistencyKind::AddressMismatch => 8.0,
            InconsistencyKind::LicenseDiscrepancy => 18.0,
            InconsistencyKind::RegulatoryContradiction => 22.0,
            InconsistencyKind::SanctionsAliasMatch => 40.0,
        }
    }
}

/// One detected inconsistency, with enough context to compute pattern
/// modifiers and to surface as a dedicated risk finding.
#[derive(Debug, Clone)]
pub struct Inconsistency {
    /// What kind of inconsistency this is.
    pub kind: InconsistencyKind,
    /// The info types this inconsistency spans.
    pub info_types: Vec<InfoType>,
    /// The field it was detected on (for the same-field/different-fields
    /// pattern modifiers), e.g. `"employment.dates"`.
    pub field: String,
    /// A human-readable account of what was detected.
    pub detail: String,
}

/// The full output of one reconciliation pass.
#[derive(Debug, Clone)]
pub struct ReconciliationReport {
    /// Every inconsistency detected, unresolved.
    pub inconsistencies: Vec<Inconsistency>,
    /// The aggregated deception score after pattern modifiers (§4.F, fed
    /// into the risk analyzer's `deception_adj` per §4.G).
    pub deception_score: f64,
}

/// Run reconciliation over the investigation's accumulated knowledge.
/// `noted` carries free-form inconsistency notes raised during SAR
/// cycles (keyword-classified here); the employment-timeline and
/// multiple-identity checks run directly over the KnowledgeBase.
pub fn reconcile(kb: &KnowledgeBaseSnapshot, noted: &[String], modifiers: &PatternModifiers) -> ReconciliationReport {
    let mut inconsistencies = structural_inconsistencies(kb);
    inconsistencies.extend(noted.iter().filter_map(|note| classify_note(note)));

    let deception_score = score_inconsistencies(&inconsistencies, modifiers);
    ReconciliationReport { inconsistencies, deception_score }
}

fn structural_inconsistencies(kb: &KnowledgeBaseSnapshot) -> Vec<Inconsistency> {
    let mut found = Vec::new();

    if kb.name_variants.len() > 2 {
        found.push(Inconsistency {
            kind: InconsistencyKind::MultipleIdentities,
            info_types: vec![InfoType::Identity],
            field: "identity.name".to_string(),
            detail: format!("{} distinct name variants on file", kb.name_variants.len()),
        });
    }

    let mut employers = kb.employers.clone();
    employers.sort_by_key(|e| e.start);
    for pair in employers.windows(2) {
        let (Some(prev_end), Some(next_start)) = (pair[0].end, pair[1].start) else {
            continue;
        };
        if next_start < prev_end {
            found.push(Inconsistency {
                kind: InconsistencyKind::ImpossibleTimeline,
                info_types: vec![InfoType::Employment],
                field: "employment.dates".to_string(),
                detail: format!("{} overlaps with {}", pair[0].name, pair[1].name),
            });
        } else if (next_start - prev_end).num_days() > 180 {
            found.push(Inconsistency {
                kind: InconsistencyKind::HiddenEmploymentGap,
                info_types: vec![InfoType::Employment],
                field: "employment.dates".to_string(),
                detail: format!("unexplained gap between {} and {}", pair[0].name, pair[1].name),
            });
        }
    }

    found
}

/// Classify a free-form note by keyword. Notes that don't match a known
/// pattern are dropped rather than guessed at.
fn classify_note(note: &str) -> Option<Inconsistency> {
    let lowered = note.to_lowercase();
    let kind = if lowered.contains("degree") || lowered.contains("title") {
        InconsistencyKind::TitleDegreeMismatch
    } else if lowered.contains("inflat") {
        InconsistencyKind::EducationInflation
    } else if lowered.contains("fabricat") {
        InconsistencyKind::FabricatedEmployer
    } else if lowered.contains("address") {
        InconsistencyKind::AddressMismatch
    } else if lowered.contains("license") {
        InconsistencyKind::LicenseDiscrepancy
    } else if lowered.contains("regulator") {
        InconsistencyKind::RegulatoryContradiction
    } else if lowered.contains("sanction") {
        InconsistencyKind::SanctionsAliasMatch
    } else if lowered.contains("date") {
        InconsistencyKind::DateMismatch
    } else if lowered.contains("pattern") {
        InconsistencyKind::SystematicPattern
    } else {
        return None;
    };

    Some(Inconsistency {
        kind,
        info_types: vec![],
        field: "note".to_string(),
        detail: note.to_string(),
    })
}

/// Aggregate base scores with the pattern modifiers from §4.F: same-field
/// recurrence, cross-field recurrence, volume, cross-type span, and a
/// directional (subject-favoring) bias among the detected kinds.
fn score_inconsistencies(items: &[Inconsistency], modifiers: &PatternModifiers) -> f64 {
    if items.is_empty() {
        return 0.0;
    }

    let base: f64 = items.iter().map(|i| i.kind.base_score()).sum();

    let mut by_field: HashMap<&str, usize> = HashMap::new();
    for item in items {
        *by_field.entry(item.field.as_str()).or_insert(0) += 1;
    }
    let max_same_field = by_field.values().copied().max().unwrap_or(1);
    let same_field_multiplier = if max_same_field >= 4 {
        modifiers.four_or_more
    } else if (2..=3).contains(&max_same_field) {
        modifiers.same_field_two_to_three
    } else {
        1.0
    };

    let distinct_fields = by_field.len();
    let different_fields_multiplier = if distinct_fields >= 4 {
        modifiers.four_or_more
    } else if (2..=3).contains(&distinct_fields) {
        modifiers.different_fields_two_to_three
    } else {
        1.0
    };

    let distinct_info_types: HashSet<InfoType> = items.iter().flat_map(|i| i.info_types.iter().copied()).collect();
    let span_multiplier = if distinct_info_types.len() >= 3 { modifiers.spans_three_or_more_info_types } else { 1.0 };

    let subject_favoring = [InconsistencyKind::EducationInflation, InconsistencyKind::FabricatedEmployer, InconsistencyKind::TitleDegreeMismatch];
    let directional_multiplier = if items.iter().all(|i| subject_favoring.contains(&i.kind)) { modifiers.directional_bias } else { 1.0 };

    base * same_field_multiplier * different_fields_multiplier * span_multiplier * directional_multiplier
}

#[cfg(test)]
mod tests {
    use super::*;
    use invest_core::model::EmployerRecord;

    fn modifiers() -> PatternModifiers {
        PatternModifiers::defaults()
    }

    #[test]
    fn overlapping_employers_are_impossible_timeline() {
        let mut kb = KnowledgeBaseSnapshot::default();
        kb.employers.push(EmployerRecord {
            name: "Acme".to_string(),
            title: None,
            start: chrono::NaiveDate::from_ymd_opt(2020, 1, 1),
            end: chrono::NaiveDate::from_ymd_opt(2021, 1, 1),
        });
        kb.employers.push(EmployerRecord {
            name: "Globex".to_string(),
            title: None,
            start: chrono::NaiveDate::from_ymd_opt(2020, 6, 1),
            end: chrono::NaiveDate::from_ymd_opt(2022, 1, 1),
        });
        let report = reconcile(&kb, &[], &modifiers());
        assert!(report.inconsistencies.iter().any(|i| i.kind == InconsistencyKind::ImpossibleTimeline));
        assert!(report.deception_score > 0.0);
    }

    #[test]
    fn many_name_variants_flags_multiple_identities() {
        let mut kb = KnowledgeBaseSnapshot::default();
        kb.name_variants.insert("Jane Doe".to_string());
        kb.name_variants.insert("J. Doe".to_string());
        kb.name_variants.insert("Janet Doe".to_string());
        let report = reconcile(&kb, &[], &modifiers());
        assert!(report.inconsistencies.iter().any(|i| i.kind == InconsistencyKind::MultipleIdentities));
    }

    #[test]
    fn no_inconsistencies_means_zero_score() {
        let kb = KnowledgeBaseSnapshot::default();
        let report = reconcile(&kb, &[], &modifiers());
        assert!(report.inconsistencies.is_empty());
        assert_eq!(report.deception_score, 0.0);
    }

    #[test]
    fn noted_sanctions_keyword_scores_higher_than_date_mismatch() {
        let kb = KnowledgeBaseSnapshot::default();
        let sanctions = reconcile(&kb, &["possible sanctions alias match".to_string()], &modifiers());
        let date = reconcile(&kb, &["date discrepancy found".to_string()], &modifiers());
        assert!(sanctions.deception_score > date.deception_score);
    }
}
