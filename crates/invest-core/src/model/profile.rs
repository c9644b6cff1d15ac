use super::finding::Finding;
use crate::id::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What caused a new profile version to be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileTrigger {
    /// The original, one-time investigation.
    InitialScreening,
    /// A scheduled re-screen per the subject's vigilance level.
    Monitoring,
    /// An operator explicitly requested a re-run.
    ManualRefresh,
}

/// A named pattern detected across successive profile versions (GLOSSARY).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionSignal {
    /// Short name, e.g. "rapid_network_expansion".
    pub name: String,
    /// Human-readable detail.
    pub detail: String,
}

/// An immutable snapshot of findings, score, and connections for an entity
/// at a point in time. Version numbers form a dense, monotone sequence per
/// entity starting at 1 (§3, §8 invariant 2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityProfile {
    /// Profile id.
    pub id: Id,
    /// The entity this profile is about.
    pub entity_id: Id,
    /// Dense, monotone version number, starting at 1.
    pub version: u32,
    /// When this version was committed.
    pub created_at: DateTime<Utc>,
    /// What triggered this version.
    pub trigger: ProfileTrigger,
    /// All findings current as of this version.
    pub findings: Vec<Finding>,
    /// Composite risk score, 0-100.
    pub risk_score: f64,
    /// Connected entity ids included in this profile's network view.
    pub connections: Vec<Id>,
    /// Provider/check identifiers successfully used.
    pub sources_used: Vec<String>,
    /// Checks that could not be completed or relied on stale data.
    pub stale_sources: Vec<String>,
    /// Evolution signals detected relative to the prior version.
    pub evolution_signals: Vec<EvolutionSignal>,
    /// The immediately preceding version, if any.
    pub previous_version: Option<Id>,
    /// The delta from `previous_version`, if any.
    pub delta: Option<ProfileDelta>,
}

/// The difference between two successive profile versions. Derived; stored
/// alongside the successor profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileDelta {
    /// Findings present in the new version but not the old.
    pub new: Vec<Finding>,
    /// Findings present in the old version but not the new.
    pub resolved: Vec<Finding>,
    /// Findings present in both, but with different severity/detail.
    pub changed: Vec<Finding>,
    /// `new_score - old_score`.
    pub score_change: f64,
    /// `new_connection_count - old_connection_count`.
    pub connection_count_change: i64,
    /// Connections present in the new version but not the old.
    pub new_connections: Vec<Id>,
    /// Connections present in the old version but not the new.
    pub lost_connections: Vec<Id>,
    /// Evolution signals carried onto the new version.
    pub evolution_signals: Vec<EvolutionSignal>,
}

/// Match key used for delta computation: `(category, source, finding_date)`.
/// Two findings with the same key across versions are considered "the same
/// finding" for new/resolved/changed purposes (§4.E profile versioning).
fn finding_key(f: &Finding) -> (String, String, Option<chrono::NaiveDate>) {
    let primary_source = f.sources.first().cloned().unwrap_or_default();
    (f.category.clone(), primary_source, f.finding_date)
}

/// Compute the delta from `previous` findings to `current` findings.
///
/// `changed` is detected by same key but differing severity or detail text;
/// pure additions/removals land in `new`/`resolved`.
pub fn compute_finding_delta(previous: &[Finding], current: &[Finding]) -> (Vec<Finding>, Vec<Finding>, Vec<Finding>) {
    let prev_by_key: HashMap<_, _> = previous.iter().map(|f| (finding_key(f), f)).collect();
    let curr_by_key: HashMap<_, _> = current.iter().map(|f| (finding_key(f), f)).collect();

    let mut new = Vec::new();
    let mut changed = Vec::new();
    for (key, f) in &curr_by_key {
        match prev_by_key.get(key) {
            None => new.push((*f).clone()),
            Some(prev_f) => {
                if prev_f.severity != f.severity || prev_f.detail != f.detail {
                    changed.push((*f).clone());
                }
            }
        }
    }

    let resolved = prev_by_key
        .iter()
        .filter(|(key, _)| !curr_by_key.contains_key(*key))
        .map(|(_, f)| (*f).clone())
        .collect();

    (new, resolved, changed)
}

impl ProfileDelta {
    /// Build a delta between a previous and a new profile.
    pub fn compute(previous: &EntityProfile, current: &EntityProfile) -> Self {
        let (new, resolved, changed) = compute_finding_delta(&previous.findings, &current.findings);

        let prev_conn: std::collections::HashSet<_> = previous.connections.iter().copied().collect();
        let curr_conn: std::collections::HashSet<_> = current.connections.iter().copied().collect();
        let new_connections = curr_conn.difference(&prev_conn).copied().collect();
        let lost_connections = prev_conn.difference(&curr_conn).copied().collect();

        Self {
            new,
            resolved,
            changed,
            score_change: current.risk_score - previous.risk_score,
            connection_count_change: current.connections.len() as i64 - previous.connections.len() as i64,
            new_connections,
            lost_connections,
            evolution_signals: current.evolution_signals.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;

    fn finding(category: &str, source: &str, severity: Severity) -> Finding {
        Finding {
            id: Id::new(),
            category: category.to_string(),
            sub_category: "x".to_string(),
            summary: "s".to_string(),
            detail: "d".to_string(),
            severity,
            confidence: 0.9,
            role_relevance: 0.5,
            sources: vec![source.to_string()],
            corroborated: false,
            finding_date: None,
            discovered_at: Utc::now(),
            subject_entity_id: Id::new(),
            connection_path: None,
        }
    }

    #[test]
    fn delta_completeness_law() {
        let kept = finding("civil", "courtlink", Severity::Low);
        let resolved_away = finding("criminal", "trustar", Severity::Medium);
        let previous = vec![kept.clone(), resolved_away.clone()];

        let mut kept_changed = kept.clone();
        kept_changed.severity = Severity::High;
        let brand_new = finding("adverse_media", "factiva", Severity::Low);
        let current = vec![kept_changed.clone(), brand_new.clone()];

        let (new, resolved, changed) = compute_finding_delta(&previous, &current);
        assert_eq!(new.len(), 1);
        assert_eq!(new[0].category, "adverse_media");
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].category, "criminal");
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].severity, Severity::High);
    }
}
