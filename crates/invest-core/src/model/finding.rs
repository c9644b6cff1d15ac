use crate::id::Id;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Severity assigned to a finding by the risk analyzer (§4.G).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Low severity.
    Low,
    /// Medium severity.
    Medium,
    /// High severity.
    High,
    /// Critical severity; can trigger auto-escalation regardless of score.
    Critical,
}

/// A categorized, severity-scored observation derived from facts gathered
/// during the investigation. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Unique id.
    pub id: Id,
    /// Top-level category (e.g. "criminal", "sanctions", "deception").
    pub category: String,
    /// Finer-grained sub-category (e.g. "felony-conviction").
    pub sub_category: String,
    /// One-line human summary.
    pub summary: String,
    /// Full detail text.
    pub detail: String,
    /// Assigned severity.
    pub severity: Severity,
    /// Confidence in the finding itself, in `[0, 1]`.
    pub confidence: f64,
    /// How relevant this finding is to the subject's role, in `[0, 1]`.
    pub role_relevance: f64,
    /// Provider/query identifiers that produced this finding. Never empty
    /// (invariant 7 in §8): a finding with zero sources is a bug.
    pub sources: Vec<String>,
    /// Whether at least two independent sources corroborate this finding.
    pub corroborated: bool,
    /// The date the underlying event occurred, if known (distinct from
    /// when the orchestrator discovered it).
    pub finding_date: Option<NaiveDate>,
    /// When the orchestrator discovered this finding.
    pub discovered_at: DateTime<Utc>,
    /// The subject entity this finding is about.
    pub subject_entity_id: Id,
    /// For network-derived findings, the path of entity ids from the
    /// subject to the entity this finding is actually about.
    pub connection_path: Option<Vec<Id>>,
}

impl Finding {
    /// Years between the finding date and now, used for recency decay in
    /// scoring (§4.G). Findings without a date are treated as maximally
    /// recent (decay = 1.0) since there is no evidence they are old.
    pub fn age_years(&self) -> f64 {
        match self.finding_date {
            Some(date) => {
                let now = Utc::now().date_naive();
                let days = (now - date).num_days().max(0);
                days as f64 / 365.25
            }
            None => 0.0,
        }
    }
}
