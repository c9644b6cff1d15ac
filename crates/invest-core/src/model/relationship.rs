use crate::id::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The nature of a directed relationship between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipKind {
    /// `from` employs `to`, or `to` is employed at `from`, depending on
    /// entity kinds.
    Employer,
    /// `from` is a director/officer of organization `to`.
    Director,
    /// A looser discovered association (e.g. co-appears in a filing).
    Associate,
    /// Shares a household address.
    Household,
    /// Business partner / co-owner relationship.
    BusinessPartner,
}

/// A directed edge in the entity graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    /// Source entity.
    pub from: Id,
    /// Target entity.
    pub to: Id,
    /// Kind of relationship.
    pub kind: RelationshipKind,
    /// Confidence/strength of the relationship, in `[0, 1]`.
    pub strength: f64,
    /// When this relationship was first observed.
    pub first_seen: DateTime<Utc>,
    /// Providers/checks that contributed evidence for this edge.
    pub sources: Vec<String>,
}

impl Relationship {
    /// Construct a new relationship, clamping `strength` into `[0, 1]`.
    pub fn new(from: Id, to: Id, kind: RelationshipKind, strength: f64, source: impl Into<String>) -> Self {
        Self {
            from,
            to,
            kind,
            strength: strength.clamp(0.0, 1.0),
            first_seen: Utc::now(),
            sources: vec![source.into()],
        }
    }
}
