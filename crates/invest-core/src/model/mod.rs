//! The shared data model: entities, identifiers, relationships, cached
//! provider results, findings, the per-investigation knowledge base, SAR
//! type state, and versioned entity profiles.

mod cached_result;
mod entity;
mod finding;
mod identifier;
mod knowledge_base;
mod profile;
mod relationship;
mod sar_state;

pub use cached_result::{CachedResult, CacheState, DataOrigin};
pub use entity::{Entity, EntityKind};
pub use finding::{Finding, Severity};
pub use identifier::{IdentifierKind, IdentifierRecord};
pub use entity::DataOriginTag;
pub use knowledge_base::{EducationRecord, EmployerRecord, KnowledgeBase, KnowledgeBaseSnapshot, LicenseRecord};
pub use profile::{compute_finding_delta, EntityProfile, EvolutionSignal, ProfileDelta, ProfileTrigger};
pub use relationship::{Relationship, RelationshipKind};
pub use sar_state::{InfoType, Phase, SarPhase, SarTypeState};

use serde::{Deserialize, Serialize};

/// Service tier: which class of providers a request is allowed to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Core sources only.
    Standard,
    /// Core + premium sources (behavioral, OSINT, dark-web).
    Enhanced,
}

/// How far the network expansion reaches from the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Degree {
    /// Subject only.
    D1,
    /// Subject plus direct (1-hop) connections.
    D2,
    /// Subject plus 2-hop network. Enhanced tier only.
    D3,
}

/// Re-screen cadence. Outside the control plane's scope except for which
/// profile a new delta is computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vigilance {
    /// One-time screening.
    V0,
    /// Annual re-screen.
    V1,
    /// Monthly re-screen.
    V2,
    /// Bi-monthly re-screen.
    V3,
}
