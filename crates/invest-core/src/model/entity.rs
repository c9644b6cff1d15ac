use super::identifier::IdentifierRecord;
use crate::id::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What an [`Entity`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    /// A natural person.
    Individual,
    /// A business or other organization.
    Organization,
    /// A physical address, tracked as its own node for household/co-location
    /// relationships.
    Address,
}

/// A canonical individual, organization, or address.
///
/// Invariants (enforced by the resolver/store, not by this type):
/// no two entities within the same tenant share a confirmed strong
/// identifier (SSN/EIN/passport); the canonical entity of a merged set is
/// the oldest by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Canonical identifier. Oldest-by-id wins on merge.
    pub id: Id,
    /// What kind of entity this is.
    pub kind: EntityKind,
    /// Typed identifiers observed for this entity (SSN, EIN, passport,
    /// email, phone, ...).
    pub identifiers: Vec<IdentifierRecord>,
    /// Normalized name variants observed across sources.
    pub name_variants: Vec<String>,
    /// Date of birth, when applicable (individuals only).
    pub date_of_birth: Option<chrono::NaiveDate>,
    /// Tenant that owns this entity record.
    pub tenant_id: String,
    /// Whether this entity's data was supplied by the customer or paid for
    /// from an external provider. Drives cache-scope isolation (§4.C).
    pub data_origin: DataOriginTag,
    /// When this entity record was first created.
    pub created_at: DateTime<Utc>,
}

/// Provenance tag carried on an [`Entity`], distinct from
/// [`super::cached_result::DataOrigin`] which is scoped to a single cached
/// row rather than the whole entity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataOriginTag {
    /// Supplied directly by the customer (e.g. from an HRIS record).
    CustomerProvided,
    /// Purchased from an external provider.
    PaidExternal,
}

impl Entity {
    /// Construct a brand-new entity with no identifiers or name variants.
    pub fn new(kind: EntityKind, tenant_id: impl Into<String>, data_origin: DataOriginTag) -> Self {
        Self {
            id: Id::new(),
            kind,
            identifiers: Vec::new(),
            name_variants: Vec::new(),
            date_of_birth: None,
            tenant_id: tenant_id.into(),
            data_origin,
            created_at: Utc::now(),
        }
    }

    /// Strong identifiers (SSN, EIN, passport) used for exact matching and
    /// the no-shared-strong-identifier invariant.
    pub fn strong_identifiers(&self) -> impl Iterator<Item = &IdentifierRecord> {
        self.identifiers.iter().filter(|id| id.kind.is_strong())
    }
}
