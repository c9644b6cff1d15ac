use invest_core::Id;
use thiserror::Error;

/// Errors raised by the entity resolver, store, and graph.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolverError {
    /// The entity id does not exist in the store.
    #[error("entity {0} not found")]
    EntityNotFound(Id),
    /// A profile version compare-and-set lost a race: another writer
    /// committed version `current` first (§5 "Profile writes are
    /// serialized per entity", §8 invariant 6).
    #[error("profile version conflict for entity {entity_id}: expected to write {attempted}, but current is {current}")]
    VersionConflict {
        /// The entity whose profile version conflicted.
        entity_id: Id,
        /// The version this caller attempted to commit.
        attempted: u32,
        /// The version actually current in the store.
        current: u32,
    },
    /// Attempted to merge or split with no recorded merge audit to reverse.
    #[error("no merge audit recorded for entity {0}; cannot split")]
    NoMergeAudit(Id),
    /// Two entities in the same tenant would end up sharing a confirmed
    /// strong identifier after this operation (§3 invariant).
    #[error("entities {a} and {b} share a confirmed strong identifier within tenant {tenant_id}")]
    DuplicateStrongIdentifier {
        /// One of the conflicting entities.
        a: Id,
        /// The other conflicting entity.
        b: Id,
        /// The tenant both entities belong to.
        tenant_id: String,
    },
}

/// Convenience alias used across `invest-resolver`.
pub type Result<T> = std::result::Result<T, ResolverError>;
