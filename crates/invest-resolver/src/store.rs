//! The entity store: entities, identifiers, relationships, and
//! version-numbered profiles, plus the compare-and-set write path that
//! keeps profile versions a dense monotone sequence per entity (§3, §8
//! invariant 2).

use crate::error::{ResolverError, Result};
use dashmap::DashMap;
use invest_core::model::{Entity, EntityProfile, IdentifierRecord, Relationship};
use invest_core::Id;
use parking_lot::Mutex;

/// Everything the store knows about one entity: its record, observed
/// identifiers, outbound relationships, and the history of committed
/// profile versions. Held behind a single lock so that a profile write is
/// a serialized read-current-then-append, never a lost update (§5 "Profile
/// writes are serialized per entity").
struct EntityRecord {
    entity: Entity,
    profiles: Vec<EntityProfile>,
}

/// In-memory entity store (§4.E, §5).
///
/// Relationships are stored separately, keyed by `from`, since a single
/// entity can accumulate edges independent of its own record's lock.
#[derive(Default)]
pub struct EntityStore {
    entities: DashMap<Id, Mutex<EntityRecord>>,
    relationships: DashMap<Id, Vec<Relationship>>,
}

impl EntityStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a brand-new entity. Returns its id for convenience.
    pub fn insert_entity(&self, entity: Entity) -> Id {
        let id = entity.id;
        self.entities.insert(id, Mutex::new(EntityRecord { entity, profiles: Vec::new() }));
        id
    }

    /// A clone of the current entity record, if it exists.
    pub fn get_entity(&self, id: Id) -> Result<Entity> {
        self.entities.get(&id).map(|e| e.lock().entity.clone()).ok_or(ResolverError::EntityNotFound(id))
    }

    /// All entities currently in the store for `tenant_id`. Used by the
    /// exact-match step and the duplicate-strong-identifier check.
    pub fn entities_for_tenant(&self, tenant_id: &str) -> Vec<Entity> {
        self.entities.iter().filter(|e| e.lock().entity.tenant_id == tenant_id).map(|e| e.lock().entity.clone()).collect()
    }

    /// Append `identifier` to `entity_id`'s record, enforcing the
    /// no-two-entities-share-a-confirmed-strong-identifier invariant (§3)
    /// when the identifier is strong.
    pub fn add_identifier(&self, entity_id: Id, identifier: IdentifierRecord) -> Result<()> {
        let entry = self.entities.get(&entity_id).ok_or(ResolverError::EntityNotFound(entity_id))?;
        let mut record = entry.lock();

        if identifier.kind.is_strong() {
            for other in self.entities.iter() {
                let other_guard = other.lock();
                if other_guard.entity.id == entity_id || other_guard.entity.tenant_id != record.entity.tenant_id {
                    continue;
                }
                let collides = other_guard.entity.identifiers.iter().any(|existing| existing.kind == identifier.kind && existing.normalized == identifier.normalized);
                if collides {
                    return Err(ResolverError::DuplicateStrongIdentifier { a: entity_id, b: other_guard.entity.id, tenant_id: record.entity.tenant_id.clone() });
                }
            }
        }

        record.entity.identifiers.push(identifier);
        Ok(())
    }

    /// Record `name_variant` against `entity_id` if not already present.
    pub fn add_name_variant(&self, entity_id: Id, name_variant: String) -> Result<()> {
        let entry = self.entities.get(&entity_id).ok_or(ResolverError::EntityNotFound(entity_id))?;
        let mut record = entry.lock();
        if !record.entity.name_variants.contains(&name_variant) {
            record.entity.name_variants.push(name_variant);
        }
        Ok(())
    }

    /// Exact-match candidates: other entities in `tenant_id` sharing a
    /// strong identifier of the same kind and normalized value (§4.E step
    /// 2, the step that runs before fuzzy matching).
    pub fn exact_match_candidates(&self, tenant_id: &str, identifiers: &[IdentifierRecord]) -> Vec<Entity> {
        let mut found = Vec::new();
        for entry in self.entities.iter() {
            let record = entry.lock();
            if record.entity.tenant_id != tenant_id {
                continue;
            }
            let matches = identifiers.iter().any(|candidate| candidate.kind.is_strong() && record.entity.identifiers.iter().any(|existing| existing.kind == candidate.kind && existing.normalized == candidate.normalized));
            if matches {
                found.push(record.entity.clone());
            }
        }
        found
    }

    /// The most recently committed profile version for `entity_id`, if any.
    pub fn latest_profile(&self, entity_id: Id) -> Result<Option<EntityProfile>> {
        let entry = self.entities.get(&entity_id).ok_or(ResolverError::EntityNotFound(entity_id))?;
        Ok(entry.lock().profiles.last().cloned())
    }

    /// Every committed profile version for `entity_id`, oldest first.
    pub fn all_profiles(&self, entity_id: Id) -> Result<Vec<EntityProfile>> {
        let entry = self.entities.get(&entity_id).ok_or(ResolverError::EntityNotFound(entity_id))?;
        Ok(entry.lock().profiles.clone())
    }

    /// Commit `profile` as the next version for its entity, enforcing the
    /// dense monotone CAS: `profile.version` must be exactly one more than
    /// the current latest version (or `1` if there is none yet).
    pub fn commit_profile(&self, profile: EntityProfile) -> Result<()> {
        let entity_id = profile.entity_id;
        let entry = self.entities.get(&entity_id).ok_or(ResolverError::EntityNotFound(entity_id))?;
        let mut record = entry.lock();

        let expected = record.profiles.last().map(|p| p.version + 1).unwrap_or(1);
        if profile.version != expected {
            return Err(ResolverError::VersionConflict { entity_id, attempted: profile.version, current: record.profiles.last().map(|p| p.version).unwrap_or(0) });
        }

        record.profiles.push(profile);
        Ok(())
    }

    /// Add a directed relationship edge.
    pub fn add_relationship(&self, relationship: Relationship) {
        self.relationships.entry(relationship.from).or_default().push(relationship);
    }

    /// Outbound edges from `entity_id`.
    pub fn relationships_from(&self, entity_id: Id) -> Vec<Relationship> {
        self.relationships.get(&entity_id).map(|edges| edges.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invest_core::model::{DataOriginTag, EntityKind, IdentifierKind};

    fn new_entity(tenant_id: &str) -> Entity {
        Entity::new(EntityKind::Individual, tenant_id, DataOriginTag::PaidExternal)
    }

    #[test]
    fn duplicate_strong_identifier_across_tenants_entities_is_rejected() {
        let store = EntityStore::new();
        let a = new_entity("tenant-1");
        let a_id = store.insert_entity(a);
        let b = new_entity("tenant-1");
        let b_id = store.insert_entity(b);

        store.add_identifier(a_id, IdentifierRecord::new(a_id, IdentifierKind::Ssn, "123-45-6789", 1.0, "provider-1")).unwrap();
        let result = store.add_identifier(b_id, IdentifierRecord::new(b_id, IdentifierKind::Ssn, "123-45-6789", 1.0, "provider-2"));
        assert!(matches!(result, Err(ResolverError::DuplicateStrongIdentifier { .. })));
    }

    #[test]
    fn shared_strong_identifier_across_different_tenants_is_allowed() {
        let store = EntityStore::new();
        let a_id = store.insert_entity(new_entity("tenant-1"));
        let b_id = store.insert_entity(new_entity("tenant-2"));

        store.add_identifier(a_id, IdentifierRecord::new(a_id, IdentifierKind::Ssn, "123-45-6789", 1.0, "provider-1")).unwrap();
        store.add_identifier(b_id, IdentifierRecord::new(b_id, IdentifierKind::Ssn, "123-45-6789", 1.0, "provider-2")).unwrap();
    }

    #[test]
    fn profile_versions_must_be_dense_and_monotone() {
        use chrono::Utc;
        use invest_core::model::ProfileTrigger;

        let store = EntityStore::new();
        let entity_id = store.insert_entity(new_entity("tenant-1"));

        let make = |version: u32| EntityProfile {
            id: Id::new(),
            entity_id,
            version,
            created_at: Utc::now(),
            trigger: ProfileTrigger::InitialScreening,
            findings: Vec::new(),
            risk_score: 0.0,
            connections: Vec::new(),
            sources_used: Vec::new(),
            stale_sources: Vec::new(),
            evolution_signals: Vec::new(),
            previous_version: None,
            delta: None,
        };

        store.commit_profile(make(1)).unwrap();
        let conflict = store.commit_profile(make(3));
        assert!(matches!(conflict, Err(ResolverError::VersionConflict { attempted: 3, current: 1, .. })));
        store.commit_profile(make(2)).unwrap();

        assert_eq!(store.latest_profile(entity_id).unwrap().unwrap().version, 2);
    }

    #[test]
    fn exact_match_finds_entity_sharing_strong_identifier() {
        let store = EntityStore::new();
        let a_id = store.insert_entity(new_entity("tenant-1"));
        store.add_identifier(a_id, IdentifierRecord::new(a_id, IdentifierKind::Ssn, "123-45-6789", 1.0, "provider-1")).unwrap();

        let candidate = IdentifierRecord::new(Id::new(), IdentifierKind::Ssn, "123-45-6789", 1.0, "provider-2");
        let found = store.exact_match_candidates("tenant-1", &[candidate]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, a_id);
    }
}
