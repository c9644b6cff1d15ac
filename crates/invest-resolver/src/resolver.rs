//! Ties exact matching, fuzzy matching, and the store together into
//! `resolve_or_create` (§4.E).

use crate::matching::{self, MatchCandidate};
use crate::store::EntityStore;
use crate::Result;
use invest_config::{FuzzyMatchWeights, MatchThresholds};
use invest_core::model::{DataOriginTag, Entity, EntityKind, IdentifierRecord};
use invest_core::Id;

/// A raw subject description as presented at intake, before it has been
/// tied to any canonical entity.
#[derive(Debug, Clone, Default)]
pub struct SubjectInput {
    /// Strong and weak identifiers observed for this subject.
    pub identifiers: Vec<IdentifierRecord>,
    /// Name variant as given (pre-fold).
    pub name: String,
    pub last_name: String,
    pub first_name: String,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub address: Option<String>,
    pub tenant_id: String,
    pub data_origin: DataOriginTag,
}

/// The outcome of attempting to resolve a subject to an entity (§4.E).
#[derive(Debug, Clone)]
pub enum MatchDecision {
    /// An exact strong-identifier match, or a fuzzy score at/above
    /// `canonical` (0.95 default): use this entity directly, no review.
    Canonical(Id),
    /// A fuzzy score at/above `auto_match_or_review` (0.85 default): tier
    /// policy decides whether to auto-match or queue for human review.
    /// `invest-resolver` surfaces the candidate; the caller applies tier
    /// policy.
    AutoMatchOrReview { candidate: Id, score: f64 },
    /// A fuzzy score at/above `duplicate_candidate` (0.70 default) but
    /// below the auto-match band: recorded as a possible duplicate, a new
    /// entity is still created.
    DuplicateCandidate { new_entity: Id, candidate: Id, score: f64 },
    /// No candidate scored above any threshold: a new entity was created.
    NewEntity(Id),
}

/// Resolve `subject` against `store`'s existing entities for
/// `subject.tenant_id`, per the matching pipeline in §4.E: normalize,
/// exact-match on strong identifiers, then fuzzy-match on name/DOB/address
/// against every tenant entity, keeping the highest score.
pub fn resolve_or_create(store: &EntityStore, subject: &SubjectInput, weights: &FuzzyMatchWeights, thresholds: &MatchThresholds) -> Result<MatchDecision> {
    let exact = store.exact_match_candidates(&subject.tenant_id, &subject.identifiers);
    if let Some(matched) = exact.into_iter().next() {
        for identifier in &subject.identifiers {
            store.add_identifier(matched.id, identifier.clone())?;
        }
        store.add_name_variant(matched.id, matching::fold_name(&subject.name))?;
        return Ok(MatchDecision::Canonical(matched.id));
    }

    let candidate = MatchCandidate {
        last_name: matching::fold_name(&subject.last_name),
        first_name: matching::fold_name(&subject.first_name),
        date_of_birth: subject.date_of_birth,
        address: subject.address.clone(),
    };

    let mut best: Option<(Id, f64)> = None;
    for existing in store.entities_for_tenant(&subject.tenant_id) {
        let existing_candidate = MatchCandidate {
            last_name: existing.name_variants.first().cloned().unwrap_or_default(),
            first_name: String::new(),
            date_of_birth: existing.date_of_birth,
            address: None,
        };
        let score = matching::fuzzy_score(&candidate, &existing_candidate, weights);
        if best.map(|(_, best_score)| score > best_score).unwrap_or(true) {
            best = Some((existing.id, score));
        }
    }

    if let Some((candidate_id, score)) = best {
        if score >= thresholds.canonical {
            for identifier in &subject.identifiers {
                store.add_identifier(candidate_id, identifier.clone())?;
            }
            store.add_name_variant(candidate_id, matching::fold_name(&subject.name))?;
            return Ok(MatchDecision::Canonical(candidate_id));
        }
        if score >= thresholds.auto_match_or_review {
            return Ok(MatchDecision::AutoMatchOrReview { candidate: candidate_id, score });
        }
        if score >= thresholds.duplicate_candidate {
            let new_id = create_entity(store, subject)?;
            return Ok(MatchDecision::DuplicateCandidate { new_entity: new_id, candidate: candidate_id, score });
        }
    }

    Ok(MatchDecision::NewEntity(create_entity(store, subject)?))
}

fn create_entity(store: &EntityStore, subject: &SubjectInput) -> Result<Id> {
    let mut entity = Entity::new(EntityKind::Individual, subject.tenant_id.clone(), subject.data_origin);
    entity.date_of_birth = subject.date_of_birth;
    let id = store.insert_entity(entity);
    for identifier in &subject.identifiers {
        store.add_identifier(id, identifier.clone())?;
    }
    store.add_name_variant(id, matching::fold_name(&subject.name))?;
    Ok(id)
}
