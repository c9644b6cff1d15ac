use crate::id::Id;
use chrono::NaiveDate;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An employer record accumulated in the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmployerRecord {
    /// Employer name as confirmed.
    pub name: String,
    /// Title held, if known.
    pub title: Option<String>,
    /// Start date, if known.
    pub start: Option<NaiveDate>,
    /// End date, if known (`None` means current).
    pub end: Option<NaiveDate>,
}

/// An education record accumulated in the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EducationRecord {
    /// Institution name.
    pub institution: String,
    /// Degree/credential claimed.
    pub degree: Option<String>,
    /// Graduation year, if known.
    pub graduation_year: Option<i32>,
}

/// A professional license record accumulated in the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LicenseRecord {
    /// Licensing body/jurisdiction.
    pub issuer: String,
    /// License number or identifier.
    pub number: String,
    /// Whether the license is currently active.
    pub active: bool,
}

/// Snapshot contents of the per-investigation knowledge base.
///
/// Mutated only by the Assess step of a SAR cycle; read by every subsequent
/// planner (§3, §4.F). Serializable as-is for checkpointing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeBaseSnapshot {
    /// Confirmed name variants.
    pub name_variants: HashSet<String>,
    /// Confirmed date of birth, if established.
    pub date_of_birth: Option<NaiveDate>,
    /// Confirmed addresses.
    pub addresses: HashSet<String>,
    /// Employer records.
    pub employers: Vec<EmployerRecord>,
    /// Education records.
    pub educations: Vec<EducationRecord>,
    /// License records.
    pub licenses: Vec<LicenseRecord>,
    /// Other people/organizations discovered during the investigation,
    /// queued for the network phase.
    pub discovered_entities: HashSet<Id>,
    /// Jurisdictions the subject has touched (for locale-aware planning).
    pub jurisdictions: HashSet<String>,
}

/// Per-investigation knowledge base accumulator.
///
/// Owned for the lifetime of one investigation (§3 ownership rules); never
/// shared across investigations. Wrapped in a mutex to give the
/// `observe_then_add` operation the transactional semantics §5 requires:
/// concurrent info-types that both observe a missing fact and one that adds
/// it must converge rather than race.
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    inner: Mutex<KnowledgeBaseSnapshot>,
}

impl KnowledgeBase {
    /// Start an empty knowledge base.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from a checkpointed snapshot.
    pub fn from_snapshot(snapshot: KnowledgeBaseSnapshot) -> Self {
        Self {
            inner: Mutex::new(snapshot),
        }
    }

    /// Take an immutable snapshot, e.g. for checkpointing or read-only
    /// planner access.
    pub fn snapshot(&self) -> KnowledgeBaseSnapshot {
        self.inner.lock().clone()
    }

    /// Atomically observe the current state and conditionally mutate it.
    ///
    /// `f` receives `&mut KnowledgeBaseSnapshot` under the lock; whatever it
    /// does (check-then-add, merge, etc.) is indivisible with respect to
    /// every other caller of `observe_then_add` on this knowledge base.
    /// This is the transactional `observe_then_add` primitive named in
    /// §5's ordering guarantees.
    pub fn observe_then_add<R>(&self, f: impl FnOnce(&mut KnowledgeBaseSnapshot) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    /// Convenience: record a confirmed name variant if not already present.
    pub fn add_name_variant(&self, variant: impl Into<String>) {
        let variant = variant.into();
        self.observe_then_add(|snap| {
            snap.name_variants.insert(variant);
        });
    }

    /// Convenience: record a discovered entity for the network phase.
    pub fn add_discovered_entity(&self, id: Id) {
        self.observe_then_add(|snap| {
            snap.discovered_entities.insert(id);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observe_then_add_is_indivisible_under_contention() {
        let kb = std::sync::Arc::new(KnowledgeBase::new());
        std::thread::scope(|scope| {
            for i in 0..50 {
                let kb = kb.clone();
                scope.spawn(move || {
                    kb.observe_then_add(|snap| {
                        snap.addresses.insert(format!("addr-{i}"));
                    });
                });
            }
        });
        assert_eq!(kb.snapshot().addresses.len(), 50);
    }
}
