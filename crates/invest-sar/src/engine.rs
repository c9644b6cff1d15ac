//! The top-level SAR engine: wires the per-type cycle, phase sequencing,
//! reconciliation, and checkpointing into the single entry point the
//! orchestrator calls per investigation (§4.F).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use invest_cache::CacheAside;
use invest_config::{AssessWeights, PatternModifiers, SarThresholds};
use invest_core::model::{InfoType, KnowledgeBase, KnowledgeBaseSnapshot, Phase, SarTypeState};
use invest_core::{Id, RequestContext};
use invest_providers::ProviderRouter;
use invest_resolver::EntityStore;

use crate::checkpoint::{Checkpoint, CheckpointMetadata, Checkpointer};
use crate::cycle::CycleDeps;
use crate::error::Result;
use crate::info_type_manager::InfoTypeManager;
use crate::phase_handlers::{self, NetworkOutcome};
use crate::reconciliation::{self, ReconciliationReport};

/// The serialized shape of one investigation's SAR state, as checkpointed.
/// This is what `bincode` wraps with the `"ICHK"` integrity header (§4.F
/// "Checkpointing").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestigationCheckpointState {
    /// Every type's state as of this checkpoint.
    pub type_states: HashMap<InfoType, SarTypeState>,
    /// The KnowledgeBase snapshot as of this checkpoint.
    pub kb_snapshot: KnowledgeBaseSnapshot,
    /// The phase the investigation had reached.
    pub phase_reached: Phase,
}

/// Per-phase concurrency bounds (§5 "phase concurrency bounds... sized
/// per phase, Records > Foundation > Network").
#[derive(Debug, Clone, Copy)]
pub struct PhaseConcurrency {
    /// Concurrency for Foundation (nominally 1: it runs sequentially
    /// anyway, but the bound still applies to provider calls within a
    /// type's own SEARCH step).
    pub foundation: usize,
    /// Concurrency for Records, the widest parallel phase.
    pub records: usize,
    /// Concurrency for Intelligence.
    pub intelligence: usize,
}

impl Default for PhaseConcurrency {
    fn default() -> Self {
        Self { foundation: 2, records: 6, intelligence: 3 }
    }
}

/// Everything a completed (or partially completed) investigation
/// produced: every type's terminal state, the network subgraph, and the
/// reconciliation report, ready for the risk analyzer.
#[derive(Debug)]
pub struct InvestigationOutcome {
    /// Terminal state per info type actually run.
    pub type_states: HashMap<InfoType, SarTypeState>,
    /// The network phase's discovered neighbors.
    pub network: NetworkOutcome,
    /// The reconciliation pass's inconsistencies and deception score.
    pub reconciliation: ReconciliationReport,
    /// Whether Foundation's confidence fell below the can-proceed
    /// threshold, blocking Records and onward (§4.F).
    pub foundation_blocked: bool,
}

/// Wires the SAR cycle, phase handlers, reconciliation, and checkpointing
/// into one investigation driver.
pub struct SarEngine<C> {
    router: ProviderRouter,
    cache: CacheAside,
    thresholds: SarThresholds,
    assess_weights: AssessWeights,
    pattern_modifiers: PatternModifiers,
    concurrency: PhaseConcurrency,
    per_hop_cap: usize,
    can_proceed_threshold: f64,
    checkpointer: C,
}

impl<C> SarEngine<C>
where
    C: Checkpointer<InvestigationCheckpointState>,
{
    /// Assemble an engine over an already-configured router, cache, and
    /// checkpoint backend.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        router: ProviderRouter,
        cache: CacheAside,
        thresholds: SarThresholds,
        assess_weights: AssessWeights,
        pattern_modifiers: PatternModifiers,
        concurrency: PhaseConcurrency,
        per_hop_cap: usize,
        can_proceed_threshold: f64,
        checkpointer: C,
    ) -> Self {
        Self { router, cache, thresholds, assess_weights, pattern_modifiers, concurrency, per_hop_cap, can_proceed_threshold, checkpointer }
    }

    /// Run a full investigation for `subject_entity_id`, checkpointing at
    /// each phase boundary under `investigation_id`.
    #[instrument(skip(self, context, store), fields(investigation_id))]
    pub async fn run(&self, investigation_id: &str, context: &RequestContext, subject_entity_id: Id, store: &EntityStore) -> Result<InvestigationOutcome> {
        let kb = KnowledgeBase::new();
        let mut manager = InfoTypeManager::new();
        let mut sequence = 0u64;

        let foundation_deps = CycleDeps {
            router: &self.router,
            cache: &self.cache,
            kb: &kb,
            thresholds: &self.thresholds,
            assess_weights: &self.assess_weights,
            phase_concurrency: self.concurrency.foundation,
        };
        let foundation = phase_handlers::run_foundation(context, subject_entity_id, foundation_deps, &mut manager).await?;
        let mut type_states = foundation.type_states;
        self.checkpoint(investigation_id, &mut sequence, "foundation", &type_states, &kb, Phase::Foundation).await?;

        let foundation_blocked = phase_handlers::assert_foundation_unblocks_downstream(
            &phase_handlers::PhaseOutcome { type_states: type_states.clone(), discovered_entities: vec![], inconsistencies: vec![] },
            self.can_proceed_threshold,
        )
        .is_err();

        let mut all_inconsistencies = foundation.inconsistencies;
        let mut discovered_entities = foundation.discovered_entities;

        if !foundation_blocked {
            let records_deps = CycleDeps { phase_concurrency: self.concurrency.records, ..foundation_deps };
            let records = phase_handlers::run_records(context, subject_entity_id, records_deps, &mut manager).await?;
            type_states.extend(records.type_states);
            all_inconsistencies.extend(records.inconsistencies);
            discovered_entities.extend(records.discovered_entities);
            self.checkpoint(investigation_id, &mut sequence, "records", &type_states, &kb, Phase::Records).await?;

            let intelligence_deps = CycleDeps { phase_concurrency: self.concurrency.intelligence, ..foundation_deps };
            let intelligence = phase_handlers::run_intelligence(context, subject_entity_id, intelligence_deps, &mut manager, context.tier).await?;
            type_states.extend(intelligence.type_states);
            all_inconsistencies.extend(intelligence.inconsistencies);
            discovered_entities.extend(intelligence.discovered_entities);
            self.checkpoint(investigation_id, &mut sequence, "intelligence", &type_states, &kb, Phase::Intelligence).await?;
        } else {
            info!(investigation_id, confidence_floor = self.can_proceed_threshold, "foundation below can-proceed threshold; skipping Records and onward");
        }

        let network = phase_handlers::run_network(store, subject_entity_id, context.degree, context.tier, self.per_hop_cap);
        self.checkpoint(investigation_id, &mut sequence, "network", &type_states, &kb, Phase::Network).await?;

        let reconciliation = reconciliation::reconcile(&kb.snapshot(), &all_inconsistencies, &self.pattern_modifiers);
        self.checkpoint(investigation_id, &mut sequence, "reconciliation", &type_states, &kb, Phase::Reconciliation).await?;

        Ok(InvestigationOutcome { type_states, network, reconciliation, foundation_blocked })
    }

    async fn checkpoint(
        &self,
        investigation_id: &str,
        sequence: &mut u64,
        node: &str,
        type_states: &HashMap<InfoType, SarTypeState>,
        kb: &KnowledgeBase,
        phase_reached: Phase,
    ) -> Result<()> {
        *sequence += 1;
        let state = InvestigationCheckpointState { type_states: type_states.clone(), kb_snapshot: kb.snapshot(), phase_reached };
        let metadata = CheckpointMetadata {
            id: Id::new(),
            investigation_id: investigation_id.to_string(),
            sequence: *sequence,
            node: node.to_string(),
            timestamp: chrono::Utc::now(),
            parent_id: None,
            metadata: HashMap::new(),
        };
        self.checkpointer.save(Checkpoint { metadata, state }).await?;
        Ok(())
    }

    /// Resume from the latest checkpoint for `investigation_id`, if one
    /// exists (§4.F "Resume restores an exact equivalent state").
    pub async fn resume_state(&self, investigation_id: &str) -> Result<Option<InvestigationCheckpointState>> {
        Ok(self.checkpointer.get_latest(investigation_id).await?.map(|c| c.state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_phase_concurrency_orders_records_above_foundation_above_network() {
        let concurrency = PhaseConcurrency::default();
        assert!(concurrency.records > concurrency.foundation);
    }
}
