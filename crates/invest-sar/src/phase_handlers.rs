//! Runs each phase according to its sequencing rule: Foundation sequential
//! and must-succeed, Records parallel, Intelligence parallel tier-filtered,
//! Network sequential D2-then-D3, Reconciliation terminal (§4.F "Phase
//! handlers").

use std::collections::HashMap;

use futures::stream::{self, StreamExt};
use tracing::warn;

use invest_core::model::{Degree, InfoType, Phase, SarPhase, SarTypeState, Tier};
use invest_core::{Id, RequestContext};
use invest_resolver::{discover_neighbors, EntityStore, Neighbor};

use crate::cycle::{self, CycleDeps};
use crate::error::{Result, SarError};
use crate::info_type_manager::InfoTypeManager;

/// What one phase produced: every type's final state plus everything
/// discovered along the way.
#[derive(Debug, Default)]
pub struct PhaseOutcome {
    /// Final [`SarTypeState`] per type run in this phase.
    pub type_states: HashMap<InfoType, SarTypeState>,
    /// Entities discovered in this phase's facts.
    pub discovered_entities: Vec<Id>,
    /// Free-form inconsistency notes raised in this phase.
    pub inconsistencies: Vec<String>,
}

impl PhaseOutcome {
    fn absorb(&mut self, info_type: InfoType, outcome: cycle::CycleOutcome) {
        self.discovered_entities.extend(outcome.discovered_entities);
        self.inconsistencies.extend(outcome.inconsistencies);
        self.type_states.insert(info_type, outcome.state);
    }

    /// The minimum confidence across this phase's types (used by
    /// Foundation to decide whether downstream phases are unblocked).
    pub fn minimum_confidence(&self) -> f64 {
        self.type_states.values().map(|s| s.confidence).fold(f64::INFINITY, f64::min).max(0.0)
    }
}

/// Run Foundation: IDENTITY → EMPLOYMENT → EDUCATION, strictly in order,
/// each one's predecessors checked before it starts. The caller decides
/// whether the resulting confidence unblocks downstream phases.
pub async fn run_foundation(context: &RequestContext, subject_entity_id: Id, deps: CycleDeps<'_>, manager: &mut InfoTypeManager) -> Result<PhaseOutcome> {
    let mut outcome = PhaseOutcome::default();
    for info_type in InfoTypeManager::types_in_phase(Phase::Foundation) {
        manager.can_start(info_type)?;
        let cycle_outcome = cycle::run_cycle(context, subject_entity_id, info_type, deps).await?;
        manager.record_terminal(info_type, cycle_outcome.state.phase);
        outcome.absorb(info_type, cycle_outcome);
    }
    Ok(outcome)
}

/// Run Records: CRIMINAL, CIVIL, FINANCIAL, LICENSES, REGULATORY,
/// SANCTIONS, all in parallel bounded by `deps.phase_concurrency`. A
/// sanctions check that cannot complete is fatal (§4.H); every other
/// Records type failing is non-fatal and only flagged.
pub async fn run_records(context: &RequestContext, subject_entity_id: Id, deps: CycleDeps<'_>, manager: &mut InfoTypeManager) -> Result<PhaseOutcome> {
    let types = InfoTypeManager::types_in_phase(Phase::Records);
    for info_type in &types {
        manager.can_start(*info_type)?;
    }

    let concurrency = deps.phase_concurrency.max(1);
    let results: Vec<(InfoType, Result<cycle::CycleOutcome>)> = stream::iter(types.clone())
        .map(|info_type| async move { (info_type, cycle::run_cycle(context, subject_entity_id, info_type, deps).await) })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    let mut outcome = PhaseOutcome::default();
    for (info_type, result) in results {
        match result {
            Ok(cycle_outcome) => {
                manager.record_terminal(info_type, cycle_outcome.state.phase);
                outcome.absorb(info_type, cycle_outcome);
            }
            Err(err) if info_type.is_high_priority() => return Err(err),
            Err(err) => {
                warn!(?info_type, error = %err, "non-priority Records check failed; flagging and continuing");
                manager.record_terminal(info_type, SarPhase::Capped);
            }
        }
    }
    Ok(outcome)
}

/// Run Intelligence: ADVERSE_MEDIA always, DIGITAL_FOOTPRINT only at
/// Enhanced tier. Types dropped by tier are simply absent from the
/// result, never an error (§4.F "Tier restrictions drop, not fail").
pub async fn run_intelligence(context: &RequestContext, subject_entity_id: Id, deps: CycleDeps<'_>, manager: &mut InfoTypeManager, tier: Tier) -> Result<PhaseOutcome> {
    let eligible: Vec<InfoType> = InfoTypeManager::types_in_phase(Phase::Intelligence)
        .into_iter()
        .filter(|t| *t != InfoType::DigitalFootprint || tier == Tier::Enhanced)
        .collect();
    for info_type in &eligible {
        manager.can_start(*info_type)?;
    }

    let concurrency = deps.phase_concurrency.max(1);
    let results: Vec<(InfoType, Result<cycle::CycleOutcome>)> = stream::iter(eligible)
        .map(|info_type| async move { (info_type, cycle::run_cycle(context, subject_entity_id, info_type, deps).await) })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    let mut outcome = PhaseOutcome::default();
    for (info_type, result) in results {
        let cycle_outcome = result?;
        manager.record_terminal(info_type, cycle_outcome.state.phase);
        outcome.absorb(info_type, cycle_outcome);
    }
    Ok(outcome)
}

/// What the Network phase produced: the neighbors discovered at each
/// degree, ready for the risk analyzer's propagation step (§4.G).
#[derive(Debug, Default)]
pub struct NetworkOutcome {
    /// 1-hop neighbors, always computed once degree allows it.
    pub d2_neighbors: Vec<Neighbor>,
    /// 2-hop neighbors, only populated at D3 + Enhanced tier.
    pub d3_neighbors: Vec<Neighbor>,
}

/// Run Network: D2 connections, then D3 (Enhanced only), sequentially,
/// since D3 discovery only makes sense once D2 is known (§4.F).
pub fn run_network(store: &EntityStore, subject_entity_id: Id, degree: Degree, tier: Tier, per_hop_cap: usize) -> NetworkOutcome {
    let mut outcome = NetworkOutcome::default();
    if matches!(degree, Degree::D1) {
        return outcome;
    }

    outcome.d2_neighbors = discover_neighbors(store, subject_entity_id, Degree::D2, per_hop_cap);

    if matches!(degree, Degree::D3) && tier == Tier::Enhanced {
        outcome.d3_neighbors = discover_neighbors(store, subject_entity_id, Degree::D3, per_hop_cap)
            .into_iter()
            .filter(|n| n.hop == 2)
            .collect();
    }

    outcome
}

/// Translate a Foundation shortfall into the fatal error §4.F requires:
/// Records and onward never start.
pub fn assert_foundation_unblocks_downstream(foundation: &PhaseOutcome, can_proceed_threshold: f64) -> Result<()> {
    let confidence = foundation.minimum_confidence();
    if confidence < can_proceed_threshold {
        return Err(SarError::FoundationBelowCanProceed { confidence, threshold: can_proceed_threshold });
    }
    Ok(())
}
