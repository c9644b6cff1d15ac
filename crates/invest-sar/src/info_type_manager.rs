//! Groups info types into their phases and enforces the predecessor
//! dependency rule so a phase handler never starts a type before its
//! prerequisites have reached a terminal state (§4.F "Dependency rule").

use std::collections::HashMap;

use invest_core::model::{InfoType, Phase, SarPhase};

use crate::error::{Result, SarError};

/// Tracks which terminal [`SarPhase`] each completed type reached, and
/// answers whether a given type is allowed to start yet.
#[derive(Debug, Default)]
pub struct InfoTypeManager {
    terminal_phases: HashMap<InfoType, SarPhase>,
}

impl InfoTypeManager {
    /// A manager with nothing completed yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `info_type` reached a terminal phase.
    pub fn record_terminal(&mut self, info_type: InfoType, phase: SarPhase) {
        debug_assert!(phase.is_terminal(), "record_terminal called with a non-terminal phase");
        self.terminal_phases.insert(info_type, phase);
    }

    /// Every type belonging to `phase`, in declaration order.
    pub fn types_in_phase(phase: Phase) -> Vec<InfoType> {
        InfoType::all().iter().copied().filter(|t| t.phase() == phase).collect()
    }

    /// Whether `info_type` may start: every declared predecessor has
    /// already reached COMPLETE, CAPPED, or DIMINISHED.
    pub fn can_start(&self, info_type: InfoType) -> Result<()> {
        for predecessor in info_type.predecessors() {
            match self.terminal_phases.get(predecessor) {
                Some(phase) if phase.is_terminal() => {}
                _ => {
                    return Err(SarError::PredecessorNotReady {
                        info_type,
                        blocking: *predecessor,
                    })
                }
            }
        }
        Ok(())
    }

    /// Whether Foundation reached a high enough confidence to unblock
    /// Records and onward, given the per-type confidences already
    /// recorded by the caller (Foundation confidence is the minimum
    /// across IDENTITY/EMPLOYMENT/EDUCATION, per §4.F).
    pub fn foundation_unblocks_downstream(foundation_confidences: &HashMap<InfoType, f64>, can_proceed_threshold: f64) -> bool {
        Self::types_in_phase(Phase::Foundation)
            .iter()
            .all(|t| foundation_confidences.get(t).copied().unwrap_or(0.0) >= can_proceed_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employment_requires_identity_first() {
        let manager = InfoTypeManager::new();
        assert!(manager.can_start(InfoType::Identity).is_ok());
        assert!(manager.can_start(InfoType::Employment).is_err());
    }

    #[test]
    fn employment_unblocks_once_identity_is_terminal() {
        let mut manager = InfoTypeManager::new();
        manager.record_terminal(InfoType::Identity, SarPhase::Complete);
        assert!(manager.can_start(InfoType::Employment).is_ok());
    }

    #[test]
    fn records_types_require_all_three_foundation_types() {
        let mut manager = InfoTypeManager::new();
        manager.record_terminal(InfoType::Identity, SarPhase::Complete);
        manager.record_terminal(InfoType::Employment, SarPhase::Complete);
        assert!(manager.can_start(InfoType::Criminal).is_err());
        manager.record_terminal(InfoType::Education, SarPhase::Capped);
        assert!(manager.can_start(InfoType::Criminal).is_ok());
    }

    #[test]
    fn foundation_below_threshold_does_not_unblock() {
        let mut confidences = HashMap::new();
        confidences.insert(InfoType::Identity, 0.95);
        confidences.insert(InfoType::Employment, 0.40);
        confidences.insert(InfoType::Education, 0.95);
        assert!(!InfoTypeManager::foundation_unblocks_downstream(&confidences, 0.90));
    }
}
