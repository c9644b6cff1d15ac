//! The REFINE step: decide whether a type's cycle terminates this
//! iteration, and if not, what gap-targeted queries to run next (§4.F
//! step 3).

use invest_config::sar_thresholds::TypeThresholds;
use invest_core::model::SarPhase;

/// What REFINE decided for this iteration.
#[derive(Debug, Clone, PartialEq)]
pub enum RefineOutcome {
    /// `confidence >= threshold`: the type is done.
    Complete,
    /// `iteration >= max_iterations` without reaching threshold.
    Capped,
    /// Gain rate and improvement both fell below their floors.
    Diminished,
    /// Loop back to SEARCH with another iteration, targeting `gaps`.
    Continue {
        /// The gaps the next iteration's planner should target.
        gaps: Vec<String>,
    },
}

impl RefineOutcome {
    /// The [`SarPhase`] this outcome corresponds to for terminal
    /// decisions; `Continue` has no terminal phase of its own.
    pub fn terminal_phase(&self) -> Option<SarPhase> {
        match self {
            RefineOutcome::Complete => Some(SarPhase::Complete),
            RefineOutcome::Capped => Some(SarPhase::Capped),
            RefineOutcome::Diminished => Some(SarPhase::Diminished),
            RefineOutcome::Continue { .. } => None,
        }
    }
}

/// Apply the REFINE decision rule (§4.F step 3) for one iteration.
///
/// `previous_confidence` is the type's confidence before this iteration's
/// ASSESS step ran; `epsilon` is the minimum confidence improvement that
/// counts as "still improving" even when the gain rate is low.
pub fn refine(
    thresholds: &TypeThresholds,
    iteration: u32,
    confidence: f64,
    previous_confidence: f64,
    info_gain_rate: f64,
    gaps: Vec<String>,
) -> RefineOutcome {
    if confidence >= thresholds.confidence_threshold {
        return RefineOutcome::Complete;
    }
    if iteration >= thresholds.max_iterations {
        return RefineOutcome::Capped;
    }
    let improvement = confidence - previous_confidence;
    if info_gain_rate < thresholds.min_gain_rate && improvement < thresholds.epsilon {
        return RefineOutcome::Diminished;
    }
    RefineOutcome::Continue { gaps }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> TypeThresholds {
        TypeThresholds {
            confidence_threshold: 0.85,
            max_iterations: 3,
            min_gain_rate: 0.10,
            epsilon: 0.02,
        }
    }

    #[test]
    fn confidence_above_threshold_completes() {
        let outcome = refine(&thresholds(), 1, 0.9, 0.5, 0.5, vec![]);
        assert_eq!(outcome, RefineOutcome::Complete);
    }

    #[test]
    fn hitting_max_iterations_caps() {
        let outcome = refine(&thresholds(), 3, 0.5, 0.4, 0.5, vec![]);
        assert_eq!(outcome, RefineOutcome::Capped);
    }

    #[test]
    fn low_gain_and_flat_confidence_diminishes() {
        let outcome = refine(&thresholds(), 2, 0.5, 0.49, 0.05, vec![]);
        assert_eq!(outcome, RefineOutcome::Diminished);
    }

    #[test]
    fn low_gain_but_real_improvement_continues() {
        let outcome = refine(&thresholds(), 2, 0.6, 0.4, 0.05, vec!["title".to_string()]);
        assert!(matches!(outcome, RefineOutcome::Continue { .. }));
    }

    #[test]
    fn terminal_phase_maps_outcomes() {
        assert_eq!(RefineOutcome::Complete.terminal_phase(), Some(SarPhase::Complete));
        assert_eq!(RefineOutcome::Continue { gaps: vec![] }.terminal_phase(), None);
    }
}
