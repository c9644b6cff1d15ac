use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A semantic category of inquiry that one SAR cycle targets (§4.F).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InfoType {
    /// Foundation: confirm the subject's identity.
    Identity,
    /// Foundation: employment history.
    Employment,
    /// Foundation: education history.
    Education,
    /// Records: criminal history.
    Criminal,
    /// Records: civil litigation.
    Civil,
    /// Records: financial/credit records.
    Financial,
    /// Records: professional licenses.
    Licenses,
    /// Records: regulatory actions.
    Regulatory,
    /// Records: sanctions/PEP screening. HIGH-PRIORITY.
    Sanctions,
    /// Intelligence: adverse media coverage.
    AdverseMedia,
    /// Intelligence: digital footprint / OSINT. Enhanced tier only.
    DigitalFootprint,
}

impl InfoType {
    /// The phase an info-type belongs to (§4.F sequencing table).
    pub fn phase(self) -> Phase {
        match self {
            Self::Identity | Self::Employment | Self::Education => Phase::Foundation,
            Self::Criminal
            | Self::Civil
            | Self::Financial
            | Self::Licenses
            | Self::Regulatory
            | Self::Sanctions => Phase::Records,
            Self::AdverseMedia | Self::DigitalFootprint => Phase::Intelligence,
        }
    }

    /// Whether total failure of this check is fatal to the investigation
    /// (§4.H, §8 boundary tests: sanctions/PEP are the only HIGH-PRIORITY
    /// checks).
    pub fn is_high_priority(self) -> bool {
        matches!(self, Self::Sanctions)
    }

    /// Declared predecessors that must be COMPLETE/CAPPED/DIMINISHED before
    /// this type may begin (§4.F dependency rule). Foundation types run in
    /// strict sequence; everything else merely depends on all of Foundation.
    pub fn predecessors(self) -> &'static [InfoType] {
        match self {
            Self::Identity => &[],
            Self::Employment => &[Self::Identity],
            Self::Education => &[Self::Identity, Self::Employment],
            Self::Criminal
            | Self::Civil
            | Self::Financial
            | Self::Licenses
            | Self::Regulatory
            | Self::Sanctions => &[Self::Identity, Self::Employment, Self::Education],
            Self::AdverseMedia | Self::DigitalFootprint => {
                &[Self::Identity, Self::Employment, Self::Education]
            }
        }
    }

    /// All info-types, in a stable declaration order.
    pub fn all() -> &'static [InfoType] {
        &[
            Self::Identity,
            Self::Employment,
            Self::Education,
            Self::Criminal,
            Self::Civil,
            Self::Financial,
            Self::Licenses,
            Self::Regulatory,
            Self::Sanctions,
            Self::AdverseMedia,
            Self::DigitalFootprint,
        ]
    }
}

/// A scheduling group of info-types (§4.F, §4.H table, GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// IDENTITY → EMPLOYMENT → EDUCATION, sequential, must succeed.
    Foundation,
    /// CRIMINAL, CIVIL, FINANCIAL, LICENSES, REGULATORY, SANCTIONS, parallel.
    Records,
    /// ADVERSE_MEDIA, DIGITAL_FOOTPRINT (Enhanced only), parallel.
    Intelligence,
    /// D2 then D3 (Enhanced only), sequential.
    Network,
    /// Inconsistency detection, deception scoring, finding dedup. Terminal.
    Reconciliation,
}

/// The state machine position of a single info-type's SAR cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SarPhase {
    /// Enumerating and executing queries for this iteration.
    Search,
    /// Extracting facts and computing confidence/gain for this iteration.
    Assess,
    /// Deciding whether to continue, and generating gap-targeted queries.
    Refine,
    /// Confidence reached threshold.
    Complete,
    /// Hit the iteration cap before reaching threshold.
    Capped,
    /// Information gain rate fell below the minimum with no meaningful
    /// improvement.
    Diminished,
}

impl SarPhase {
    /// Terminal phases never loop back to SEARCH.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Capped | Self::Diminished)
    }
}

/// Per-investigation, per-info-type SAR cycle state (§3, §4.F).
///
/// Monotone: `confidence` only increases, `iteration` strictly increments,
/// and `phase` transitions are one-way except the SEARCH→ASSESS→REFINE→
/// SEARCH loop-back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarTypeState {
    /// Which info-type this cycle is for.
    pub info_type: InfoType,
    /// Current iteration, starting at 1.
    pub iteration: u32,
    /// Current phase.
    pub phase: SarPhase,
    /// Current confidence, in `[0, 1]`. Monotone non-decreasing.
    pub confidence: f64,
    /// New facts this iteration divided by queries executed this iteration.
    pub info_gain_rate: f64,
    /// Declared-expected facts not yet observed.
    pub gaps: Vec<String>,
    /// Canonical `(provider, check, params)` query keys executed so far,
    /// for dedup.
    pub queries: Vec<String>,
    /// Opaque result references accumulated this cycle (ids into the
    /// result store).
    pub results: Vec<String>,
    /// When this cycle was last updated.
    pub updated_at: DateTime<Utc>,
}

impl SarTypeState {
    /// Start a brand-new SAR cycle for `info_type` at iteration 1.
    pub fn new(info_type: InfoType) -> Self {
        Self {
            info_type,
            iteration: 1,
            phase: SarPhase::Search,
            confidence: 0.0,
            info_gain_rate: 1.0,
            gaps: Vec::new(),
            queries: Vec::new(),
            results: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Advance confidence; never allowed to decrease (monotonicity
    /// invariant).
    pub fn raise_confidence(&mut self, candidate: f64) {
        if candidate > self.confidence {
            self.confidence = candidate.clamp(0.0, 1.0);
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_confidence_never_decreases() {
        let mut state = SarTypeState::new(InfoType::Criminal);
        state.raise_confidence(0.6);
        state.raise_confidence(0.4);
        assert_eq!(state.confidence, 0.6);
        state.raise_confidence(0.9);
        assert_eq!(state.confidence, 0.9);
    }

    #[test]
    fn foundation_types_have_no_cross_phase_predecessors() {
        assert!(InfoType::Identity.predecessors().is_empty());
        assert_eq!(InfoType::Education.phase(), Phase::Foundation);
        assert_eq!(InfoType::Criminal.phase(), Phase::Records);
    }

    #[test]
    fn only_sanctions_is_high_priority() {
        for t in InfoType::all() {
            assert_eq!(t.is_high_priority(), *t == InfoType::Sanctions);
        }
    }
}
