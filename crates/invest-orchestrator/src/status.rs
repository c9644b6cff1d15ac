//! Investigation lifecycle status (§6 "inbound control surface").

use serde::{Deserialize, Serialize};

/// Where an investigation stands in its lifecycle. Transitions only move
/// forward; `Cancelled` and `Failed` are terminal from any non-terminal
/// state, `Complete` only from `AwaitingReview` or `Analyzing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvestigationStatus {
    /// Submitted but waiting on subject consent before any provider call
    /// is allowed to run.
    PendingConsent,
    /// The SAR engine is actively running Foundation/Records/Intelligence/
    /// Network.
    Collecting,
    /// SAR collection finished; the risk analyzer is scoring findings.
    Analyzing,
    /// Risk level requires a human reviewer before any adverse action.
    AwaitingReview,
    /// A profile was committed and no further action is pending.
    Complete,
    /// Cancelled before completion, cooperatively.
    Cancelled,
    /// Aborted by an unrecoverable error (budget exceeded, consent
    /// expired, internal invariant violation).
    Failed,
}

impl InvestigationStatus {
    /// Whether this status can still transition.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Cancelled | Self::Failed)
    }
}

impl std::fmt::Display for InvestigationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::PendingConsent => "pending_consent",
            Self::Collecting => "collecting",
            Self::Analyzing => "analyzing",
            Self::AwaitingReview => "awaiting_review",
            Self::Complete => "complete",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_complete_cancelled_failed_are_terminal() {
        assert!(!InvestigationStatus::PendingConsent.is_terminal());
        assert!(!InvestigationStatus::Collecting.is_terminal());
        assert!(!InvestigationStatus::Analyzing.is_terminal());
        assert!(!InvestigationStatus::AwaitingReview.is_terminal());
        assert!(InvestigationStatus::Complete.is_terminal());
        assert!(InvestigationStatus::Cancelled.is_terminal());
        assert!(InvestigationStatus::Failed.is_terminal());
    }
}
