//! Risk levels, recommendations, and the final assessment record (§4.G).

use invest_config::RiskLevelThresholds;
use invest_core::model::Finding;
use serde::{Deserialize, Serialize};

/// The four risk bands over the final 0-100 score (§4.G).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Score below `moderate`.
    Low,
    /// Score at or above `moderate`, below `high`.
    Moderate,
    /// Score at or above `high`, below `critical`.
    High,
    /// Score at or above `critical`, or an auto-escalation rule fired.
    Critical,
}

impl RiskLevel {
    /// The band `score` falls into under `thresholds`, ignoring
    /// auto-escalation.
    pub fn from_score(score: f64, thresholds: &RiskLevelThresholds) -> Self {
        if score >= thresholds.critical {
            RiskLevel::Critical
        } else if score >= thresholds.high {
            RiskLevel::High
        } else if score >= thresholds.moderate {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }
}

/// The hiring-decision recommendation attached to a risk level (§4.G).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    /// No material findings; proceed.
    Proceed,
    /// Minor findings; proceed but note them.
    ProceedWithCaution,
    /// Material findings; a human reviewer must decide.
    ReviewRequired,
    /// Critical findings or auto-escalation; do not proceed without
    /// override.
    DoNotProceed,
}

impl Recommendation {
    /// The recommendation that follows directly from `level`.
    pub fn for_level(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low => Recommendation::Proceed,
            RiskLevel::Moderate => Recommendation::ProceedWithCaution,
            RiskLevel::High => Recommendation::ReviewRequired,
            RiskLevel::Critical => Recommendation::DoNotProceed,
        }
    }
}

/// The complete output of one risk analysis pass (§4.G).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Every finding extracted, classified, and severity-scored this pass.
    pub findings: Vec<Finding>,
    /// Per-category weighted scores that sum into `base_score`.
    pub category_scores: Vec<(String, f64)>,
    /// The category-weighted severity/recency/corroboration score.
    pub base_score: f64,
    /// Adjustment from volume/spread patterns (frequency bursts,
    /// cross-category saturation).
    pub pattern_adj: f64,
    /// Adjustment from severity escalating over time.
    pub anomaly_adj: f64,
    /// Adjustment from network risk propagation.
    pub network_adj: f64,
    /// Adjustment carried in from reconciliation's deception score.
    pub deception_adj: f64,
    /// `clamp(base_score + pattern_adj + anomaly_adj + network_adj +
    /// deception_adj, 0, 100)`.
    pub final_score: f64,
    /// The risk band, after any auto-escalation.
    pub level: RiskLevel,
    /// The recommendation that follows from `level`.
    pub recommendation: Recommendation,
    /// Whether an auto-escalation rule fired regardless of numeric score.
    pub auto_escalated: bool,
}
