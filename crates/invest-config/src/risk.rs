//! Risk-analyzer tuning: role severity adjustments, network propagation
//! decay, risk-level cutoffs, auto-escalation thresholds, and the AI
//! override confidence gates (§4.G).

use serde::{Deserialize, Serialize};

/// Role × category severity boosts (§4.G: "certain role × category pairs
/// boost severity"). A row not present for a given `(role, category)` pair
/// contributes no boost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleSeverityAdjustments {
    rows: Vec<RoleSeverityRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RoleSeverityRow {
    role: String,
    category: String,
    boost: u8,
}

impl RoleSeverityAdjustments {
    /// Illustrative defaults: financial roles care more about financial and
    /// criminal history, executives about regulatory standing, and roles
    /// with childcare/vulnerable-population access care most about criminal
    /// history.
    pub fn defaults() -> Self {
        Self {
            rows: vec![
                RoleSeverityRow { role: "finance".to_string(), category: "financial".to_string(), boost: 1 },
                RoleSeverityRow { role: "finance".to_string(), category: "criminal".to_string(), boost: 1 },
                RoleSeverityRow { role: "executive".to_string(), category: "regulatory".to_string(), boost: 1 },
                RoleSeverityRow { role: "childcare".to_string(), category: "criminal".to_string(), boost: 2 },
            ],
        }
    }

    /// The severity-band boost (in steps, e.g. 1 == one band higher) for
    /// `role` finding a `category` finding, or 0 if no row matches.
    pub fn boost_for(&self, role: &str, category: &str) -> u8 {
        self.rows.iter().find(|row| row.role == role && row.category == category).map(|row| row.boost).unwrap_or(0)
    }
}

/// Hop-decay and centrality weighting for network risk propagation (§4.G
/// "Network propagation").
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NetworkPropagationWeights {
    /// Decay applied to a D2 neighbor's intrinsic risk before propagation.
    pub d2_decay: f64,
    /// Decay applied to a D3 neighbor's intrinsic risk before propagation.
    pub d3_decay: f64,
    /// How strongly centrality (degree/betweenness) scales the propagated
    /// contribution, on top of hop decay.
    pub centrality_weight: f64,
}

impl NetworkPropagationWeights {
    /// The defaults named in §4.G: 0.5 for D2, 0.25 for D3.
    pub fn defaults() -> Self {
        Self { d2_decay: 0.5, d3_decay: 0.25, centrality_weight: 0.5 }
    }
}

/// Cutoffs over the final 0-100 risk score (§4.G).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskLevelThresholds {
    /// Score at or above which the level is MODERATE (below is LOW).
    pub moderate: f64,
    /// Score at or above which the level is HIGH.
    pub high: f64,
    /// Score at or above which the level is CRITICAL.
    pub critical: f64,
}

impl RiskLevelThresholds {
    /// The defaults named in §4.G: LOW <25, MODERATE <50, HIGH <75,
    /// CRITICAL >=75.
    pub fn defaults() -> Self {
        Self { moderate: 25.0, high: 50.0, critical: 75.0 }
    }
}

/// Thresholds governing auto-escalation of the risk level regardless of
/// numeric score (§4.G: "critical deception signal or any critical
/// sanctions finding").
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EscalationThresholds {
    /// A reconciliation deception score at or above this value is treated
    /// as a critical deception signal on its own.
    pub critical_deception_score: f64,
}

impl EscalationThresholds {
    /// Chosen so that a single top-tier inconsistency (e.g. a sanctions
    /// alias match, base score 40.0) or a small cluster of lesser ones
    /// already trips escalation.
    pub fn defaults() -> Self {
        Self { critical_deception_score: 35.0 }
    }
}

/// Confidence gates above which an AI-assisted classification/severity call
/// may override the rule-based result (§4.G).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AiThresholds {
    /// Minimum AI confidence to override the keyword-rubric category.
    pub classification_override_confidence: f64,
    /// Minimum AI confidence to override the rule-based severity.
    pub severity_override_confidence: f64,
}

impl AiThresholds {
    /// Defaults chosen so only a high-confidence AI call can override the
    /// deterministic rubric; anything less defers to the rule-based path.
    pub fn defaults() -> Self {
        Self { classification_override_confidence: 0.75, severity_override_confidence: 0.75 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_role_category_has_no_boost() {
        let adjustments = RoleSeverityAdjustments::defaults();
        assert_eq!(adjustments.boost_for("finance", "adverse_media"), 0);
    }

    #[test]
    fn childcare_criminal_boost_is_present() {
        let adjustments = RoleSeverityAdjustments::defaults();
        assert_eq!(adjustments.boost_for("childcare", "criminal"), 2);
    }

    #[test]
    fn risk_level_thresholds_are_ordered() {
        let thresholds = RiskLevelThresholds::defaults();
        assert!(thresholds.moderate < thresholds.high);
        assert!(thresholds.high < thresholds.critical);
    }

    #[test]
    fn d2_decays_less_than_d3() {
        let weights = NetworkPropagationWeights::defaults();
        assert!(weights.d2_decay > weights.d3_decay);
    }
}
