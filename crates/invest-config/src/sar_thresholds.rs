//! SAR cycle thresholds and iteration caps, and the ASSESS-step weights
//! that produce `type_confidence` (§4.F).

use serde::{Deserialize, Serialize};

/// Termination thresholds for one class of info-type (Foundation types get
/// a stricter set than everything else, per §4.F).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TypeThresholds {
    /// `confidence ≥ this` → COMPLETE.
    pub confidence_threshold: f64,
    /// `iteration ≥ this` → CAPPED.
    pub max_iterations: u32,
    /// Info-gain rate below this, combined with `epsilon`, → DIMINISHED.
    pub min_gain_rate: f64,
    /// Minimum meaningful improvement in confidence between iterations.
    pub epsilon: f64,
}

/// The two threshold classes: Foundation types (stricter) and everything
/// else.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SarThresholds {
    /// Thresholds for Records/Intelligence/Network info-types.
    pub default: TypeThresholds,
    /// Thresholds for Foundation info-types (+0.05 confidence, +1 max
    /// iteration, per §4.F).
    pub foundation: TypeThresholds,
}

impl SarThresholds {
    /// The defaults named in §4.F: τ 0.85 / foundation 0.90, I 3 /
    /// foundation 4, g 0.10. `epsilon` (the minimum meaningful confidence
    /// improvement between iterations) is left unspecified by §4.F; a
    /// domain-conservative 0.02 is used until validated (see DESIGN.md).
    pub fn defaults() -> Self {
        Self {
            default: TypeThresholds { confidence_threshold: 0.85, max_iterations: 3, min_gain_rate: 0.10, epsilon: 0.02 },
            foundation: TypeThresholds { confidence_threshold: 0.90, max_iterations: 4, min_gain_rate: 0.10, epsilon: 0.02 },
        }
    }

    /// Thresholds applicable to an info-type, selected by whether it's in
    /// the Foundation phase.
    pub fn for_phase(&self, is_foundation: bool) -> TypeThresholds {
        if is_foundation { self.foundation } else { self.default }
    }
}

/// Weights for the five components of `type_confidence` (§4.F ASSESS
/// step). Must sum to 1.0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AssessWeights {
    /// Weight for observed/expected fact completeness.
    pub completeness: f64,
    /// Weight for the share of facts seen in ≥2 sources.
    pub corroboration: f64,
    /// Weight for the query success rate.
    pub query_success_rate: f64,
    /// Weight for mean fact confidence.
    pub mean_fact_confidence: f64,
    /// Weight for source diversity.
    pub source_diversity: f64,
}

impl AssessWeights {
    /// The defaults named in §4.F: 0.30/0.25/0.20/0.15/0.10.
    pub fn defaults() -> Self {
        Self {
            completeness: 0.30,
            corroboration: 0.25,
            query_success_rate: 0.20,
            mean_fact_confidence: 0.15,
            source_diversity: 0.10,
        }
    }

    /// Weighted sum of the five signals, each expected in `[0, 1]`.
    pub fn score(&self, completeness: f64, corroboration: f64, query_success_rate: f64, mean_fact_confidence: f64, source_diversity: f64) -> f64 {
        (self.completeness * completeness
            + self.corroboration * corroboration
            + self.query_success_rate * query_success_rate
            + self.mean_fact_confidence * mean_fact_confidence
            + self.source_diversity * source_diversity)
            .clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assess_weights_sum_to_one() {
        let w = AssessWeights::defaults();
        let total = w.completeness + w.corroboration + w.query_success_rate + w.mean_fact_confidence + w.source_diversity;
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn foundation_thresholds_are_stricter() {
        let thresholds = SarThresholds::defaults();
        assert!(thresholds.foundation.confidence_threshold > thresholds.default.confidence_threshold);
        assert!(thresholds.foundation.max_iterations > thresholds.default.max_iterations);
    }

    #[test]
    fn perfect_signals_saturate_at_one() {
        let w = AssessWeights::defaults();
        assert_eq!(w.score(1.0, 1.0, 1.0, 1.0, 1.0), 1.0);
    }
}
