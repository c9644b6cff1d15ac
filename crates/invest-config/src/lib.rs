//! Frozen, versioned configuration records for the investigation
//! orchestrator (§9 design note: "dynamic dictionaries as configuration").
//!
//! Every tunable named by §4/§5 — tier-policy matrix, freshness
//! windows, SAR thresholds, retry/circuit-breaker constants, category and
//! severity weights, pattern modifiers, fuzzy-match weights, and the
//! compliance rule table itself — lives here as a plain data record loaded
//! once at process start. Nothing downstream mutates it; nothing downstream
//! reads environment variables or globals to get at it.

pub mod compliance_rules;
pub mod error;
pub mod freshness;
pub mod retry;
pub mod risk;
pub mod sar_thresholds;
pub mod tier_policy;
pub mod weights;

pub use compliance_rules::ComplianceRuleTable;
pub use error::{ConfigError, Result};
pub use freshness::{FreshnessWindow, FreshnessWindows};
pub use retry::{CircuitBreakerConfig, RetryConfig, TimeoutConfig};
pub use risk::{AiThresholds, EscalationThresholds, NetworkPropagationWeights, RiskLevelThresholds, RoleSeverityAdjustments};
pub use sar_thresholds::{AssessWeights, SarThresholds, TypeThresholds};
pub use tier_policy::{StaleAction, TierPolicyEntry, TierPolicyMatrix};
pub use weights::{CategoryWeights, FuzzyMatchWeights, MatchThresholds, PatternModifiers, SeverityWeights};

use invest_core::ComplianceRuleset;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// The complete configuration surface for one running orchestrator (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Tier-policy matrix for STALE cache handling.
    pub tier_policy: TierPolicyMatrix,
    /// Per-info-type freshness/stale windows.
    pub freshness: FreshnessWindows,
    /// SAR termination thresholds and ASSESS-step weights.
    pub sar_thresholds: SarThresholds,
    /// ASSESS-step confidence weights.
    pub assess_weights: AssessWeights,
    /// Provider retry policy.
    pub retry: RetryConfig,
    /// Circuit-breaker thresholds.
    pub circuit_breaker: CircuitBreakerConfig,
    /// Per-call/per-scope timeouts.
    pub timeouts: TimeoutConfig,
    /// Risk category weights.
    pub category_weights: CategoryWeights,
    /// Risk severity weights.
    pub severity_weights: SeverityWeights,
    /// Reconciliation pattern modifiers.
    pub pattern_modifiers: PatternModifiers,
    /// Fuzzy entity-match weights.
    pub fuzzy_match_weights: FuzzyMatchWeights,
    /// Fuzzy entity-match decision thresholds.
    pub match_thresholds: MatchThresholds,
    /// Jurisdictional compliance rule table.
    pub compliance_rules: ComplianceRuleTable,
    /// Role x category severity boosts for the risk analyzer.
    pub role_severity_adjustments: RoleSeverityAdjustments,
    /// Hop-decay and centrality weighting for network risk propagation.
    pub network_propagation_weights: NetworkPropagationWeights,
    /// Cutoffs over the final 0-100 risk score.
    pub risk_level_thresholds: RiskLevelThresholds,
    /// Auto-escalation thresholds for the risk analyzer.
    pub escalation_thresholds: EscalationThresholds,
    /// AI override confidence gates for classification and severity.
    pub ai_thresholds: AiThresholds,
}

impl AppConfig {
    /// Every default named or implied by §4 and §5, assembled into one
    /// record. Used for tests and as the base a loaded TOML file patches.
    pub fn defaults() -> Self {
        Self {
            tier_policy: TierPolicyMatrix::defaults(),
            freshness: FreshnessWindows::defaults(),
            sar_thresholds: SarThresholds::defaults(),
            assess_weights: AssessWeights::defaults(),
            retry: RetryConfig::defaults(),
            circuit_breaker: CircuitBreakerConfig::defaults(),
            timeouts: TimeoutConfig::defaults(),
            category_weights: CategoryWeights::defaults(),
            severity_weights: SeverityWeights::defaults(),
            pattern_modifiers: PatternModifiers::defaults(),
            fuzzy_match_weights: FuzzyMatchWeights::defaults(),
            match_thresholds: MatchThresholds::defaults(),
            compliance_rules: ComplianceRuleTable::default(),
            role_severity_adjustments: RoleSeverityAdjustments::defaults(),
            network_propagation_weights: NetworkPropagationWeights::defaults(),
            risk_level_thresholds: RiskLevelThresholds::defaults(),
            escalation_thresholds: EscalationThresholds::defaults(),
            ai_thresholds: AiThresholds::defaults(),
        }
    }

    /// Load a configuration file from `path`, validate it, and return it.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        tracing::info!(hash = %config.hash(), "loaded configuration");
        Ok(config)
    }

    /// Fail loudly if any declared info-type lacks a tier-policy or
    /// freshness row (§9 open questions).
    pub fn validate(&self) -> Result<()> {
        self.tier_policy.validate()?;
        self.freshness.validate()?;
        Ok(())
    }

    /// Build the queryable compliance ruleset from the loaded rule table.
    pub fn compliance_ruleset(&self) -> ComplianceRuleset {
        self.compliance_rules.clone().into_ruleset()
    }

    /// A deterministic hash of this configuration, recorded into every
    /// investigation's audit trail (§6, §9) so a report can always be tied
    /// back to the exact configuration that produced it.
    pub fn hash(&self) -> String {
        let canonical = serde_json::to_string(self).expect("AppConfig always serializes");
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        AppConfig::defaults().validate().unwrap();
    }

    #[test]
    fn hash_is_stable_for_identical_configs() {
        let a = AppConfig::defaults();
        let b = AppConfig::defaults();
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn hash_changes_when_a_weight_changes() {
        let a = AppConfig::defaults();
        let mut b = AppConfig::defaults();
        b.category_weights.default_weight += 0.1;
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn load_round_trips_a_written_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let original = AppConfig::defaults();
        std::fs::write(&path, toml::to_string_pretty(&original).unwrap()).unwrap();
        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(original.hash(), loaded.hash());
    }
}
