//! The risk analyzer: ties extraction, classification, severity,
//! scoring, anomaly detection, and network propagation into one pass
//! producing a [`RiskAssessment`] (§4.G).

use std::collections::HashMap;

use chrono::Utc;
use invest_ai::{AiModel, RawFact, RuleBasedAiModel, ScoreRequest};
use invest_config::{AiThresholds, AppConfig, CategoryWeights, EscalationThresholds, NetworkPropagationWeights, RiskLevelThresholds, RoleSeverityAdjustments, SeverityWeights};
use invest_core::model::{Finding, Severity};
use invest_core::Id;
use invest_resolver::Neighbor;

use crate::anomaly;
use crate::classifier;
use crate::extractor;
use crate::model::{Recommendation, RiskAssessment, RiskLevel};
use crate::propagation;
use crate::scoring;

/// The configured weights and thresholds the analyzer runs with, frozen
/// for the lifetime of one investigation (§6: configuration loaded once
/// at process start).
#[derive(Debug, Clone)]
pub struct RiskAnalyzer {
    severity_weights: SeverityWeights,
    category_weights: CategoryWeights,
    role_severity_adjustments: RoleSeverityAdjustments,
    network_propagation_weights: NetworkPropagationWeights,
    risk_level_thresholds: RiskLevelThresholds,
    escalation_thresholds: EscalationThresholds,
    ai_thresholds: AiThresholds,
}

impl RiskAnalyzer {
    /// Build an analyzer from explicit config records.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        severity_weights: SeverityWeights,
        category_weights: CategoryWeights,
        role_severity_adjustments: RoleSeverityAdjustments,
        network_propagation_weights: NetworkPropagationWeights,
        risk_level_thresholds: RiskLevelThresholds,
        escalation_thresholds: EscalationThresholds,
        ai_thresholds: AiThresholds,
    ) -> Self {
        Self {
            severity_weights,
            category_weights,
            role_severity_adjustments,
            network_propagation_weights,
            risk_level_thresholds,
            escalation_thresholds,
            ai_thresholds,
        }
    }

    /// Build an analyzer from the loaded application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.severity_weights,
            config.category_weights.clone(),
            config.role_severity_adjustments.clone(),
            config.network_propagation_weights,
            config.risk_level_thresholds,
            config.escalation_thresholds,
            config.ai_thresholds,
        )
    }

    /// Run the full §4.G pipeline for one subject.
    ///
    /// `deception_score` is reconciliation's `ReconciliationReport.deception_score`
    /// (this crate never depends on `invest-sar`, so the caller passes the
    /// number in directly). `network_neighbors`/`network_intrinsic_risk`
    /// are the D2/D3 subgraph and each connected entity's own intrinsic
    /// risk score, respectively.
    #[allow(clippy::too_many_arguments)]
    pub async fn analyze(
        &self,
        model: &dyn AiModel,
        facts: Vec<RawFact>,
        subject_entity_id: Id,
        role: Option<&str>,
        deception_score: f64,
        network_neighbors: &[Neighbor],
        network_intrinsic_risk: &HashMap<Id, f64>,
    ) -> RiskAssessment {
        let findings = self.build_findings(model, facts, subject_entity_id, role).await;

        let (category_scores, base_score) = scoring::score_findings(&findings, &self.severity_weights, &self.category_weights);
        let anomaly_outcome = anomaly::detect(&findings);
        let network_adj = propagation::propagate(network_neighbors, network_intrinsic_risk, &self.network_propagation_weights);

        let raw_total = base_score + anomaly_outcome.pattern_adj + anomaly_outcome.anomaly_adj + network_adj + deception_score;
        let final_score = raw_total.clamp(0.0, 100.0);

        let has_critical_sanctions = findings.iter().any(|f| f.category == "sanctions" && f.severity == Severity::Critical);
        let has_critical_deception = deception_score >= self.escalation_thresholds.critical_deception_score;
        let auto_escalated = has_critical_sanctions || has_critical_deception;

        let level = if auto_escalated { RiskLevel::Critical } else { RiskLevel::from_score(final_score, &self.risk_level_thresholds) };
        let recommendation = Recommendation::for_level(level);

        RiskAssessment {
            findings,
            category_scores,
            base_score,
            pattern_adj: anomaly_outcome.pattern_adj,
            anomaly_adj: anomaly_outcome.anomaly_adj,
            network_adj,
            deception_adj: deception_score,
            final_score,
            level,
            recommendation,
            auto_escalated,
        }
    }

    async fn build_findings(&self, model: &dyn AiModel, facts: Vec<RawFact>, subject_entity_id: Id, role: Option<&str>) -> Vec<Finding> {
        let candidates = extractor::extract_candidates(model, facts.clone()).await;
        let fallback = RuleBasedAiModel::new();

        let mut findings = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let source_fact = facts.get(candidate.source_fact_index);

            let (category, sub_category) = classifier::classify(model, &candidate.summary, &candidate.detail, &self.ai_thresholds).await;

            let score_request = ScoreRequest { category: category.clone(), sub_category: sub_category.clone(), detail: candidate.detail.clone() };
            let rule_based_severity = fallback.score(score_request.clone()).await.map(|response| response.severity).unwrap_or(Severity::Low);
            let base_severity = match model.score(score_request).await {
                Ok(response) if response.confidence >= self.ai_thresholds.severity_override_confidence => response.severity,
                _ => rule_based_severity,
            };

            let finding_date = source_fact.and_then(|fact| fact.event_date);
            let severity = crate::severity::adjust_severity(base_severity, &category, role, finding_date, &self.role_severity_adjustments);

            findings.push(Finding {
                id: Id::new(),
                category,
                sub_category,
                summary: candidate.summary,
                detail: candidate.detail,
                severity,
                confidence: candidate.confidence,
                role_relevance: if role.is_some() { 1.0 } else { 0.0 },
                sources: source_fact.map(|fact| vec![fact.source.clone()]).unwrap_or_default(),
                corroborated: false,
                finding_date,
                discovered_at: Utc::now(),
                subject_entity_id,
                connection_path: None,
            });
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invest_config::AppConfig;

    fn analyzer() -> RiskAnalyzer {
        RiskAnalyzer::from_config(&AppConfig::defaults())
    }

    #[tokio::test]
    async fn clean_subject_has_no_findings_and_low_score() {
        let model = RuleBasedAiModel::new();
        let assessment = analyzer().analyze(&model, vec![], Id::new(), None, 0.0, &[], &HashMap::new()).await;
        assert!(assessment.findings.is_empty());
        assert_eq!(assessment.final_score, 0.0);
        assert_eq!(assessment.level, RiskLevel::Low);
        assert_eq!(assessment.recommendation, Recommendation::Proceed);
        assert!(!assessment.auto_escalated);
    }

    #[tokio::test]
    async fn sanctions_hit_auto_escalates_to_critical() {
        let model = RuleBasedAiModel::new();
        let facts = vec![RawFact { source: "ofac".to_string(), text: "subject matched an OFAC SDN list entry".to_string(), event_date: None }];
        let assessment = analyzer().analyze(&model, facts, Id::new(), None, 0.0, &[], &HashMap::new()).await;
        assert!(assessment.findings.iter().any(|f| f.category == "sanctions"));
        assert_eq!(assessment.level, RiskLevel::Critical);
        assert_eq!(assessment.recommendation, Recommendation::DoNotProceed);
        assert!(assessment.auto_escalated);
        assert!(assessment.final_score >= 75.0);
    }

    #[tokio::test]
    async fn high_deception_score_auto_escalates_even_with_no_findings() {
        let model = RuleBasedAiModel::new();
        let assessment = analyzer().analyze(&model, vec![], Id::new(), None, 40.0, &[], &HashMap::new()).await;
        assert!(assessment.auto_escalated);
        assert_eq!(assessment.level, RiskLevel::Critical);
    }
}
