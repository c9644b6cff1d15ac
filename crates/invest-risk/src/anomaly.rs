//! Anomaly and pattern detection over a finding set: frequency bursts,
//! severity escalation over time, and cross-category saturation (§4.G
//! "Anomaly & pattern detection").
//!
//! Cross-type structural inconsistencies — timeline impossibilities,
//! credential inflation, multiple identities, and the rest of the
//! reconciliation pass's catalog — are detected over the knowledge base
//! during reconciliation, not here, and arrive as `deception_adj`; this
//! module only looks at the shape of the finding set itself.

use invest_core::model::{Finding, Severity};
use std::collections::HashSet;

/// Score adjustments derived from patterns in the finding set itself.
#[derive(Debug, Clone, Default)]
pub struct AnomalyOutcome {
    /// Adjustment from volume/spread patterns: frequency bursts and
    /// cross-category saturation.
    pub pattern_adj: f64,
    /// Adjustment from severity escalating over time.
    pub anomaly_adj: f64,
    /// Human-readable signal descriptions, for the audit trail.
    pub signals: Vec<String>,
}

const BURST_WINDOW_DAYS: i64 = 90;
const BURST_THRESHOLD: usize = 3;
const SATURATION_CATEGORY_THRESHOLD: usize = 4;

/// Run every anomaly/pattern detector over `findings` and combine their
/// contributions.
pub fn detect(findings: &[Finding]) -> AnomalyOutcome {
    let mut outcome = AnomalyOutcome::default();

    if let Some(burst_adj) = frequency_burst(findings) {
        outcome.pattern_adj += burst_adj;
        outcome.signals.push("frequency burst: 3+ findings within 90 days".to_string());
    }

    let distinct_categories: HashSet<&str> = findings.iter().map(|f| f.category.as_str()).collect();
    if distinct_categories.len() >= SATURATION_CATEGORY_THRESHOLD {
        let overage = (distinct_categories.len() - SATURATION_CATEGORY_THRESHOLD + 1) as f64;
        outcome.pattern_adj += 5.0 * overage;
        outcome.signals.push(format!("cross-category saturation across {} categories", distinct_categories.len()));
    }

    if let Some(escalation_adj) = escalation_over_time(findings) {
        outcome.anomaly_adj += escalation_adj;
        outcome.signals.push("severity escalating over time".to_string());
    }

    outcome
}

/// Three or more findings whose dates fall within a 90-day span.
fn frequency_burst(findings: &[Finding]) -> Option<f64> {
    let mut dated: Vec<_> = findings.iter().filter_map(|f| f.finding_date).collect();
    if dated.len() < BURST_THRESHOLD {
        return None;
    }
    dated.sort();
    let found = dated.windows(BURST_THRESHOLD).any(|window| {
        let span = window[window.len() - 1] - window[0];
        span.num_days() <= BURST_WINDOW_DAYS
    });
    found.then_some(8.0)
}

fn severity_ordinal(severity: Severity) -> f64 {
    match severity {
        Severity::Low => 0.0,
        Severity::Medium => 1.0,
        Severity::High => 2.0,
        Severity::Critical => 3.0,
    }
}

/// Whether mean severity in the later half of dated findings exceeds the
/// earlier half, scaled into a score adjustment.
fn escalation_over_time(findings: &[Finding]) -> Option<f64> {
    let mut dated: Vec<&Finding> = findings.iter().filter(|f| f.finding_date.is_some()).collect();
    if dated.len() < 2 {
        return None;
    }
    dated.sort_by_key(|f| f.finding_date);

    let midpoint = (dated.len() / 2).max(1);
    let early_mean = mean_ordinal(&dated[..midpoint]);
    let late_mean = mean_ordinal(&dated[midpoint..]);

    (late_mean > early_mean).then(|| (late_mean - early_mean) * 6.0)
}

fn mean_ordinal(findings: &[&Finding]) -> f64 {
    if findings.is_empty() {
        return 0.0;
    }
    findings.iter().map(|f| severity_ordinal(f.severity)).sum::<f64>() / findings.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use invest_core::Id;

    fn finding(category: &str, severity: Severity, days_ago: i64) -> Finding {
        Finding {
            id: Id::new(),
            category: category.to_string(),
            sub_category: "sub".to_string(),
            summary: "summary".to_string(),
            detail: "detail".to_string(),
            severity,
            confidence: 0.8,
            role_relevance: 0.0,
            sources: vec!["provider".to_string()],
            corroborated: false,
            finding_date: Some(Utc::now().date_naive() - chrono::Duration::days(days_ago)),
            discovered_at: Utc::now(),
            subject_entity_id: Id::new(),
            connection_path: None,
        }
    }

    #[test]
    fn no_findings_yields_no_signals() {
        let outcome = detect(&[]);
        assert_eq!(outcome.pattern_adj, 0.0);
        assert_eq!(outcome.anomaly_adj, 0.0);
        assert!(outcome.signals.is_empty());
    }

    #[test]
    fn clustered_findings_trigger_frequency_burst() {
        let findings = vec![finding("civil", Severity::Low, 10), finding("civil", Severity::Low, 20), finding("civil", Severity::Low, 30)];
        let outcome = detect(&findings);
        assert!(outcome.pattern_adj > 0.0);
    }

    #[test]
    fn widely_spaced_findings_do_not_trigger_burst() {
        let findings = vec![finding("civil", Severity::Low, 10), finding("civil", Severity::Low, 400), finding("civil", Severity::Low, 900)];
        let outcome = detect(&findings);
        assert_eq!(outcome.pattern_adj, 0.0);
    }

    #[test]
    fn four_categories_trigger_saturation() {
        let findings = vec![finding("civil", Severity::Low, 10), finding("criminal", Severity::Low, 10), finding("regulatory", Severity::Low, 10), finding("sanctions", Severity::Low, 10)];
        let outcome = detect(&findings);
        assert!(outcome.pattern_adj > 0.0);
    }

    #[test]
    fn rising_severity_over_time_triggers_escalation() {
        let findings = vec![finding("criminal", Severity::Low, 300), finding("criminal", Severity::High, 10)];
        let outcome = detect(&findings);
        assert!(outcome.anomaly_adj > 0.0);
    }

    #[test]
    fn falling_severity_over_time_does_not_trigger_escalation() {
        let findings = vec![finding("criminal", Severity::High, 300), finding("criminal", Severity::Low, 10)];
        let outcome = detect(&findings);
        assert_eq!(outcome.anomaly_adj, 0.0);
    }
}
