//! Severity assignment: a rule-based base severity plus optional role and
//! recency adjustments (§4.G "Severity").

use chrono::NaiveDate;
use invest_config::RoleSeverityAdjustments;
use invest_core::model::Severity;

fn ordinal(severity: Severity) -> u8 {
    match severity {
        Severity::Low => 0,
        Severity::Medium => 1,
        Severity::High => 2,
        Severity::Critical => 3,
    }
}

fn from_ordinal(value: u8) -> Severity {
    match value.min(3) {
        0 => Severity::Low,
        1 => Severity::Medium,
        2 => Severity::High,
        _ => Severity::Critical,
    }
}

/// A finding dated within this many days of now earns the recency bump.
const RECENT_WINDOW_DAYS: i64 = 180;

/// Adjust `base` for role relevance and recency (§4.G). `role` is the
/// subject's role identifier (e.g. `"finance"`, `"childcare"`), if known;
/// `category` is the finding's assigned category. Each adjustment raises
/// severity by one band, capped at `Critical`.
pub fn adjust_severity(base: Severity, category: &str, role: Option<&str>, finding_date: Option<NaiveDate>, adjustments: &RoleSeverityAdjustments) -> Severity {
    let mut boost = 0u8;
    if let Some(role) = role {
        boost = boost.saturating_add(adjustments.boost_for(role, category));
    }
    if let Some(date) = finding_date {
        let days = (chrono::Utc::now().date_naive() - date).num_days();
        if (0..=RECENT_WINDOW_DAYS).contains(&days) {
            boost = boost.saturating_add(1);
        }
    }
    from_ordinal(ordinal(base).saturating_add(boost))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_boost_raises_severity_by_one_step() {
        let adjustments = RoleSeverityAdjustments::defaults();
        let adjusted = adjust_severity(Severity::Medium, "criminal", Some("finance"), None, &adjustments);
        assert_eq!(adjusted, Severity::High);
    }

    #[test]
    fn no_role_or_recency_leaves_severity_unchanged() {
        let adjustments = RoleSeverityAdjustments::defaults();
        let adjusted = adjust_severity(Severity::Medium, "adverse_media", None, None, &adjustments);
        assert_eq!(adjusted, Severity::Medium);
    }

    #[test]
    fn recent_finding_is_boosted() {
        let adjustments = RoleSeverityAdjustments::defaults();
        let recent = chrono::Utc::now().date_naive();
        let adjusted = adjust_severity(Severity::Low, "civil", None, Some(recent), &adjustments);
        assert_eq!(adjusted, Severity::Medium);
    }

    #[test]
    fn old_finding_is_not_boosted() {
        let adjustments = RoleSeverityAdjustments::defaults();
        let old = chrono::Utc::now().date_naive() - chrono::Duration::days(900);
        let adjusted = adjust_severity(Severity::Low, "civil", None, Some(old), &adjustments);
        assert_eq!(adjusted, Severity::Low);
    }

    #[test]
    fn critical_severity_cannot_be_boosted_further() {
        let adjustments = RoleSeverityAdjustments::defaults();
        let adjusted = adjust_severity(Severity::Critical, "criminal", Some("childcare"), None, &adjustments);
        assert_eq!(adjusted, Severity::Critical);
    }
}
