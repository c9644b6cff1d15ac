//! The compliance ruleset: maps `(locale, role, tier, check-type)` to
//! permitted/blocked plus lookback and restrictions (§4.A).

use crate::model::{InfoType, Tier};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A single compliance rule as loaded from configuration data. Jurisdictional
/// rule *content* is data, not code (§1 Non-goals) — this type is just the
/// shape a rule takes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceRule {
    /// Locale this rule applies to, e.g. `"US-CA"`, `"US"`, or `"default"`.
    pub locale: String,
    /// The check type this rule governs.
    pub check_type: InfoType,
    /// Role categories this rule is restricted to; empty means "all roles".
    #[serde(default)]
    pub role_categories: Vec<String>,
    /// Tiers this rule applies to; empty means "all tiers".
    #[serde(default)]
    pub tiers: Vec<Tier>,
    /// The data-source category this rule governs (e.g. "criminal-records").
    pub data_source_category: String,
    /// Whether the check is permitted under this rule.
    pub permitted: bool,
    /// Freeform conditions attached to this rule (informational; enforced
    /// by callers that understand the condition).
    #[serde(default)]
    pub conditions: Vec<String>,
    /// How many years back data may be considered, if restricted.
    pub lookback_years: Option<u32>,
    /// Disclosures that must accompany a report using this rule.
    #[serde(default)]
    pub required_disclosures: Vec<String>,
    /// Restrictions on what may be reported even if the check is permitted.
    #[serde(default)]
    pub data_restrictions: Vec<String>,
    /// Whether this rule requires explicit (not blanket) consent.
    #[serde(default)]
    pub requires_explicit_consent: bool,
    /// Finding categories excluded even when the check itself is permitted.
    #[serde(default)]
    pub excluded_categories: Vec<String>,
}

/// The result of evaluating a ruleset for one `(locale, role, tier, consent
/// scope)` combination (§4.A).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplianceDecision {
    /// Check types this context may perform.
    pub permitted_checks: HashSet<InfoType>,
    /// Provider ids this context may reach (populated by the caller by
    /// intersecting provider categories with `permitted_checks`; left empty
    /// here since provider identity isn't part of the rule shape).
    pub permitted_sources: HashSet<String>,
    /// Effective lookback per check type: the minimum across all matching
    /// rules that specified one.
    pub lookback_years: HashMap<InfoType, u32>,
    /// Union of all required disclosures across matching rules.
    pub required_disclosures: HashSet<String>,
    /// Union of all data restrictions across matching rules.
    pub data_restrictions: HashSet<String>,
    /// Union of excluded finding categories across matching rules.
    pub excluded_categories: HashSet<String>,
}

/// A loaded, queryable set of compliance rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplianceRuleset {
    rules: Vec<ComplianceRule>,
}

impl ComplianceRuleset {
    /// Build a ruleset from a flat rule list (as loaded from config).
    pub fn new(rules: Vec<ComplianceRule>) -> Self {
        Self { rules }
    }

    /// The locale fallback chain: `"US-CA"` → `["US-CA", "US", "default"]`.
    pub fn locale_chain(locale: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut current = locale.to_string();
        loop {
            chain.push(current.clone());
            match current.rfind('-') {
                Some(idx) => current.truncate(idx),
                None => break,
            }
        }
        if locale != "default" {
            chain.push("default".to_string());
        }
        chain
    }

    /// Evaluate this ruleset for a `(locale, role, tier)` combination across
    /// every declared check type. Locale lookup falls back through the
    /// parent chain; within a chain position, the first matching rule per
    /// check type wins (config is expected to avoid ambiguous overlaps).
    pub fn evaluate(&self, locale: &str, role_category: &str, tier: Tier) -> ComplianceDecision {
        let chain = Self::locale_chain(locale);
        let mut decision = ComplianceDecision::default();

        for &check_type in InfoType::all() {
            let mut matched_any = false;
            let mut effective_lookback: Option<u32> = None;

            for locale_candidate in &chain {
                let matching: Vec<&ComplianceRule> = self
                    .rules
                    .iter()
                    .filter(|r| {
                        &r.locale == locale_candidate
                            && r.check_type == check_type
                            && (r.role_categories.is_empty()
                                || r.role_categories.iter().any(|c| c == role_category))
                            && (r.tiers.is_empty() || r.tiers.contains(&tier))
                    })
                    .collect();

                if matching.is_empty() {
                    continue;
                }
                matched_any = true;

                let permitted = matching.iter().all(|r| r.permitted);
                if permitted {
                    decision.permitted_checks.insert(check_type);
                }

                for rule in &matching {
                    if let Some(years) = rule.lookback_years {
                        effective_lookback = Some(match effective_lookback {
                            Some(existing) => existing.min(years),
                            None => years,
                        });
                    }
                    decision
                        .required_disclosures
                        .extend(rule.required_disclosures.iter().cloned());
                    decision
                        .data_restrictions
                        .extend(rule.data_restrictions.iter().cloned());
                    decision
                        .excluded_categories
                        .extend(rule.excluded_categories.iter().cloned());
                }

                // Most-specific locale in the chain wins; stop descending.
                break;
            }

            if !matched_any {
                // No rule mentions this check for this locale/role/tier at
                // all: default-permit. Jurisdictional data is expected to
                // be exhaustive for anything it wants to forbid.
                decision.permitted_checks.insert(check_type);
            }

            if let Some(years) = effective_lookback {
                decision.lookback_years.insert(check_type, years);
            }
        }

        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(locale: &str, check_type: InfoType, permitted: bool) -> ComplianceRule {
        ComplianceRule {
            locale: locale.to_string(),
            check_type,
            role_categories: vec![],
            tiers: vec![],
            data_source_category: "records".to_string(),
            permitted,
            conditions: vec![],
            lookback_years: None,
            required_disclosures: vec![],
            data_restrictions: vec![],
            requires_explicit_consent: false,
            excluded_categories: vec![],
        }
    }

    #[test]
    fn locale_chain_falls_back_through_parents() {
        assert_eq!(
            ComplianceRuleset::locale_chain("US-CA"),
            vec!["US-CA", "US", "default"]
        );
        assert_eq!(ComplianceRuleset::locale_chain("default"), vec!["default"]);
    }

    #[test]
    fn eu_criminal_checks_can_be_forbidden_by_rule() {
        let ruleset = ComplianceRuleset::new(vec![rule("EU", InfoType::Criminal, false)]);
        let decision = ruleset.evaluate("EU", "standard", Tier::Standard);
        assert!(!decision.permitted_checks.contains(&InfoType::Criminal));
        assert!(decision.permitted_checks.contains(&InfoType::Identity));
    }

    #[test]
    fn compliance_idempotence_law() {
        let ruleset = ComplianceRuleset::new(vec![rule("US-CA", InfoType::Criminal, true)]);
        let a = ruleset.evaluate("US-CA", "standard", Tier::Standard);
        let b = ruleset.evaluate("US-CA", "standard", Tier::Standard);
        assert_eq!(a, b);
    }

    #[test]
    fn effective_lookback_is_the_minimum_of_matching_rules() {
        let mut r1 = rule("US", InfoType::Criminal, true);
        r1.lookback_years = Some(7);
        let mut r2 = rule("US", InfoType::Criminal, true);
        r2.role_categories = vec!["driver".to_string()];
        r2.lookback_years = Some(3);
        // Only r1 matches (role_categories empty = all roles) since a
        // non-"driver" role wouldn't match r2; use same role to combine.
        r2.role_categories = vec![];
        let ruleset = ComplianceRuleset::new(vec![r1, r2]);
        let decision = ruleset.evaluate("US", "standard", Tier::Standard);
        assert_eq!(decision.lookback_years.get(&InfoType::Criminal), Some(&3));
    }
}
