//! TOML-loadable wrapper around `invest_core::ComplianceRuleset` (§4.A, §6
//! configuration surface).

use invest_core::{ComplianceRule, ComplianceRuleset};
use serde::{Deserialize, Serialize};

/// The on-disk shape of the compliance rule table: a flat list under a
/// `[[rule]]` TOML array-of-tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplianceRuleTable {
    /// One entry per declared rule.
    #[serde(default, rename = "rule")]
    pub rules: Vec<ComplianceRule>,
}

impl ComplianceRuleTable {
    /// Build the queryable ruleset `invest-core` understands.
    pub fn into_ruleset(self) -> ComplianceRuleset {
        ComplianceRuleset::new(self.rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invest_core::model::{InfoType, Tier};

    #[test]
    fn parses_a_minimal_rule_table() {
        let toml_text = r#"
            [[rule]]
            locale = "EU"
            check_type = "Criminal"
            data_source_category = "criminal-records"
            permitted = false
        "#;
        let table: ComplianceRuleTable = toml::from_str(toml_text).unwrap();
        let ruleset = table.into_ruleset();
        let decision = ruleset.evaluate("EU", "standard", Tier::Standard);
        assert!(!decision.permitted_checks.contains(&InfoType::Criminal));
    }
}
