//! The tier-policy matrix: what a STALE cache row means per info-type per
//! tier (§4.C).

use crate::error::{ConfigError, Result};
use invest_core::model::InfoType;
use serde::{Deserialize, Serialize};

/// What the cache-aside layer should do with a STALE row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleAction {
    /// Return the row immediately; queue an asynchronous, best-effort
    /// refresh.
    UseAndFlag,
    /// Do not return the row; fall through to a provider query.
    BlockAndRefresh,
}

/// The STALE-handling policy for one info-type, per tier. `None` means the
/// info-type is not offered at that tier at all.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TierPolicyEntry {
    /// The info-type this row governs.
    pub info_type: InfoType,
    /// Policy under the Standard tier.
    pub standard: Option<StaleAction>,
    /// Policy under the Enhanced tier.
    pub enhanced: Option<StaleAction>,
}

/// One row per declared info-type; a missing row is a configuration defect,
/// never a silent default (§9 open questions). Stored as a flat row list so
/// it serializes cleanly to TOML (which has no non-string map keys).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TierPolicyMatrix {
    rows: Vec<TierPolicyEntry>,
}

impl TierPolicyMatrix {
    /// Build from an explicit row list.
    pub fn new(rows: Vec<TierPolicyEntry>) -> Self {
        Self { rows }
    }

    /// The illustrative defaults from §4.C, one row per declared info-type.
    pub fn defaults() -> Self {
        use StaleAction::{BlockAndRefresh, UseAndFlag};
        let mut rows = vec![TierPolicyEntry {
            info_type: InfoType::Sanctions,
            standard: Some(BlockAndRefresh),
            enhanced: Some(BlockAndRefresh),
        }];
        for info_type in [InfoType::Criminal, InfoType::AdverseMedia] {
            rows.push(TierPolicyEntry { info_type, standard: Some(UseAndFlag), enhanced: Some(BlockAndRefresh) });
        }
        for info_type in [
            InfoType::Identity,
            InfoType::Civil,
            InfoType::Financial,
            InfoType::Employment,
            InfoType::Education,
            InfoType::Licenses,
            InfoType::Regulatory,
        ] {
            rows.push(TierPolicyEntry { info_type, standard: Some(UseAndFlag), enhanced: Some(UseAndFlag) });
        }
        rows.push(TierPolicyEntry { info_type: InfoType::DigitalFootprint, standard: None, enhanced: Some(UseAndFlag) });
        Self { rows }
    }

    /// Look up the policy row for `info_type`.
    pub fn entry(&self, info_type: InfoType) -> Option<&TierPolicyEntry> {
        self.rows.iter().find(|row| row.info_type == info_type)
    }

    /// Fail loudly if any declared info-type is missing a row.
    pub fn validate(&self) -> Result<()> {
        for &info_type in InfoType::all() {
            if self.entry(info_type).is_none() {
                return Err(ConfigError::MissingCheckTypeEntry { table: "tier_policy", info_type });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_declared_info_type() {
        TierPolicyMatrix::defaults().validate().unwrap();
    }

    #[test]
    fn sanctions_always_blocks_on_stale() {
        let matrix = TierPolicyMatrix::defaults();
        let entry = matrix.entry(InfoType::Sanctions).unwrap();
        assert_eq!(entry.standard, Some(StaleAction::BlockAndRefresh));
        assert_eq!(entry.enhanced, Some(StaleAction::BlockAndRefresh));
    }

    #[test]
    fn digital_footprint_is_not_available_at_standard() {
        let matrix = TierPolicyMatrix::defaults();
        let entry = matrix.entry(InfoType::DigitalFootprint).unwrap();
        assert_eq!(entry.standard, None);
    }

    #[test]
    fn missing_row_is_a_loud_error() {
        let matrix = TierPolicyMatrix::new(vec![TierPolicyEntry {
            info_type: InfoType::Identity,
            standard: Some(StaleAction::UseAndFlag),
            enhanced: Some(StaleAction::UseAndFlag),
        }]);
        assert!(matrix.validate().is_err());
    }
}
