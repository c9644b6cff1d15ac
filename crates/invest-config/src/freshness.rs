//! Per-info-type freshness/stale windows (§4.C).

use crate::error::{ConfigError, Result};
use invest_core::model::InfoType;
use serde::{Deserialize, Serialize};

/// One info-type's freshness policy. `stale_hours = None` means the row
/// never expires to EXPIRED on its own (education has no stale upper
/// bound, per §4.C).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FreshnessWindow {
    /// The info-type this row governs.
    pub info_type: InfoType,
    /// Hours after `acquired_at` during which the row is FRESH.
    pub freshness_hours: i64,
    /// Hours after `acquired_at` during which the row is STALE (as opposed
    /// to EXPIRED). `None` means unbounded.
    pub stale_hours: Option<i64>,
}

/// The full freshness table, one row per declared info-type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FreshnessWindows {
    rows: Vec<FreshnessWindow>,
}

impl FreshnessWindows {
    /// Build from an explicit row list.
    pub fn new(rows: Vec<FreshnessWindow>) -> Self {
        Self { rows }
    }

    /// The defaults from §4.C: sanctions=0h, adverse-media=24h,
    /// criminal=7d, civil=14d, financial/corporate/OSINT=30d,
    /// employment=90d, education=365d with no stale ceiling. Identity
    /// takes the same 30-day window as the other core-registry checks;
    /// §4.C does not call it out separately.
    pub fn defaults() -> Self {
        let hours = |days: i64| days * 24;
        let row = |info_type, freshness_hours: i64, stale_multiple: Option<i64>| FreshnessWindow {
            info_type,
            freshness_hours,
            stale_hours: stale_multiple.map(|m| freshness_hours * m),
        };
        Self {
            rows: vec![
                row(InfoType::Sanctions, 0, Some(4)),
                row(InfoType::AdverseMedia, 24, Some(3)),
                row(InfoType::Criminal, hours(7), Some(2)),
                row(InfoType::Civil, hours(14), Some(2)),
                row(InfoType::Financial, hours(30), Some(2)),
                row(InfoType::Licenses, hours(30), Some(2)),
                row(InfoType::Regulatory, hours(30), Some(2)),
                row(InfoType::DigitalFootprint, hours(30), Some(2)),
                row(InfoType::Identity, hours(30), Some(2)),
                row(InfoType::Employment, hours(90), Some(2)),
                row(InfoType::Education, hours(365), None),
            ],
        }
    }

    /// Look up the freshness row for `info_type`.
    pub fn window(&self, info_type: InfoType) -> Option<&FreshnessWindow> {
        self.rows.iter().find(|row| row.info_type == info_type)
    }

    /// Fail loudly if any declared info-type is missing a row.
    pub fn validate(&self) -> Result<()> {
        for &info_type in InfoType::all() {
            if self.window(info_type).is_none() {
                return Err(ConfigError::MissingCheckTypeEntry { table: "freshness", info_type });
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
        FreshnessWindows::defaults().validate().unwrap();
    }

    #[test]
    fn sanctions_has_zero_freshness_window() {
        let table = FreshnessWindows::defaults();
        assert_eq!(table.window(InfoType::Sanctions).unwrap().freshness_hours, 0);
    }

    #[test]
    fn education_has_no_stale_ceiling() {
        let table = FreshnessWindows::defaults();
        assert_eq!(table.window(InfoType::Education).unwrap().stale_hours, None);
    }
}
