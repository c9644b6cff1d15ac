//! The cost ledger itself: per-`(tenant, day)` counters, budget
//! enforcement, and cache-savings tracking (§4.D).

use crate::error::{CostError, Result};
use chrono::NaiveDate;
use dashmap::DashMap;
use invest_core::model::InfoType;
use parking_lot::Mutex;
use prometheus::{register_counter_vec, CounterVec};
use std::collections::HashMap;
use std::sync::LazyLock;

static COST_CHARGED: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter_vec!("invest_cost_charged_usd_total", "Total USD charged to tenants", &["tenant"]).expect("metric registration")
});
static CACHE_SAVINGS: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter_vec!("invest_cache_savings_usd_total", "Total USD saved by cache hits", &["tenant"]).expect("metric registration")
});

/// Optional soft-warning and hard-ceiling budgets for one tenant (§4.D).
#[derive(Debug, Clone, Copy, Default)]
pub struct TenantBudget {
    /// Daily soft warning threshold; crossing it logs, never blocks.
    pub daily_soft: Option<f64>,
    /// Daily hard ceiling; crossing it is `BudgetExceeded`.
    pub daily_hard: Option<f64>,
    /// Monthly soft warning threshold.
    pub monthly_soft: Option<f64>,
    /// Monthly hard ceiling.
    pub monthly_hard: Option<f64>,
}

/// Spend counters for one tenant on one day.
#[derive(Debug, Clone, Default)]
pub struct DayCounters {
    /// Total cost charged this day.
    pub total: f64,
    /// Cost broken down by provider id.
    pub by_provider: HashMap<String, f64>,
    /// Cost broken down by check type.
    pub by_check_type: HashMap<InfoType, f64>,
    /// What the tenant would have paid had every cache hit this day been a
    /// miss.
    pub cache_savings: f64,
}

struct TenantLedger {
    budget: TenantBudget,
    days: HashMap<NaiveDate, DayCounters>,
}

impl TenantLedger {
    fn month_total(&self, month: (i32, u32)) -> f64 {
        self.days
            .iter()
            .filter(|(date, _)| (date.format("%Y").to_string().parse().unwrap_or(0), date.format("%m").to_string().parse().unwrap_or(0)) == month)
            .map(|(_, counters)| counters.total)
            .sum()
    }
}

/// Per-tenant cost accounting service (§4.D).
///
/// The budget check-and-increment for one charge is a single critical
/// section (§5 "Cost counters"): each tenant's ledger lives behind its own
/// `parking_lot::Mutex`, so concurrent charges for the same tenant serialize
/// on that lock rather than racing a check against an increment.
pub struct CostService {
    tenants: DashMap<String, Mutex<TenantLedger>>,
}

impl CostService {
    /// An empty service with no tenants registered yet.
    pub fn new() -> Self {
        Self { tenants: DashMap::new() }
    }

    /// Set (or replace) the budget for a tenant. Tenants with no budget set
    /// default to unlimited (§4.D "optional").
    pub fn set_budget(&self, tenant_id: impl Into<String>, budget: TenantBudget) {
        let tenant_id = tenant_id.into();
        self.tenants
            .entry(tenant_id)
            .and_modify(|ledger| ledger.lock().budget = budget)
            .or_insert_with(|| Mutex::new(TenantLedger { budget, days: HashMap::new() }));
    }

    /// Charge `cost` against `tenant_id` for `day`, broken down by
    /// `provider_id` and `check_type`. Enforces both the daily and monthly
    /// hard ceilings, when configured, as one atomic check-and-increment.
    #[tracing::instrument(skip(self), fields(tenant_id, cost))]
    pub fn charge(&self, tenant_id: &str, day: NaiveDate, provider_id: &str, check_type: InfoType, cost: f64) -> Result<()> {
        let entry = self.tenants.entry(tenant_id.to_string()).or_insert_with(|| Mutex::new(TenantLedger { budget: TenantBudget::default(), days: HashMap::new() }));
        let mut ledger = entry.lock();

        let today_total = ledger.days.get(&day).map(|c| c.total).unwrap_or(0.0);
        if let Some(limit) = ledger.budget.daily_hard {
            if today_total + cost > limit {
                return Err(CostError::BudgetExceeded { tenant_id: tenant_id.to_string(), day: day.to_string(), accumulated: today_total, requested: cost, limit });
            }
        }
        let month = (day.format("%Y").to_string().parse().unwrap_or(0), day.format("%m").to_string().parse().unwrap_or(0));
        if let Some(limit) = ledger.budget.monthly_hard {
            let month_total = ledger.month_total(month);
            if month_total + cost > limit {
                return Err(CostError::BudgetExceeded { tenant_id: tenant_id.to_string(), day: day.to_string(), accumulated: month_total, requested: cost, limit });
            }
        }

        let counters = ledger.days.entry(day).or_default();
        counters.total += cost;
        *counters.by_provider.entry(provider_id.to_string()).or_insert(0.0) += cost;
        *counters.by_check_type.entry(check_type).or_insert(0.0) += cost;
        let new_total = counters.total;

        if let Some(soft) = ledger.budget.daily_soft {
            if new_total > soft && today_total <= soft {
                tracing::warn!(tenant_id, day = %day, new_total, soft, "tenant crossed daily soft budget threshold");
            }
        }

        COST_CHARGED.with_label_values(&[tenant_id]).inc_by(cost);
        Ok(())
    }

    /// Record what `would_have_cost` would have been paid had this cache
    /// hit instead been a provider miss (§4.D "cache-savings reporting").
    pub fn record_cache_saving(&self, tenant_id: &str, day: NaiveDate, would_have_cost: f64) {
        let entry = self.tenants.entry(tenant_id.to_string()).or_insert_with(|| Mutex::new(TenantLedger { budget: TenantBudget::default(), days: HashMap::new() }));
        let mut ledger = entry.lock();
        ledger.days.entry(day).or_default().cache_savings += would_have_cost;
        CACHE_SAVINGS.with_label_values(&[tenant_id]).inc_by(would_have_cost);
    }

    /// A snapshot of one tenant's counters for one day, if any spend has
    /// been recorded.
    pub fn day_summary(&self, tenant_id: &str, day: NaiveDate) -> Option<DayCounters> {
        self.tenants.get(tenant_id).and_then(|ledger| ledger.lock().days.get(&day).cloned())
    }
}

impl Default for CostService {
    fn default() -> Self {
        Self::new()
    }
}
