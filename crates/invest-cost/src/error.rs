use thiserror::Error;

/// Errors raised by the cost service.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CostError {
    /// Charging this amount would exceed the tenant's hard budget ceiling
    /// (§4.D, §8 invariant 3).
    #[error("budget exceeded for tenant {tenant_id} on {day}: {accumulated} + {requested} > {limit}")]
    BudgetExceeded {
        /// The tenant whose budget would be exceeded.
        tenant_id: String,
        /// The day the ceiling applies to, `YYYY-MM-DD`.
        day: String,
        /// Already-accumulated spend for that day.
        accumulated: f64,
        /// The amount this call would add.
        requested: f64,
        /// The configured ceiling.
        limit: f64,
    },
}

/// Convenience alias used across `invest-cost`.
pub type Result<T> = std::result::Result<T, CostError>;
