//! The inbound control surface: `submit`/`get`/`cancel`/`list`, exposed
//! as a plain async trait deliberately not wrapped in any transport (§6).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use invest_core::model::{Degree, Tier};
use invest_core::{CacheScope, Id};
use invest_resolver::SubjectInput;
use invest_risk::RiskAssessment;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::status::InvestigationStatus;

/// Everything needed to submit one investigation (§4.A, §4.E intake).
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    /// The tenant this investigation belongs to.
    pub tenant_id: String,
    /// The authenticated actor submitting the request.
    pub actor: String,
    /// Locale governing compliance rules.
    pub locale: String,
    /// Role category the subject is being screened for (drives
    /// compliance evaluation and risk severity adjustments).
    pub role_category: String,
    /// The subject as presented at intake, before entity resolution.
    pub subject: SubjectInput,
    /// Opaque consent token reference.
    pub consent_token: String,
    /// Scopes the subject consented to.
    pub consent_scope: Vec<String>,
    /// When consent expires.
    pub consent_expiry: DateTime<Utc>,
    /// Service tier.
    pub tier: Tier,
    /// Network expansion degree.
    pub degree: Degree,
    /// Optional hard budget ceiling in USD.
    pub budget_limit: Option<f64>,
    /// Cache scope for this request.
    pub cache_scope: CacheScope,
}

/// The committed outcome of a completed investigation: the versioned
/// profile it produced and the risk assessment behind that version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestigationReport {
    /// This investigation's id.
    pub investigation_id: String,
    /// The resolved subject entity.
    pub subject_entity_id: Id,
    /// The committed profile's id.
    pub profile_id: Id,
    /// The committed profile's version.
    pub profile_version: u32,
    /// The full risk assessment behind this version.
    pub risk_assessment: RiskAssessment,
}

/// One investigation's current status plus its report, once available.
#[derive(Debug, Clone)]
pub struct InvestigationRecord {
    /// This investigation's id.
    pub investigation_id: String,
    /// The tenant this investigation belongs to.
    pub tenant_id: String,
    /// Current lifecycle status.
    pub status: InvestigationStatus,
    /// The completed report, once `status` is `Complete`.
    pub report: Option<InvestigationReport>,
}

/// The inbound control surface every deployment adapter (CLI, a future
/// HTTP layer) drives. Transport-agnostic by design (§6).
#[async_trait]
pub trait InvestigationService: Send + Sync {
    /// Submit a new investigation, returning its id immediately; work
    /// proceeds asynchronously.
    async fn submit(&self, request: SubmissionRequest) -> Result<String>;

    /// Fetch an investigation's current record.
    async fn get(&self, investigation_id: &str) -> Result<InvestigationRecord>;

    /// Cooperatively cancel a non-terminal investigation.
    async fn cancel(&self, investigation_id: &str) -> Result<()>;

    /// List every investigation known for a tenant.
    async fn list(&self, tenant_id: &str) -> Result<Vec<InvestigationRecord>>;
}
