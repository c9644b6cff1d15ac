//! `invest submit` — submit a new investigation and print its id.

use anyhow::Result;
use chrono::{Duration, Utc};
use clap::{Args, ValueEnum};
use invest_core::model::{DataOriginTag, Degree, Tier};
use invest_core::CacheScope;
use invest_orchestrator::{InvestigationService, SubmissionRequest};
use invest_resolver::SubjectInput;

use crate::output::{print_record, OutputFormat};
use crate::wiring::DemoPipeline;

/// Service tier to screen at.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TierArg {
    /// Core sources only.
    Standard,
    /// Core + premium sources.
    Enhanced,
}

impl From<TierArg> for Tier {
    fn from(value: TierArg) -> Self {
        match value {
            TierArg::Standard => Tier::Standard,
            TierArg::Enhanced => Tier::Enhanced,
        }
    }
}

/// Network expansion degree.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DegreeArg {
    /// Subject only.
    D1,
    /// Subject plus direct connections.
    D2,
    /// Subject plus 2-hop network (Enhanced tier only).
    D3,
}

impl From<DegreeArg> for Degree {
    fn from(value: DegreeArg) -> Self {
        match value {
            DegreeArg::D1 => Degree::D1,
            DegreeArg::D2 => Degree::D2,
            DegreeArg::D3 => Degree::D3,
        }
    }
}

#[derive(Args)]
pub struct SubmitArgs {
    /// Tenant this investigation belongs to.
    #[arg(long)]
    pub tenant: String,

    /// Authenticated actor submitting the request.
    #[arg(long, default_value = "invest-cli")]
    pub actor: String,

    /// Locale governing compliance rules.
    #[arg(long, default_value = "US")]
    pub locale: String,

    /// Role category the subject is being screened for.
    #[arg(long)]
    pub role: String,

    /// Subject's first name.
    #[arg(long)]
    pub first_name: String,

    /// Subject's last name.
    #[arg(long)]
    pub last_name: String,

    /// Opaque consent token reference.
    #[arg(long, default_value = "cli-consent")]
    pub consent_token: String,

    /// Comma-separated consent scopes (e.g. "criminal,employment").
    #[arg(long, default_value = "criminal,employment,identity")]
    pub consent_scope: String,

    /// How many days from now consent remains valid.
    #[arg(long, default_value_t = 365)]
    pub consent_days: i64,

    /// Service tier.
    #[arg(long, value_enum, default_value_t = TierArg::Standard)]
    pub tier: TierArg,

    /// Network expansion degree.
    #[arg(long, value_enum, default_value_t = DegreeArg::D1)]
    pub degree: DegreeArg,

    /// Optional hard budget ceiling in USD.
    #[arg(long)]
    pub budget_limit: Option<f64>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

pub async fn run(args: SubmitArgs, pipeline: &DemoPipeline) -> Result<()> {
    let subject = SubjectInput {
        identifiers: Vec::new(),
        name: format!("{} {}", args.first_name, args.last_name),
        first_name: args.first_name,
        last_name: args.last_name,
        date_of_birth: None,
        address: None,
        tenant_id: args.tenant.clone(),
        data_origin: DataOriginTag::CustomerProvided,
    };

    let request = SubmissionRequest {
        tenant_id: args.tenant,
        actor: args.actor,
        locale: args.locale,
        role_category: args.role,
        subject,
        consent_token: args.consent_token,
        consent_scope: args.consent_scope.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect(),
        consent_expiry: Utc::now() + Duration::days(args.consent_days),
        tier: args.tier.into(),
        degree: args.degree.into(),
        budget_limit: args.budget_limit,
        cache_scope: CacheScope::Shared,
    };

    let investigation_id = pipeline.submit(request).await?;
    print_record(args.format, &investigation_id, &[("investigation_id", investigation_id.clone())]);
    Ok(())
}
