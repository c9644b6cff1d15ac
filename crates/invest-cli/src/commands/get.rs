//! `invest get` — fetch one investigation's current record.

use anyhow::Result;
use clap::Args;
use invest_orchestrator::InvestigationService;
use serde_json::json;

use crate::output::{print_record, OutputFormat};
use crate::wiring::DemoPipeline;

#[derive(Args)]
pub struct GetArgs {
    /// Investigation id returned by `invest submit`.
    pub investigation_id: String,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

pub async fn run(args: GetArgs, pipeline: &DemoPipeline) -> Result<()> {
    let record = pipeline.get(&args.investigation_id).await?;

    let risk_score = record.report.as_ref().map(|r| r.risk_assessment.final_score);
    let risk_level = record.report.as_ref().map(|r| format!("{:?}", r.risk_assessment.level));
    let profile_version = record.report.as_ref().map(|r| r.profile_version);

    let value = json!({
        "investigation_id": record.investigation_id,
        "tenant_id": record.tenant_id,
        "status": record.status.to_string(),
        "risk_score": risk_score,
        "risk_level": risk_level,
        "profile_version": profile_version,
    });

    let rows = vec![
        ("investigation_id", record.investigation_id.clone()),
        ("tenant_id", record.tenant_id.clone()),
        ("status", record.status.to_string()),
        ("risk_score", risk_score.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string())),
        ("risk_level", risk_level.unwrap_or_else(|| "-".to_string())),
        ("profile_version", profile_version.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())),
    ];

    print_record(args.format, &value, &rows);
    Ok(())
}
