//! `invest list` — list every investigation known for a tenant.

use anyhow::Result;
use clap::Args;
use invest_orchestrator::InvestigationService;
use serde_json::json;

use crate::output::{print_list, OutputFormat};
use crate::wiring::DemoPipeline;

#[derive(Args)]
pub struct ListArgs {
    /// Tenant to list investigations for.
    pub tenant: String,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

pub async fn run(args: ListArgs, pipeline: &DemoPipeline) -> Result<()> {
    let records = pipeline.list(&args.tenant).await?;

    let values: Vec<serde_json::Value> = records
        .iter()
        .map(|record| {
            json!({
                "investigation_id": record.investigation_id,
                "tenant_id": record.tenant_id,
                "status": record.status.to_string(),
                "risk_score": record.report.as_ref().map(|r| r.risk_assessment.final_score),
            })
        })
        .collect();

    print_list(args.format, &values, &["investigation_id", "status", "risk_score"], |value| {
        vec![
            value["investigation_id"].as_str().unwrap_or_default().to_string(),
            value["status"].as_str().unwrap_or_default().to_string(),
            value["risk_score"].as_f64().map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
        ]
    });
    Ok(())
}
