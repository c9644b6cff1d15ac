//! `invest cancel` — cooperatively cancel a non-terminal investigation.

use anyhow::Result;
use clap::Args;
use invest_orchestrator::InvestigationService;

use crate::output::print_success;
use crate::wiring::DemoPipeline;

#[derive(Args)]
pub struct CancelArgs {
    /// Investigation id returned by `invest submit`.
    pub investigation_id: String,
}

pub async fn run(args: CancelArgs, pipeline: &DemoPipeline) -> Result<()> {
    pipeline.cancel(&args.investigation_id).await?;
    print_success(&format!("cancelled {}", args.investigation_id));
    Ok(())
}
