//! `invest webhook` — parse an HRIS webhook payload from a file and report
//! how the orchestrator would route it. Ingestion only: this command does
//! not submit an investigation, since the webhook event alone doesn't
//! carry everything `invest submit` needs (subject name, consent).

use anyhow::{Context, Result};
use clap::Args;
use invest_orchestrator::HrisWebhookEvent;

use crate::output::print_info;

#[derive(Args)]
pub struct WebhookArgs {
    /// Path to a JSON file containing one `HrisWebhookEvent` payload.
    pub path: String,
}

pub async fn run(args: WebhookArgs) -> Result<()> {
    let raw = std::fs::read_to_string(&args.path).with_context(|| format!("reading {}", args.path))?;
    let event: HrisWebhookEvent = serde_json::from_str(&raw).with_context(|| format!("parsing {} as an HRIS webhook event", args.path))?;

    print_info(&format!("parsed event: {event:?}"));
    if event.starts_new_investigation() {
        print_info("this event starts a new investigation; submit one with `invest submit`");
    } else {
        print_info("this event updates an existing investigation; no new submission required");
    }
    Ok(())
}
