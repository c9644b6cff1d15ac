#![allow(clippy::needless_pass_by_value)]

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;
mod wiring;

use commands::{cancel, get, list, submit, webhook};

/// Investigation orchestrator CLI: drives the investigation service trait
/// directly for local demonstration and ops use.
///
/// **Investigation lifecycle**:
///   submit, get, list, cancel
///
/// **HRIS ingestion preview**:
///   webhook
#[derive(Parser)]
#[command(name = "invest")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Investigation orchestrator CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a new investigation.
    Submit(submit::SubmitArgs),
    /// Fetch an investigation's current record.
    Get(get::GetArgs),
    /// List every investigation known for a tenant.
    List(list::ListArgs),
    /// Cooperatively cancel a non-terminal investigation.
    Cancel(cancel::CancelArgs),
    /// Parse an HRIS webhook payload and report how it would be routed.
    Webhook(webhook::WebhookArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Submit(args) => {
            let pipeline = wiring::build_demo_pipeline();
            submit::run(args, &pipeline).await
        }
        Commands::Get(args) => {
            let pipeline = wiring::build_demo_pipeline();
            get::run(args, &pipeline).await
        }
        Commands::List(args) => {
            let pipeline = wiring::build_demo_pipeline();
            list::run(args, &pipeline).await
        }
        Commands::Cancel(args) => {
            let pipeline = wiring::build_demo_pipeline();
            cancel::run(args, &pipeline).await
        }
        Commands::Webhook(args) => webhook::run(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clap_parses_known_subcommands() {
        let cli = Cli::try_parse_from(["invest", "list", "tenant-a"]).expect("parse list");
        assert!(matches!(cli.command, Commands::List(_)));

        let cli = Cli::try_parse_from(["invest", "cancel", "inv-1"]).expect("parse cancel");
        assert!(matches!(cli.command, Commands::Cancel(_)));
    }

    #[test]
    fn clap_enforces_required_args() {
        assert!(Cli::try_parse_from(["invest", "submit"]).is_err());
        assert!(Cli::try_parse_from(["invest", "get"]).is_err());
    }
}
