//! Run command - Evaluate a pull request and publish the verdict.
//!
//! Inputs come from a snapshot file and the verdict is printed as it would
//! be published: commit status first, then the new label set.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use pullgate_core::CONFIG_FILE_NAME;
use pullgate_runner::{run_for_pull_request, PullRequestTarget, SnapshotSource, StdoutPublisher};

use super::evaluate::exit_code;
use super::{load_snapshot, OutputFormat};

#[derive(Args)]
pub struct RunArgs {
    /// Policy file
    #[arg(short, long, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    /// Pull request snapshot (JSON)
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Repository owner (also the organization for team lookups)
    #[arg(long, env = "PULLGATE_OWNER")]
    owner: String,

    /// Repository name
    #[arg(long, env = "PULLGATE_REPO")]
    repo: String,

    /// Pull request number (defaults to the snapshot's)
    #[arg(short, long)]
    number: Option<u64>,

    /// Output format for the run report (text, json)
    #[arg(long, default_value = "text")]
    format: String,
}

pub async fn execute(args: RunArgs) -> Result<u8> {
    let format = OutputFormat::parse(&args.format)?;

    let snapshot = load_snapshot(&args.snapshot)?;
    let number = args.number.unwrap_or(snapshot.pull_request.number);
    let target = PullRequestTarget::new(args.owner, args.repo, number);
    info!("Running policy for {}", target);

    let source = SnapshotSource::new(snapshot, args.config);
    let report = run_for_pull_request(&source, &StdoutPublisher, &target).await?;

    if format == OutputFormat::Json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize run report")?;
        println!("{}", json);
    }

    Ok(exit_code(report.result.state))
}
