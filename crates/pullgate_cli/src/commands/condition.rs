//! Condition command - Evaluate one condition against a snapshot.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::warn;

use pullgate_core::Condition;

use super::load_snapshot;
use crate::ExitCodes;

#[derive(Args)]
pub struct ConditionArgs {
    /// Condition, e.g. "'*.md' in files"
    condition: String,

    /// Pull request snapshot (JSON)
    #[arg(short, long)]
    snapshot: PathBuf,
}

pub async fn execute(args: ConditionArgs) -> Result<u8> {
    let snapshot = load_snapshot(&args.snapshot)?;
    let condition = Condition::parse(args.condition);

    if !condition.is_recognized() {
        warn!("Condition matches no known form: {}", condition);
    }

    if condition.evaluate(&snapshot.pull_request) {
        println!("✅ met: {}", condition);
        Ok(ExitCodes::SUCCESS)
    } else {
        println!("❌ not met: {}", condition);
        Ok(ExitCodes::NOT_APPROVED)
    }
}
