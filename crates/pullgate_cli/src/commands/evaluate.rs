//! Evaluate command - Evaluate a pull request snapshot against a policy.
//!
//! Nothing is published; the verdict is printed and reflected in the exit code.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use pullgate_core::{reduce, EvaluationResult, GroupStatus, StatusValue, TeamIndex, CONFIG_FILE_NAME};

use super::{load_policy, load_snapshot, OutputFormat};
use crate::ExitCodes;

#[derive(Args)]
pub struct EvaluateArgs {
    /// Policy file
    #[arg(short, long, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    /// Pull request snapshot (JSON)
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: String,
}

pub async fn execute(args: EvaluateArgs) -> Result<u8> {
    let format = OutputFormat::parse(&args.format)?;
    info!("Evaluating {:?} against {:?}", args.snapshot, args.config);

    let config = load_policy(&args.config)?;
    let snapshot = load_snapshot(&args.snapshot)?;

    for condition in config.unrecognized_conditions() {
        warn!("Condition matches no known form: {}", condition);
    }

    let teams = TeamIndex::new(&snapshot.teams);
    let result = reduce(&config, &teams, &snapshot.pull_request, &snapshot.reviews);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
            println!("{}", json);
        }
        OutputFormat::Text => print_result(&result),
    }

    Ok(exit_code(result.state))
}

pub fn exit_code(state: StatusValue) -> u8 {
    match state {
        StatusValue::Success => ExitCodes::SUCCESS,
        StatusValue::Pending | StatusValue::Failure | StatusValue::Error => ExitCodes::NOT_APPROVED,
    }
}

fn print_result(result: &EvaluationResult) {
    let icon = match result.state {
        StatusValue::Success => "✅",
        StatusValue::Pending => "⏳",
        StatusValue::Failure | StatusValue::Error => "❌",
    };
    println!("{} {}: {}", icon, result.state, result.description);

    if !result.groups.is_empty() {
        println!();
        println!("Groups:");
        for group in &result.groups {
            let status = match group.status {
                GroupStatus::Approved => "✅",
                GroupStatus::Pending => "⏳",
                GroupStatus::Rejected => "❌",
            };
            println!("  {} {}", status, group.summary());
            for review in &group.rejected_reviews {
                println!("      - rejected by {}", review.author_login);
            }
        }
    }

    if !result.labels_to_add.is_empty() || !result.labels_to_remove.is_empty() {
        println!();
        println!("Labels:");
        for label in &result.labels_to_add {
            println!("  + {}", label);
        }
        for label in &result.labels_to_remove {
            println!("  - {}", label);
        }
    }
}
