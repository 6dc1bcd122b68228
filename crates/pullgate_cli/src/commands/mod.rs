//! CLI command definitions.
//!
//! Each subcommand maps to one way of driving the approval engine.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use pullgate_core::PolicyConfig;
use pullgate_runner::Snapshot;

pub mod condition;
pub mod evaluate;
pub mod run;

/// pullgate - reviewer-approval policies for pull requests
#[derive(Parser)]
#[command(name = "pullgate")]
#[command(version, about = "pullgate - reviewer-approval policies for pull requests")]
#[command(long_about = r#"
pullgate decides whether a pull request satisfies the reviewer-approval
rules of a .pullapprove.yml policy and reports a commit status.

COMMANDS:
  evaluate   → Evaluate a pull request snapshot against a policy
  condition  → Evaluate a single condition against a snapshot
  run        → Evaluate and publish status and labels

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Not approved
  4 - Policy configuration error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a pull request snapshot against a policy
    Evaluate(evaluate::EvaluateArgs),

    /// Evaluate a single condition against a snapshot
    Condition(condition::ConditionArgs),

    /// Evaluate a pull request and publish its status and labels
    Run(run::RunArgs),
}

/// Output format shared by the commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(format: &str) -> Result<Self> {
        match format {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => anyhow::bail!("Unknown output format: {} (expected text or json)", other),
        }
    }
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    Snapshot::from_file(path).with_context(|| format!("Failed to load snapshot {:?}", path))
}

pub fn load_policy(path: &Path) -> Result<PolicyConfig> {
    Ok(PolicyConfig::from_file(path)?)
}
