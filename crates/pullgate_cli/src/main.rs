//! pullgate CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success (pull request approved, condition met)
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Not approved (pending, failure or error verdict; condition unmet)
//! - 4: Policy configuration error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const NOT_APPROVED: u8 = 3;
    pub const CONFIG_ERROR: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_directives = if cli.verbose {
        "pullgate=debug,warn"
    } else if cli.quiet {
        "warn"
    } else {
        "pullgate=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let result = match cli.command {
        Commands::Evaluate(args) => commands::evaluate::execute(args).await,
        Commands::Condition(args) => commands::condition::execute(args).await,
        Commands::Run(args) => commands::run::execute(args).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if let Some(runner) = e.downcast_ref::<pullgate_runner::RunnerError>() {
        if runner.is_config_error() {
            return ExitCodes::CONFIG_ERROR;
        }
    }
    if e.downcast_ref::<pullgate_core::CoreError>().is_some() {
        return ExitCodes::CONFIG_ERROR;
    }

    let msg = e.to_string().to_lowercase();
    if msg.contains("argument") || msg.contains("option") || msg.contains("format") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}
