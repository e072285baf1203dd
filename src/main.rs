//! SQL Server Backup/Restore/Validation Tool
//!
//! Provides CLI interface for database backup, restore and backup validation

// mssqlbackup/src/main.rs
mod backup;
mod cli;
mod config;
mod errors;
mod gateway;
mod logging;
mod orchestrator;
mod restore;
mod utils;
mod validate;

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::error;

use cli::{Action, Cli, Outcome};
use config::AppConfig;
use gateway::MssqlGateway;
use orchestrator::BackupOrchestrator;

/// Main entry point for the backup/restore tool
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run_app(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_app(cli: Cli) -> Result<ExitCode> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    logging::init_logging(&config.log).context("Failed to initialize logging")?;

    let choice = match cli.action {
        Some(action) => action,
        None => cli::prompt_choice()?,
    };
    let action = Action::parse(&choice).inspect_err(|e| error!("❌ {}", e))?;

    let orchestrator = BackupOrchestrator::new(&config, MssqlGateway::new(config.clone()));
    let outcome = cli::dispatch(&orchestrator, action, cli.file.as_deref())
        .await
        .with_context(|| format!("{} process failed", action))?;

    outcome.print(cli.json)?;
    if !cli.json && outcome.exit_status() == 0 && !matches!(outcome, Outcome::Skipped) {
        println!("✅ Operation completed successfully.");
    }
    Ok(outcome.exit_code())
}
