// mssqlbackup/src/cli/mod.rs
use anyhow::{Context, Result as AnyResult};
use clap::Parser;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, warn};

use crate::errors::{AppError, Result};
use crate::gateway::DatabaseGateway;
use crate::orchestrator::BackupOrchestrator;
use crate::validate::ValidationReport;

/// Exit status when validation ran and found a difference.
const EXIT_VALIDATION_MISMATCH: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "mssqlbackup",
    version,
    about = "SQL Server backup, restore and backup validation",
    long_about = "Runs a server-side full backup of ORIGINAL_DB into BACKUP_PATH, restores a \
                  backup file into BACKUP_DB, and validates BACKUP_DB against ORIGINAL_DB by \
                  comparing table and row counts. Connection settings come from the \
                  environment or a .env file."
)]
pub struct Cli {
    /// Operation: backup, restore, validate, full or check. Prompts when omitted.
    pub action: Option<String>,

    /// Backup file to restore from (used by `restore`)
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Print the validation report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Backup,
    Restore,
    Validate,
    Full,
    Check,
}

impl Action {
    /// Accepts the action names and the numeric menu choices.
    pub fn parse(choice: &str) -> Result<Self> {
        match choice.trim().to_ascii_lowercase().as_str() {
            "1" | "backup" => Ok(Action::Backup),
            "2" | "restore" => Ok(Action::Restore),
            "3" | "validate" => Ok(Action::Validate),
            "4" | "full" => Ok(Action::Full),
            "5" | "check" => Ok(Action::Check),
            other => Err(AppError::InvalidAction(format!(
                "'{}' is not one of backup, restore, validate, full, check",
                other
            ))),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Backup => "backup",
            Action::Restore => "restore",
            Action::Validate => "validate",
            Action::Full => "full",
            Action::Check => "check",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum Outcome {
    BackupCreated(PathBuf),
    Restored(PathBuf),
    Validated(ValidationReport),
    Connected,
    /// Nothing ran because the invocation was incomplete.
    Skipped,
}

impl Outcome {
    /// 0 on success, 2 when validation found a difference.
    pub fn exit_status(&self) -> u8 {
        match self {
            Outcome::Validated(report) if !report.matches => EXIT_VALIDATION_MISMATCH,
            _ => 0,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }

    /// Writes the user-facing summary to stdout.
    pub fn print(&self, json: bool) -> AnyResult<()> {
        match self {
            Outcome::BackupCreated(path) => println!("Backup created: {}", path.display()),
            Outcome::Restored(path) => println!("Restored from: {}", path.display()),
            Outcome::Validated(report) if json => println!(
                "{}",
                serde_json::to_string_pretty(report).context("Failed to serialize validation report")?
            ),
            Outcome::Validated(report) => println!("\n{}", report),
            Outcome::Connected => println!("Connection OK."),
            Outcome::Skipped => println!("⚠️ Nothing was done."),
        }
        Ok(())
    }
}

/// Runs `action`. `restore` without a file is logged as an invalid action and skipped; a file
/// given to any other action is ignored with a warning.
pub async fn dispatch<G: DatabaseGateway>(
    orchestrator: &BackupOrchestrator<'_, G>,
    action: Action,
    file: Option<&Path>,
) -> Result<Outcome> {
    if let Some(path) = file.filter(|_| action != Action::Restore) {
        warn!(
            "⚠️ --file is only used by restore; ignoring {} for {}",
            path.display(),
            action
        );
    }

    match action {
        Action::Backup => orchestrator.backup().await.map(Outcome::BackupCreated),
        Action::Restore => match file {
            Some(file) => {
                orchestrator.restore(file).await?;
                Ok(Outcome::Restored(file.to_path_buf()))
            }
            None => {
                let err = AppError::InvalidAction("restore requires --file <PATH>".to_string());
                error!("❌ {}", err);
                Ok(Outcome::Skipped)
            }
        },
        Action::Validate => orchestrator.validate().await.map(Outcome::Validated),
        Action::Full => orchestrator.full().await.map(Outcome::Validated),
        Action::Check => orchestrator.check().await.map(|_| Outcome::Connected),
    }
}

/// Prompts the user to pick an operation when none was given on the command line.
pub fn prompt_choice() -> AnyResult<String> {
    use std::io::{Write, stdin, stdout};

    println!("Select an operation:");
    println!("1. Take Backup (or type 'backup')");
    println!("2. Restore Backup (or type 'restore')");
    println!("3. Validate Backup Database (or type 'validate')");
    println!("4. Backup, Restore and Validate (or type 'full')");
    println!("5. Check Connection (or type 'check')");
    print!("Enter your choice: ");
    stdout().flush().context("Failed to flush stdout")?;

    let mut input = String::new();
    stdin().read_line(&mut input).context("Failed to read user input")?;
    Ok(input.trim().to_string())
}
