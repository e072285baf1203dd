// mssqlbackup/src/backup/logic.rs
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::errors::{AppError, GatewayError, Result};
use crate::gateway::DatabaseGateway;
use crate::utils::{disk_path, quote_identifier};

/// Timestamp embedded in backup file names, e.g. `20240131235959`.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// `<backup_dir>/<source_db>_backup_<YYYYMMDDHHMMSS>.bak`
pub fn backup_file_path(backup_dir: &Path, source_db: &str, taken_at: &DateTime<Local>) -> PathBuf {
    backup_dir.join(format!(
        "{}_backup_{}.bak",
        source_db,
        taken_at.format(TIMESTAMP_FORMAT)
    ))
}

/// Full backup into a fresh media set, overwriting any set already at the target path.
pub fn backup_statement(source_db: &str) -> Result<String> {
    Ok(format!(
        "BACKUP DATABASE {} TO DISK = @P1 WITH FORMAT, INIT;",
        quote_identifier(source_db)?
    ))
}

/// Creates the backup directory when missing. Safe to call repeatedly.
pub fn create_backup_dir(backup_dir: &Path) -> Result<()> {
    if backup_dir.is_dir() {
        return Ok(());
    }
    info!("📂 Creating backup directory: {}", backup_dir.display());
    fs::create_dir_all(backup_dir).map_err(|e| {
        error!(
            "❌ Failed to create backup directory {}: {}",
            backup_dir.display(),
            e
        );
        AppError::Io(e)
    })
}

/// Runs a server-side full backup of the source database and returns the artifact path.
pub async fn perform_backup(
    config: &AppConfig,
    gateway: &dyn DatabaseGateway,
    taken_at: DateTime<Local>,
) -> Result<PathBuf> {
    info!("🚀 Starting backup of database {}", config.source_db);

    create_backup_dir(&config.backup_dir)?;
    let statement = backup_statement(&config.source_db)?;
    let backup_file = backup_file_path(&config.backup_dir, &config.source_db, &taken_at);
    let disk = disk_path(&backup_file)?;

    {
        let mut session = gateway.connect(None).await.map_err(backup_failed)?;
        session
            .execute(&statement, &[disk])
            .await
            .map_err(backup_failed)?;
    }

    info!("✅ Backup created: {}", backup_file.display());
    Ok(backup_file)
}

fn backup_failed(e: GatewayError) -> AppError {
    error!("❌ Backup failed: {}", e);
    AppError::Backup(e)
}
