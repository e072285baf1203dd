// mssqlbackup/src/restore/logic.rs
use std::path::Path;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::errors::{AppError, GatewayError, Result};
use crate::gateway::DatabaseGateway;
use crate::utils::{disk_path, quote_identifier};

/// Restores over `target_db`, replacing it even when its backup history is unrelated.
pub fn restore_statement(target_db: &str) -> Result<String> {
    Ok(format!(
        "RESTORE DATABASE {} FROM DISK = @P1 WITH REPLACE;",
        quote_identifier(target_db)?
    ))
}

/// Restores the backup database from `backup_file`.
///
/// The file is checked before any connection is opened, so a missing file costs no round trip.
pub async fn perform_restore(
    config: &AppConfig,
    gateway: &dyn DatabaseGateway,
    backup_file: &Path,
) -> Result<()> {
    if !backup_file.exists() {
        error!("❌ Backup file not found: {}", backup_file.display());
        return Err(AppError::FileNotFound(backup_file.to_path_buf()));
    }

    let statement = restore_statement(&config.backup_db)?;
    let disk = disk_path(backup_file)?;
    warn!(
        "🔄 Restoring {} from {} (existing database will be replaced)",
        config.backup_db,
        backup_file.display()
    );

    {
        let mut session = gateway.connect(None).await.map_err(restore_failed)?;
        session
            .execute(&statement, &[disk])
            .await
            .map_err(restore_failed)?;
    }

    info!(
        "✅ Database {} restored from {}",
        config.backup_db,
        backup_file.display()
    );
    Ok(())
}

fn restore_failed(e: GatewayError) -> AppError {
    error!("❌ Restore failed: {}", e);
    AppError::Restore(e)
}
