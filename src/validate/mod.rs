// mssqlbackup/src/validate/mod.rs
pub(crate) mod snapshot;

use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::errors::Result;
use crate::gateway::DatabaseGateway;
pub use snapshot::CountSnapshot;

/// Outcome of comparing the source database with the backup database.
///
/// A mismatch is a normal result; only a failure to take either snapshot is an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub source_database: String,
    pub backup_database: String,
    pub source: CountSnapshot,
    pub backup: CountSnapshot,
    pub matches: bool,
}

impl ValidationReport {
    pub fn new(
        source_database: &str,
        backup_database: &str,
        source: CountSnapshot,
        backup: CountSnapshot,
    ) -> Self {
        Self {
            source_database: source_database.to_string(),
            backup_database: backup_database.to_string(),
            source,
            backup,
            matches: source == backup,
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation Results:")?;
        writeln!(
            f,
            "Original Database - Tables: {}, Rows: {}",
            self.source.table_count, self.source.row_count
        )?;
        writeln!(
            f,
            "Backup Database - Tables: {}, Rows: {}",
            self.backup.table_count, self.backup.row_count
        )?;
        if self.matches {
            write!(f, "Validation successful: The backup matches the original database.")
        } else {
            write!(f, "Validation failed: The backup does not match the original database.")
        }
    }
}

/// Public entry point for validation: snapshots the source, then the backup database.
pub async fn run_validation_flow(
    config: &AppConfig,
    gateway: &dyn DatabaseGateway,
) -> Result<ValidationReport> {
    info!(
        "🔍 Validating {} against {}",
        config.backup_db, config.source_db
    );

    let source = snapshot::count_tables_and_rows(gateway, &config.source_db).await?;
    let backup = snapshot::count_tables_and_rows(gateway, &config.backup_db).await?;
    let report = ValidationReport::new(&config.source_db, &config.backup_db, source, backup);

    if report.matches {
        info!(
            "✅ Validation successful: {} and {} both have {} tables and {} rows",
            report.source_database, report.backup_database, source.table_count, source.row_count
        );
    } else {
        warn!(
            "⚠️ Validation mismatch: {} has {} tables / {} rows, {} has {} tables / {} rows",
            report.source_database,
            source.table_count,
            source.row_count,
            report.backup_database,
            backup.table_count,
            backup.row_count
        );
    }
    Ok(report)
}
