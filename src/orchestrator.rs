//! Backup, restore and validation operations bound to one configuration and gateway.

use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::backup;
use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::gateway::DatabaseGateway;
use crate::restore;
use crate::validate::{self, ValidationReport};

pub struct BackupOrchestrator<'a, G> {
    config: &'a AppConfig,
    gateway: G,
}

impl<'a, G: DatabaseGateway> BackupOrchestrator<'a, G> {
    pub fn new(config: &'a AppConfig, gateway: G) -> Self {
        Self { config, gateway }
    }

    #[cfg(test)]
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub async fn backup(&self) -> Result<PathBuf> {
        backup::run_backup_flow(self.config, &self.gateway).await
    }

    pub async fn restore(&self, backup_file: &Path) -> Result<()> {
        restore::run_restore_flow(self.config, &self.gateway, backup_file).await
    }

    pub async fn validate(&self) -> Result<ValidationReport> {
        validate::run_validation_flow(self.config, &self.gateway).await
    }

    /// Backs up the source, restores that backup into the backup database, then validates.
    pub async fn full(&self) -> Result<ValidationReport> {
        let backup_file = self.backup().await?;
        self.restore(&backup_file).await?;
        self.validate().await
    }

    /// Opens a server-level connection and runs a trivial query.
    pub async fn check(&self) -> Result<()> {
        info!("🔌 Checking connectivity to {}", self.config.server);
        let mut session = self
            .gateway
            .connect(None)
            .await
            .map_err(AppError::Connection)?;
        session.query_scalar("SELECT 1;").await.map_err(|e| {
            error!("❌ Connectivity check failed: {}", e);
            AppError::Connection(e)
        })?;
        info!("✅ Successfully connected to {}", self.config.server);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::MockGateway;
    use crate::errors::GatewayError;

    #[tokio::test]
    async fn test_full_flow_backs_up_restores_and_validates() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let config = AppConfig::for_tests(tmp.path());
        let gateway = MockGateway::new()
            .with_counts("Sales", Some(3), Some(30))
            .with_counts("Sales_Verify", Some(3), Some(30));
        let orchestrator = BackupOrchestrator::new(&config, gateway);

        let backup_file = orchestrator.backup().await?;
        // The mock server writes nothing; restore needs the file on disk.
        std::fs::write(&backup_file, b"TAPE")?;
        orchestrator.restore(&backup_file).await?;
        let report = orchestrator.validate().await?;

        assert!(report.matches);
        assert_eq!(
            orchestrator.gateway().connects(),
            vec![
                None,
                None,
                Some("Sales".to_string()),
                Some("Sales_Verify".to_string())
            ]
        );
        let sql: Vec<String> = orchestrator
            .gateway()
            .statements()
            .into_iter()
            .map(|s| s.sql)
            .collect();
        assert!(sql[0].starts_with("BACKUP DATABASE [Sales]"));
        assert!(sql[1].starts_with("RESTORE DATABASE [Sales_Verify]"));
        Ok(())
    }

    #[tokio::test]
    async fn test_full_stops_when_backup_file_is_absent() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let config = AppConfig::for_tests(tmp.path());
        let orchestrator = BackupOrchestrator::new(&config, MockGateway::new());

        let err = orchestrator.full().await.unwrap_err();

        assert!(matches!(err, AppError::FileNotFound(_)));
        assert_eq!(orchestrator.gateway().connect_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_check_reports_connection_error() {
        let config = AppConfig::for_tests(Path::new("/unused"));
        let orchestrator = BackupOrchestrator::new(&config, MockGateway::new().refusing_connections());

        let err = orchestrator.check().await.unwrap_err();
        assert!(matches!(err, AppError::Connection(GatewayError::Socket { .. })));
    }

    #[tokio::test]
    async fn test_check_succeeds_against_reachable_server() -> anyhow::Result<()> {
        let config = AppConfig::for_tests(Path::new("/unused"));
        let orchestrator = BackupOrchestrator::new(&config, MockGateway::new());

        orchestrator.check().await?;
        assert_eq!(orchestrator.gateway().statements()[0].sql, "SELECT 1;");
        Ok(())
    }
}
