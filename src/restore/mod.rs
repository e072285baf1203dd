pub(crate) mod logic;

use std::path::Path;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::gateway::DatabaseGateway;

/// Public entry point for the restore process.
pub async fn run_restore_flow(
    config: &AppConfig,
    gateway: &dyn DatabaseGateway,
    backup_file: &Path,
) -> Result<()> {
    logic::perform_restore(config, gateway, backup_file).await
}
