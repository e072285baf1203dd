pub(crate) mod logic;

use chrono::Local;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::gateway::DatabaseGateway;

/// Public entry point for the backup process. Returns the path of the new backup set.
pub async fn run_backup_flow(config: &AppConfig, gateway: &dyn DatabaseGateway) -> Result<PathBuf> {
    logic::perform_backup(config, gateway, Local::now()).await
}
