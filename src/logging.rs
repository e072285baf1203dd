// Logging: console (stderr) and append-only file, both via tracing-subscriber.

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LogConfig;

/// Base level plus overrides for chatty dependencies.
fn build_env_filter(level: &str) -> Result<EnvFilter> {
    let directives = [level, "tiberius=warn", "tokio_util=warn"].join(",");
    EnvFilter::try_new(&directives)
        .with_context(|| format!("Invalid LOG_LEVEL filter '{}'", directives))
}

/// Installs the global subscriber.
///
/// The file layer never carries ANSI colours; the console layer writes to stderr so stdout
/// stays free for reports.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    if let Some(parent) = config.file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.file)
        .with_context(|| format!("Failed to open log file {}", config.file.display()))?;

    let console_layer = if config.to_console {
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_target(false)
                .with_filter(build_env_filter(&config.level)?),
        )
    } else {
        None
    };

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .with_target(true)
        .with_filter(build_env_filter(&config.level)?);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    tracing::debug!(
        "Logging initialized: level={}, console={}, file={}",
        config.level,
        config.to_console,
        config.file.display()
    );
    Ok(())
}
