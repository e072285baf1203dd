// mssqlbackup/src/config/mod.rs
use anyhow::{Context, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;

const DEFAULT_LOG_FILE: &str = "logs/mssqlbackup.log";
const DEFAULT_LOG_LEVEL: &str = "info";

/// SQL login used instead of integrated authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub file: PathBuf,
    pub level: String,
    pub to_console: bool,
}

/// Process configuration, built once at start-up and passed by reference afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub server: String,
    pub source_db: String,
    pub backup_db: String,
    pub backup_dir: PathBuf,
    /// `None` means integrated/trusted authentication.
    pub credentials: Option<Credentials>,
    pub trust_server_certificate: bool,
    pub log: LogConfig,
}

impl AppConfig {
    /// Loads `.env` (when present) and reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &str| {
            get(key).with_context(|| format!("{} must be set in the environment or .env file", key))
        };

        let server = require("SQL_SERVER")?;
        let source_db = require("ORIGINAL_DB")?;
        let backup_db = require("BACKUP_DB")?;
        let backup_dir = PathBuf::from(require("BACKUP_PATH")?);

        // Password is kept verbatim; only emptiness disables it.
        let password = lookup("DB_PASSWORD").filter(|v| !v.is_empty());
        let credentials = match (get("DB_USER"), password) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            _ => None,
        };

        let trust_server_certificate = match get("SQL_TRUST_SERVER_CERTIFICATE") {
            Some(raw) => parse_bool(&raw)
                .with_context(|| format!("SQL_TRUST_SERVER_CERTIFICATE has invalid value '{}'", raw))?,
            None => true,
        };

        let to_console = match get("LOG_TO_CONSOLE") {
            Some(raw) => parse_bool(&raw)
                .with_context(|| format!("LOG_TO_CONSOLE has invalid value '{}'", raw))?,
            None => true,
        };

        Ok(AppConfig {
            server,
            source_db,
            backup_db,
            backup_dir,
            credentials,
            trust_server_certificate,
            log: LogConfig {
                file: get("LOG_FILE").map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
                level: get("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
                to_console,
            },
        })
    }

    pub fn uses_integrated_auth(&self) -> bool {
        self.credentials.is_none()
    }
}

#[cfg(test)]
impl AppConfig {
    pub fn for_tests(backup_dir: &std::path::Path) -> Self {
        AppConfig {
            server: "localhost,1433".to_string(),
            source_db: "Sales".to_string(),
            backup_db: "Sales_Verify".to_string(),
            backup_dir: backup_dir.to_path_buf(),
            credentials: None,
            trust_server_certificate: true,
            log: LogConfig {
                file: backup_dir.join("test.log"),
                level: "info".to_string(),
                to_console: false,
            },
        }
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow::anyhow!("expected true/false, yes/no, on/off or 1/0")),
    }
}
