// mssqlbackup/src/gateway/mod.rs
pub(crate) mod mssql; // tiberius-backed gateway
#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::errors::GatewayError;

pub use mssql::MssqlGateway;

/// Produces live connections to the configured server.
///
/// The returned session owns its socket; dropping it closes the connection, so every exit
/// path releases it. Sessions run in auto-commit mode: each statement commits on its own.
#[async_trait(?Send)]
pub trait DatabaseGateway {
    /// Opens a connection, scoped to `database` when given, otherwise to the login's default.
    async fn connect(&self, database: Option<&str>) -> Result<Box<dyn SqlSession>, GatewayError>;
}

#[async_trait(?Send)]
pub trait SqlSession {
    /// Runs a statement with positional string parameters bound to `@P1`, `@P2`, ...
    async fn execute(&mut self, sql: &str, params: &[&str]) -> Result<u64, GatewayError>;

    /// Runs a query and returns the first column of its first row. SQL `NULL` and an empty
    /// result both come back as `None`.
    async fn query_scalar(&mut self, sql: &str) -> Result<Option<i64>, GatewayError>;
}

/// Builds the ADO.NET connection string handed to the driver.
///
/// With `redact` set the password is masked, which is the form that may be logged.
pub fn connection_descriptor(config: &AppConfig, database: Option<&str>, redact: bool) -> String {
    let mut parts = vec![format!("server={}", ado_value(&config.server))];

    if let Some(db) = database {
        parts.push(format!("database={}", ado_value(db)));
    }

    match &config.credentials {
        Some(creds) => {
            parts.push(format!("user id={}", ado_value(&creds.username)));
            let password = if redact { "****" } else { creds.password.as_str() };
            parts.push(format!("password={}", ado_value(password)));
        }
        None => parts.push("IntegratedSecurity=true".to_string()),
    }

    if config.trust_server_certificate {
        parts.push("TrustServerCertificate=true".to_string());
    }
    parts.push(format!("Application Name={}", env!("CARGO_PKG_NAME")));

    parts.join(";")
}

// Values with separators, quotes or edge whitespace are double-quoted, inner quotes doubled.
fn ado_value(value: &str) -> String {
    let needs_quoting = value.contains([';', '"', '\''])
        || value.starts_with(char::is_whitespace)
        || value.ends_with(char::is_whitespace);
    if needs_quoting {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
