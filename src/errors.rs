use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the database gateway while connecting or running a statement.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid connection descriptor: {0}")]
    Descriptor(#[source] tiberius::error::Error),

    #[error(
        "Integrated authentication is not available in this build; set DB_USER and DB_PASSWORD \
         or rebuild with the integrated-auth-gssapi feature"
    )]
    IntegratedAuthUnavailable,

    #[error("Could not reach SQL Server at {addr}: {source}")]
    Socket {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Login to SQL Server at {addr} failed: {source}")]
    Login {
        addr: String,
        #[source]
        source: tiberius::error::Error,
    },

    #[error("Statement failed: {0}")]
    Query(#[from] tiberius::error::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Connection error: {0}")]
    Connection(#[source] GatewayError),

    #[error("Backup operation failed: {0}")]
    Backup(#[source] GatewayError),

    #[error("Restore operation failed: {0}")]
    Restore(#[source] GatewayError),

    #[error("Validation could not run: {0}")]
    Validation(#[source] GatewayError),

    #[error("Backup file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Invalid database identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("Path is not valid UTF-8 and cannot be sent to the server: {}", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
