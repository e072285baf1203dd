// mssqlbackup/src/gateway/mssql.rs
use async_trait::async_trait;
use tiberius::{Client, Config, ToSql};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, error};

use super::{DatabaseGateway, SqlSession, connection_descriptor};
use crate::config::AppConfig;
use crate::errors::GatewayError;

/// Whether the driver was built with a way to log in as the process identity.
/// Without it tiberius falls back to a SQL login with an empty user name.
const INTEGRATED_AUTH_AVAILABLE: bool = cfg!(any(windows, feature = "integrated-auth-gssapi"));

/// Connection factory for a SQL Server instance, built from the process configuration.
pub struct MssqlGateway {
    config: AppConfig,
}

impl MssqlGateway {
    pub fn new(config: AppConfig) -> Self {
        if config.uses_integrated_auth() {
            debug!("DB_USER/DB_PASSWORD not set, using integrated authentication");
        }
        Self { config }
    }

    async fn open(&self, database: Option<&str>) -> Result<MssqlSession, GatewayError> {
        let driver_config = driver_config(&self.config, database)?;
        let addr = driver_config.get_addr();

        let tcp = TcpStream::connect(addr.as_str())
            .await
            .map_err(|source| GatewayError::Socket { addr: addr.clone(), source })?;
        tcp.set_nodelay(true)
            .map_err(|source| GatewayError::Socket { addr: addr.clone(), source })?;

        let client = Client::connect(driver_config, tcp.compat_write())
            .await
            .map_err(|source| GatewayError::Login { addr: addr.clone(), source })?;

        debug!("Connected to {} (database: {})", addr, database.unwrap_or("<default>"));
        Ok(MssqlSession { client })
    }
}

/// Resolves the driver configuration, refusing integrated auth when the driver cannot do it.
fn driver_config(config: &AppConfig, database: Option<&str>) -> Result<Config, GatewayError> {
    if config.uses_integrated_auth() && !INTEGRATED_AUTH_AVAILABLE {
        return Err(GatewayError::IntegratedAuthUnavailable);
    }

    debug!(
        "Opening connection: {}",
        connection_descriptor(config, database, true)
    );
    Config::from_ado_string(&connection_descriptor(config, database, false))
        .map_err(GatewayError::Descriptor)
}

#[async_trait(?Send)]
impl DatabaseGateway for MssqlGateway {
    async fn connect(&self, database: Option<&str>) -> Result<Box<dyn SqlSession>, GatewayError> {
        match self.open(database).await {
            Ok(session) => Ok(Box::new(session)),
            Err(e) => {
                error!(
                    "Connection to {} (database: {}) failed: {}",
                    self.config.server,
                    database.unwrap_or("<default>"),
                    e
                );
                Err(e)
            }
        }
    }
}

/// One open TDS connection. The socket closes when this value is dropped.
struct MssqlSession {
    client: Client<Compat<TcpStream>>,
}

#[async_trait(?Send)]
impl SqlSession for MssqlSession {
    async fn execute(&mut self, sql: &str, params: &[&str]) -> Result<u64, GatewayError> {
        let owned: Vec<String> = params.iter().map(|p| p.to_string()).collect();
        let bound: Vec<&dyn ToSql> = owned.iter().map(|p| p as &dyn ToSql).collect();

        let result = self.client.execute(sql, &bound).await?;
        Ok(result.rows_affected().iter().sum())
    }

    async fn query_scalar(&mut self, sql: &str) -> Result<Option<i64>, GatewayError> {
        let row = self.client.simple_query(sql).await?.into_row().await?;
        let Some(row) = row else {
            return Ok(None);
        };

        // COUNT(*) comes back as INT, SUM over BIGINT as BIGINT.
        match row.try_get::<i64, _>(0) {
            Ok(value) => Ok(value),
            Err(_) => Ok(row.try_get::<i32, _>(0)?.map(i64::from)),
        }
    }
}
