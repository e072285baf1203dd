// Recording gateway used by unit tests.
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

use super::{DatabaseGateway, SqlSession};
use crate::errors::GatewayError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedStatement {
    pub database: Option<String>,
    pub sql: String,
    pub params: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
struct ScriptedCounts {
    tables: Option<i64>,
    rows: Option<i64>,
}

#[derive(Default)]
struct Recorder {
    connects: Vec<Option<String>>,
    statements: Vec<RecordedStatement>,
}

#[derive(Default)]
pub struct MockGateway {
    recorder: Arc<Mutex<Recorder>>,
    counts: HashMap<String, ScriptedCounts>,
    refuse_connections: bool,
    failing_database: Option<String>,
    fail_statements: bool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the catalog answers for `database`: base table count and summed row count.
    pub fn with_counts(mut self, database: &str, tables: Option<i64>, rows: Option<i64>) -> Self {
        self.counts
            .insert(database.to_string(), ScriptedCounts { tables, rows });
        self
    }

    pub fn refusing_connections(mut self) -> Self {
        self.refuse_connections = true;
        self
    }

    pub fn failing_queries_on(mut self, database: &str) -> Self {
        self.failing_database = Some(database.to_string());
        self
    }

    pub fn failing_statements(mut self) -> Self {
        self.fail_statements = true;
        self
    }

    pub fn connect_count(&self) -> usize {
        self.recorder.lock().unwrap().connects.len()
    }

    pub fn connects(&self) -> Vec<Option<String>> {
        self.recorder.lock().unwrap().connects.clone()
    }

    pub fn statements(&self) -> Vec<RecordedStatement> {
        self.recorder.lock().unwrap().statements.clone()
    }
}

#[async_trait(?Send)]
impl DatabaseGateway for MockGateway {
    async fn connect(&self, database: Option<&str>) -> Result<Box<dyn SqlSession>, GatewayError> {
        self.recorder
            .lock()
            .unwrap()
            .connects
            .push(database.map(str::to_string));

        if self.refuse_connections {
            return Err(GatewayError::Socket {
                addr: "mock:1433".to_string(),
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            });
        }

        let counts = database
            .and_then(|db| self.counts.get(db).copied())
            .unwrap_or_default();
        let fail = self.fail_statements
            || (database.is_some() && database == self.failing_database.as_deref());

        Ok(Box::new(MockSession {
            recorder: Arc::clone(&self.recorder),
            database: database.map(str::to_string),
            counts,
            fail,
        }))
    }
}

struct MockSession {
    recorder: Arc<Mutex<Recorder>>,
    database: Option<String>,
    counts: ScriptedCounts,
    fail: bool,
}

impl MockSession {
    fn record(&self, sql: &str, params: &[&str]) {
        self.recorder.lock().unwrap().statements.push(RecordedStatement {
            database: self.database.clone(),
            sql: sql.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
        });
    }

    fn scripted_failure() -> GatewayError {
        GatewayError::Query(tiberius::error::Error::Protocol("scripted failure".into()))
    }
}

#[async_trait(?Send)]
impl SqlSession for MockSession {
    async fn execute(&mut self, sql: &str, params: &[&str]) -> Result<u64, GatewayError> {
        self.record(sql, params);
        if self.fail {
            return Err(Self::scripted_failure());
        }
        Ok(0)
    }

    async fn query_scalar(&mut self, sql: &str) -> Result<Option<i64>, GatewayError> {
        self.record(sql, &[]);
        if self.fail {
            return Err(Self::scripted_failure());
        }
        if sql.contains("INFORMATION_SCHEMA.TABLES") {
            Ok(self.counts.tables)
        } else if sql.contains("sys.partitions") {
            Ok(self.counts.rows)
        } else {
            Ok(Some(1))
        }
    }
}
