// mssqlbackup/src/validate/snapshot.rs
use serde::Serialize;
use tracing::{debug, error};

use crate::errors::{AppError, GatewayError, Result};
use crate::gateway::DatabaseGateway;
use crate::utils::quote_identifier;

/// Base tables only; views are excluded.
pub const TABLE_COUNT_QUERY: &str =
    "SELECT COUNT(*) FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_TYPE = 'BASE TABLE';";

/// Rows of user tables, counted once per table through the heap or clustered index partition.
pub const ROW_COUNT_QUERY: &str = "
SELECT SUM(row_count)
FROM (
    SELECT p.[Rows] AS row_count
    FROM sys.objects AS o
    INNER JOIN sys.partitions AS p ON o.object_id = p.object_id
    WHERE o.type = 'U' AND p.index_id IN (0, 1)
) AS total_rows;";

/// Table and row totals of one database at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CountSnapshot {
    pub table_count: u64,
    pub row_count: u64,
}

/// Counts base tables and user-table rows in `database` over a dedicated connection.
pub async fn count_tables_and_rows(
    gateway: &dyn DatabaseGateway,
    database: &str,
) -> Result<CountSnapshot> {
    quote_identifier(database)?;

    let snapshot = async {
        let mut session = gateway.connect(Some(database)).await?;
        let table_count = session.query_scalar(TABLE_COUNT_QUERY).await?;
        let row_count = session.query_scalar(ROW_COUNT_QUERY).await?;
        Ok::<_, GatewayError>(CountSnapshot {
            table_count: non_negative(table_count),
            row_count: non_negative(row_count),
        })
    }
    .await
    .map_err(|e| {
        error!("❌ Could not count tables and rows in {}: {}", database, e);
        AppError::Validation(e)
    })?;

    debug!(
        "{}: {} tables, {} rows",
        database, snapshot.table_count, snapshot.row_count
    );
    Ok(snapshot)
}

// SUM over no rows is NULL.
fn non_negative(value: Option<i64>) -> u64 {
    value.and_then(|v| u64::try_from(v).ok()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::MockGateway;

    #[test]
    fn test_null_aggregate_is_zero() {
        assert_eq!(non_negative(None), 0);
        assert_eq!(non_negative(Some(0)), 0);
        assert_eq!(non_negative(Some(42)), 42);
    }

    #[tokio::test]
    async fn test_counts_come_from_one_scoped_connection() -> anyhow::Result<()> {
        let gateway = MockGateway::new().with_counts("Sales", Some(5), Some(1000));

        let snapshot = count_tables_and_rows(&gateway, "Sales").await?;

        assert_eq!(snapshot, CountSnapshot { table_count: 5, row_count: 1000 });
        assert_eq!(gateway.connects(), vec![Some("Sales".to_string())]);
        let sql: Vec<String> = gateway.statements().into_iter().map(|s| s.sql).collect();
        assert_eq!(sql, vec![TABLE_COUNT_QUERY.to_string(), ROW_COUNT_QUERY.to_string()]);
        assert!(gateway
            .statements()
            .iter()
            .all(|s| s.database.as_deref() == Some("Sales")));
        Ok(())
    }

    #[tokio::test]
    async fn test_database_without_user_tables_counts_zero_rows() -> anyhow::Result<()> {
        let gateway = MockGateway::new().with_counts("Empty", Some(0), None);
        let snapshot = count_tables_and_rows(&gateway, "Empty").await?;
        assert_eq!(snapshot, CountSnapshot::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_query_failure_is_a_validation_error() {
        let gateway = MockGateway::new().failing_queries_on("Sales");
        let err = count_tables_and_rows(&gateway, "Sales").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(GatewayError::Query(_))));
    }
}
