//! Execute a list plan against PostgreSQL.

use async_trait::async_trait;
use sqlx::Row;
use tracing::{info_span, Instrument};

use query_engine_sql::sql;
use query_engine_translation::translation;
use translation::plan::ListPlan;
use translation::query::{ROW_COLUMN, TOTAL_COLUMN};

use crate::error::Error;
use crate::query::{DataSource, QueryResult, Record};

const CONSISTENT_SNAPSHOT: &str = "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY";

/// Runs list plans over a connection pool.
#[derive(Debug, Clone)]
pub struct PostgresDataSource {
    pool: sqlx::PgPool,
    consistent_snapshot: bool,
}

impl PostgresDataSource {
    /// When `consistent_snapshot` is set, the count and the page are read from the same
    /// snapshot. Otherwise they are two independent statements.
    pub fn new(pool: sqlx::PgPool, consistent_snapshot: bool) -> Self {
        Self {
            pool,
            consistent_snapshot,
        }
    }

    pub fn pool(&self) -> &sqlx::PgPool {
        &self.pool
    }
}

#[async_trait]
impl DataSource for PostgresDataSource {
    async fn execute(&self, plan: &ListPlan) -> Result<QueryResult, Error> {
        let execution_plan = translation::query::translate(plan);
        let count = execution_plan.count_sql();
        let rows = execution_plan.rows_sql();

        tracing::info!(
            count_sql = count.sql,
            rows_sql = rows.sql,
            params = ?&rows.params,
            consistent_snapshot = self.consistent_snapshot,
        );

        if self.consistent_snapshot {
            let mut transaction = self.pool.begin().await?;
            sqlx::query(CONSISTENT_SNAPSHOT)
                .execute(&mut *transaction)
                .await?;
            let total_count = fetch_count(&mut transaction, &count)
                .instrument(info_span!("Count rows"))
                .await?;
            let rows = fetch_rows(&mut transaction, &rows, &execution_plan.includes)
                .instrument(info_span!("Fetch rows"))
                .await?;
            transaction.commit().await?;
            Ok(QueryResult { rows, total_count })
        } else {
            let mut connection = self.pool.acquire().await?;
            let total_count = fetch_count(&mut connection, &count)
                .instrument(info_span!("Count rows"))
                .await?;
            let rows = fetch_rows(&mut connection, &rows, &execution_plan.includes)
                .instrument(info_span!("Fetch rows"))
                .await?;
            Ok(QueryResult { rows, total_count })
        }
    }

    async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

async fn fetch_count(
    connection: &mut sqlx::PgConnection,
    query: &sql::string::SQL,
) -> Result<u64, Error> {
    let row = build_query_with_params(query).fetch_one(connection).await?;
    let total: i64 = row.try_get(TOTAL_COLUMN)?;
    u64::try_from(total).map_err(|_| Error::MalformedRow(format!("negative count {total}")))
}

/// Each row holds the record as JSON, followed by one JSON column per include.
async fn fetch_rows(
    connection: &mut sqlx::PgConnection,
    query: &sql::string::SQL,
    includes: &[String],
) -> Result<Vec<Record>, Error> {
    let rows = build_query_with_params(query).fetch_all(connection).await?;
    rows.into_iter()
        .map(|row| {
            let mut record = match row.try_get::<serde_json::Value, _>(ROW_COLUMN)? {
                serde_json::Value::Object(record) => record,
                other => {
                    return Err(Error::MalformedRow(format!(
                        "expected an object, got {other}"
                    )))
                }
            };
            for include in includes {
                let related: Option<serde_json::Value> = row.try_get(include.as_str())?;
                record.insert(include.clone(), related.unwrap_or(serde_json::Value::Null));
            }
            Ok(record)
        })
        .collect()
}

/// Create a SQLx query based on our SQL query and bind our parameters to it.
fn build_query_with_params(
    query: &sql::string::SQL,
) -> sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments> {
    query
        .params
        .iter()
        .fold(sqlx::query(query.sql.as_str()), |sqlx_query, param| {
            match param {
                sql::string::Param::String(s) => sqlx_query.bind(s.as_str()),
            }
        })
}
