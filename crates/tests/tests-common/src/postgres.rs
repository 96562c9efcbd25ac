//! Load the fleet fixture into a PostgreSQL database.
//!
//! Tests that need a database are ignored by default. Run them with `--ignored`, after
//! pointing `FLEET_QUERY_TEST_DATABASE_URL` at a database they may drop tables from.

use sqlx::Connection;
use tokio::sync::OnceCell;

use query_engine_metadata::metadata::{CollectionInfo, Nullable};

use crate::fixtures::{fleet_configuration, fleet_dataset};

pub const TEST_DATABASE_URL_VARIABLE: &str = "FLEET_QUERY_TEST_DATABASE_URL";

static LOADED: OnceCell<()> = OnceCell::const_new();

/// The URL of the test database, with the fleet dataset loaded into it once per test
/// binary.
pub async fn fleet_database() -> anyhow::Result<String> {
    let connection_uri = std::env::var(TEST_DATABASE_URL_VARIABLE)
        .map_err(|_| anyhow::anyhow!("{TEST_DATABASE_URL_VARIABLE} is not set"))?;
    LOADED
        .get_or_try_init(|| load_fleet_dataset(&connection_uri))
        .await?;
    Ok(connection_uri)
}

/// Recreate every table the fleet metadata describes and insert the fleet dataset.
async fn load_fleet_dataset(connection_uri: &str) -> anyhow::Result<()> {
    let configuration = fleet_configuration(connection_uri).await?;
    let dataset = fleet_dataset().await?;
    let mut connection = sqlx::PgConnection::connect(connection_uri).await?;
    let mut transaction = connection.begin().await?;

    let collections = &configuration.metadata.collections.0;
    for collection in collections.values() {
        sqlx::query(&format!(
            "DROP TABLE IF EXISTS {} CASCADE",
            qualified_name(collection)
        ))
        .execute(&mut *transaction)
        .await?;
    }

    for (name, collection) in collections {
        let table = qualified_name(collection);
        sqlx::query(&create_table(collection))
            .execute(&mut *transaction)
            .await?;
        let rows = dataset
            .get(name)
            .cloned()
            .unwrap_or_else(|| serde_json::json!([]));
        sqlx::query(&format!(
            "INSERT INTO {table} SELECT * FROM jsonb_populate_recordset(NULL::{table}, $1)"
        ))
        .bind(sqlx::types::Json(rows))
        .execute(&mut *transaction)
        .await?;
        tracing::info!(collection = name.as_str(), "loaded fixture");
    }

    transaction.commit().await?;
    Ok(())
}

fn create_table(collection: &CollectionInfo) -> String {
    let columns = collection
        .columns
        .values()
        .map(|column| {
            format!(
                "{} {}{}",
                quote(&column.name),
                column.r#type.type_name().unwrap_or("text"),
                match column.nullable {
                    Nullable::Nullable => "",
                    Nullable::NonNullable => " NOT NULL",
                }
            )
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({columns})", qualified_name(collection))
}

fn qualified_name(collection: &CollectionInfo) -> String {
    format!(
        "{}.{}",
        quote(&collection.schema_name),
        quote(&collection.table_name)
    )
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}
