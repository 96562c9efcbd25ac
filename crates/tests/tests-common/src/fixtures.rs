//! The fleet fixture: a configuration and a dataset shared by every test suite.

use std::path::PathBuf;
use std::sync::Arc;

use fleet_query::routes::create_router;
use fleet_query::state;
use fleet_query_configuration::environment::FixedEnvironment;
use fleet_query_configuration::version1::DEFAULT_CONNECTION_URI_VARIABLE;
use fleet_query_configuration::Configuration;
use query_engine_execution::memory::InMemoryDataSource;

/// Find the project root via the crate root provided by `cargo test`,
/// and get the directory of the fleet fixture.
pub fn fleet_configuration_dir() -> PathBuf {
    let mut d = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    d.push("../../../static/fleet");
    d
}

/// Read the fleet configuration, connecting to `connection_uri`.
pub async fn fleet_configuration(connection_uri: &str) -> anyhow::Result<Configuration> {
    let parsed = fleet_query_configuration::parse_configuration(fleet_configuration_dir()).await?;
    let configuration = fleet_query_configuration::make_runtime_configuration(
        parsed,
        FixedEnvironment::from([(
            DEFAULT_CONNECTION_URI_VARIABLE.to_string(),
            connection_uri.to_string(),
        )]),
    )?;
    Ok(configuration)
}

/// The records of every collection, by collection name.
pub async fn fleet_dataset() -> anyhow::Result<serde_json::Value> {
    let contents =
        tokio::fs::read_to_string(fleet_configuration_dir().join("dataset.json")).await?;
    Ok(serde_json::from_str(&contents)?)
}

/// A router over the fleet fixture, answering from memory.
pub async fn memory_router() -> anyhow::Result<axum::Router> {
    let configuration = fleet_configuration("postgresql://unused").await?;
    let data_source = InMemoryDataSource::from_json(fleet_dataset().await?)?;
    let state = state::create_state_with_data_source(
        configuration,
        Arc::new(data_source),
        prometheus::Registry::new(),
    )?;
    Ok(create_router(state))
}

/// A router over the fleet fixture, loaded into the given database.
pub async fn postgres_router(connection_uri: &str) -> anyhow::Result<axum::Router> {
    let configuration = fleet_configuration(connection_uri).await?;
    let state = state::create_state(configuration, prometheus::Registry::new()).await?;
    Ok(create_router(state))
}
