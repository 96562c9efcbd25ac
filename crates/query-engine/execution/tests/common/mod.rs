use std::path::PathBuf;

use fleet_query_configuration::environment::FixedEnvironment;
use fleet_query_configuration::Configuration;
use query_engine_execution::error::Error;
use query_engine_execution::memory::InMemoryDataSource;
use query_engine_execution::query::{DataSource, QueryResult};
use query_engine_translation::translation;
use translation::plan::BaseQuery;
use translation::request::{ParamValue, RawParams};

fn fleet_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../../static/fleet")
}

pub async fn fleet_configuration() -> Configuration {
    let parsed = fleet_query_configuration::parse_configuration(fleet_dir())
        .await
        .unwrap();
    fleet_query_configuration::make_runtime_configuration(
        parsed,
        FixedEnvironment::from([(
            "FLEET_QUERY_DATABASE_URL".into(),
            "postgresql://unused".into(),
        )]),
    )
    .unwrap()
}

pub async fn fleet_data_source() -> InMemoryDataSource {
    let dataset = tokio::fs::read_to_string(fleet_dir().join("dataset.json"))
        .await
        .unwrap();
    InMemoryDataSource::from_json(serde_json::from_str(&dataset).unwrap()).unwrap()
}

/// Split a query string on `&` and `=`. Repeated keys become lists.
pub fn params(query: &str) -> RawParams {
    let mut params = RawParams::new();
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = value.to_string();
        let merged = match params.shift_remove(key) {
            None => ParamValue::Single(value),
            Some(ParamValue::Single(first)) => ParamValue::List(vec![first, value]),
            Some(ParamValue::List(mut values)) => {
                values.push(value);
                ParamValue::List(values)
            }
        };
        params.insert(key.to_string(), merged);
    }
    params
}

/// List an endpoint of the fleet fixture, in memory.
pub async fn list(endpoint: &str, query: &str) -> Result<QueryResult, Error> {
    let configuration = fleet_configuration().await;
    let endpoint = configuration.lookup_endpoint(endpoint).unwrap();
    let request = translation::request::parse_params(&params(query), &configuration.pagination);
    let plan = translation::plan::resolve(
        &configuration.metadata,
        &BaseQuery {
            collection: endpoint.collection.clone(),
            includes: endpoint.includes.clone(),
        },
        request,
    )
    .unwrap();
    fleet_data_source().await.execute(&plan).await
}

pub fn ids(result: &QueryResult) -> Vec<i64> {
    result
        .rows
        .iter()
        .map(|row| row["id"].as_i64().unwrap())
        .collect()
}
