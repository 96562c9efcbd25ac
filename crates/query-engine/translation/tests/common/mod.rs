use std::path::PathBuf;

use fleet_query_configuration::environment::FixedEnvironment;
use fleet_query_configuration::Configuration;
use query_engine_sql::sql;
use query_engine_translation::translation;
use translation::plan::BaseQuery;
use translation::request::{ParamValue, RawParams};

/// The fleet fixture shared by the whole workspace.
pub fn fleet_configuration_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../../static/fleet")
}

pub async fn fleet_configuration() -> anyhow::Result<Configuration> {
    let parsed = fleet_query_configuration::parse_configuration(fleet_configuration_dir()).await?;
    let configuration = fleet_query_configuration::make_runtime_configuration(
        parsed,
        FixedEnvironment::from([(
            "FLEET_QUERY_DATABASE_URL".into(),
            "the translation tests do not rely on a database connection".into(),
        )]),
    )?;
    Ok(configuration)
}

/// Split a query string on `&` and `=`. Repeated keys become lists. No decoding is done.
pub fn params(query: &str) -> RawParams {
    let mut params = RawParams::new();
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        match params.get_mut(key) {
            None => {
                params.insert(key.to_string(), ParamValue::Single(value.to_string()));
            }
            Some(ParamValue::Single(first)) => {
                let first = std::mem::take(first);
                params.insert(
                    key.to_string(),
                    ParamValue::List(vec![first, value.to_string()]),
                );
            }
            Some(ParamValue::List(values)) => values.push(value.to_string()),
        }
    }
    params
}

/// The rendered SQL of both statements, with their parameters.
#[derive(Debug)]
pub struct Translated {
    pub count: String,
    pub count_params: Vec<String>,
    pub rows: String,
    pub rows_params: Vec<String>,
}

fn param_strings(params: Vec<sql::string::Param>) -> Vec<String> {
    params
        .into_iter()
        .map(|param| match param {
            sql::string::Param::String(s) => s,
        })
        .collect()
}

/// Translate a list request on a collection, without includes.
pub async fn translate(collection: &str, raw: RawParams) -> Result<Translated, translation::error::Error> {
    translate_base(
        BaseQuery {
            collection: collection.to_string(),
            includes: vec![],
        },
        raw,
    )
    .await
}

/// Translate a list request on a configured endpoint, with its includes.
pub async fn translate_endpoint(
    endpoint: &str,
    raw: RawParams,
) -> Result<Translated, translation::error::Error> {
    let configuration = fleet_configuration().await.unwrap();
    let endpoint = configuration.lookup_endpoint(endpoint).unwrap();
    translate_base(
        BaseQuery {
            collection: endpoint.collection.clone(),
            includes: endpoint.includes.clone(),
        },
        raw,
    )
    .await
}

async fn translate_base(
    base: BaseQuery,
    raw: RawParams,
) -> Result<Translated, translation::error::Error> {
    let configuration = fleet_configuration().await.unwrap();
    let request = translation::request::parse_params(&raw, &configuration.pagination);
    let plan = translation::plan::resolve(&configuration.metadata, &base, request)?;
    let execution_plan = translation::query::translate(&plan);
    let count = execution_plan.count_sql();
    let rows = execution_plan.rows_sql();
    Ok(Translated {
        count: count.sql,
        count_params: param_strings(count.params),
        rows: rows.sql,
        rows_params: param_strings(rows.params),
    })
}
