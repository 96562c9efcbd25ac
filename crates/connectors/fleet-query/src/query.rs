//! Answer list and explain requests.

use serde::Serialize;
use tracing::{info_span, Instrument};

use query_engine_execution::query::QueryResult;
use query_engine_translation::translation;
use translation::plan::{BaseQuery, ListPlan};
use translation::request::RawParams;

use crate::error::ServerError;
use crate::state::State;

/// The statements a list request runs, as returned by the explain endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainResponse {
    pub count_sql: String,
    pub count_params: Vec<String>,
    pub rows_sql: String,
    pub rows_params: Vec<String>,
}

/// List the records of an endpoint matching the request parameters.
pub async fn list(
    state: &State,
    endpoint: &str,
    params: &RawParams,
) -> Result<QueryResult, ServerError> {
    let result = async {
        let plan = info_span!("Plan query").in_scope(|| plan(state, endpoint, params))?;

        let result = state
            .data_source
            .execute(&plan)
            .instrument(info_span!("Execute query"))
            .await?;
        Ok::<_, ServerError>(result)
    }
    .await
    .map_err(|err| record_failure(state, err));

    if result.is_ok() {
        state.metrics.record_successful_query();
    }
    result
}

/// Describe the statements a list request would run against PostgreSQL, without running
/// them.
pub fn explain(
    state: &State,
    endpoint: &str,
    params: &RawParams,
) -> Result<ExplainResponse, ServerError> {
    let plan = info_span!("Plan query")
        .in_scope(|| plan(state, endpoint, params))
        .map_err(|err| record_failure(state, err))?;

    let explanation = translation::query::translate(&plan).explain();
    state.metrics.record_successful_explain();

    Ok(ExplainResponse {
        count_sql: explanation.count,
        count_params: explanation.count_params,
        rows_sql: explanation.rows,
        rows_params: explanation.rows_params,
    })
}

fn plan(state: &State, endpoint: &str, params: &RawParams) -> Result<ListPlan, ServerError> {
    let configuration = &state.configuration;
    let endpoint_info = configuration
        .lookup_endpoint(endpoint)
        .ok_or_else(|| ServerError::UnknownCollection(endpoint.to_string()))?;

    let request = translation::request::parse_params(params, &configuration.pagination);
    tracing::debug!(endpoint, ?request);

    let plan = translation::plan::resolve(
        &configuration.metadata,
        &BaseQuery {
            collection: endpoint_info.collection.clone(),
            includes: endpoint_info.includes.clone(),
        },
        request,
    )?;
    Ok(plan)
}

fn record_failure(state: &State, err: ServerError) -> ServerError {
    if err.status_code().is_client_error() {
        tracing::info!(error = %err, "rejected request");
        state.metrics.record_invalid_request();
    } else {
        tracing::error!(
            meta.signal_type = "log",
            event.name = "Query error",
            name = "Query error",
            body = %err,
            error = true,
        );
        state.metrics.record_error();
    }
    err
}
