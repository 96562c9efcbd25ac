//! The routes the service answers.

use axum::extract::{Path, RawQuery, State as AxumState};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use prometheus::{Encoder, TextEncoder};

use query_engine_execution::query::QueryResult;

use crate::error::ServerError;
use crate::health;
use crate::params::parse_query_string;
use crate::query::{self, ExplainResponse};
use crate::state::State;

pub fn create_router(state: State) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/metrics", get(get_metrics))
        .route("/collections/:collection", get(get_collection))
        .route("/collections/:collection/explain", get(get_collection_explain))
        .with_state(state)
}

async fn get_health(AxumState(state): AxumState<State>) -> StatusCode {
    health::health_check(&state).await
}

async fn get_metrics(AxumState(state): AxumState<State>) -> Result<String, ServerError> {
    if let Some(pool) = &state.pool {
        state.metrics.update_pool_metrics(pool);
    }
    let mut buffer = vec![];
    TextEncoder::new()
        .encode(&state.metrics_registry.gather(), &mut buffer)
        .map_err(ServerError::Metrics)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

async fn get_collection(
    AxumState(state): AxumState<State>,
    Path(collection): Path<String>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<QueryResult>, ServerError> {
    let params = parse_query_string(raw_query.as_deref().unwrap_or_default());
    query::list(&state, &collection, &params).await.map(Json)
}

async fn get_collection_explain(
    AxumState(state): AxumState<State>,
    Path(collection): Path<String>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<ExplainResponse>, ServerError> {
    let params = parse_query_string(raw_query.as_deref().unwrap_or_default());
    query::explain(&state, &collection, &params).map(Json)
}
