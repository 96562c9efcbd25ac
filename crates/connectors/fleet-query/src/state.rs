//! Transient state used by the service.
//!
//! This is initialized on startup.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info_span, Instrument};

use fleet_query_configuration::{Configuration, PoolSettings};
use query_engine_execution::metrics;
use query_engine_execution::postgres::PostgresDataSource;
use query_engine_execution::query::DataSource;

/// State shared by every request handler.
#[derive(Clone)]
pub struct State {
    pub configuration: Arc<Configuration>,
    pub data_source: Arc<dyn DataSource>,
    pub metrics: metrics::Metrics,
    pub metrics_registry: prometheus::Registry,
    /// Set when the data source is PostgreSQL, so pool gauges can be refreshed.
    pub pool: Option<PgPool>,
}

/// Create a connection pool and wrap it inside a service State.
pub async fn create_state(
    configuration: Configuration,
    mut metrics_registry: prometheus::Registry,
) -> Result<State, InitializationError> {
    let pool = create_pool(&configuration.connection_uri, &configuration.pool_settings)
        .instrument(info_span!(
            "Create connection pool",
            max_connections = configuration.pool_settings.max_connections,
        ))
        .await
        .map_err(InitializationError::UnableToCreatePool)?;

    let metrics = async {
        let metrics_inner = metrics::Metrics::initialize(&mut metrics_registry)
            .map_err(InitializationError::MetricsError)?;
        metrics_inner.update_pool_metrics(&pool);
        Ok(metrics_inner)
    }
    .instrument(info_span!("Setup metrics"))
    .await?;

    let data_source = PostgresDataSource::new(pool.clone(), configuration.consistent_snapshot);

    Ok(State {
        configuration: Arc::new(configuration),
        data_source: Arc::new(data_source),
        metrics,
        metrics_registry,
        pool: Some(pool),
    })
}

/// Wrap an already constructed data source, such as an in-memory one, inside a State.
pub fn create_state_with_data_source(
    configuration: Configuration,
    data_source: Arc<dyn DataSource>,
    mut metrics_registry: prometheus::Registry,
) -> Result<State, InitializationError> {
    let metrics = metrics::Metrics::initialize(&mut metrics_registry)
        .map_err(InitializationError::MetricsError)?;
    Ok(State {
        configuration: Arc::new(configuration),
        data_source,
        metrics,
        metrics_registry,
        pool: None,
    })
}

/// Create a connection pool with the configured settings.
async fn create_pool(connection_uri: &str, settings: &PoolSettings) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.pool_timeout))
        .idle_timeout(settings.idle_timeout.map(Duration::from_secs))
        .max_lifetime(settings.connection_lifetime.map(Duration::from_secs))
        .connect(connection_uri)
        .await
}

/// State initialization error.
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("unable to initialize connection pool: {0}")]
    UnableToCreatePool(sqlx::Error),
    #[error("error initializing metrics: {0}")]
    MetricsError(prometheus::Error),
}
