//! Health check endpoint for the service.

use axum::http::StatusCode;

use crate::state::State;

/// Check that the data source can be reached.
pub async fn health_check(state: &State) -> StatusCode {
    match state.data_source.health_check().await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(err) => {
            tracing::error!(error = %err, "health check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
