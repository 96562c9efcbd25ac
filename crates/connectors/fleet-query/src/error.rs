//! Errors reported to HTTP clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use query_engine_execution::error as execution;
use query_engine_translation::translation::error as translation;

/// Anything that can go wrong while serving a request.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Collection '{0}' is not exposed.")]
    UnknownCollection(String),
    #[error("{0}")]
    Translation(translation::Error),
    #[error("{0}")]
    Execution(execution::Error),
    #[error("unable to encode metrics: {0}")]
    Metrics(prometheus::Error),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::UnknownCollection(_) => StatusCode::NOT_FOUND,
            ServerError::Translation(err) if err.is_invalid_parameter() => StatusCode::BAD_REQUEST,
            ServerError::Execution(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ServerError::Translation(_) | ServerError::Execution(_) | ServerError::Metrics(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<translation::Error> for ServerError {
    fn from(err: translation::Error) -> Self {
        ServerError::Translation(err)
    }
}

impl From<execution::Error> for ServerError {
    fn from(err: execution::Error) -> Self {
        ServerError::Execution(err)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (
            status,
            Json(serde_json::json!({ "message": self.to_string() })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_are_bad_requests() {
        let err = ServerError::from(translation::Error::RelationshipNotFound(
            "foo".to_string(),
            "modeles".to_string(),
        ));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ServerError::UnknownCollection("foo".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn misconfigured_includes_are_server_errors() {
        let err = ServerError::from(translation::Error::IncludeNotFound(
            "gamme".to_string(),
            "modeles".to_string(),
        ));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn values_the_data_source_rejects_are_bad_requests() {
        let err = ServerError::from(execution::Error::Query(
            execution::QueryError::InvalidDate("soon".to_string()),
        ));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let err = ServerError::from(execution::Error::DB(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
