//! Errors raised while running a list plan.

use thiserror::Error;

/// Errors that occur while running a plan against a data source.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Query(QueryError),
    #[error("database error: {0}")]
    DB(sqlx::Error),
    #[error("malformed row: {0}")]
    MalformedRow(String),
}

/// Errors evaluating a plan over records held in memory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("invalid input value for type {r#type}: \"{value}\"")]
    InvalidValue { value: String, r#type: String },
    #[error("invalid input value for type date: \"{0}\"")]
    InvalidDate(String),
}

impl Error {
    /// Whether the request carried a value the data source could not use.
    ///
    /// PostgreSQL reports these as data exceptions (SQLSTATE class `22`) or as
    /// syntax errors and undefined objects (class `42`).
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::Query(_) => true,
            Error::DB(sqlx::Error::Database(error)) => error
                .code()
                .is_some_and(|code| code.starts_with("22") || code.starts_with("42")),
            Error::DB(_) | Error::MalformedRow(_) => false,
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Error {
        Error::DB(err)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Error {
        Error::Query(err)
    }
}
