//! Errors that can be thrown when processing configuration.

use std::path::PathBuf;

/// The errors that can be thrown when reading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ParseConfigurationError {
    #[error("parse error on {file_path}:{line}:{column}: {message}")]
    ParseError {
        file_path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("unsupported configuration version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("empty connection URI")]
    EmptyConnectionUri { file_path: PathBuf },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("I/O error: {0}")]
    IoErrorButStringified(String),
}

/// The errors that can be thrown when turning a parsed configuration into
/// the one the service runs with.
#[derive(Debug, thiserror::Error)]
pub enum MakeRuntimeConfigurationError {
    #[error("missing environment variable when processing {file_path}: {message}")]
    MissingEnvironmentVariable { file_path: PathBuf, message: String },

    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("endpoint '{endpoint}': {message}")]
    InvalidEndpoint { endpoint: String, message: String },

    #[error("invalid pagination settings: {0}")]
    InvalidPagination(String),
}
