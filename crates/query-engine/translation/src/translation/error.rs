//! Errors for list request translation.

/// A type for translation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Collection '{0}' not found.")]
    CollectionNotFound(String),
    #[error("Column '{0}' not found in collection '{1}'.")]
    ColumnNotFoundInCollection(String, String),
    #[error("Relationship '{0}' not found in collection '{1}'.")]
    RelationshipNotFound(String, String),
    #[error("Included relationship '{0}' not found in collection '{1}'.")]
    IncludeNotFound(String, String),
}

impl Error {
    /// Whether the request named something that does not exist, as opposed to the
    /// service being configured with names that do not exist.
    pub fn is_invalid_parameter(&self) -> bool {
        match self {
            Error::CollectionNotFound(_)
            | Error::ColumnNotFoundInCollection(_, _)
            | Error::RelationshipNotFound(_, _) => true,
            Error::IncludeNotFound(_, _) => false,
        }
    }
}
