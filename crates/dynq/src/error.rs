//! Error types for dynq

use thiserror::Error;

/// Result type alias for dynq operations
pub type DynqResult<T> = Result<T, DynqError>;

/// Error types for dynamic queries.
///
/// There are two kinds of failure:
/// - [`DynqError::InvalidArgument`] is raised before any SQL is built, when
///   caller input breaks a syntactic rule.
/// - Every other variant comes from the database side and is passed through
///   without classification or retry (see [`DynqError::is_execution_failure`]).
#[derive(Debug, Error)]
pub enum DynqError {
    /// Caller-supplied table/column/condition/pagination data was rejected
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Query execution error reported by the driver
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// A returned column could not be represented as a [`Value`](crate::Value)
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),
}

impl DynqError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this error was raised by input validation
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this error originated while executing against the database
    pub fn is_execution_failure(&self) -> bool {
        !self.is_invalid_argument()
    }

    /// The SQLSTATE code reported by the server, if any.
    pub fn sqlstate(&self) -> Option<&str> {
        match self {
            Self::Query(err) => err.as_db_error().map(|db| db.code().code()),
            _ => None,
        }
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for DynqError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_is_not_execution_failure() {
        let err = DynqError::invalid_argument("Limit must be greater than 0");
        assert!(err.is_invalid_argument());
        assert!(!err.is_execution_failure());
        assert_eq!(
            err.to_string(),
            "Invalid argument: Limit must be greater than 0"
        );
    }

    #[test]
    fn decode_is_execution_failure() {
        let err = DynqError::decode("location", "unsupported column type point");
        assert!(err.is_execution_failure());
        assert!(err.sqlstate().is_none());
        assert_eq!(
            err.to_string(),
            "Decode error on column 'location': unsupported column type point"
        );
    }
}
