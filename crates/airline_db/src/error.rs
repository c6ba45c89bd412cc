//! Error types for the database client

use airline_common::AirlineError;
use thiserror::Error;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// Error with database transaction
    #[error("Database transaction error: {0}")]
    TransactionError(String),

    /// A stored value could not be mapped onto the domain model
    #[error("Invalid stored value: {0}")]
    DecodeError(String),
}

impl DbError {
    /// True when the statement was rejected by a unique constraint or index.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DbError::SqlxError(sqlx::Error::Database(e)) => e.is_unique_violation(),
            _ => false,
        }
    }
}

/// Maps a failed statement, keeping the driver error for constraint inspection.
pub(crate) fn query_error(e: sqlx::Error) -> DbError {
    match e {
        sqlx::Error::Database(_) => DbError::SqlxError(e),
        other => DbError::QueryError(other.to_string()),
    }
}

impl From<DbError> for AirlineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConfigError(msg) | DbError::UrlError(msg) => AirlineError::ConfigError(msg),
            other => AirlineError::DatabaseError(other.to_string()),
        }
    }
}
