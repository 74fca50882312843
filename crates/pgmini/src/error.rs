//! Error types for pgmini

use thiserror::Error;

/// Result type alias for pgmini operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by pgmini helpers and [`Db`](crate::Db) implementations.
///
/// [`Error::NoRows`] is the only "expected" failure: it signals that a
/// fetch-one query matched nothing. Every other variant is a query error
/// (see [`Error::is_query_error`]).
#[derive(Debug, Error)]
pub enum Error {
    /// A fetch-one query returned no rows
    #[error("no rows in result set")]
    NoRows,

    /// Error reported by tokio-postgres, carried as-is
    #[error("query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row decode/mapping error
    #[error("decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Invalid connection parameters
    #[error("connection error: {0}")]
    Connection(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("pool error: {0}")]
    Pool(String),

    /// Backend error from a non-Postgres `Db` implementation
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is the "no rows" error
    pub fn is_no_rows(&self) -> bool {
        matches!(self, Self::NoRows)
    }

    /// Check if this is any failure other than [`Error::NoRows`]
    pub fn is_query_error(&self) -> bool {
        !self.is_no_rows()
    }

    /// Check if this is a decode error
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// The server-side error, if the backend rejected the statement.
    pub fn as_db_error(&self) -> Option<&tokio_postgres::error::DbError> {
        match self {
            Self::Query(err) => err.as_db_error(),
            _ => None,
        }
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for Error {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
