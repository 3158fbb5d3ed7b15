//! Error types for sqlkit

use thiserror::Error;

/// Result type alias for sqlkit operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for statement generation and execution
#[derive(Debug, Error)]
pub enum OrmError {
    /// Error reported by the execution backend, forwarded unchanged
    #[error("Driver error: {0}")]
    Driver(String),

    /// Query execution error from tokio-postgres
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Unique constraint violation (e.g. two upserts racing on the same key)
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Column metadata could not be loaded for a write
    #[error("Table \"{table}\" not found")]
    TableNotFound { table: String },

    /// No primary or unique column of the table is present in the row
    #[error("Can not write to \"{table}\": no primary or unique key specified")]
    MissingKeySpec { table: String },

    /// The filter compiled to an empty predicate
    #[error("Can not {operation} \"{table}\": \"where\" parameter is empty")]
    EmptyPredicate {
        table: String,
        operation: &'static str,
    },

    /// Validation error (e.g. an UPDATE with nothing to SET)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },
}

impl OrmError {
    /// Create a driver error from any displayable backend error
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn table_not_found(table: impl Into<String>) -> Self {
        Self::TableNotFound {
            table: table.into(),
        }
    }

    pub fn missing_key_spec(table: impl Into<String>) -> Self {
        Self::MissingKeySpec {
            table: table.into(),
        }
    }

    pub fn empty_predicate(table: impl Into<String>, operation: &'static str) -> Self {
        Self::EmptyPredicate {
            table: table.into(),
            operation,
        }
    }

    /// Check if this is a table-not-found error
    pub fn is_table_not_found(&self) -> bool {
        matches!(self, Self::TableNotFound { .. })
    }

    /// Check if this is a missing-key error
    pub fn is_missing_key_spec(&self) -> bool {
        matches!(self, Self::MissingKeySpec { .. })
    }

    /// Check if this is an empty-predicate error
    pub fn is_empty_predicate(&self) -> bool {
        matches!(self, Self::EmptyPredicate { .. })
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Errors raised by the statement generator itself rather than the backend.
    ///
    /// These are the ones mirrored to [`QueryMonitor::on_error`](crate::monitor::QueryMonitor::on_error).
    pub fn is_generator_error(&self) -> bool {
        self.is_table_not_found() || self.is_missing_key_spec() || self.is_empty_predicate()
    }

    /// Parse a tokio_postgres error into a more specific OrmError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            if db_err.code().code() == "23505" {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return Self::UniqueViolation(format!("{}: {}", constraint, db_err.message()));
            }
        }
        Self::Query(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for OrmError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_errors_are_classified() {
        assert!(OrmError::table_not_found("t").is_generator_error());
        assert!(OrmError::missing_key_spec("t").is_generator_error());
        assert!(OrmError::empty_predicate("t", "delete from").is_generator_error());
        assert!(!OrmError::driver("boom").is_generator_error());
    }

    #[test]
    fn messages_name_the_table() {
        assert_eq!(
            OrmError::empty_predicate("users", "delete from").to_string(),
            "Can not delete from \"users\": \"where\" parameter is empty"
        );
        assert_eq!(
            OrmError::table_not_found("ghost").to_string(),
            "Table \"ghost\" not found"
        );
    }
}
