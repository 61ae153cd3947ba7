//! Error types for chorm

use thiserror::Error;

/// The main error type for chorm operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database connection or driver error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A statement failed in the executor
    #[error("Failed to execute `{sql}` with {arg_count} argument(s): {source}")]
    Execution {
        sql: String,
        arg_count: usize,
        #[source]
        source: Box<Error>,
    },

    /// Invalid query configuration or input
    #[error("Invalid query: {message}")]
    Validation { message: String },

    /// A record type could not be described
    #[error("Schema error for '{record}': {message}")]
    Schema { record: String, message: String },

    /// Field lookup by name failed
    #[error("Field '{field}' not found on '{record}'")]
    FieldNotFound { record: String, field: String },

    /// A value could not be coerced into a field (strict policy only)
    #[error("Cannot coerce {value} into field '{field}' of type {target}")]
    Coercion {
        field: String,
        value: String,
        target: String,
    },

    /// A single-row fetch returned nothing
    #[error("No rows returned by `{sql}`")]
    RowNotFound { sql: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid client configuration
    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

/// Convenience Result type for chorm operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new schema error
    pub fn schema(record: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            record: record.into(),
            message: message.into(),
        }
    }

    /// Create a new field not found error
    pub fn field_not_found(record: impl Into<String>, field: impl Into<String>) -> Self {
        Self::FieldNotFound {
            record: record.into(),
            field: field.into(),
        }
    }

    /// Create a new coercion error
    pub fn coercion(
        field: impl Into<String>,
        value: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self::Coercion {
            field: field.into(),
            value: value.into(),
            target: target.into(),
        }
    }

    /// Create a new row not found error
    pub fn row_not_found(sql: impl Into<String>) -> Self {
        Self::RowNotFound { sql: sql.into() }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wrap an executor failure with the statement that caused it
    pub fn execution(sql: impl Into<String>, arg_count: usize, source: Error) -> Self {
        Self::Execution {
            sql: sql.into(),
            arg_count,
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = Error::validation("no data to update");
        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(err.to_string(), "Invalid query: no data to update");
    }

    #[test]
    fn test_schema_error() {
        let err = Error::schema("Event", "duplicate column 'id'");
        assert!(matches!(err, Error::Schema { .. }));
        assert_eq!(err.to_string(), "Schema error for 'Event': duplicate column 'id'");
    }

    #[test]
    fn test_field_not_found_error() {
        let err = Error::field_not_found("Event", "missing");
        assert_eq!(err.to_string(), "Field 'missing' not found on 'Event'");
    }

    #[test]
    fn test_execution_error_keeps_statement() {
        let inner = Error::config("connection refused");
        let err = Error::execution("SELECT * FROM events WHERE id = ?", 1, inner);
        let message = err.to_string();
        assert!(message.contains("SELECT * FROM events WHERE id = ?"));
        assert!(message.contains("1 argument(s)"));
        assert!(message.contains("connection refused"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_coercion_error() {
        let err = Error::coercion("age", "String(\"abc\")", "Int32");
        assert_eq!(
            err.to_string(),
            "Cannot coerce String(\"abc\") into field 'age' of type Int32"
        );
    }
}
