//! Error types for the table store

use crate::query::QueryErr;
use crate::storage::DataType;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Error, Debug)]
pub enum DbError {
    // Catalog errors
    #[error("Table already exists: {0}")]
    TableExists(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Column already exists: {table}.{column}")]
    ColumnExists { table: String, column: String },

    #[error("Column not found: {table}.{column}")]
    ColumnNotFound { table: String, column: String },

    // Type errors
    #[error("Type mismatch for column {column}: table holds {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        found: DataType,
    },

    #[error("Invalid value for {column} ({expected}): '{value}'")]
    InvalidValueType {
        column: String,
        expected: DataType,
        value: String,
    },

    // Query errors
    #[error(transparent)]
    Query(#[from] QueryErr),

    // Persistence errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed database file at line {line}: {reason}")]
    MalformedFile { line: usize, reason: String },
}

impl DbError {
    pub(crate) fn column_not_found(table: &str, column: &str) -> Self {
        DbError::ColumnNotFound {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}
