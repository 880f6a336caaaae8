//! Error types for Tabula
//!
//! Provides a unified error type for all operations. Every failure inside the
//! core is surfaced as a typed `TabulaError`; nothing in the library panics on
//! bad input or bad files.

use thiserror::Error;

use crate::schema::{DataType, Value};

/// Result type alias using TabulaError
pub type Result<T> = std::result::Result<T, TabulaError>;

/// Unified error type for Tabula operations
#[derive(Debug, Error)]
pub enum TabulaError {
    // -------------------------------------------------------------------------
    // Parse Errors
    // -------------------------------------------------------------------------
    #[error("Syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    // -------------------------------------------------------------------------
    // Schema Resolution Errors
    // -------------------------------------------------------------------------
    #[error("Table '{0}' does not exist")]
    UnknownTable(String),

    #[error("Column '{column}' does not exist in table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("Column reference '{0}' is ambiguous")]
    AmbiguousColumn(String),

    #[error("Table '{0}' already exists")]
    DuplicateTable(String),

    #[error("Column '{column}' appears more than once for table '{table}'")]
    DuplicateColumn { table: String, column: String },

    #[error("Invalid schema for table '{table}': {reason}")]
    InvalidSchema { table: String, reason: String },

    #[error("Table '{table}' expects {expected} value(s), got {found}")]
    ColumnCountMismatch {
        table: String,
        expected: usize,
        found: usize,
    },

    // -------------------------------------------------------------------------
    // Validation Errors
    // -------------------------------------------------------------------------
    #[error("Type mismatch for column '{column}': expected {expected}, got {found}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        found: &'static str,
    },

    #[error("Constraint violation on '{table}.{column}': value {value} already exists")]
    ConstraintViolation {
        table: String,
        column: String,
        value: Value,
    },

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Storage for table '{table}' is corrupt: {reason}")]
    CorruptStorage { table: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TabulaError {
    /// Shorthand for building a syntax error
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        TabulaError::Syntax {
            position,
            message: message.into(),
        }
    }

    /// Shorthand for building a corrupt-storage error
    pub(crate) fn corrupt(table: &str, reason: impl Into<String>) -> Self {
        TabulaError::CorruptStorage {
            table: table.to_string(),
            reason: reason.into(),
        }
    }
}
