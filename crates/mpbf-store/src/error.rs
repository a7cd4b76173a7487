//! Error types for the store crate.

use thiserror::Error;

/// Errors from the relational store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database failure (connectivity, constraint violation).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The targeted record does not exist.
    #[error("record not found in {table}: {id}")]
    NotFound { table: &'static str, id: i64 },

    /// A parameter required by the statement is missing or has the wrong
    /// shape. The gate normally catches this first; this is the last
    /// line of defense at the write boundary.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

impl StoreError {
    pub fn missing(field: &str) -> Self {
        Self::InvalidParameters(format!("missing field: {field}"))
    }
}
