//! Query error types
//!
//! Rendering never fails. These errors only come from turning text into typed
//! query parts: operators, relations, fill values, and query documents.

use thiserror::Error;

/// Errors that can occur while interpreting textual query input
#[derive(Error, Debug)]
pub enum QueryError {
    /// Comparison operator is not one InfluxQL understands
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    /// Condition join relation is neither `and` nor `or`
    #[error("Invalid relation: {0}")]
    InvalidRelation(String),

    /// Sort order is neither `asc` nor `desc`
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// fill() value is neither a number nor a known fill strategy
    #[error("Invalid fill: {0}")]
    InvalidFill(String),

    /// Query document could not be parsed
    #[error("Invalid query document: {0}")]
    InvalidDocument(String),

    /// Query document could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::InvalidDocument(err.to_string())
    }
}

impl From<toml::de::Error> for QueryError {
    fn from(err: toml::de::Error) -> Self {
        QueryError::InvalidDocument(err.to_string())
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
