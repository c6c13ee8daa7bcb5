//! Error types for the loot audit

use thiserror::Error;

/// Result type alias using the audit's error
pub type Result<T> = std::result::Result<T, AuditError>;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Could not connect to database: {0}")]
    Connection(String),

    #[error("Database credentials not found: {0}")]
    CredentialMissing(String),

    #[error("Database credentials are malformed: {0}")]
    CredentialMalformed(String),

    #[error("Query failed: {message}\n  query: {sql}")]
    Query { sql: String, message: String },

    #[error("Invalid level band: min level {min} is above max level {max}")]
    InvalidBand { min: i64, max: i64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AuditError {
    pub fn query(sql: &str, err: impl std::fmt::Display) -> Self {
        AuditError::Query {
            sql: sql.to_string(),
            message: err.to_string(),
        }
    }
}
