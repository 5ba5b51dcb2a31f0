//! Error types for the binaries and the storage-facing layer.
//!
//! The derivation functions in `signals` and `hygiene::mojibake` are total
//! and never produce these. Errors come from config loading and SQLite.

use std::path::PathBuf;

use thiserror::Error;

use crate::db::DbError;

#[derive(Debug, Error)]
pub enum LeadError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not found at {0}")]
    ConfigNotFound(PathBuf),

    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl LeadError {
    /// SQLite busy/locked conditions clear up on their own.
    pub fn is_retryable(&self) -> bool {
        match self {
            LeadError::Db(DbError::Sqlite(rusqlite::Error::SqliteFailure(err, _))) => matches!(
                err.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            LeadError::Config(_) | LeadError::Json(_) => {
                "Check the JSON in ~/.leadsignals/config.json"
            }
            LeadError::ConfigNotFound(_) => {
                "Create ~/.leadsignals/config.json (an empty {} uses defaults)"
            }
            LeadError::Io(_) => "Check file permissions and disk space.",
            LeadError::Db(_) if self.is_retryable() => {
                "The database is busy. Try again in a moment."
            }
            LeadError::Db(_) => "Check the database path and that migrations can run.",
            LeadError::InvalidArgument(_) => "Run with --help to see accepted arguments.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_is_retryable() {
        let err = LeadError::Db(DbError::Sqlite(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        )));
        assert!(err.is_retryable());
        assert_eq!(
            err.recovery_suggestion(),
            "The database is busy. Try again in a moment."
        );
    }

    #[test]
    fn test_config_errors_not_retryable() {
        let err = LeadError::Config("bad".to_string());
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_json_error_converts() {
        let parse: Result<crate::types::Config, _> = serde_json::from_str("{not json");
        let err: LeadError = parse.unwrap_err().into();
        assert!(matches!(err, LeadError::Json(_)));
    }
}
