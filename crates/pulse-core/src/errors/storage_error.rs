//! Storage errors.

use super::error_code::{self, PulseErrorCode};

/// Errors raised by the SQLite persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Migration to version {version} failed: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("Corrupt {column} column for {key}: {message}")]
    CorruptColumn {
        column: &'static str,
        key: String,
        message: String,
    },
}

impl PulseErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MigrationFailed { .. } => error_code::MIGRATION_ERROR,
            _ => error_code::STORAGE_ERROR,
        }
    }
}
