//! SQLite persistence for the Pulse pipeline.
//!
//! Four tables, one per pipeline artifact: `derived_signals`,
//! `score_snapshots`, `decision_snapshots`, `feed_rows`. Every key includes
//! the pack id and version, so nothing written under one pack is ever
//! visible under another, and re-pinning a tenant touches no stored row.

pub mod connection;
pub mod migrations;
pub mod queries;

use pulse_core::errors::StorageError;

pub use connection::{open, open_in_memory};

/// Wrap a raw SQLite error message.
pub(crate) fn to_storage_err(message: String) -> StorageError {
    StorageError::SqliteError { message }
}
