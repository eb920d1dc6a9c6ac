//! Connection lifecycle: open, configure, migrate.

pub mod pragmas;

use std::path::Path;

use pulse_core::errors::StorageError;
use rusqlite::Connection;
use tracing::info;

use crate::migrations;
use crate::to_storage_err;

/// Open (creating if needed) a database file, apply pragmas, and run any
/// pending migrations.
pub fn open(path: &Path) -> Result<Connection, StorageError> {
    let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
    pragmas::apply_pragmas(&conn)?;
    migrations::run(&conn)?;
    info!(path = %path.display(), "database opened");
    Ok(conn)
}

/// In-memory database with the full schema. Test and dry-run use.
pub fn open_in_memory() -> Result<Connection, StorageError> {
    let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
    pragmas::apply_pragmas(&conn)?;
    migrations::run(&conn)?;
    Ok(conn)
}
