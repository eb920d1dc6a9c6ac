//! Schema migrations, tracked via `PRAGMA user_version`.

mod v001_initial;

use pulse_core::errors::StorageError;
use rusqlite::Connection;
use tracing::info;

use crate::to_storage_err;

/// Latest schema version this build knows about.
pub const CURRENT_VERSION: u32 = 1;

/// Apply all migrations newer than the database's recorded version.
pub fn run(conn: &Connection) -> Result<(), StorageError> {
    let mut version = user_version(conn)?;
    while version < CURRENT_VERSION {
        let next = version + 1;
        apply(conn, next).map_err(|e| StorageError::MigrationFailed {
            version: next,
            message: e.to_string(),
        })?;
        set_user_version(conn, next)?;
        info!(version = next, "migration applied");
        version = next;
    }
    Ok(())
}

fn apply(conn: &Connection, version: u32) -> Result<(), rusqlite::Error> {
    match version {
        1 => v001_initial::migrate(conn),
        other => unreachable!("no migration registered for version {other}"),
    }
}

fn user_version(conn: &Connection) -> Result<u32, StorageError> {
    conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))
        .map_err(|e| to_storage_err(e.to_string()))
}

fn set_user_version(conn: &Connection, version: u32) -> Result<(), StorageError> {
    conn.pragma_update(None, "user_version", version)
        .map_err(|e| to_storage_err(e.to_string()))
}
