//! Derived signal rows. Evidence accumulates across runs: an upsert unions
//! the incoming evidence set with what is already stored, so re-deriving a
//! batch never loses previously attributed facts.

use std::collections::BTreeSet;

use pulse_core::errors::StorageError;
use pulse_core::types::{DerivedSignal, EntityId, FactId, PackKey, SignalId};
use rusqlite::{params, Connection, OptionalExtension};

use crate::to_storage_err;

/// Insert or update one signal, unioning evidence with any stored row.
///
/// Read-merge-write; run inside the caller's transaction when upserting a
/// batch.
pub fn upsert_signal(conn: &Connection, signal: &DerivedSignal) -> Result<(), StorageError> {
    let mut select = conn
        .prepare_cached(
            "SELECT evidence FROM derived_signals
             WHERE entity_id = ?1 AND signal_id = ?2 AND pack_id = ?3 AND pack_version = ?4",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let existing: Option<String> = select
        .query_row(
            params![
                signal.entity_id.as_str(),
                signal.signal_id.as_str(),
                signal.pack.id.as_str(),
                signal.pack.version,
            ],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut evidence = signal.evidence.clone();
    if let Some(json) = existing {
        let stored: BTreeSet<FactId> =
            serde_json::from_str(&json).map_err(|e| StorageError::CorruptColumn {
                column: "evidence",
                key: format!("{}/{}", signal.entity_id, signal.signal_id),
                message: e.to_string(),
            })?;
        evidence.extend(stored);
    }
    let evidence_json =
        serde_json::to_string(&evidence).map_err(|e| to_storage_err(e.to_string()))?;

    let mut upsert = conn
        .prepare_cached(
            "INSERT INTO derived_signals (entity_id, signal_id, pack_id, pack_version, evidence)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (entity_id, signal_id, pack_id, pack_version) DO UPDATE SET
                 evidence = excluded.evidence,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    upsert
        .execute(params![
            signal.entity_id.as_str(),
            signal.signal_id.as_str(),
            signal.pack.id.as_str(),
            signal.pack.version,
            evidence_json,
        ])
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// All of one entity's signals under one pack.
pub fn load_entity_signals(
    conn: &Connection,
    entity_id: &EntityId,
    pack: &PackKey,
) -> Result<Vec<DerivedSignal>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT entity_id, signal_id, evidence FROM derived_signals
             WHERE entity_id = ?1 AND pack_id = ?2 AND pack_version = ?3
             ORDER BY signal_id",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let raw = stmt
        .query_map(
            params![entity_id.as_str(), pack.id.as_str(), pack.version],
            row_tuple,
        )
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.into_iter().map(|t| into_signal(t, pack)).collect()
}

/// Every signal stored under one pack, all entities.
pub fn load_pack_signals(
    conn: &Connection,
    pack: &PackKey,
) -> Result<Vec<DerivedSignal>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT entity_id, signal_id, evidence FROM derived_signals
             WHERE pack_id = ?1 AND pack_version = ?2
             ORDER BY entity_id, signal_id",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let raw = stmt
        .query_map(params![pack.id.as_str(), pack.version], row_tuple)
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.into_iter().map(|t| into_signal(t, pack)).collect()
}

fn row_tuple(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, String, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn into_signal(
    (entity, signal, evidence_json): (String, String, String),
    pack: &PackKey,
) -> Result<DerivedSignal, StorageError> {
    let evidence: BTreeSet<FactId> =
        serde_json::from_str(&evidence_json).map_err(|e| StorageError::CorruptColumn {
            column: "evidence",
            key: format!("{entity}/{signal}"),
            message: e.to_string(),
        })?;
    Ok(DerivedSignal {
        entity_id: EntityId::new(entity),
        signal_id: SignalId::new(signal),
        pack: pack.clone(),
        evidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::open_in_memory;

    fn signal(entity: &str, signal_id: &str, facts: &[&str]) -> DerivedSignal {
        DerivedSignal {
            entity_id: EntityId::new(entity),
            signal_id: SignalId::new(signal_id),
            pack: PackKey::new("default", "1"),
            evidence: facts.iter().map(|f| FactId::new(*f)).collect(),
        }
    }

    #[test]
    fn test_upsert_unions_evidence() {
        let conn = open_in_memory().unwrap();
        upsert_signal(&conn, &signal("acme", "momentum.funding_round", &["f1"])).unwrap();
        upsert_signal(&conn, &signal("acme", "momentum.funding_round", &["f2"])).unwrap();

        let pack = PackKey::new("default", "1");
        let loaded = load_entity_signals(&conn, &EntityId::new("acme"), &pack).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].evidence.len(), 2, "evidence must union, not replace");
    }

    #[test]
    fn test_signals_are_pack_isolated() {
        let conn = open_in_memory().unwrap();
        upsert_signal(&conn, &signal("acme", "momentum.funding_round", &["f1"])).unwrap();

        let other = PackKey::new("custom", "2");
        assert!(load_entity_signals(&conn, &EntityId::new("acme"), &other)
            .unwrap()
            .is_empty());
        assert_eq!(load_pack_signals(&conn, &PackKey::new("default", "1")).unwrap().len(), 1);
    }
}
