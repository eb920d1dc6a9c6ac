//! Score snapshot rows. Unique per `(entity, as_of, pack)`; reruns of the
//! same day overwrite in place. The full snapshot, explain payload
//! included, is stored as JSON; composite and disqualified are mirrored
//! into real columns for filtering.

use chrono::NaiveDate;
use pulse_core::errors::StorageError;
use pulse_core::types::{EntityId, PackKey, ScoreSnapshot};
use rusqlite::{params, Connection, OptionalExtension};

use crate::to_storage_err;

pub fn upsert_score_snapshot(
    conn: &Connection,
    snapshot: &ScoreSnapshot,
) -> Result<(), StorageError> {
    let payload = serde_json::to_string(snapshot).map_err(|e| to_storage_err(e.to_string()))?;
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO score_snapshots
                 (entity_id, as_of, pack_id, pack_version, composite, disqualified, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (entity_id, as_of, pack_id, pack_version) DO UPDATE SET
                 composite = excluded.composite,
                 disqualified = excluded.disqualified,
                 payload = excluded.payload,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    stmt.execute(params![
        snapshot.entity_id.as_str(),
        snapshot.as_of.to_string(),
        snapshot.pack.id.as_str(),
        snapshot.pack.version,
        snapshot.composite,
        snapshot.disqualified,
        payload,
    ])
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn load_score_snapshot(
    conn: &Connection,
    entity_id: &EntityId,
    as_of: NaiveDate,
    pack: &PackKey,
) -> Result<Option<ScoreSnapshot>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT payload FROM score_snapshots
             WHERE entity_id = ?1 AND as_of = ?2 AND pack_id = ?3 AND pack_version = ?4",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let payload: Option<String> = stmt
        .query_row(
            params![
                entity_id.as_str(),
                as_of.to_string(),
                pack.id.as_str(),
                pack.version,
            ],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    payload
        .map(|json| parse_payload(&json, entity_id.as_str()))
        .transpose()
}

/// All snapshots for one pack and date, entity order.
pub fn load_score_snapshots(
    conn: &Connection,
    pack: &PackKey,
    as_of: NaiveDate,
) -> Result<Vec<ScoreSnapshot>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT entity_id, payload FROM score_snapshots
             WHERE pack_id = ?1 AND pack_version = ?2 AND as_of = ?3
             ORDER BY entity_id",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let raw: Vec<(String, String)> = stmt
        .query_map(
            params![pack.id.as_str(), pack.version, as_of.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.iter()
        .map(|(entity, json)| parse_payload(json, entity))
        .collect()
}

fn parse_payload(json: &str, key: &str) -> Result<ScoreSnapshot, StorageError> {
    serde_json::from_str(json).map_err(|e| StorageError::CorruptColumn {
        column: "payload",
        key: key.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use pulse_core::types::{DimensionScores, Explain};

    use super::*;
    use crate::open_in_memory;

    fn snapshot(entity: &str, composite: u8) -> ScoreSnapshot {
        ScoreSnapshot {
            entity_id: EntityId::new(entity),
            as_of: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            pack: PackKey::new("default", "1"),
            dimensions: DimensionScores {
                momentum: composite,
                ..DimensionScores::default()
            },
            composite,
            disqualified: false,
            explain: Explain::default(),
        }
    }

    #[test]
    fn test_rerun_overwrites_in_place() {
        let conn = open_in_memory().unwrap();
        upsert_score_snapshot(&conn, &snapshot("acme", 40)).unwrap();
        upsert_score_snapshot(&conn, &snapshot("acme", 64)).unwrap();

        let pack = PackKey::new("default", "1");
        let as_of = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let all = load_score_snapshots(&conn, &pack, as_of).unwrap();
        assert_eq!(all.len(), 1, "rerun must overwrite, not duplicate");
        assert_eq!(all[0].composite, 64);

        let one = load_score_snapshot(&conn, &EntityId::new("acme"), as_of, &pack)
            .unwrap()
            .expect("stored snapshot");
        assert_eq!(one.dimensions.momentum, 64);
    }

    #[test]
    fn test_snapshots_are_pack_isolated() {
        let conn = open_in_memory().unwrap();
        upsert_score_snapshot(&conn, &snapshot("acme", 64)).unwrap();

        let as_of = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let other = PackKey::new("custom", "2");
        assert!(load_score_snapshot(&conn, &EntityId::new("acme"), as_of, &other)
            .unwrap()
            .is_none());
    }
}
