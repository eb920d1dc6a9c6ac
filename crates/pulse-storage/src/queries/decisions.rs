//! Decision snapshot rows, same keying discipline as score snapshots. The
//! decision kind and reason code are mirrored into columns so audit
//! queries can filter without touching the payload.

use chrono::NaiveDate;
use pulse_core::errors::StorageError;
use pulse_core::types::{DecisionSnapshot, EntityId, PackKey};
use rusqlite::{params, Connection, OptionalExtension};

use crate::to_storage_err;

pub fn upsert_decision_snapshot(
    conn: &Connection,
    snapshot: &DecisionSnapshot,
) -> Result<(), StorageError> {
    let payload = serde_json::to_string(snapshot).map_err(|e| to_storage_err(e.to_string()))?;
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO decision_snapshots
                 (entity_id, as_of, pack_id, pack_version, decision, reason_code, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (entity_id, as_of, pack_id, pack_version) DO UPDATE SET
                 decision = excluded.decision,
                 reason_code = excluded.reason_code,
                 payload = excluded.payload,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    stmt.execute(params![
        snapshot.entity_id.as_str(),
        snapshot.as_of.to_string(),
        snapshot.pack.id.as_str(),
        snapshot.pack.version,
        snapshot.decision.kind(),
        snapshot.reason_code.as_str(),
        payload,
    ])
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn load_decision_snapshot(
    conn: &Connection,
    entity_id: &EntityId,
    as_of: NaiveDate,
    pack: &PackKey,
) -> Result<Option<DecisionSnapshot>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT payload FROM decision_snapshots
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

pub fn load_decision_snapshots(
    conn: &Connection,
    pack: &PackKey,
    as_of: NaiveDate,
) -> Result<Vec<DecisionSnapshot>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT entity_id, payload FROM decision_snapshots
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

fn parse_payload(json: &str, key: &str) -> Result<DecisionSnapshot, StorageError> {
    serde_json::from_str(json).map_err(|e| StorageError::CorruptColumn {
        column: "payload",
        key: key.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use pulse_core::types::{Decision, ReasonCode, SensitivityLevel};

    use super::*;
    use crate::open_in_memory;

    fn snapshot(entity: &str, decision: Decision, reason_code: ReasonCode) -> DecisionSnapshot {
        DecisionSnapshot {
            entity_id: EntityId::new(entity),
            as_of: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            pack: PackKey::new("default", "1"),
            decision,
            reason_code,
            sensitivity: SensitivityLevel::Standard,
            stability_modifier: 1.0,
            band: Some("engage_standard".into()),
        }
    }

    #[test]
    fn test_decision_round_trip_and_overwrite() {
        let conn = open_in_memory().unwrap();
        upsert_decision_snapshot(&conn, &snapshot("acme", Decision::Allow, ReasonCode::Clear))
            .unwrap();
        upsert_decision_snapshot(
            &conn,
            &snapshot(
                "acme",
                Decision::AllowWithConstraints(vec!["no urgency framing".into()]),
                ReasonCode::Downgrade,
            ),
        )
        .unwrap();

        let pack = PackKey::new("default", "1");
        let as_of = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let loaded = load_decision_snapshot(&conn, &EntityId::new("acme"), as_of, &pack)
            .unwrap()
            .expect("stored decision");
        assert_eq!(loaded.reason_code, ReasonCode::Downgrade);
        match loaded.decision {
            Decision::AllowWithConstraints(constraints) => {
                assert_eq!(constraints, vec!["no urgency framing".to_string()]);
            }
            other => panic!("expected constraints, got {other:?}"),
        }
        assert_eq!(
            load_decision_snapshots(&conn, &pack, as_of).unwrap().len(),
            1
        );
    }
}
