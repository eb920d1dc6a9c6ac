//! Feed rows. The projection is a full rebuild each run: delete the
//! `(tenant, pack)` slice and insert the fresh rows in one transaction, so
//! readers never observe a half-replaced feed.

use chrono::NaiveDate;
use pulse_core::errors::StorageError;
use pulse_core::types::{EntityId, PackKey, ProjectionRow, TenantId};
use rusqlite::{params, Connection};

use crate::to_storage_err;

/// Replace the stored feed for one `(tenant, pack)` with `rows`.
pub fn replace_rows(
    conn: &Connection,
    tenant_id: &TenantId,
    pack: &PackKey,
    rows: &[ProjectionRow],
) -> Result<(), StorageError> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(e.to_string()))?;
    {
        let mut delete = tx
            .prepare_cached(
                "DELETE FROM feed_rows
                 WHERE tenant_id = ?1 AND pack_id = ?2 AND pack_version = ?3",
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
        delete
            .execute(params![tenant_id.as_str(), pack.id.as_str(), pack.version])
            .map_err(|e| to_storage_err(e.to_string()))?;

        let mut insert = tx
            .prepare_cached(
                "INSERT INTO feed_rows
                     (tenant_id, pack_id, pack_version, entity_id, composite,
                      top_reasons, decision, last_seen)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
        for row in rows {
            let reasons = serde_json::to_string(&row.top_reasons)
                .map_err(|e| to_storage_err(e.to_string()))?;
            insert
                .execute(params![
                    tenant_id.as_str(),
                    pack.id.as_str(),
                    pack.version,
                    row.entity_id.as_str(),
                    row.composite,
                    reasons,
                    row.decision,
                    row.last_seen.to_string(),
                ])
                .map_err(|e| to_storage_err(e.to_string()))?;
        }
    }
    tx.commit().map_err(|e| to_storage_err(e.to_string()))
}

/// The top `n` feed rows for one `(tenant, pack)`, ranked composite
/// descending with entity id as the tiebreak. Returns fewer than `n` when
/// fewer are stored.
pub fn top_rows(
    conn: &Connection,
    tenant_id: &TenantId,
    pack: &PackKey,
    n: usize,
) -> Result<Vec<ProjectionRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT entity_id, composite, top_reasons, decision, last_seen
             FROM feed_rows
             WHERE tenant_id = ?1 AND pack_id = ?2 AND pack_version = ?3
             ORDER BY composite DESC, entity_id ASC
             LIMIT ?4",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let raw: Vec<(String, u8, String, String, String)> = stmt
        .query_map(
            params![
                tenant_id.as_str(),
                pack.id.as_str(),
                pack.version,
                n as i64,
            ],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                ))
            },
        )
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;

    raw.into_iter()
        .map(|(entity, composite, reasons_json, decision, last_seen)| {
            let top_reasons: Vec<String> =
                serde_json::from_str(&reasons_json).map_err(|e| StorageError::CorruptColumn {
                    column: "top_reasons",
                    key: entity.clone(),
                    message: e.to_string(),
                })?;
            let last_seen: NaiveDate =
                last_seen.parse().map_err(|e: chrono::ParseError| {
                    StorageError::CorruptColumn {
                        column: "last_seen",
                        key: entity.clone(),
                        message: e.to_string(),
                    }
                })?;
            Ok(ProjectionRow {
                tenant_id: tenant_id.clone(),
                pack: pack.clone(),
                entity_id: EntityId::new(entity),
                composite,
                top_reasons,
                decision,
                last_seen,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::open_in_memory;

    fn row(entity: &str, composite: u8) -> ProjectionRow {
        ProjectionRow {
            tenant_id: TenantId::new("t1"),
            pack: PackKey::new("default", "1"),
            entity_id: EntityId::new(entity),
            composite,
            top_reasons: vec![format!("momentum.funding_round (+{composite}.0)")],
            decision: "allow".to_string(),
            last_seen: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
        }
    }

    #[test]
    fn test_replace_is_a_full_rebuild() {
        let conn = open_in_memory().unwrap();
        let tenant = TenantId::new("t1");
        let pack = PackKey::new("default", "1");

        replace_rows(&conn, &tenant, &pack, &[row("acme", 64), row("zenith", 45)]).unwrap();
        replace_rows(&conn, &tenant, &pack, &[row("acme", 70)]).unwrap();

        let rows = top_rows(&conn, &tenant, &pack, 50).unwrap();
        assert_eq!(rows.len(), 1, "stale rows must not survive a rebuild");
        assert_eq!(rows[0].composite, 70);
        assert_eq!(rows[0].top_reasons.len(), 1);
    }

    #[test]
    fn test_top_rows_ranked_and_limited() {
        let conn = open_in_memory().unwrap();
        let tenant = TenantId::new("t1");
        let pack = PackKey::new("default", "1");
        replace_rows(
            &conn,
            &tenant,
            &pack,
            &[row("b", 70), row("a", 70), row("c", 90)],
        )
        .unwrap();

        let rows = top_rows(&conn, &tenant, &pack, 2).unwrap();
        let order: Vec<&str> = rows.iter().map(|r| r.entity_id.as_str()).collect();
        assert_eq!(order, vec!["c", "a"]);
    }

    #[test]
    fn test_feed_is_tenant_and_pack_scoped() {
        let conn = open_in_memory().unwrap();
        let pack = PackKey::new("default", "1");
        replace_rows(&conn, &TenantId::new("t1"), &pack, &[row("acme", 64)]).unwrap();

        assert!(top_rows(&conn, &TenantId::new("t2"), &pack, 50)
            .unwrap()
            .is_empty());
        assert!(
            top_rows(&conn, &TenantId::new("t1"), &PackKey::new("custom", "2"), 50)
                .unwrap()
                .is_empty()
        );
    }
}
