//! v001: derived_signals, score_snapshots, decision_snapshots, feed_rows.
//!
//! Every key carries the pack id and version; the pack columns are part of
//! each primary key, never an afterthought filter.

use rusqlite::Connection;

pub fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS derived_signals (
            entity_id     TEXT NOT NULL,
            signal_id     TEXT NOT NULL,
            pack_id       TEXT NOT NULL,
            pack_version  TEXT NOT NULL,
            evidence      TEXT NOT NULL DEFAULT '[]',
            updated_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            PRIMARY KEY (entity_id, signal_id, pack_id, pack_version)
        );

        CREATE INDEX IF NOT EXISTS idx_signals_pack
            ON derived_signals(pack_id, pack_version);

        CREATE TABLE IF NOT EXISTS score_snapshots (
            entity_id     TEXT NOT NULL,
            as_of         TEXT NOT NULL,
            pack_id       TEXT NOT NULL,
            pack_version  TEXT NOT NULL,
            composite     INTEGER NOT NULL,
            disqualified  INTEGER NOT NULL DEFAULT 0,
            payload       TEXT NOT NULL,
            updated_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            PRIMARY KEY (entity_id, as_of, pack_id, pack_version)
        );

        CREATE INDEX IF NOT EXISTS idx_scores_pack_date
            ON score_snapshots(pack_id, pack_version, as_of);

        CREATE TABLE IF NOT EXISTS decision_snapshots (
            entity_id     TEXT NOT NULL,
            as_of         TEXT NOT NULL,
            pack_id       TEXT NOT NULL,
            pack_version  TEXT NOT NULL,
            decision      TEXT NOT NULL,
            reason_code   TEXT NOT NULL,
            payload       TEXT NOT NULL,
            updated_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            PRIMARY KEY (entity_id, as_of, pack_id, pack_version)
        );

        CREATE INDEX IF NOT EXISTS idx_decisions_pack_date
            ON decision_snapshots(pack_id, pack_version, as_of);

        CREATE TABLE IF NOT EXISTS feed_rows (
            tenant_id     TEXT NOT NULL,
            pack_id       TEXT NOT NULL,
            pack_version  TEXT NOT NULL,
            entity_id     TEXT NOT NULL,
            composite     INTEGER NOT NULL,
            top_reasons   TEXT NOT NULL DEFAULT '[]',
            decision      TEXT NOT NULL,
            last_seen     TEXT NOT NULL,
            PRIMARY KEY (tenant_id, pack_id, pack_version, entity_id)
        );

        CREATE INDEX IF NOT EXISTS idx_feed_rank
            ON feed_rows(tenant_id, pack_id, pack_version, composite DESC, entity_id ASC);
        ",
    )
}
