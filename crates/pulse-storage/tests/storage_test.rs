//! File-backed round trips: everything a pipeline run writes must survive
//! a close and reopen, and a tenant re-pin must not disturb stored rows.

use chrono::NaiveDate;
use pulse_core::types::{
    Decision, DecisionSnapshot, DerivedSignal, DimensionScores, EntityId, Explain, FactId,
    PackKey, ProjectionRow, ReasonCode, ScoreSnapshot, SensitivityLevel, TenantId,
};
use pulse_storage::queries::{decisions, projection, signals, snapshots};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
}

fn pack() -> PackKey {
    PackKey::new("default", "1")
}

fn sample_signal() -> DerivedSignal {
    DerivedSignal {
        entity_id: EntityId::new("acme"),
        signal_id: "momentum.funding_round".into(),
        pack: pack(),
        evidence: [FactId::new("f1"), FactId::new("f2")].into(),
    }
}

fn sample_score() -> ScoreSnapshot {
    ScoreSnapshot {
        entity_id: EntityId::new("acme"),
        as_of: as_of(),
        pack: pack(),
        dimensions: DimensionScores {
            momentum: 80,
            complexity: 60,
            pressure: 40,
            leadership_gap: 80,
        },
        composite: 64,
        disqualified: false,
        explain: Explain::default(),
    }
}

fn sample_decision() -> DecisionSnapshot {
    DecisionSnapshot {
        entity_id: EntityId::new("acme"),
        as_of: as_of(),
        pack: pack(),
        decision: Decision::Allow,
        reason_code: ReasonCode::Clear,
        sensitivity: SensitivityLevel::Standard,
        stability_modifier: 1.0,
        band: Some("engage_standard".into()),
    }
}

fn sample_row() -> ProjectionRow {
    ProjectionRow {
        tenant_id: TenantId::new("t1"),
        pack: pack(),
        entity_id: EntityId::new("acme"),
        composite: 64,
        top_reasons: vec!["leadership.cfo_vacancy (+80.0)".into()],
        decision: "allow".into(),
        last_seen: as_of(),
    }
}

#[test]
fn test_artifacts_survive_reopen() {
    pulse_core::tracing::init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pulse.db");

    {
        let conn = pulse_storage::open(&path).unwrap();
        signals::upsert_signal(&conn, &sample_signal()).unwrap();
        snapshots::upsert_score_snapshot(&conn, &sample_score()).unwrap();
        decisions::upsert_decision_snapshot(&conn, &sample_decision()).unwrap();
        projection::replace_rows(&conn, &TenantId::new("t1"), &pack(), &[sample_row()]).unwrap();
    }

    let conn = pulse_storage::open(&path).unwrap();

    let loaded_signals = signals::load_pack_signals(&conn, &pack()).unwrap();
    assert_eq!(loaded_signals.len(), 1);
    assert_eq!(loaded_signals[0].evidence.len(), 2);

    let score = snapshots::load_score_snapshot(&conn, &EntityId::new("acme"), as_of(), &pack())
        .unwrap()
        .expect("score snapshot persisted");
    assert_eq!(score.composite, 64);
    assert_eq!(score.dimensions.pressure, 40);

    let decision =
        decisions::load_decision_snapshot(&conn, &EntityId::new("acme"), as_of(), &pack())
            .unwrap()
            .expect("decision snapshot persisted");
    assert_eq!(decision.decision, Decision::Allow);
    assert_eq!(decision.band.as_deref(), Some("engage_standard"));

    let rows = projection::top_rows(&conn, &TenantId::new("t1"), &pack(), 50).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].top_reasons, vec!["leadership.cfo_vacancy (+80.0)"]);
}

#[test]
fn test_repin_writes_beside_old_rows_not_over_them() {
    // A tenant moving to a new pack version writes a parallel slice; the
    // old pack's rows stay untouched until a run under the new pack
    // replaces the feed being read.
    let conn = pulse_storage::open_in_memory().unwrap();
    let tenant = TenantId::new("t1");
    let v1 = pack();
    let v2 = PackKey::new("default", "2");

    snapshots::upsert_score_snapshot(&conn, &sample_score()).unwrap();
    let mut rescored = sample_score();
    rescored.pack = v2.clone();
    rescored.composite = 51;
    snapshots::upsert_score_snapshot(&conn, &rescored).unwrap();

    let old = snapshots::load_score_snapshot(&conn, &EntityId::new("acme"), as_of(), &v1)
        .unwrap()
        .expect("v1 snapshot intact");
    assert_eq!(old.composite, 64);
    let new = snapshots::load_score_snapshot(&conn, &EntityId::new("acme"), as_of(), &v2)
        .unwrap()
        .expect("v2 snapshot written");
    assert_eq!(new.composite, 51);
}
