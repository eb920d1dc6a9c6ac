//! Feed projector: snapshots → denormalized, rank-ready rows per tenant.

use pulse_core::types::{
    DecisionSnapshot, EntityId, PackKey, ProjectionRow, ScoreSnapshot, TenantId,
};
use rustc_hash::FxHashMap;
use tracing::debug;

/// Build the feed rows for one `(tenant, pack)` from matching snapshot
/// pairs. Entities are excluded when their decision is suppress, when their
/// composite is below the pack's minimum threshold, or when either snapshot
/// is missing. Rows are ranked by composite descending, entity id as the
/// tiebreak for determinism.
pub fn project(
    tenant_id: &TenantId,
    pack: &PackKey,
    scores: &[ScoreSnapshot],
    decisions: &[DecisionSnapshot],
    minimum_threshold: u8,
) -> Vec<ProjectionRow> {
    let decision_index: FxHashMap<&EntityId, &DecisionSnapshot> = decisions
        .iter()
        .filter(|d| &d.pack == pack)
        .map(|d| (&d.entity_id, d))
        .collect();

    let mut rows: Vec<ProjectionRow> = Vec::new();
    for score in scores {
        if &score.pack != pack {
            debug!(entity = %score.entity_id, pack = %score.pack, "snapshot from another pack; ignored");
            continue;
        }
        let Some(decision) = decision_index.get(&score.entity_id) else {
            debug!(entity = %score.entity_id, "no decision snapshot; excluded from feed");
            continue;
        };
        if decision.decision.is_suppressed() {
            continue;
        }
        if score.composite < minimum_threshold {
            continue;
        }

        let top_reasons = score
            .explain
            .top_contributors
            .iter()
            .map(|c| format!("{} (+{:.1})", c.signal_id, c.points))
            .collect();

        rows.push(ProjectionRow {
            tenant_id: tenant_id.clone(),
            pack: pack.clone(),
            entity_id: score.entity_id.clone(),
            composite: score.composite,
            top_reasons,
            decision: decision.decision.kind().to_string(),
            last_seen: score.as_of,
        });
    }

    rows.sort_by(|a, b| {
        b.composite
            .cmp(&a.composite)
            .then_with(|| a.entity_id.cmp(&b.entity_id))
    });
    rows
}

/// Take the leading `n` rows of a ranked projection. Returns fewer when
/// fewer qualify; never pads.
pub fn top_n(rows: &[ProjectionRow], n: usize) -> &[ProjectionRow] {
    &rows[..rows.len().min(n)]
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pulse_core::types::{
        Decision, DimensionScores, Explain, ReasonCode, SensitivityLevel,
    };

    use super::*;

    fn pack() -> PackKey {
        PackKey::new("default", "1")
    }

    fn score(entity: &str, composite: u8) -> ScoreSnapshot {
        ScoreSnapshot {
            entity_id: EntityId::new(entity),
            as_of: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            pack: pack(),
            dimensions: DimensionScores::default(),
            composite,
            disqualified: false,
            explain: Explain::default(),
        }
    }

    fn decision(entity: &str, decision: Decision) -> DecisionSnapshot {
        DecisionSnapshot {
            entity_id: EntityId::new(entity),
            as_of: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            pack: pack(),
            decision,
            reason_code: ReasonCode::Clear,
            sensitivity: SensitivityLevel::Standard,
            stability_modifier: 1.0,
            band: Some("engage_standard".into()),
        }
    }

    #[test]
    fn test_projection_excludes_suppressed_and_below_threshold() {
        let scores = vec![score("a", 80), score("b", 70), score("c", 20)];
        let decisions = vec![
            decision("a", Decision::Allow),
            decision("b", Decision::Suppress),
            decision("c", Decision::Allow),
        ];
        let rows = project(&TenantId::new("t1"), &pack(), &scores, &decisions, 35);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entity_id.as_str(), "a");
    }

    #[test]
    fn test_projection_ranks_by_composite_then_entity() {
        let scores = vec![score("b", 70), score("a", 70), score("c", 90)];
        let decisions = vec![
            decision("a", Decision::Allow),
            decision("b", Decision::Allow),
            decision("c", Decision::Allow),
        ];
        let rows = project(&TenantId::new("t1"), &pack(), &scores, &decisions, 0);
        let order: Vec<&str> = rows.iter().map(|r| r.entity_id.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_top_n_never_pads() {
        let scores = vec![score("a", 80), score("b", 70)];
        let decisions = vec![
            decision("a", Decision::Allow),
            decision("b", Decision::Allow),
        ];
        let rows = project(&TenantId::new("t1"), &pack(), &scores, &decisions, 0);
        assert_eq!(top_n(&rows, 10).len(), 2);
        assert_eq!(top_n(&rows, 1).len(), 1);
    }

    #[test]
    fn test_projection_ignores_other_packs() {
        let mut foreign = score("a", 80);
        foreign.pack = PackKey::new("other", "2");
        let decisions = vec![decision("a", Decision::Allow)];
        let rows = project(&TenantId::new("t1"), &pack(), &[foreign], &decisions, 0);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_missing_decision_excludes_entity() {
        let scores = vec![score("a", 80)];
        let rows = project(&TenantId::new("t1"), &pack(), &scores, &[], 0);
        assert!(rows.is_empty());
    }
}
