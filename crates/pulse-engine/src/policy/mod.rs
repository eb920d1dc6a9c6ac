//! Engagement policy gate: score snapshot + signals + cadence state →
//! decision snapshot.
//!
//! Stages run in fixed order, first match wins. The core hard bans run
//! before any pack rule and cannot be removed or weakened by pack config —
//! a pack that "allows" a banned signal still suppresses.

pub mod modifiers;

use pulse_core::constants;
use pulse_core::types::{
    Decision, DecisionSnapshot, EngagementContext, ReasonCode, ScoreSnapshot, SensitivityLevel,
    SignalId,
};
use pulse_packs::Pack;
use tracing::info;

/// Evaluates decisions under one resolved pack.
pub struct PolicyGate<'a> {
    pack: &'a Pack,
}

impl<'a> PolicyGate<'a> {
    pub fn new(pack: &'a Pack) -> Self {
        Self { pack }
    }

    /// Evaluate one entity's decision.
    ///
    /// `signal_ids` are the entity's derived signals under the same pack as
    /// `snapshot`. Sensitivity and the stability modifier are computed for
    /// every decision, including suppressions, for audit surfaces.
    pub fn evaluate(
        &self,
        snapshot: &ScoreSnapshot,
        signal_ids: &[SignalId],
        ctx: &EngagementContext,
    ) -> DecisionSnapshot {
        let policy = &self.pack.policy;
        let sensitivity = self.sensitivity(signal_ids);
        let sm = modifiers::stability_modifier(&ctx.stress, &policy.stress_weights);

        let (decision, reason_code) = self.decide(signal_ids);

        let band = if decision.is_suppressed() {
            None
        } else {
            let cm = modifiers::cadence_modifier(
                ctx.cadence.last_contact,
                snapshot.as_of,
                policy.cooldown_days,
            );
            let esl = modifiers::engageability(snapshot.composite, sm, cm, ctx.alignment);
            Some(modifiers::select_band(&self.pack.scoring.bands, esl, sm))
        };

        if decision.is_suppressed() {
            info!(
                entity = %snapshot.entity_id,
                reason = reason_code.as_str(),
                "engagement suppressed"
            );
        }

        DecisionSnapshot {
            entity_id: snapshot.entity_id.clone(),
            as_of: snapshot.as_of,
            pack: snapshot.pack.clone(),
            decision,
            reason_code,
            sensitivity,
            stability_modifier: sm,
            band,
        }
    }

    /// The ordered decision stages.
    fn decide(&self, signal_ids: &[SignalId]) -> (Decision, ReasonCode) {
        let policy = &self.pack.policy;

        // Stage 1: core hard bans. Pack config is not consulted.
        if signal_ids
            .iter()
            .any(|s| constants::is_core_banned(s.as_str()))
        {
            return (Decision::Suppress, ReasonCode::CoreBan);
        }

        // Stage 2: pack blocklist.
        if signal_ids.iter().any(|s| policy.blocked_signals.contains(s)) {
            return (Decision::Suppress, ReasonCode::PackBlocklist);
        }

        // Stage 3: prohibited combinations (all members co-occur).
        for combo in &policy.prohibited_combinations {
            if !combo.is_empty() && combo.iter().all(|s| signal_ids.contains(s)) {
                return (Decision::Suppress, ReasonCode::ProhibitedCombination);
            }
        }

        // Stage 4: downgrade rules attach constraints.
        let mut constraints: Vec<String> = Vec::new();
        for rule in &policy.downgrades {
            if signal_ids.contains(&rule.when_signal) {
                constraints.extend(rule.constraints.iter().cloned());
            }
        }
        if !constraints.is_empty() {
            return (
                Decision::AllowWithConstraints(constraints),
                ReasonCode::Downgrade,
            );
        }

        // Stage 6: default.
        (Decision::Allow, ReasonCode::Clear)
    }

    /// Stage 5, independent of allow/suppress: highest mapped level wins.
    fn sensitivity(&self, signal_ids: &[SignalId]) -> SensitivityLevel {
        self.pack
            .policy
            .sensitivity
            .iter()
            .filter(|rule| signal_ids.contains(&rule.signal_id))
            .map(|rule| rule.level)
            .max()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pulse_core::types::{
        CadenceState, DimensionScores, EntityId, Explain, PackKey, StressIndices,
    };
    use pulse_packs::{default_pack, PolicyConfig};

    use super::*;

    fn snapshot(composite: u8) -> ScoreSnapshot {
        ScoreSnapshot {
            entity_id: EntityId::new("acme"),
            as_of: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            pack: PackKey::new("default", "1"),
            dimensions: DimensionScores {
                momentum: composite,
                complexity: composite,
                pressure: composite,
                leadership_gap: composite,
            },
            composite,
            disqualified: false,
            explain: Explain::default(),
        }
    }

    fn ids(names: &[&str]) -> Vec<SignalId> {
        names.iter().map(|n| SignalId::new(*n)).collect()
    }

    #[test]
    fn test_core_ban_cannot_be_overridden_by_pack() {
        // A pack that empties every policy list still cannot allow a
        // core-banned signal.
        let mut pack = default_pack();
        pack.policy = PolicyConfig {
            blocked_signals: Vec::new(),
            prohibited_combinations: Vec::new(),
            downgrades: Vec::new(),
            sensitivity: Vec::new(),
            ..PolicyConfig::default()
        };
        let gate = PolicyGate::new(&pack);
        let decision = gate.evaluate(
            &snapshot(90),
            &ids(&["legal.sanctions_match", "momentum.funding_round"]),
            &EngagementContext::default(),
        );
        assert_eq!(decision.decision, Decision::Suppress);
        assert_eq!(decision.reason_code, ReasonCode::CoreBan);
        assert!(decision.band.is_none());
    }

    #[test]
    fn test_pack_blocklist_suppresses() {
        let pack = default_pack();
        let gate = PolicyGate::new(&pack);
        let decision = gate.evaluate(
            &snapshot(80),
            &ids(&["distress.mass_layoffs"]),
            &EngagementContext::default(),
        );
        assert_eq!(decision.decision, Decision::Suppress);
        assert_eq!(decision.reason_code, ReasonCode::PackBlocklist);
        // Sensitivity is still assigned on suppressed decisions.
        assert_eq!(decision.sensitivity, SensitivityLevel::High);
    }

    #[test]
    fn test_prohibited_combination_requires_co_occurrence() {
        let pack = default_pack();
        let gate = PolicyGate::new(&pack);

        let partial = gate.evaluate(
            &snapshot(80),
            &ids(&["pressure.funding_runway"]),
            &EngagementContext::default(),
        );
        assert_ne!(partial.reason_code, ReasonCode::ProhibitedCombination);

        let full = gate.evaluate(
            &snapshot(80),
            &ids(&["pressure.funding_runway", "leadership.cfo_vacancy"]),
            &EngagementContext::default(),
        );
        assert_eq!(full.decision, Decision::Suppress);
        assert_eq!(full.reason_code, ReasonCode::ProhibitedCombination);
    }

    #[test]
    fn test_downgrade_attaches_constraints() {
        let pack = default_pack();
        let gate = PolicyGate::new(&pack);
        let decision = gate.evaluate(
            &snapshot(80),
            &ids(&["pressure.compliance_finding"]),
            &EngagementContext::default(),
        );
        match &decision.decision {
            Decision::AllowWithConstraints(constraints) => {
                assert_eq!(constraints.len(), 2);
            }
            other => panic!("expected constraints, got {other:?}"),
        }
        assert_eq!(decision.reason_code, ReasonCode::Downgrade);
        assert_eq!(decision.sensitivity, SensitivityLevel::Elevated);
    }

    #[test]
    fn test_default_allow() {
        let pack = default_pack();
        let gate = PolicyGate::new(&pack);
        let decision = gate.evaluate(
            &snapshot(80),
            &ids(&["momentum.funding_round"]),
            &EngagementContext::default(),
        );
        assert_eq!(decision.decision, Decision::Allow);
        assert_eq!(decision.reason_code, ReasonCode::Clear);
        assert_eq!(decision.band.as_deref(), Some("engage_now"));
    }

    #[test]
    fn test_stability_cap_bounds_band() {
        let pack = default_pack();
        let gate = PolicyGate::new(&pack);
        // SM = 1 - 0.4*0.875 = 0.65 with default stress weights.
        let ctx = EngagementContext {
            cadence: CadenceState::default(),
            stress: StressIndices {
                volatility: 0.875,
                sustained_pressure: 0.0,
                communication_instability: 0.0,
            },
            alignment: 1.0,
        };
        let decision = gate.evaluate(&snapshot(100), &ids(&["momentum.funding_round"]), &ctx);
        assert!((decision.stability_modifier - 0.65).abs() < 1e-10);
        // Otherwise-maximal ESL is capped at the second most conservative band.
        assert_eq!(decision.band.as_deref(), Some("nurture"));
    }

    #[test]
    fn test_cooldown_collapses_band() {
        let pack = default_pack();
        let gate = PolicyGate::new(&pack);
        let ctx = EngagementContext {
            cadence: CadenceState {
                last_contact: NaiveDate::from_ymd_opt(2026, 5, 31),
            },
            ..EngagementContext::default()
        };
        let decision = gate.evaluate(&snapshot(100), &ids(&["momentum.funding_round"]), &ctx);
        // Contacted yesterday: CM ≈ 1/21, ESL near zero.
        assert_eq!(decision.band.as_deref(), Some("observe"));
    }
}
