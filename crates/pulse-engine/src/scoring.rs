//! Readiness scoring engine: derived signals → multi-dimension, time-decayed
//! composite score snapshots.
//!
//! Three of the four dimensions are additive: each evidence fact contributes
//! `base_points × decay(age) × confidence`, bucket caps bite before the
//! 0..=100 clamp. Leadership gap is state-based: the most recent qualifying
//! signal sets the magnitude and countervailing signals subtract from it.
//! Disqualifiers override everything.

use chrono::NaiveDate;
use pulse_core::constants;
use pulse_core::types::{
    Contribution, DerivedSignal, Dimension, DimensionScores, EntityId, Explain, Fact, FactId,
    PackKey, ScoreSnapshot, SignalId,
};
use pulse_packs::Pack;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Scores entities under one resolved pack.
pub struct ReadinessScorer<'a> {
    pack: &'a Pack,
}

impl<'a> ReadinessScorer<'a> {
    pub fn new(pack: &'a Pack) -> Self {
        Self { pack }
    }

    /// Compute the score snapshot for one entity as of one date.
    ///
    /// `facts` is the evidence window; `signals` the entity's derived
    /// signals. Signals from other entities or other packs are ignored, so
    /// a caller bug cannot leak state across isolation boundaries.
    pub fn compute(
        &self,
        entity_id: &EntityId,
        as_of: NaiveDate,
        facts: &[Fact],
        signals: &[DerivedSignal],
    ) -> ScoreSnapshot {
        let pack_key = self.pack.key();
        let fact_index: FxHashMap<&FactId, &Fact> = facts.iter().map(|f| (&f.id, f)).collect();

        let mut contributions: Vec<Contribution> = Vec::new();
        // Additive points per (dimension, bucket).
        let mut bucket_sums: FxHashMap<(Dimension, Option<String>), f64> = FxHashMap::default();
        // Leadership events, ordered later: (date, fact, signal, magnitude, countervailing).
        let mut leadership: Vec<(NaiveDate, FactId, SignalId, f64, bool)> = Vec::new();
        let mut disqualifiers_fired: Vec<SignalId> = Vec::new();

        for signal in signals {
            if &signal.entity_id != entity_id || signal.pack != pack_key {
                debug!(
                    signal = %signal.signal_id,
                    entity = %signal.entity_id,
                    pack = %signal.pack,
                    "signal outside this entity/pack; ignored"
                );
                continue;
            }
            let Some(def) = self.pack.taxonomy.get(&signal.signal_id) else {
                debug!(signal = %signal.signal_id, "signal not in taxonomy; ignored");
                continue;
            };

            let in_window = signal.evidence.iter().any(|fact_id| {
                fact_index.get(fact_id).is_some_and(|fact| {
                    let days = fact.days_before(as_of);
                    (0..=constants::SCORING_WINDOW_DAYS).contains(&days)
                })
            });
            if in_window && self.pack.scoring.disqualifiers.contains(&signal.signal_id) {
                disqualifiers_fired.push(signal.signal_id.clone());
            }

            for fact_id in &signal.evidence {
                let Some(fact) = fact_index.get(fact_id) else {
                    debug!(fact = %fact_id, "evidence fact missing from window; skipped");
                    continue;
                };
                let days = fact.days_before(as_of);

                match self.pack.scoring.decay.curve(def.dimension) {
                    Some(curve) => {
                        let decay = curve.factor(days);
                        if decay <= 0.0 {
                            continue;
                        }
                        let points = def.base_points * decay * fact.confidence;
                        contributions.push(Contribution {
                            fact_id: fact.id.clone(),
                            signal_id: signal.signal_id.clone(),
                            dimension: def.dimension,
                            base_points: def.base_points,
                            decay,
                            confidence: fact.confidence,
                            points,
                        });
                        *bucket_sums
                            .entry((def.dimension, def.bucket.clone()))
                            .or_insert(0.0) += points;
                    }
                    None => {
                        // Leadership gap: magnitude, no time decay.
                        if days < 0 {
                            continue;
                        }
                        let magnitude = def.base_points * fact.confidence;
                        leadership.push((
                            fact.occurred_at.date_naive(),
                            fact.id.clone(),
                            signal.signal_id.clone(),
                            magnitude,
                            def.countervailing,
                        ));
                        contributions.push(Contribution {
                            fact_id: fact.id.clone(),
                            signal_id: signal.signal_id.clone(),
                            dimension: Dimension::LeadershipGap,
                            base_points: def.base_points,
                            decay: 1.0,
                            confidence: fact.confidence,
                            points: if def.countervailing { -magnitude } else { magnitude },
                        });
                    }
                }
            }
        }

        let mut caps_applied: Vec<String> = Vec::new();
        let mut dim_totals: FxHashMap<Dimension, f64> = FxHashMap::default();
        // Deterministic cap reporting: iterate caps in pack order.
        for ((dimension, bucket), sum) in {
            let mut entries: Vec<_> = bucket_sums.into_iter().collect();
            entries.sort_by(|a, b| a.0 .1.cmp(&b.0 .1).then(a.0 .0.name().cmp(b.0 .0.name())));
            entries
        } {
            let mut capped = sum;
            if let Some(bucket_name) = &bucket {
                if let Some(cap) = self
                    .pack
                    .scoring
                    .caps
                    .iter()
                    .find(|c| &c.bucket == bucket_name)
                {
                    if sum > cap.max_points {
                        capped = cap.max_points;
                        caps_applied
                            .push(format!("bucket '{bucket_name}': {sum:.1} -> {capped:.1}"));
                    }
                }
            }
            *dim_totals.entry(dimension).or_insert(0.0) += capped;
        }

        // Leadership state machine: chronological, latest set wins,
        // countervailing subtracts, floored at zero.
        leadership.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
        let mut gap_state = 0.0_f64;
        for (_, _, _, magnitude, countervailing) in &leadership {
            if *countervailing {
                gap_state = (gap_state - magnitude).max(0.0);
            } else {
                gap_state = *magnitude;
            }
        }
        dim_totals.insert(Dimension::LeadershipGap, gap_state);

        let clamp = |v: f64| v.round().clamp(0.0, 100.0) as u8;
        let dimensions = DimensionScores {
            momentum: clamp(dim_totals.get(&Dimension::Momentum).copied().unwrap_or(0.0)),
            complexity: clamp(dim_totals.get(&Dimension::Complexity).copied().unwrap_or(0.0)),
            pressure: clamp(dim_totals.get(&Dimension::Pressure).copied().unwrap_or(0.0)),
            leadership_gap: clamp(
                dim_totals
                    .get(&Dimension::LeadershipGap)
                    .copied()
                    .unwrap_or(0.0),
            ),
        };

        let weights = self.pack.scoring.weights;
        let disqualified = !disqualifiers_fired.is_empty();
        let composite = if disqualified {
            0
        } else {
            let weighted: f64 = Dimension::all()
                .iter()
                .map(|&d| weights.get(d) * f64::from(dimensions.get(d)))
                .sum();
            clamp(weighted)
        };

        let mut top = contributions.clone();
        top.sort_by(|a, b| {
            b.points
                .partial_cmp(&a.points)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.fact_id.cmp(&b.fact_id))
        });
        top.truncate(constants::TOP_CONTRIBUTORS);

        disqualifiers_fired.sort();
        disqualifiers_fired.dedup();

        ScoreSnapshot {
            entity_id: entity_id.clone(),
            as_of,
            pack: pack_key,
            dimensions,
            composite,
            disqualified,
            explain: Explain {
                weights,
                contributions,
                top_contributors: top,
                disqualifiers_fired,
                caps_applied,
            },
        }
    }
}
