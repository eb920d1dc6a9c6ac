//! Deriver engine: raw facts → canonical derived signals.
//!
//! Passthrough rules run first (O(1) per fact), pattern rules second. A
//! `(entity, signal)` pair produced by multiple rules collapses into one
//! signal with a unioned evidence set, which also makes derivation
//! idempotent: rerunning over the same facts yields the same signal set.

mod matcher;
mod rules;

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::time::Duration;

use pulse_core::constants;
use pulse_core::errors::DeriveError;
use pulse_core::types::{DerivedSignal, EntityId, Fact, FactId, PackKey, SignalId};
use pulse_packs::DerivationRules;
use tracing::debug;

pub use matcher::BoundedMatcher;
pub use rules::{CompiledPattern, CompiledRuleSet};

/// Stateful deriver for one pack's rule set.
pub struct Deriver {
    ruleset: CompiledRuleSet,
    matcher: BoundedMatcher,
}

impl Deriver {
    /// Compile the pack's derivation rules. Patterns were already vetted at
    /// pack validation; compilation failure here still surfaces as an error
    /// rather than a panic.
    pub fn new(rules: &DerivationRules) -> Result<Self, DeriveError> {
        Ok(Self {
            ruleset: CompiledRuleSet::compile(rules)?,
            matcher: BoundedMatcher::new(Duration::from_millis(constants::MATCH_TIMEOUT_MS)),
        })
    }

    /// Override the per-match timeout (tests).
    pub fn with_match_timeout(mut self, timeout: Duration) -> Self {
        self.matcher = BoundedMatcher::new(timeout);
        self
    }

    /// Derive signals for a batch of facts under `pack`.
    ///
    /// Facts without an entity are skipped. Pattern match attempts are
    /// bounded by the matcher's timeout; a timeout counts as no match and
    /// never aborts the batch.
    pub fn derive(&mut self, facts: &[Fact], pack: &PackKey) -> Vec<DerivedSignal> {
        let mut acc: BTreeMap<(EntityId, SignalId), BTreeSet<FactId>> = BTreeMap::new();

        for fact in facts {
            let entity = match &fact.entity_id {
                Some(entity) => entity,
                None => {
                    debug!(fact = %fact.id, "fact has no entity attribution; skipped");
                    continue;
                }
            };

            if let Some(signal_id) = self.ruleset.passthrough.get(&fact.event_type) {
                acc.entry((entity.clone(), signal_id.clone()))
                    .or_default()
                    .insert(fact.id.clone());
            }

            for rule in &self.ruleset.patterns {
                if let Some(min) = rule.min_confidence {
                    if fact.confidence < min {
                        continue;
                    }
                }
                let haystack = rule.haystack(&fact.text);
                if haystack.is_empty() {
                    continue;
                }
                if self.matcher.is_match(&rule.signal_id, &rule.regex, &haystack) {
                    acc.entry((entity.clone(), rule.signal_id.clone()))
                        .or_default()
                        .insert(fact.id.clone());
                }
            }
        }

        acc.into_iter()
            .map(|((entity_id, signal_id), evidence)| DerivedSignal {
                entity_id,
                signal_id,
                pack: pack.clone(),
                evidence,
            })
            .collect()
    }
}
