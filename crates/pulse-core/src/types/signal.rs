//! Derived signals: canonical observations produced by the deriver.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::identifiers::{EntityId, FactId, PackKey, SignalId};

/// A canonical signal derived from one or more facts.
///
/// Unique per `(entity_id, signal_id, pack)`. Reruns union the evidence set,
/// never replace it, so traceability survives reprocessing. The evidence is
/// an ordered set: equality and serialization are order-independent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedSignal {
    pub entity_id: EntityId,
    pub signal_id: SignalId,
    pub pack: PackKey,
    pub evidence: BTreeSet<FactId>,
}

impl DerivedSignal {
    pub fn new(entity_id: EntityId, signal_id: SignalId, pack: PackKey) -> Self {
        Self {
            entity_id,
            signal_id,
            pack,
            evidence: BTreeSet::new(),
        }
    }

    /// Union another evidence set into this signal.
    pub fn merge_evidence(&mut self, other: impl IntoIterator<Item = FactId>) {
        self.evidence.extend(other);
    }
}
