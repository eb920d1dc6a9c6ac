//! Denormalized, rank-ready feed rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::identifiers::{EntityId, PackKey, TenantId};

/// One entity's row in a tenant's feed.
///
/// Unique per `(tenant_id, pack, entity_id)`. Rebuilt, never appended, on
/// each projector run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRow {
    pub tenant_id: TenantId,
    pub pack: PackKey,
    pub entity_id: EntityId,
    pub composite: u8,
    /// Human-readable reasons taken from the snapshot's top contributors.
    pub top_reasons: Vec<String>,
    /// Stable decision kind string (`allow` / `allow_with_constraints`).
    pub decision: String,
    pub last_seen: NaiveDate,
}
