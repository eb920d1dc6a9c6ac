//! Raw fact records, as delivered by the ingestion collaborator.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::identifiers::{EntityId, FactId};

/// The whitelisted text fields a pattern rule may match against.
///
/// Pattern rules never see arbitrary payload fields; this struct is the
/// whole surface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactText {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub url: Option<String>,
    pub source_label: Option<String>,
}

/// A timestamped fact about an entity. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact {
    pub id: FactId,
    /// Absent when the ingestion layer could not attribute the fact.
    pub entity_id: Option<EntityId>,
    /// Provider that produced the fact.
    pub source: String,
    /// Provider-scoped event id, used for upstream deduplication.
    pub source_event_id: Option<String>,
    /// Candidate event type as labelled by the provider.
    pub event_type: String,
    pub occurred_at: DateTime<Utc>,
    pub text: FactText,
    /// Ingestion confidence in [0, 1].
    pub confidence: f64,
}

impl Fact {
    /// Deduplication key, present only when the provider supplied an event id.
    pub fn dedup_key(&self) -> Option<(&str, &str)> {
        self.source_event_id
            .as_deref()
            .map(|event_id| (self.source.as_str(), event_id))
    }

    /// Whole days between this fact and `as_of`. Negative for future facts.
    pub fn days_before(&self, as_of: NaiveDate) -> i64 {
        (as_of - self.occurred_at.date_naive()).num_days()
    }
}
