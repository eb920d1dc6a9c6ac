//! Engagement decision snapshots produced by the policy gate.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::identifiers::{EntityId, PackKey};

/// The engagement decision. `Suppress` is terminal; constraints attached to
/// `AllowWithConstraints` are free-form tone/content directives for the
/// outreach surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "constraints")]
pub enum Decision {
    Allow,
    AllowWithConstraints(Vec<String>),
    Suppress,
}

impl Decision {
    /// Stable string form used for storage and projection rows.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::AllowWithConstraints(_) => "allow_with_constraints",
            Self::Suppress => "suppress",
        }
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppress)
    }
}

/// Why the gate decided what it decided. First matching stage wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    /// A core hard ban fired. Not overridable by any pack field.
    CoreBan,
    /// A pack-declared blocked signal was present.
    PackBlocklist,
    /// A pack-declared co-occurrence rule matched.
    ProhibitedCombination,
    /// A downgrade rule attached constraints.
    Downgrade,
    /// No rule matched; default allow.
    Clear,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CoreBan => "core_ban",
            Self::PackBlocklist => "pack_blocklist",
            Self::ProhibitedCombination => "prohibited_combination",
            Self::Downgrade => "downgrade",
            Self::Clear => "clear",
        }
    }
}

/// Sensitivity classification for surfaces that must display it.
/// Assigned independently of allow/suppress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityLevel {
    #[default]
    Standard,
    Elevated,
    High,
}

impl SensitivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Elevated => "elevated",
            Self::High => "high",
        }
    }
}

/// The policy gate's output for one entity as of one date under one pack.
///
/// Unique per `(entity_id, as_of, pack)`; reruns upsert. Derived
/// deterministically from the score snapshot, pack policy, and cadence state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionSnapshot {
    pub entity_id: EntityId,
    pub as_of: NaiveDate,
    pub pack: PackKey,
    pub decision: Decision,
    pub reason_code: ReasonCode,
    pub sensitivity: SensitivityLevel,
    /// `1 - Σ(weight_i × stress_index_i)`, clamped to [0, 1]. Recorded even
    /// when the decision is suppress, for audit.
    pub stability_modifier: f64,
    /// Recommendation band name; `None` when suppressed.
    pub band: Option<String>,
}
