//! Score snapshots and their explain payloads.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants;

use super::identifiers::{EntityId, FactId, PackKey, SignalId};

/// The four readiness dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Momentum,
    Complexity,
    Pressure,
    LeadershipGap,
}

impl Dimension {
    pub fn all() -> &'static [Dimension] {
        &[
            Self::Momentum,
            Self::Complexity,
            Self::Pressure,
            Self::LeadershipGap,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Momentum => "momentum",
            Self::Complexity => "complexity",
            Self::Pressure => "pressure",
            Self::LeadershipGap => "leadership_gap",
        }
    }
}

/// Per-dimension scores, each clamped to 0..=100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub momentum: u8,
    pub complexity: u8,
    pub pressure: u8,
    pub leadership_gap: u8,
}

impl DimensionScores {
    pub fn get(&self, dimension: Dimension) -> u8 {
        match dimension {
            Dimension::Momentum => self.momentum,
            Dimension::Complexity => self.complexity,
            Dimension::Pressure => self.pressure,
            Dimension::LeadershipGap => self.leadership_gap,
        }
    }
}

/// Composite weights per dimension. Pack-overridable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionWeights {
    pub momentum: f64,
    pub complexity: f64,
    pub pressure: f64,
    pub leadership_gap: f64,
}

impl DimensionWeights {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Momentum => self.momentum,
            Dimension::Complexity => self.complexity,
            Dimension::Pressure => self.pressure,
            Dimension::LeadershipGap => self.leadership_gap,
        }
    }
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self {
            momentum: constants::DEFAULT_WEIGHT_MOMENTUM,
            complexity: constants::DEFAULT_WEIGHT_COMPLEXITY,
            pressure: constants::DEFAULT_WEIGHT_PRESSURE,
            leadership_gap: constants::DEFAULT_WEIGHT_LEADERSHIP_GAP,
        }
    }
}

/// One fact's contribution to one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub fact_id: FactId,
    pub signal_id: SignalId,
    pub dimension: Dimension,
    pub base_points: f64,
    pub decay: f64,
    pub confidence: f64,
    /// `base_points * decay * confidence`, before caps and clamping.
    pub points: f64,
}

/// Audit payload carried by every score snapshot.
///
/// Records the weights used, every input contribution, the top contributing
/// facts, any bucket caps that bit, and which disqualifiers fired. This is a
/// hard requirement, not optional telemetry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Explain {
    pub weights: DimensionWeights,
    pub contributions: Vec<Contribution>,
    pub top_contributors: Vec<Contribution>,
    pub disqualifiers_fired: Vec<SignalId>,
    pub caps_applied: Vec<String>,
}

/// A readiness score for one entity as of one date under one pack.
///
/// Unique per `(entity_id, as_of, pack)`; reruns upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub entity_id: EntityId,
    pub as_of: NaiveDate,
    pub pack: PackKey,
    pub dimensions: DimensionScores,
    pub composite: u8,
    pub disqualified: bool,
    pub explain: Explain,
}
