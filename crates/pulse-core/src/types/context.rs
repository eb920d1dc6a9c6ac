//! Inputs to the policy gate that come from outside the scoring pipeline:
//! outreach cadence, volatility indices, and alignment.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Outreach-history state for one entity, supplied by the outreach
/// collaborator. Used only by the policy gate.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CadenceState {
    /// Date of the most recent contact, if any.
    pub last_contact: Option<NaiveDate>,
}

/// Volatility and pressure indices, each in [0, 1].
///
/// Higher means more stressed. These only ever dampen engagement; they can
/// never make a recommendation more aggressive.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StressIndices {
    pub volatility: f64,
    pub sustained_pressure: f64,
    pub communication_instability: f64,
}

/// Everything the policy gate needs beyond the score snapshot and the pack.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngagementContext {
    pub cadence: CadenceState,
    pub stress: StressIndices,
    /// Alignment modifier in [0, 1]; 1.0 when unknown.
    pub alignment: f64,
}

impl Default for EngagementContext {
    fn default() -> Self {
        Self {
            cadence: CadenceState::default(),
            stress: StressIndices::default(),
            alignment: 1.0,
        }
    }
}
