//! Typed records for every stage of the pipeline: facts in, derived signals,
//! score snapshots, decision snapshots, and projection rows out.

pub mod context;
pub mod decision;
pub mod fact;
pub mod identifiers;
pub mod projection;
pub mod signal;
pub mod snapshot;

pub use context::{CadenceState, EngagementContext, StressIndices};
pub use decision::{Decision, DecisionSnapshot, ReasonCode, SensitivityLevel};
pub use fact::{Fact, FactText};
pub use identifiers::{EntityId, FactId, PackId, PackKey, SignalId, TenantId};
pub use projection::ProjectionRow;
pub use signal::DerivedSignal;
pub use snapshot::{
    Contribution, Dimension, DimensionScores, DimensionWeights, Explain, ScoreSnapshot,
};
