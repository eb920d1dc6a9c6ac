//! The Pulse pipeline engines.
//!
//! Data flow: facts → [`deriver`] → derived signals → [`scoring`] → score
//! snapshots → [`policy`] → decision snapshots → [`projector`] → ranked
//! feed rows. [`runner`] executes each stage as an independent batch with
//! per-entity fault isolation.
//!
//! Every function takes the resolved pack explicitly; there is no ambient
//! "current pack" anywhere.

pub mod deriver;
pub mod policy;
pub mod projector;
pub mod runner;
pub mod scoring;

pub use deriver::Deriver;
pub use policy::PolicyGate;
pub use runner::{EntityFailure, PipelineOutput, PipelineRunner, RunSummary};
pub use scoring::ReadinessScorer;
