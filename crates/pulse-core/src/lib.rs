//! Core types, errors, constants, and tracing setup for the Pulse
//! engagement-readiness engine.
//!
//! Everything downstream (packs, engine, storage) depends on this crate and
//! nothing here depends on them.

pub mod constants;
pub mod errors;
pub mod tracing;
pub mod types;
