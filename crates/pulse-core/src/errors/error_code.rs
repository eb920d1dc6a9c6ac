//! Stable error code strings, attached to every error for logs and
//! batch summaries.

pub const PACK_ERROR: &str = "PULSE_PACK";
pub const PACK_VALIDATION: &str = "PULSE_PACK_VALIDATION";
pub const DERIVE_ERROR: &str = "PULSE_DERIVE";
pub const STAGE_ERROR: &str = "PULSE_STAGE";
pub const STORAGE_ERROR: &str = "PULSE_STORAGE";
pub const MIGRATION_ERROR: &str = "PULSE_MIGRATION";

/// Every Pulse error maps to a stable string code.
pub trait PulseErrorCode {
    fn error_code(&self) -> &'static str;
}
