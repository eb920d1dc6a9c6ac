//! Deriver errors.

use super::error_code::{self, PulseErrorCode};

/// Errors raised while compiling derivation rules.
///
/// Match-time problems (timeouts) are not errors: they are logged and
/// treated as non-matches so a pathological pattern cannot abort a batch.
#[derive(Debug, thiserror::Error)]
pub enum DeriveError {
    #[error("Pattern rule for '{signal}' failed to compile: {message}")]
    PatternCompile { signal: String, message: String },
}

impl PulseErrorCode for DeriveError {
    fn error_code(&self) -> &'static str {
        error_code::DERIVE_ERROR
    }
}
