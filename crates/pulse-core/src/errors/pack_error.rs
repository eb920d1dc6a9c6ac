//! Pack loading and validation errors.
//!
//! These are the fail-loud half of the pack contract: `load` surfaces them
//! with the offending field or reference named. The fail-soft half
//! (`resolve`) converts them into a logged `None`.

use super::error_code::{self, PulseErrorCode};

/// Errors raised while loading or validating a pack.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("Pack file not found: {path}")]
    FileNotFound { path: String },

    #[error("Pack parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Pack manifest field '{field}' is missing or empty")]
    MissingManifestField { field: String },

    #[error("Unsupported pack schema_version {version} (supported: 1, 2)")]
    UnsupportedSchemaVersion { version: u32 },

    #[error("Pack schema_version 2 requires an embedded taxonomy")]
    MissingTaxonomy,

    #[error("Pack schema_version 1 must not embed a taxonomy; the canonical taxonomy applies")]
    UnexpectedTaxonomy,

    #[error("Taxonomy has no signals")]
    EmptyTaxonomy,

    #[error("{section} references unknown signal '{signal}'")]
    DanglingSignal { section: String, signal: String },

    #[error("{section} references unknown bucket '{bucket}'")]
    DanglingBucket { section: String, bucket: String },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Pattern rule for '{signal}' is {length} chars, max {max}")]
    PatternTooLong {
        signal: String,
        length: usize,
        max: usize,
    },

    #[error("Pattern rule for '{signal}' is unsafe: {reason}")]
    UnsafePattern { signal: String, reason: String },

    #[error("Pattern rule for '{signal}' does not compile: {message}")]
    PatternCompile { signal: String, message: String },

    #[error("Recommendation bands must be strictly ordered by min_esl: {message}")]
    BandsNotOrdered { message: String },

    #[error("Unknown pack {key} (tenant pin or lookup against a pack that was never loaded)")]
    UnknownPack { key: String },
}

impl PulseErrorCode for PackError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::FileNotFound { .. } | Self::ParseError { .. } | Self::UnknownPack { .. } => {
                error_code::PACK_ERROR
            }
            _ => error_code::PACK_VALIDATION,
        }
    }
}
