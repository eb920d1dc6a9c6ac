//! Batch stage errors.

use super::derive_error::DeriveError;
use super::error_code::{self, PulseErrorCode};
use super::storage_error::StorageError;

/// A failure while processing one entity inside a batch stage.
///
/// Caught per entity: logged, collected into the run summary, and never
/// allowed to abort the batch.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("entity {entity} failed in {stage}: {message}")]
    EntityFailed {
        stage: &'static str,
        entity: String,
        message: String,
    },

    #[error(transparent)]
    Derive(#[from] DeriveError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl PulseErrorCode for StageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EntityFailed { .. } => error_code::STAGE_ERROR,
            Self::Derive(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
        }
    }
}
