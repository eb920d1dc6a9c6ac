//! Per-concern error enums and stable error codes.

pub mod derive_error;
pub mod error_code;
pub mod pack_error;
pub mod stage_error;
pub mod storage_error;

pub use derive_error::DeriveError;
pub use error_code::PulseErrorCode;
pub use pack_error::PackError;
pub use stage_error::StageError;
pub use storage_error::StorageError;
