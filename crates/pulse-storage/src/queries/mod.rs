//! Query modules, one per table. Free functions over `&Connection`;
//! callers own transaction boundaries except where noted.

pub mod decisions;
pub mod projection;
pub mod signals;
pub mod snapshots;
