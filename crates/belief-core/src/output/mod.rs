//! Output Generation
//!
//! Per-step recording, run summaries and the JSON files written after a run.

pub mod files;
pub mod stats;

pub use files::*;
pub use stats::*;
