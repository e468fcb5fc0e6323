//! Shared record types and serialization for the epistemic engine.
//!
//! This crate contains pure data structures with no simulation logic.
//! The engine writes these; anything downstream (plotting, analysis)
//! only ever reads them.

pub mod snapshot;
pub mod trajectory;

// Re-export snapshot types
pub use snapshot::{AgentSnapshot, EdgeSnapshot, NetworkSnapshot};

// Re-export trajectory types
pub use trajectory::{MetricsRecord, PolarizationRecord, RunSummary, StepRecord, Trajectory};
