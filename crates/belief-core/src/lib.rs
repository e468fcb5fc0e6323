//! Epistemic Propagation Engine Library
//!
//! Belief dynamics on weighted social networks: agents hold a belief in
//! [0, 1] and update synchronously from their neighbors, weighted by trust,
//! homophily and their own resistance.

pub mod components;
pub mod config;
pub mod error;
pub mod output;
pub mod runner;
pub mod setup;
pub mod systems;

pub use components::*;
pub use config::Config;
pub use error::{ConfigError, NetworkError, RunError};
pub use runner::{run_scenario, RunOptions, RunReport};
pub use setup::{lookup, Scenario, ScenarioEntry, SCENARIOS};
pub use systems::{IsolationPolicy, StepOutcome, UpdateParams};
