//! Scenario Setup
//!
//! Graph generators and the preset scenarios built from them.

pub mod scenarios;
pub mod topology;

pub use scenarios::{
    lookup, scenario_keys, ExternalEvidence, RunPlan, Rewiring, Scenario, ScenarioConfigs,
    ScenarioEntry, SCENARIOS,
};
