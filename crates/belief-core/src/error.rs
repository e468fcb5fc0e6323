//! Error types for the belief network and the scenario runner.

use thiserror::Error;

use crate::components::agent::AgentId;

/// Errors raised by graph construction and the update rule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    /// An edge or query referenced an agent that does not exist
    #[error("agent {agent} does not exist")]
    InvalidReference { agent: AgentId },
    /// Belief, resistance, trust or anchor value outside [0, 1] (or not finite)
    #[error("{field} must be within [0, 1], got {value}")]
    OutOfRange { field: &'static str, value: f64 },
    /// An edge from an agent to itself
    #[error("agent {agent} cannot be connected to itself")]
    SelfLoop { agent: AgentId },
    /// An unanchored agent has no source of influence and the policy rejects it
    #[error("agent {agent} has no neighbors")]
    DegreeZero { agent: AgentId },
    /// Update parameters outside their valid domain
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error parsing TOML config
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Error writing config back out as TOML
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Errors surfaced by scenario runs and the CLI.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validates that a value lies in the closed unit interval.
pub(crate) fn check_unit(field: &'static str, value: f64) -> Result<f64, NetworkError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(NetworkError::OutOfRange { field, value })
    }
}
