//! Configuration System
//!
//! Loads run settings and per-scenario parameters from engine.toml so
//! experiments can be adjusted without recompiling.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::setup::scenarios::ScenarioConfigs;
use crate::systems::metrics::DEFAULT_POLARIZATION_THRESHOLD;

/// Default config file path
pub const DEFAULT_CONFIG_PATH: &str = "engine.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub scenarios: ScenarioConfigs,
}

/// Run-level settings shared by every scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for topology, initial beliefs and noise
    pub seed: u64,
    /// Directory run output is written to
    pub output_dir: PathBuf,
    /// Store the full belief vector at every step
    pub record_beliefs: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            output_dir: PathBuf::from("output"),
            record_beliefs: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Distance from the mean that counts as one side of a split
    pub polarization_threshold: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            polarization_threshold: DEFAULT_POLARIZATION_THRESHOLD,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Load configuration from the default path, or use defaults if not found
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_CONFIG_PATH).unwrap_or_else(|e| {
            tracing::warn!("could not load {}: {}, using defaults", DEFAULT_CONFIG_PATH, e);
            Self::default()
        })
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Epistemic Engine Configuration

[simulation]
seed = 42
output_dir = "output"
# Set to false to keep only per-step metrics in trajectory files
record_beliefs = true

[metrics]
polarization_threshold = 0.2

# Every scenario table is optional; missing keys keep their defaults.

[scenarios.long_slide]
agents = 80
lattice_degree = 6
rewire_probability = 0.15
belief = { mean = 0.5, sd = 0.12, min = 0.1, max = 0.9 }
resistance = { min = 0.05, max = 0.2 }
homophily = 0.7
steps = 150
noise_scale = 0.008

[scenarios.bridger]
agents_per_side = 30
lattice_degree = 4
rewire_probability = 0.2
believers = { mean = 0.82, sd = 0.06, min = 0.65, max = 0.99 }
skeptics = { mean = 0.18, sd = 0.06, min = 0.01, max = 0.35 }
resistance = { min = 0.1, max = 0.25 }
bridger_belief = 0.5
bridger_resistance = 0.05
bridge_contacts = 5
bridge_trust = 0.8
homophily = 0.65
steps = 120
noise_scale = 0.004

[scenarios.evidence]
agents = 60
attachments = 3
belief = { mean = 0.85, sd = 0.05, min = 0.7, max = 0.99 }
resistance = { min = 0.15, max = 0.35 }
entry_points = 5
evidence_value = 0.15
evidence_strength = 0.04
evidence_start_step = 20
homophily = 0.6
steps = 200
noise_scale = 0.003

[scenarios.cascade]
agents = 100
attachments = 3
belief = { mean = 0.75, sd = 0.1, min = 0.5, max = 0.99 }
resistance = { min = 0.05, max = 0.2 }
influencer_belief = 0.88
influencer_resistance = 0.05
evidence_value = 0.1
evidence_strength = 0.25
evidence_start_step = 30
homophily = 0.4
steps = 150
noise_scale = 0.004

[scenarios.reconstruction]
community_agents = 45
outside_agents = 20
community_lattice_degree = 5
community_rewire_probability = 0.1
outside_lattice_degree = 4
outside_rewire_probability = 0.2
community_belief = { mean = 0.85, sd = 0.04, min = 0.72, max = 0.97 }
community_resistance = { min = 0.2, max = 0.35 }
outside_belief = { mean = 0.25, sd = 0.07, min = 0.1, max = 0.45 }
outside_resistance = { min = 0.1, max = 0.25 }
questioner_belief = 0.83
questioner_resistance = 0.08
evidence_value = 0.2
evidence_strength = 0.03
new_connections = 5
new_connection_trust = 0.6
rewire_step = 40
homophily = 0.55
steps = 150
noise_scale = 0.004
"#
    .to_string()
}
