//! Snapshot Types
//!
//! Serialization structs for the state of a belief network at one step.
//!
//! The engine emits one snapshot before the first step and one after the
//! last, so a reader can draw the graph without re-running the simulation.

use serde::{Deserialize, Serialize};

/// Agent state at the time of the snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent_id: usize,
    pub belief: f64,
    pub resistance: f64,
    pub community: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<f64>,
    pub stance: String,
}

/// One undirected influence edge (or one direction of a directed one)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub source: usize,
    pub target: usize,
    pub trust: f64,
    #[serde(default)]
    pub directed: bool,
}

/// Complete network snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub step: u64,
    pub agents: Vec<AgentSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
}

impl NetworkSnapshot {
    /// Creates an empty snapshot for the given step.
    pub fn new(step: u64) -> Self {
        Self {
            step,
            agents: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Finds an agent by id.
    pub fn find_agent(&self, agent_id: usize) -> Option<&AgentSnapshot> {
        self.agents.iter().find(|a| a.agent_id == agent_id)
    }

    /// Returns agents belonging to a community.
    pub fn community_members(&self, community: &str) -> Vec<&AgentSnapshot> {
        self.agents.iter().filter(|a| a.community == community).collect()
    }

    /// Returns agents carrying a human-readable label.
    pub fn labeled_agents(&self) -> Vec<&AgentSnapshot> {
        self.agents.iter().filter(|a| a.label.is_some()).collect()
    }

    /// Serializes the snapshot to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl AgentSnapshot {
    /// Creates a new AgentSnapshot with required fields.
    pub fn new(
        agent_id: usize,
        belief: f64,
        resistance: f64,
        community: impl Into<String>,
        stance: impl Into<String>,
    ) -> Self {
        Self {
            agent_id,
            belief,
            resistance,
            community: community.into(),
            label: None,
            anchor: None,
            stance: stance.into(),
        }
    }
}
