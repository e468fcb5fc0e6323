//! Agent Components
//!
//! Individual agents: belief, resistance, community and anchoring.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{check_unit, NetworkError};

/// Stable index of an agent, assigned in insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub usize);

impl AgentId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for AgentId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// Community assigned when none is given
pub const DEFAULT_COMMUNITY: &str = "default";

/// How an anchored agent relates to its anchor value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AnchorMode {
    /// Belief is reset to the anchor value every step
    #[default]
    Pinned,
    /// Normal social update plus `strength * (value - belief)` each step
    Pull { strength: f64 },
}

/// Persistent external evidence attached to an agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub value: f64,
    #[serde(flatten)]
    pub mode: AnchorMode,
}

impl Anchor {
    /// Hard pin at `value`.
    pub fn pinned(value: f64) -> Result<Self, NetworkError> {
        Ok(Self {
            value: check_unit("anchor", value)?,
            mode: AnchorMode::Pinned,
        })
    }

    /// Gentle pull toward `value`; `strength` is the fraction of the gap closed per step.
    pub fn pull(value: f64, strength: f64) -> Result<Self, NetworkError> {
        Ok(Self {
            value: check_unit("anchor", value)?,
            mode: AnchorMode::Pull {
                strength: check_unit("anchor strength", strength)?,
            },
        })
    }

    pub fn is_pinned(&self) -> bool {
        self.mode == AnchorMode::Pinned
    }

    pub(crate) fn validate(&self) -> Result<(), NetworkError> {
        check_unit("anchor", self.value)?;
        if let AnchorMode::Pull { strength } = self.mode {
            check_unit("anchor strength", strength)?;
        }
        Ok(())
    }
}

/// Coarse reading of a belief value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    StrongDisbelief,
    Skeptical,
    Uncertain,
    Inclined,
    StrongBelief,
}

impl Stance {
    pub fn from_belief(belief: f64) -> Self {
        if belief < 0.2 {
            Stance::StrongDisbelief
        } else if belief < 0.4 {
            Stance::Skeptical
        } else if belief < 0.6 {
            Stance::Uncertain
        } else if belief < 0.8 {
            Stance::Inclined
        } else {
            Stance::StrongBelief
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stance::StrongDisbelief => "strong disbelief",
            Stance::Skeptical => "skeptical",
            Stance::Uncertain => "uncertain",
            Stance::Inclined => "inclined",
            Stance::StrongBelief => "strong belief",
        }
    }
}

/// A single agent in the network.
/// Belief and resistance are always within [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    /// 0 = strong disbelief, 1 = strong belief, 0.5 = uncertain
    pub belief: f64,
    /// Fraction of each proposed move the agent ignores
    pub resistance: f64,
    pub community: String,
    /// Human-readable name for key agents
    pub label: Option<String>,
    pub anchor: Option<Anchor>,
    /// Has no neighbors on purpose; never reported as `DegreeZero`
    pub isolated: bool,
}

impl Agent {
    pub fn stance(&self) -> Stance {
        Stance::from_belief(self.belief)
    }

    pub fn is_anchored(&self) -> bool {
        self.anchor.is_some()
    }
}

/// Builder for agents before they are placed in a network
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSpec {
    pub belief: f64,
    pub resistance: f64,
    pub community: String,
    pub label: Option<String>,
    pub anchor: Option<Anchor>,
    pub isolated: bool,
}

impl AgentSpec {
    pub fn new(belief: f64, resistance: f64) -> Self {
        Self {
            belief,
            resistance,
            community: DEFAULT_COMMUNITY.to_string(),
            label: None,
            anchor: None,
            isolated: false,
        }
    }

    pub fn with_community(mut self, community: impl Into<String>) -> Self {
        self.community = community.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn isolated(mut self) -> Self {
        self.isolated = true;
        self
    }

    /// Validates the spec and turns it into an agent with the given id.
    pub(crate) fn into_agent(self, id: AgentId) -> Result<Agent, NetworkError> {
        let belief = check_unit("belief", self.belief)?;
        let resistance = check_unit("resistance", self.resistance)?;
        if let Some(anchor) = &self.anchor {
            anchor.validate()?;
        }
        // A pinned agent starts at its anchor
        let belief = match self.anchor {
            Some(anchor) if anchor.is_pinned() => anchor.value,
            _ => belief,
        };

        Ok(Agent {
            id,
            belief,
            resistance,
            community: self.community,
            label: self.label,
            anchor: self.anchor,
            isolated: self.isolated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stance_boundaries() {
        assert_eq!(Stance::from_belief(0.0), Stance::StrongDisbelief);
        assert_eq!(Stance::from_belief(0.2), Stance::Skeptical);
        assert_eq!(Stance::from_belief(0.5), Stance::Uncertain);
        assert_eq!(Stance::from_belief(0.79), Stance::Inclined);
        assert_eq!(Stance::from_belief(0.8), Stance::StrongBelief);
        assert_eq!(Stance::Inclined.as_str(), "inclined");
    }

    #[test]
    fn test_spec_builder() {
        let agent = AgentSpec::new(0.5, 0.05)
            .with_community("bridge")
            .with_label("The Bridger")
            .into_agent(AgentId(60))
            .unwrap();

        assert_eq!(agent.id, AgentId(60));
        assert_eq!(agent.community, "bridge");
        assert_eq!(agent.label.as_deref(), Some("The Bridger"));
        assert!(!agent.is_anchored());
    }

    #[test]
    fn test_spec_rejects_out_of_range() {
        assert!(AgentSpec::new(1.2, 0.1).into_agent(AgentId(0)).is_err());
        assert!(AgentSpec::new(0.5, -0.1).into_agent(AgentId(0)).is_err());
    }

    #[test]
    fn test_pinned_agent_starts_at_anchor() {
        let agent = AgentSpec::new(0.9, 0.1)
            .with_anchor(Anchor::pinned(0.15).unwrap())
            .into_agent(AgentId(0))
            .unwrap();
        assert_eq!(agent.belief, 0.15);

        let pulled = AgentSpec::new(0.9, 0.1)
            .with_anchor(Anchor::pull(0.15, 0.04).unwrap())
            .into_agent(AgentId(0))
            .unwrap();
        assert_eq!(pulled.belief, 0.9);
    }

    #[test]
    fn test_anchor_constructors_validate() {
        assert!(Anchor::pinned(1.5).is_err());
        assert!(Anchor::pull(0.5, 2.0).is_err());
        assert!(Anchor::pinned(0.3).unwrap().is_pinned());
        assert!(!Anchor::pull(0.3, 0.1).unwrap().is_pinned());
    }
}
