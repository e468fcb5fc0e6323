//! Network Component
//!
//! Owns the agents and the influence adjacency between them. Structure only
//! changes through `spawn` / `add_edge`; the update rule lives in
//! `systems::dynamics`.

use belief_events::{AgentSnapshot, EdgeSnapshot, NetworkSnapshot};
use std::collections::BTreeSet;

use super::agent::{Agent, AgentId, AgentSpec, Anchor};
use crate::error::{check_unit, NetworkError};

/// A social network of agents holding beliefs.
///
/// `adjacency[i]` lists the agents that influence `i`, with the trust `i`
/// places in each, in the order the edges were added.
#[derive(Debug, Clone, Default)]
pub struct Network {
    pub(crate) agents: Vec<Agent>,
    pub(crate) adjacency: Vec<Vec<(AgentId, f64)>>,
    pub(crate) step_count: u64,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an agent with default community and returns its stable id.
    pub fn add_agent(&mut self, belief: f64, resistance: f64) -> Result<AgentId, NetworkError> {
        self.spawn(AgentSpec::new(belief, resistance))
    }

    /// Adds a fully described agent and returns its stable id.
    pub fn spawn(&mut self, spec: AgentSpec) -> Result<AgentId, NetworkError> {
        let id = AgentId(self.agents.len());
        let agent = spec.into_agent(id)?;
        self.agents.push(agent);
        self.adjacency.push(Vec::new());
        Ok(id)
    }

    /// Connects two agents so each hears the other with the given trust.
    /// Re-adding an existing edge replaces its trust.
    pub fn add_edge(
        &mut self,
        i: AgentId,
        j: AgentId,
        trust: f64,
    ) -> Result<(), NetworkError> {
        self.check_link(i, j, trust)?;
        self.set_influence(i, j, trust);
        self.set_influence(j, i, trust);
        Ok(())
    }

    /// Makes `target` hear `source` with the given trust. `source` is unaffected.
    pub fn add_directed_edge(
        &mut self,
        source: AgentId,
        target: AgentId,
        trust: f64,
    ) -> Result<(), NetworkError> {
        self.check_link(source, target, trust)?;
        self.set_influence(target, source, trust);
        Ok(())
    }

    fn check_link(&self, a: AgentId, b: AgentId, trust: f64) -> Result<(), NetworkError> {
        self.require(a)?;
        self.require(b)?;
        if a == b {
            return Err(NetworkError::SelfLoop { agent: a });
        }
        check_unit("trust", trust)?;
        Ok(())
    }

    fn set_influence(&mut self, target: AgentId, source: AgentId, trust: f64) {
        let list = &mut self.adjacency[target.0];
        match list.iter_mut().find(|(id, _)| *id == source) {
            Some(entry) => entry.1 = trust,
            None => list.push((source, trust)),
        }
    }

    fn require(&self, id: AgentId) -> Result<(), NetworkError> {
        if id.0 < self.agents.len() {
            Ok(())
        } else {
            Err(NetworkError::InvalidReference { agent: id })
        }
    }

    /// The `(neighbor, trust)` pairs that influence agent `i`, in insertion order.
    pub fn neighbors(&self, i: AgentId) -> Result<&[(AgentId, f64)], NetworkError> {
        self.require(i)?;
        Ok(&self.adjacency[i.0])
    }

    pub fn degree(&self, i: AgentId) -> Result<usize, NetworkError> {
        self.neighbors(i).map(|n| n.len())
    }

    pub fn agent(&self, i: AgentId) -> Result<&Agent, NetworkError> {
        self.require(i)?;
        Ok(&self.agents[i.0])
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Number of synchronous steps applied so far.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn belief(&self, i: AgentId) -> Result<f64, NetworkError> {
        self.agent(i).map(|a| a.belief)
    }

    /// Belief vector indexed by agent id.
    pub fn beliefs(&self) -> Vec<f64> {
        self.agents.iter().map(|a| a.belief).collect()
    }

    /// Overwrites one agent's belief between steps.
    pub fn set_belief(&mut self, i: AgentId, belief: f64) -> Result<(), NetworkError> {
        self.require(i)?;
        self.agents[i.0].belief = check_unit("belief", belief)?;
        Ok(())
    }

    /// Attaches, replaces or removes an agent's anchor. A pinned anchor moves
    /// the belief to the anchor value immediately.
    pub fn set_anchor(
        &mut self,
        i: AgentId,
        anchor: Option<Anchor>,
    ) -> Result<(), NetworkError> {
        self.require(i)?;
        if let Some(anchor) = &anchor {
            anchor.validate()?;
        }
        let agent = &mut self.agents[i.0];
        agent.anchor = anchor;
        if let Some(anchor) = anchor.filter(Anchor::is_pinned) {
            agent.belief = anchor.value;
        }
        Ok(())
    }

    /// Number of connected agent pairs; a two-way edge counts once.
    pub fn edge_count(&self) -> usize {
        let mut count = 0;
        for (target, sources) in self.adjacency.iter().enumerate() {
            for (source, _) in sources {
                let reciprocal = self.adjacency[source.0]
                    .iter()
                    .any(|(id, _)| id.0 == target);
                if source.0 < target || !reciprocal {
                    count += 1;
                }
            }
        }
        count
    }

    /// Sorted, de-duplicated community labels.
    pub fn communities(&self) -> Vec<String> {
        self.agents
            .iter()
            .map(|a| a.community.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn agents_in_community<'a>(
        &'a self,
        community: &'a str,
    ) -> impl Iterator<Item = &'a Agent> + 'a {
        self.agents.iter().filter(move |a| a.community == community)
    }

    pub fn labeled_agents(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.iter().filter(|a| a.label.is_some())
    }

    /// Captures agents and edges for output.
    pub fn snapshot(&self) -> NetworkSnapshot {
        let mut snapshot = NetworkSnapshot::new(self.step_count);

        for agent in &self.agents {
            let mut entry = AgentSnapshot::new(
                agent.id.0,
                agent.belief,
                agent.resistance,
                agent.community.clone(),
                agent.stance().as_str(),
            );
            entry.label = agent.label.clone();
            entry.anchor = agent.anchor.map(|a| a.value);
            snapshot.agents.push(entry);
        }

        for (target, sources) in self.adjacency.iter().enumerate() {
            for &(source, trust) in sources {
                let reverse = self.adjacency[source.0]
                    .iter()
                    .find(|(id, _)| id.0 == target)
                    .map(|&(_, w)| w);
                match reverse {
                    // Symmetric pair: emit once, from the lower id
                    Some(w) if w == trust => {
                        if source.0 < target {
                            snapshot.edges.push(EdgeSnapshot {
                                source: source.0,
                                target,
                                trust,
                                directed: false,
                            });
                        }
                    }
                    _ => snapshot.edges.push(EdgeSnapshot {
                        source: source.0,
                        target,
                        trust,
                        directed: true,
                    }),
                }
            }
        }

        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Network {
        let mut net = Network::new();
        for belief in [0.2, 0.5, 0.8] {
            net.add_agent(belief, 0.1).unwrap();
        }
        net.add_edge(AgentId(0), AgentId(1), 1.0).unwrap();
        net.add_edge(AgentId(1), AgentId(2), 0.5).unwrap();
        net
    }

    #[test]
    fn test_add_agent_returns_stable_ids() {
        let mut net = Network::new();
        assert_eq!(net.add_agent(0.1, 0.0).unwrap(), AgentId(0));
        assert_eq!(net.add_agent(0.9, 1.0).unwrap(), AgentId(1));
        assert_eq!(net.len(), 2);
        assert_eq!(net.beliefs(), vec![0.1, 0.9]);
    }

    #[test]
    fn test_add_agent_rejects_out_of_range() {
        let mut net = Network::new();
        assert_eq!(
            net.add_agent(1.5, 0.1),
            Err(NetworkError::OutOfRange { field: "belief", value: 1.5 })
        );
        assert!(matches!(
            net.add_agent(0.5, -0.2),
            Err(NetworkError::OutOfRange { field: "resistance", .. })
        ));
        assert!(net.is_empty());
    }

    #[test]
    fn test_add_edge_invalid_reference() {
        let mut net = triangle();
        assert_eq!(
            net.add_edge(AgentId(0), AgentId(9), 1.0),
            Err(NetworkError::InvalidReference { agent: AgentId(9) })
        );
        assert_eq!(
            net.add_edge(AgentId(0), AgentId(0), 1.0),
            Err(NetworkError::SelfLoop { agent: AgentId(0) })
        );
        assert!(net.add_edge(AgentId(0), AgentId(2), 1.5).is_err());
        assert!(net.neighbors(AgentId(5)).is_err());
    }

    #[test]
    fn test_neighbors_in_insertion_order() {
        let net = triangle();
        let n: Vec<_> = net.neighbors(AgentId(1)).unwrap().to_vec();
        assert_eq!(n, vec![(AgentId(0), 1.0), (AgentId(2), 0.5)]);
        // Restartable: a second read sees the same sequence
        assert_eq!(net.neighbors(AgentId(1)).unwrap(), &n[..]);
        assert_eq!(net.degree(AgentId(0)).unwrap(), 1);
    }

    #[test]
    fn test_readding_edge_replaces_trust() {
        let mut net = triangle();
        net.add_edge(AgentId(1), AgentId(0), 0.3).unwrap();
        assert_eq!(net.neighbors(AgentId(0)).unwrap(), &[(AgentId(1), 0.3)]);
        assert_eq!(net.degree(AgentId(1)).unwrap(), 2);
        assert_eq!(net.edge_count(), 2);
    }

    #[test]
    fn test_directed_edge_is_one_way() {
        let mut net = triangle();
        net.add_directed_edge(AgentId(0), AgentId(2), 0.7).unwrap();
        assert_eq!(net.neighbors(AgentId(2)).unwrap().last(), Some(&(AgentId(0), 0.7)));
        assert_eq!(net.degree(AgentId(0)).unwrap(), 1);
        assert_eq!(net.edge_count(), 3);

        let snapshot = net.snapshot();
        assert_eq!(snapshot.edges.iter().filter(|e| e.directed).count(), 1);
        assert_eq!(snapshot.edges.iter().filter(|e| !e.directed).count(), 2);
    }

    #[test]
    fn test_set_anchor_pins_belief() {
        let mut net = triangle();
        net.set_anchor(AgentId(2), Some(Anchor::pinned(0.1).unwrap())).unwrap();
        assert_eq!(net.belief(AgentId(2)).unwrap(), 0.1);
        assert!(net.agent(AgentId(2)).unwrap().is_anchored());

        net.set_anchor(AgentId(2), None).unwrap();
        assert!(!net.agent(AgentId(2)).unwrap().is_anchored());
    }

    #[test]
    fn test_communities_and_labels() {
        let mut net = Network::new();
        net.spawn(AgentSpec::new(0.9, 0.1).with_community("believers")).unwrap();
        net.spawn(AgentSpec::new(0.1, 0.1).with_community("skeptics")).unwrap();
        net.spawn(
            AgentSpec::new(0.5, 0.05)
                .with_community("bridge")
                .with_label("The Bridger"),
        )
        .unwrap();

        assert_eq!(net.communities(), vec!["believers", "bridge", "skeptics"]);
        assert_eq!(net.agents_in_community("skeptics").count(), 1);
        assert_eq!(net.labeled_agents().next().unwrap().id, AgentId(2));

        let snapshot = net.snapshot();
        assert_eq!(snapshot.agents[2].label.as_deref(), Some("The Bridger"));
        assert_eq!(snapshot.agents[0].stance, "strong belief");
    }
}
