//! Network Metrics
//!
//! Summary statistics read off a belief network: mean belief, echo-chamber
//! score and polarization.

use belief_events::{MetricsRecord, PolarizationRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::components::agent::AgentId;
use crate::components::network::Network;
use crate::error::NetworkError;

/// Distance from the mean beyond which an agent counts toward a pole
pub const DEFAULT_POLARIZATION_THRESHOLD: f64 = 0.2;

/// Polarization of a belief distribution.
///
/// `index = (4 * variance + bimodal_fraction) / 2`. Variance alone cannot
/// tell two tight, distant clusters from one wide spread; the bimodal
/// fraction `2 * min(f_hi, f_lo)` (fractions of agents more than
/// `threshold` above / below the mean) rewards mass at both poles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Polarization {
    pub variance: f64,
    /// `4 * mean((b - 0.5)^2)`: 0 when everyone is uncertain, 1 when all sit at 0 or 1
    pub extremity: f64,
    pub bimodal_fraction: f64,
    pub index: f64,
}

impl From<Polarization> for PolarizationRecord {
    fn from(p: Polarization) -> Self {
        PolarizationRecord {
            variance: p.variance,
            extremity: p.extremity,
            bimodal_fraction: p.bimodal_fraction,
            index: p.index,
        }
    }
}

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean_belief(beliefs: &[f64]) -> f64 {
    if beliefs.is_empty() {
        return 0.0;
    }
    beliefs.iter().sum::<f64>() / beliefs.len() as f64
}

/// Population variance; 0.0 for an empty slice.
pub fn variance(beliefs: &[f64]) -> f64 {
    if beliefs.is_empty() {
        return 0.0;
    }
    let mean = mean_belief(beliefs);
    beliefs.iter().map(|b| (b - mean).powi(2)).sum::<f64>() / beliefs.len() as f64
}

pub fn polarization(beliefs: &[f64], threshold: f64) -> Polarization {
    if beliefs.len() < 2 {
        return Polarization::default();
    }
    let n = beliefs.len() as f64;
    let mean = mean_belief(beliefs);
    let variance = variance(beliefs);
    let extremity = 4.0 * beliefs.iter().map(|b| (b - 0.5).powi(2)).sum::<f64>() / n;

    let above = beliefs.iter().filter(|&&b| b > mean + threshold).count() as f64 / n;
    let below = beliefs.iter().filter(|&&b| b < mean - threshold).count() as f64 / n;
    let bimodal_fraction = 2.0 * above.min(below);

    Polarization {
        variance,
        extremity,
        bimodal_fraction,
        index: ((4.0 * variance + bimodal_fraction) / 2.0).clamp(0.0, 1.0),
    }
}

/// `1 - mean |b_i - b_j|` over agent `i`'s neighbors; `None` without neighbors.
pub fn local_echo_chamber(network: &Network, agent: AgentId) -> Result<Option<f64>, NetworkError> {
    let neighbors = network.neighbors(agent)?;
    if neighbors.is_empty() {
        return Ok(None);
    }
    let b = network.agents[agent.0].belief;
    let total: f64 = neighbors
        .iter()
        .map(|(j, _)| (b - network.agents[j.0].belief).abs())
        .sum();
    Ok(Some(1.0 - total / neighbors.len() as f64))
}

/// Mean local echo-chamber score over agents with at least one neighbor.
/// 0.0 when nobody has neighbors.
pub fn echo_chamber_score(network: &Network) -> f64 {
    let scores: Vec<f64> = network
        .agents
        .iter()
        .filter_map(|a| local_echo_chamber(network, a.id).ok().flatten())
        .collect();
    mean_belief(&scores)
}

/// Mean belief per community.
pub fn community_means(network: &Network) -> BTreeMap<String, f64> {
    community_beliefs(network)
        .into_iter()
        .map(|(c, beliefs)| (c, mean_belief(&beliefs)))
        .collect()
}

/// Standard deviation of belief per community.
pub fn community_stds(network: &Network) -> BTreeMap<String, f64> {
    community_beliefs(network)
        .into_iter()
        .map(|(c, beliefs)| (c, variance(&beliefs).sqrt()))
        .collect()
}

fn community_beliefs(network: &Network) -> BTreeMap<String, Vec<f64>> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for agent in &network.agents {
        groups.entry(agent.community.clone()).or_default().push(agent.belief);
    }
    groups
}

/// All network-wide metrics for the current state.
pub fn measure(network: &Network, threshold: f64, uninfluenced: usize) -> MetricsRecord {
    let beliefs = network.beliefs();
    MetricsRecord {
        mean_belief: mean_belief(&beliefs),
        echo_chamber: echo_chamber_score(network),
        polarization: polarization(&beliefs, threshold).into(),
        uninfluenced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::agent::AgentSpec;

    #[test]
    fn test_mean_and_variance() {
        assert_eq!(mean_belief(&[]), 0.0);
        assert!((mean_belief(&[0.2, 0.4, 0.9]) - 0.5).abs() < 1e-12);
        assert_eq!(variance(&[0.5, 0.5]), 0.0);
        assert!((variance(&[0.0, 1.0]) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_polarization_two_clusters_beats_wide_spread() {
        let clusters: Vec<f64> = (0..50).map(|i| if i % 2 == 0 { 0.1 } else { 0.9 }).collect();
        let spread: Vec<f64> = (0..51).map(|i| i as f64 / 50.0).collect();

        let p_clusters = polarization(&clusters, DEFAULT_POLARIZATION_THRESHOLD);
        let p_spread = polarization(&spread, DEFAULT_POLARIZATION_THRESHOLD);

        assert!((p_clusters.bimodal_fraction - 1.0).abs() < 1e-12);
        assert!(p_clusters.index > p_spread.index);
        assert!(p_clusters.bimodal_fraction > p_spread.bimodal_fraction);
    }

    #[test]
    fn test_polarization_one_sided_tail_is_not_bimodal() {
        // Mass far above the mean on one side only
        let mut beliefs = vec![0.1; 45];
        beliefs.extend(vec![0.95; 5]);
        let p = polarization(&beliefs, DEFAULT_POLARIZATION_THRESHOLD);
        assert_eq!(p.bimodal_fraction, 0.0);
    }

    #[test]
    fn test_polarization_degenerate_inputs() {
        assert_eq!(polarization(&[], 0.2), Polarization::default());
        assert_eq!(polarization(&[0.7], 0.2), Polarization::default());

        let consensus = polarization(&[0.5; 10], 0.2);
        assert_eq!(consensus.index, 0.0);
        assert_eq!(consensus.extremity, 0.0);
    }

    #[test]
    fn test_echo_chamber_homogeneous_neighborhood() {
        let mut net = Network::new();
        let hub = net.add_agent(0.6, 0.1).unwrap();
        for _ in 0..4 {
            let leaf = net.add_agent(0.6, 0.1).unwrap();
            net.add_edge(hub, leaf, 1.0).unwrap();
        }
        assert_eq!(local_echo_chamber(&net, hub).unwrap(), Some(1.0));
        assert_eq!(echo_chamber_score(&net), 1.0);
    }

    #[test]
    fn test_echo_chamber_mixed_and_empty() {
        let mut net = Network::new();
        let a = net.add_agent(0.0, 0.1).unwrap();
        let b = net.add_agent(1.0, 0.1).unwrap();
        let loner = net.add_agent(0.5, 0.1).unwrap();
        assert_eq!(echo_chamber_score(&net), 0.0);

        net.add_edge(a, b, 1.0).unwrap();
        assert_eq!(local_echo_chamber(&net, a).unwrap(), Some(0.0));
        assert_eq!(local_echo_chamber(&net, loner).unwrap(), None);
        // Loner does not drag the average
        assert_eq!(echo_chamber_score(&net), 0.0);
        assert!(local_echo_chamber(&net, AgentId(9)).is_err());
    }

    #[test]
    fn test_community_means() {
        let mut net = Network::new();
        net.spawn(AgentSpec::new(0.8, 0.1).with_community("believers")).unwrap();
        net.spawn(AgentSpec::new(0.6, 0.1).with_community("believers")).unwrap();
        net.spawn(AgentSpec::new(0.2, 0.1).with_community("skeptics")).unwrap();

        let means = community_means(&net);
        assert!((means["believers"] - 0.7).abs() < 1e-12);
        assert!((means["skeptics"] - 0.2).abs() < 1e-12);

        let stds = community_stds(&net);
        assert!((stds["believers"] - 0.1).abs() < 1e-12);
        assert_eq!(stds["skeptics"], 0.0);
    }

    #[test]
    fn test_measure_collects_everything() {
        let mut net = Network::new();
        let a = net.add_agent(0.1, 0.1).unwrap();
        let b = net.add_agent(0.9, 0.1).unwrap();
        net.add_edge(a, b, 1.0).unwrap();

        let record = measure(&net, DEFAULT_POLARIZATION_THRESHOLD, 0);
        assert!((record.mean_belief - 0.5).abs() < 1e-12);
        assert!((record.echo_chamber - 0.2).abs() < 1e-12);
        assert!(record.polarization.bimodal_fraction > 0.99);
    }
}
