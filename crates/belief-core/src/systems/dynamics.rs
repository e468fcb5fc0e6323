//! Belief Dynamics
//!
//! The synchronous update rule. Each step reads the whole belief vector,
//! computes every agent's next belief from those pre-step values, then
//! writes the new vector back in one go:
//!
//! ```text
//! w_eff   = trust * (1 - h + h * (1 - |b_i - b_j|))
//! target  = sum(w_eff * b_j) / sum(w_eff)
//! b_i'    = clamp(b_i + (1 - r_i) * (target - b_i) + noise [+ pull], 0, 1)
//! ```

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::components::agent::{AgentId, AnchorMode};
use crate::components::network::Network;
use crate::error::NetworkError;

/// Default standard deviation of the per-step Gaussian noise
pub const DEFAULT_NOISE_SCALE: f64 = 0.005;
/// Default homophily
pub const DEFAULT_HOMOPHILY: f64 = 0.5;

/// What to do with an unanchored agent that has no neighbors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IsolationPolicy {
    /// Keep the belief, apply noise only
    #[default]
    Hold,
    /// Fail the step with `DegreeZero`
    Reject,
}

/// Parameters of one synchronous update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateParams {
    /// 0 = neighbors weighted by trust only, 1 = fully similarity-weighted
    pub homophily: f64,
    /// Standard deviation of the zero-mean Gaussian noise
    pub noise_scale: f64,
    pub isolation: IsolationPolicy,
}

impl Default for UpdateParams {
    fn default() -> Self {
        Self {
            homophily: DEFAULT_HOMOPHILY,
            noise_scale: DEFAULT_NOISE_SCALE,
            isolation: IsolationPolicy::Hold,
        }
    }
}

impl UpdateParams {
    pub fn new(homophily: f64, noise_scale: f64) -> Self {
        Self {
            homophily,
            noise_scale,
            isolation: IsolationPolicy::Hold,
        }
    }

    pub fn with_isolation(mut self, isolation: IsolationPolicy) -> Self {
        self.isolation = isolation;
        self
    }

    pub fn validate(&self) -> Result<(), NetworkError> {
        if !(self.homophily.is_finite() && (0.0..=1.0).contains(&self.homophily)) {
            return Err(NetworkError::InvalidParameter {
                name: "homophily",
                value: self.homophily,
            });
        }
        if !(self.noise_scale.is_finite() && self.noise_scale >= 0.0) {
            return Err(NetworkError::InvalidParameter {
                name: "noise_scale",
                value: self.noise_scale,
            });
        }
        Ok(())
    }
}

/// Result of one step
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Steps completed after this one
    pub step: u64,
    /// Agents that received no neighbor influence (noise-only update)
    pub uninfluenced: Vec<AgentId>,
}

/// Scale edge trust by belief similarity.
pub fn effective_weight(trust: f64, b_self: f64, b_other: f64, homophily: f64) -> f64 {
    let similarity = 1.0 - (b_self - b_other).abs();
    trust * (1.0 - homophily + homophily * similarity)
}

/// Homophily-weighted mean of the neighbors' beliefs, or `None` when the
/// agent has no neighbors or their total effective weight is zero.
/// Neighbors without an entry in `beliefs` are skipped.
pub fn social_target(
    beliefs: &[f64],
    neighbors: &[(AgentId, f64)],
    b_self: f64,
    homophily: f64,
) -> Option<f64> {
    let mut total_weight = 0.0;
    let mut weighted_sum = 0.0;

    for &(neighbor, trust) in neighbors {
        let Some(&b_other) = beliefs.get(neighbor.0) else {
            continue;
        };
        let w = effective_weight(trust, b_self, b_other, homophily);
        weighted_sum += w * b_other;
        total_weight += w;
    }

    (total_weight > 0.0).then(|| weighted_sum / total_weight)
}

/// One noise sample per agent, drawn in id order.
fn draw_noise<R: Rng + ?Sized>(
    count: usize,
    noise_scale: f64,
    rng: &mut R,
) -> Result<Vec<f64>, NetworkError> {
    if noise_scale == 0.0 {
        return Ok(vec![0.0; count]);
    }
    let normal = Normal::new(0.0, noise_scale).map_err(|_| NetworkError::InvalidParameter {
        name: "noise_scale",
        value: noise_scale,
    })?;
    Ok((0..count).map(|_| normal.sample(rng)).collect())
}

impl Network {
    /// Advance every agent by one synchronous step.
    ///
    /// Fails without touching any belief if the parameters are invalid or,
    /// under `IsolationPolicy::Reject`, if an unanchored agent that is not
    /// isolated by design has no neighbors.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        params: &UpdateParams,
        rng: &mut R,
    ) -> Result<StepOutcome, NetworkError> {
        params.validate()?;

        if params.isolation == IsolationPolicy::Reject {
            if let Some(agent) = self.agents.iter().find(|a| {
                a.anchor.is_none() && !a.isolated && self.adjacency[a.id.0].is_empty()
            }) {
                return Err(NetworkError::DegreeZero { agent: agent.id });
            }
        }

        let noise = draw_noise(self.agents.len(), params.noise_scale, rng)?;
        let (next, uninfluenced) = self.next_beliefs(params, &noise);

        for (agent, belief) in self.agents.iter_mut().zip(next) {
            agent.belief = belief;
        }
        self.step_count += 1;

        if !uninfluenced.is_empty() {
            tracing::debug!(
                step = self.step_count,
                count = uninfluenced.len(),
                "agents updated without neighbor influence"
            );
        }

        Ok(StepOutcome {
            step: self.step_count,
            uninfluenced,
        })
    }

    /// Compute the post-step belief vector from the current one without
    /// mutating anything. `noise[i]` is added to agent `i`'s proposal.
    pub(crate) fn next_beliefs(&self, params: &UpdateParams, noise: &[f64]) -> (Vec<f64>, Vec<AgentId>) {
        debug_assert_eq!(noise.len(), self.agents.len());
        let current = self.beliefs();
        let mut next = Vec::with_capacity(current.len());
        let mut uninfluenced = Vec::new();

        for (agent, &eps) in self.agents.iter().zip(noise) {
            let b = current[agent.id.0];

            if let Some(anchor) = agent.anchor.filter(|a| a.is_pinned()) {
                next.push(anchor.value);
                continue;
            }

            let target = if agent.isolated {
                None
            } else {
                social_target(&current, &self.adjacency[agent.id.0], b, params.homophily)
            };
            let target = target.unwrap_or_else(|| {
                uninfluenced.push(agent.id);
                b
            });

            let mut delta = (1.0 - agent.resistance) * (target - b) + eps;
            if let Some(anchor) = agent.anchor {
                if let AnchorMode::Pull { strength } = anchor.mode {
                    delta += strength * (anchor.value - b);
                }
            }

            next.push((b + delta).clamp(0.0, 1.0));
        }

        (next, uninfluenced)
    }
}

/// Run `steps` synchronous updates, calling `after_step` with the number of
/// completed steps after each one. The callback may add edges or anchors.
pub fn run<R, F>(
    network: &mut Network,
    steps: u64,
    params: &UpdateParams,
    rng: &mut R,
    mut after_step: F,
) -> Result<(), NetworkError>
where
    R: Rng + ?Sized,
    F: FnMut(&mut Network, &StepOutcome) -> Result<(), NetworkError>,
{
    for _ in 0..steps {
        let outcome = network.step(params, rng)?;
        after_step(network, &outcome)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::agent::{AgentSpec, Anchor};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn quiet(homophily: f64) -> UpdateParams {
        UpdateParams::new(homophily, 0.0)
    }

    #[test]
    fn test_effective_weight() {
        // No homophily: trust passes through unchanged
        assert_eq!(effective_weight(0.8, 0.1, 0.9, 0.0), 0.8);
        // Full homophily: weight scales with similarity
        assert!((effective_weight(1.0, 0.1, 0.9, 1.0) - 0.2).abs() < 1e-12);
        assert_eq!(effective_weight(1.0, 0.4, 0.4, 1.0), 1.0);
    }

    #[test]
    fn test_social_target_weighted_mean() {
        let beliefs = [0.5, 0.0, 1.0];
        let neighbors = [(AgentId(1), 1.0), (AgentId(2), 3.0)];
        let target = social_target(&beliefs, &neighbors, 0.5, 0.0).unwrap();
        assert!((target - 0.75).abs() < 1e-12);

        assert_eq!(social_target(&beliefs, &[], 0.5, 0.0), None);
        assert_eq!(social_target(&beliefs, &[(AgentId(1), 0.0)], 0.5, 0.5), None);
    }

    #[test]
    fn test_social_target_skips_unknown_neighbors() {
        let beliefs = [0.2, 0.6];
        let neighbors = [(AgentId(1), 1.0), (AgentId(9), 1.0)];
        assert_eq!(social_target(&beliefs, &neighbors, 0.5, 0.0), Some(0.6));
        assert_eq!(social_target(&beliefs, &[(AgentId(5), 1.0)], 0.5, 0.0), None);
    }

    #[test]
    fn test_resistance_damps_update() {
        let mut net = Network::new();
        let a = net.add_agent(0.0, 0.75).unwrap();
        let b = net.spawn(AgentSpec::new(1.0, 0.0).with_anchor(Anchor::pinned(1.0).unwrap())).unwrap();
        net.add_edge(a, b, 1.0).unwrap();

        let mut rng = SmallRng::seed_from_u64(1);
        net.step(&quiet(0.0), &mut rng).unwrap();
        assert!((net.belief(a).unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_two_agent_swap_uses_pre_step_values() {
        let mut net = Network::new();
        let a = net.add_agent(0.0, 0.0).unwrap();
        let b = net.add_agent(1.0, 0.0).unwrap();
        net.add_edge(a, b, 1.0).unwrap();

        let mut rng = SmallRng::seed_from_u64(7);
        let outcome = net.step(&quiet(0.0), &mut rng).unwrap();

        // A sequential update would leave both at 1.0
        assert_eq!(net.beliefs(), vec![1.0, 0.0]);
        assert_eq!(outcome.step, 1);
        assert!(outcome.uninfluenced.is_empty());
    }

    #[test]
    fn test_pinned_anchor_holds_exactly() {
        let mut net = Network::new();
        let anchor = net
            .spawn(AgentSpec::new(0.2, 0.0).with_anchor(Anchor::pinned(0.2).unwrap()))
            .unwrap();
        let other = net.add_agent(0.9, 0.1).unwrap();
        net.add_edge(anchor, other, 1.0).unwrap();

        let mut rng = SmallRng::seed_from_u64(3);
        let params = UpdateParams::new(0.5, 0.05);
        for _ in 0..50 {
            net.step(&params, &mut rng).unwrap();
            assert_eq!(net.belief(anchor).unwrap(), 0.2);
        }
        assert!(net.belief(other).unwrap() < 0.5);
    }

    #[test]
    fn test_pull_anchor_moves_toward_value() {
        let mut net = Network::new();
        let a = net
            .spawn(AgentSpec::new(0.9, 0.0).isolated().with_anchor(Anchor::pull(0.1, 0.25).unwrap()))
            .unwrap();

        let mut rng = SmallRng::seed_from_u64(3);
        net.step(&quiet(0.5), &mut rng).unwrap();
        assert!((net.belief(a).unwrap() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_isolated_agent_hold_policy() {
        let mut net = Network::new();
        let lonely = net.add_agent(0.4, 0.1).unwrap();

        let mut rng = SmallRng::seed_from_u64(11);
        let outcome = net.step(&quiet(0.5), &mut rng).unwrap();
        assert_eq!(outcome.uninfluenced, vec![lonely]);
        assert_eq!(net.belief(lonely).unwrap(), 0.4);
    }

    #[test]
    fn test_isolated_agent_reject_policy() {
        let mut net = Network::new();
        let a = net.add_agent(0.3, 0.1).unwrap();
        let b = net.add_agent(0.7, 0.1).unwrap();
        let lonely = net.add_agent(0.5, 0.1).unwrap();
        net.add_edge(a, b, 1.0).unwrap();

        let params = quiet(0.5).with_isolation(IsolationPolicy::Reject);
        let mut rng = SmallRng::seed_from_u64(11);
        assert_eq!(
            net.step(&params, &mut rng),
            Err(NetworkError::DegreeZero { agent: lonely })
        );
        // Nothing was written
        assert_eq!(net.beliefs(), vec![0.3, 0.7, 0.5]);
        assert_eq!(net.step_count(), 0);

        // Isolated by design is accepted under the same policy
        let mut net = Network::new();
        net.spawn(AgentSpec::new(0.5, 0.1).isolated()).unwrap();
        assert!(net.step(&params, &mut rng).is_ok());
    }

    #[test]
    fn test_beliefs_stay_clamped() {
        let mut net = Network::new();
        let a = net.add_agent(1.0, 0.0).unwrap();
        let b = net.add_agent(0.0, 0.0).unwrap();
        let c = net.add_agent(1.0, 0.0).unwrap();
        net.add_edge(a, c, 1.0).unwrap();
        net.add_edge(b, c, 0.1).unwrap();

        let mut rng = SmallRng::seed_from_u64(5);
        let params = UpdateParams::new(0.9, 0.5);
        for _ in 0..200 {
            net.step(&params, &mut rng).unwrap();
            assert!(net.beliefs().iter().all(|b| (0.0..=1.0).contains(b)));
        }
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut net = Network::new();
        net.add_agent(0.5, 0.1).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);

        assert!(matches!(
            net.step(&UpdateParams::new(1.5, 0.0), &mut rng),
            Err(NetworkError::InvalidParameter { name: "homophily", .. })
        ));
        assert!(matches!(
            net.step(&UpdateParams::new(0.5, -0.1), &mut rng),
            Err(NetworkError::InvalidParameter { name: "noise_scale", .. })
        ));
    }

    #[test]
    fn test_run_sees_edges_added_between_steps() {
        let mut net = Network::new();
        let a = net.add_agent(0.9, 0.0).unwrap();
        let b = net.add_agent(0.1, 0.0).unwrap();

        let mut rng = SmallRng::seed_from_u64(2);
        let mut seen = Vec::new();
        run(&mut net, 3, &quiet(0.0), &mut rng, |net, outcome| {
            seen.push(outcome.uninfluenced.len());
            if outcome.step == 1 {
                net.add_edge(a, b, 1.0)?;
            }
            Ok(())
        })
        .unwrap();

        // Step 1 had no edges; steps 2 and 3 did
        assert_eq!(seen, vec![2, 0, 0]);
        assert_eq!(net.step_count(), 3);
    }
}
