//! Scenario Presets
//!
//! Five canned experiments. Each one is an explicit config struct (all
//! fields overridable from TOML) plus a builder that turns it into a
//! network and a run plan. `SCENARIOS` maps scenario keys to builders.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::topology;
use crate::components::agent::{AgentId, AgentSpec};
use crate::components::network::Network;
use crate::error::NetworkError;
use crate::systems::dynamics::UpdateParams;

/// External evidence entering the network through a few agents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalEvidence {
    /// The "true" belief the evidence points to
    pub value: f64,
    /// Fraction of the gap closed per step
    pub strength: f64,
    /// Evidence is active from this step index on (0 = before the first step)
    pub start_step: u64,
    pub targets: Vec<AgentId>,
}

/// Edges formed partway through a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rewiring {
    /// Edges are added before this step index
    pub at_step: u64,
    pub edges: Vec<(AgentId, AgentId, f64)>,
}

/// How a scenario should be run
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub steps: u64,
    pub dynamics: UpdateParams,
    pub evidence: Option<ExternalEvidence>,
    pub rewiring: Option<Rewiring>,
}

/// A built scenario: a fresh network plus its plan
#[derive(Debug, Clone)]
pub struct Scenario {
    pub key: &'static str,
    pub name: &'static str,
    pub network: Network,
    pub plan: RunPlan,
}

/// Bounds of a uniform draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Both bounds finite and `min <= max`.
    pub fn validate(&self, name: &'static str) -> Result<(), NetworkError> {
        check_bounds(name, self.min, self.max)
    }
}

fn check_bounds(name: &'static str, min: f64, max: f64) -> Result<(), NetworkError> {
    if !min.is_finite() {
        return Err(NetworkError::InvalidParameter { name, value: min });
    }
    if !max.is_finite() || min > max {
        return Err(NetworkError::InvalidParameter { name, value: max });
    }
    Ok(())
}

/// Normal draw clipped to `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClippedNormal {
    pub mean: f64,
    pub sd: f64,
    pub min: f64,
    pub max: f64,
}

impl ClippedNormal {
    pub const fn new(mean: f64, sd: f64, min: f64, max: f64) -> Self {
        Self { mean, sd, min, max }
    }

    /// Finite mean, finite non-negative sd, finite bounds with `min <= max`.
    pub fn validate(&self) -> Result<(), NetworkError> {
        check_bounds("belief range", self.min, self.max)?;
        if !self.mean.is_finite() {
            return Err(NetworkError::InvalidParameter {
                name: "belief mean",
                value: self.mean,
            });
        }
        if !self.sd.is_finite() || self.sd < 0.0 {
            return Err(NetworkError::InvalidParameter {
                name: "belief sd",
                value: self.sd,
            });
        }
        Ok(())
    }

    fn sample_n<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Result<Vec<f64>, NetworkError> {
        self.validate()?;
        let normal = Normal::new(self.mean, self.sd).map_err(|_| NetworkError::InvalidParameter {
            name: "belief sd",
            value: self.sd,
        })?;
        Ok((0..count)
            .map(|_| normal.sample(rng).clamp(self.min, self.max))
            .collect())
    }
}

fn uniform_n<R: Rng + ?Sized>(range: Range, count: usize, rng: &mut R) -> Result<Vec<f64>, NetworkError> {
    range.validate("resistance range")?;
    Ok((0..count)
        .map(|_| {
            if range.max > range.min {
                rng.gen_range(range.min..range.max)
            } else {
                range.min
            }
        })
        .collect())
}

fn add_edges(
    network: &mut Network,
    edges: &[(usize, usize)],
    offset: usize,
    trust: f64,
) -> Result<(), NetworkError> {
    for &(u, v) in edges {
        network.add_edge(AgentId(u + offset), AgentId(v + offset), trust)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------
// The Long Slide
// ---------------------------------------------------------------------

/// A moderate, small-world community drifting apart through homophily alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongSlideConfig {
    pub agents: usize,
    pub lattice_degree: usize,
    pub rewire_probability: f64,
    pub belief: ClippedNormal,
    pub resistance: Range,
    pub homophily: f64,
    pub steps: u64,
    pub noise_scale: f64,
}

impl Default for LongSlideConfig {
    fn default() -> Self {
        Self {
            agents: 80,
            lattice_degree: 6,
            rewire_probability: 0.15,
            belief: ClippedNormal::new(0.5, 0.12, 0.1, 0.9),
            resistance: Range::new(0.05, 0.2),
            homophily: 0.7,
            steps: 150,
            noise_scale: 0.008,
        }
    }
}

pub fn long_slide(config: &LongSlideConfig, seed: u64) -> Result<Scenario, NetworkError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let n = config.agents;

    let edges = topology::watts_strogatz(n, config.lattice_degree, config.rewire_probability, &mut rng)?;
    let beliefs = config.belief.sample_n(n, &mut rng)?;
    let resistances = uniform_n(config.resistance, n, &mut rng)?;

    let mut network = Network::new();
    for (b, r) in beliefs.into_iter().zip(resistances) {
        network.spawn(AgentSpec::new(b, r).with_community("community"))?;
    }
    add_edges(&mut network, &edges, 0, 1.0)?;

    Ok(Scenario {
        key: "long_slide",
        name: "The Long Slide",
        network,
        plan: RunPlan {
            steps: config.steps,
            dynamics: UpdateParams::new(config.homophily, config.noise_scale),
            evidence: None,
            rewiring: None,
        },
    })
}

// ---------------------------------------------------------------------
// The Bridger
// ---------------------------------------------------------------------

/// Two polarized communities joined through one open-minded agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgerConfig {
    pub agents_per_side: usize,
    pub lattice_degree: usize,
    pub rewire_probability: f64,
    pub believers: ClippedNormal,
    pub skeptics: ClippedNormal,
    pub resistance: Range,
    pub bridger_belief: f64,
    pub bridger_resistance: f64,
    /// Agents on each side the bridger is connected to
    pub bridge_contacts: usize,
    pub bridge_trust: f64,
    pub homophily: f64,
    pub steps: u64,
    pub noise_scale: f64,
}

impl Default for BridgerConfig {
    fn default() -> Self {
        Self {
            agents_per_side: 30,
            lattice_degree: 4,
            rewire_probability: 0.2,
            believers: ClippedNormal::new(0.82, 0.06, 0.65, 0.99),
            skeptics: ClippedNormal::new(0.18, 0.06, 0.01, 0.35),
            resistance: Range::new(0.1, 0.25),
            bridger_belief: 0.5,
            bridger_resistance: 0.05,
            bridge_contacts: 5,
            bridge_trust: 0.8,
            homophily: 0.65,
            steps: 120,
            noise_scale: 0.004,
        }
    }
}

pub fn bridger(config: &BridgerConfig, seed: u64) -> Result<Scenario, NetworkError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let per_side = config.agents_per_side;

    let believers = config.believers.sample_n(per_side, &mut rng)?;
    let skeptics = config.skeptics.sample_n(per_side, &mut rng)?;
    let resistances = uniform_n(config.resistance, 2 * per_side, &mut rng)?;
    let side_a = topology::watts_strogatz(per_side, config.lattice_degree, config.rewire_probability, &mut rng)?;
    let side_b = topology::watts_strogatz(per_side, config.lattice_degree, config.rewire_probability, &mut rng)?;

    let mut network = Network::new();
    let communities = std::iter::repeat("believers")
        .take(per_side)
        .chain(std::iter::repeat("skeptics").take(per_side));
    for ((b, r), community) in believers.into_iter().chain(skeptics).zip(resistances).zip(communities) {
        network.spawn(AgentSpec::new(b, r).with_community(community))?;
    }
    let bridge = network.spawn(
        AgentSpec::new(config.bridger_belief, config.bridger_resistance)
            .with_community("bridge")
            .with_label("The Bridger"),
    )?;

    add_edges(&mut network, &side_a, 0, 1.0)?;
    add_edges(&mut network, &side_b, per_side, 1.0)?;
    for i in 0..config.bridge_contacts.min(per_side) {
        network.add_edge(bridge, AgentId(i), config.bridge_trust)?;
        network.add_edge(bridge, AgentId(per_side + i), config.bridge_trust)?;
    }

    Ok(Scenario {
        key: "bridger",
        name: "The Bridger",
        network,
        plan: RunPlan {
            steps: config.steps,
            dynamics: UpdateParams::new(config.homophily, config.noise_scale),
            evidence: None,
            rewiring: None,
        },
    })
}

// ---------------------------------------------------------------------
// The Evidence
// ---------------------------------------------------------------------

/// An echo chamber that receives contrary evidence through its periphery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    pub agents: usize,
    pub attachments: usize,
    pub belief: ClippedNormal,
    pub resistance: Range,
    /// How many of the lowest-degree agents receive the evidence
    pub entry_points: usize,
    pub evidence_value: f64,
    pub evidence_strength: f64,
    pub evidence_start_step: u64,
    pub homophily: f64,
    pub steps: u64,
    pub noise_scale: f64,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            agents: 60,
            attachments: 3,
            belief: ClippedNormal::new(0.85, 0.05, 0.7, 0.99),
            resistance: Range::new(0.15, 0.35),
            entry_points: 5,
            evidence_value: 0.15,
            evidence_strength: 0.04,
            evidence_start_step: 20,
            homophily: 0.6,
            steps: 200,
            noise_scale: 0.003,
        }
    }
}

pub fn evidence(config: &EvidenceConfig, seed: u64) -> Result<Scenario, NetworkError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let n = config.agents;

    let beliefs = config.belief.sample_n(n, &mut rng)?;
    let resistances = uniform_n(config.resistance, n, &mut rng)?;
    let edges = topology::barabasi_albert(n, config.attachments, &mut rng)?;
    let peripheral = topology::lowest_degree_nodes(n, &edges, config.entry_points);

    let mut network = Network::new();
    for (i, (b, r)) in beliefs.into_iter().zip(resistances).enumerate() {
        let mut spec = AgentSpec::new(b, r).with_community("echo_chamber");
        if let Some(k) = peripheral.iter().position(|&p| p == i) {
            spec = spec.with_label(format!("evidence_entry_{}", k));
        }
        network.spawn(spec)?;
    }
    add_edges(&mut network, &edges, 0, 1.0)?;

    Ok(Scenario {
        key: "evidence",
        name: "The Evidence",
        network,
        plan: RunPlan {
            steps: config.steps,
            dynamics: UpdateParams::new(config.homophily, config.noise_scale),
            evidence: Some(ExternalEvidence {
                value: config.evidence_value,
                strength: config.evidence_strength,
                start_step: config.evidence_start_step,
                targets: peripheral.into_iter().map(AgentId).collect(),
            }),
            rewiring: None,
        },
    })
}

// ---------------------------------------------------------------------
// The Cascade
// ---------------------------------------------------------------------

/// A scale-free network whose biggest hub meets strong contrary evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    pub agents: usize,
    pub attachments: usize,
    pub belief: ClippedNormal,
    pub resistance: Range,
    pub influencer_belief: f64,
    pub influencer_resistance: f64,
    pub evidence_value: f64,
    pub evidence_strength: f64,
    pub evidence_start_step: u64,
    pub homophily: f64,
    pub steps: u64,
    pub noise_scale: f64,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            agents: 100,
            attachments: 3,
            belief: ClippedNormal::new(0.75, 0.1, 0.5, 0.99),
            resistance: Range::new(0.05, 0.2),
            influencer_belief: 0.88,
            influencer_resistance: 0.05,
            evidence_value: 0.1,
            evidence_strength: 0.25,
            evidence_start_step: 30,
            homophily: 0.4,
            steps: 150,
            noise_scale: 0.004,
        }
    }
}

pub fn cascade(config: &CascadeConfig, seed: u64) -> Result<Scenario, NetworkError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let n = config.agents;

    let edges = topology::barabasi_albert(n, config.attachments, &mut rng)?;
    let influencer = topology::max_degree_node(n, &edges).unwrap_or(0);

    let mut beliefs = config.belief.sample_n(n, &mut rng)?;
    let mut resistances = uniform_n(config.resistance, n, &mut rng)?;
    beliefs[influencer] = config.influencer_belief;
    resistances[influencer] = config.influencer_resistance;

    let mut network = Network::new();
    for (i, (b, r)) in beliefs.into_iter().zip(resistances).enumerate() {
        let mut spec = AgentSpec::new(b, r).with_community("network");
        if i == influencer {
            spec = spec.with_label("The Influencer");
        }
        network.spawn(spec)?;
    }
    add_edges(&mut network, &edges, 0, 1.0)?;

    Ok(Scenario {
        key: "cascade",
        name: "The Cascade",
        network,
        plan: RunPlan {
            steps: config.steps,
            dynamics: UpdateParams::new(config.homophily, config.noise_scale),
            evidence: Some(ExternalEvidence {
                value: config.evidence_value,
                strength: config.evidence_strength,
                start_step: config.evidence_start_step,
                targets: vec![AgentId(influencer)],
            }),
            rewiring: None,
        },
    })
}

// ---------------------------------------------------------------------
// The Reconstruction
// ---------------------------------------------------------------------

/// One member of a tight community starts questioning, then forms ties
/// to an outside group partway through the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    pub community_agents: usize,
    pub outside_agents: usize,
    pub community_lattice_degree: usize,
    pub community_rewire_probability: f64,
    pub outside_lattice_degree: usize,
    pub outside_rewire_probability: f64,
    pub community_belief: ClippedNormal,
    pub community_resistance: Range,
    pub outside_belief: ClippedNormal,
    pub outside_resistance: Range,
    pub questioner_belief: f64,
    pub questioner_resistance: f64,
    pub evidence_value: f64,
    pub evidence_strength: f64,
    pub new_connections: usize,
    pub new_connection_trust: f64,
    pub rewire_step: u64,
    pub homophily: f64,
    pub steps: u64,
    pub noise_scale: f64,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            community_agents: 45,
            outside_agents: 20,
            community_lattice_degree: 5,
            community_rewire_probability: 0.1,
            outside_lattice_degree: 4,
            outside_rewire_probability: 0.2,
            community_belief: ClippedNormal::new(0.85, 0.04, 0.72, 0.97),
            community_resistance: Range::new(0.2, 0.35),
            outside_belief: ClippedNormal::new(0.25, 0.07, 0.1, 0.45),
            outside_resistance: Range::new(0.1, 0.25),
            questioner_belief: 0.83,
            questioner_resistance: 0.08,
            evidence_value: 0.2,
            evidence_strength: 0.03,
            new_connections: 5,
            new_connection_trust: 0.6,
            rewire_step: 40,
            homophily: 0.55,
            steps: 150,
            noise_scale: 0.004,
        }
    }
}

pub fn reconstruction(config: &ReconstructionConfig, seed: u64) -> Result<Scenario, NetworkError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let n_comm = config.community_agents;
    if n_comm == 0 {
        // Agent 0 is the questioner and must sit inside the community
        return Err(NetworkError::InvalidParameter {
            name: "community_agents",
            value: 0.0,
        });
    }
    let n_out = config.outside_agents;
    let questioner = AgentId(0);

    let mut comm_beliefs = config.community_belief.sample_n(n_comm, &mut rng)?;
    let mut comm_resistances = uniform_n(config.community_resistance, n_comm, &mut rng)?;
    let out_beliefs = config.outside_belief.sample_n(n_out, &mut rng)?;
    let out_resistances = uniform_n(config.outside_resistance, n_out, &mut rng)?;
    comm_beliefs[0] = config.questioner_belief;
    comm_resistances[0] = config.questioner_resistance;

    let comm_edges = topology::watts_strogatz(
        n_comm,
        config.community_lattice_degree,
        config.community_rewire_probability,
        &mut rng,
    )?;
    let out_edges = topology::watts_strogatz(
        n_out,
        config.outside_lattice_degree,
        config.outside_rewire_probability,
        &mut rng,
    )?;

    let mut network = Network::new();
    for (i, (b, r)) in comm_beliefs.into_iter().zip(comm_resistances).enumerate() {
        let mut spec = AgentSpec::new(b, r).with_community("tight_community");
        if i == questioner.0 {
            spec = spec.with_label("The Questioner");
        }
        network.spawn(spec)?;
    }
    for (b, r) in out_beliefs.into_iter().zip(out_resistances) {
        network.spawn(AgentSpec::new(b, r).with_community("outside"))?;
    }
    add_edges(&mut network, &comm_edges, 0, 1.0)?;
    add_edges(&mut network, &out_edges, n_comm, 1.0)?;

    let new_edges = (0..config.new_connections.min(n_out))
        .map(|i| (questioner, AgentId(n_comm + i), config.new_connection_trust))
        .collect();

    Ok(Scenario {
        key: "reconstruction",
        name: "The Reconstruction",
        network,
        plan: RunPlan {
            steps: config.steps,
            dynamics: UpdateParams::new(config.homophily, config.noise_scale),
            evidence: Some(ExternalEvidence {
                value: config.evidence_value,
                strength: config.evidence_strength,
                start_step: 0,
                targets: vec![questioner],
            }),
            rewiring: Some(Rewiring {
                at_step: config.rewire_step,
                edges: new_edges,
            }),
        },
    })
}

// ---------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------

/// Per-scenario configuration, one table per preset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfigs {
    pub long_slide: LongSlideConfig,
    pub bridger: BridgerConfig,
    pub evidence: EvidenceConfig,
    pub cascade: CascadeConfig,
    pub reconstruction: ReconstructionConfig,
}

/// Builds a scenario from the full config table and a seed
pub type ScenarioBuilder = fn(&ScenarioConfigs, u64) -> Result<Scenario, NetworkError>;

/// One row of the scenario menu
#[derive(Debug, Clone, Copy)]
pub struct ScenarioEntry {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub question: &'static str,
    pub build: ScenarioBuilder,
}

fn build_long_slide(configs: &ScenarioConfigs, seed: u64) -> Result<Scenario, NetworkError> {
    long_slide(&configs.long_slide, seed)
}

fn build_bridger(configs: &ScenarioConfigs, seed: u64) -> Result<Scenario, NetworkError> {
    bridger(&configs.bridger, seed)
}

fn build_evidence(configs: &ScenarioConfigs, seed: u64) -> Result<Scenario, NetworkError> {
    evidence(&configs.evidence, seed)
}

fn build_cascade(configs: &ScenarioConfigs, seed: u64) -> Result<Scenario, NetworkError> {
    cascade(&configs.cascade, seed)
}

fn build_reconstruction(configs: &ScenarioConfigs, seed: u64) -> Result<Scenario, NetworkError> {
    reconstruction(&configs.reconstruction, seed)
}

pub const SCENARIOS: &[ScenarioEntry] = &[
    ScenarioEntry {
        key: "long_slide",
        name: "The Long Slide",
        description: "A moderate community polarizes slowly through homophily alone.",
        question: "How does a fair-minded community become entrenched without bad actors?",
        build: build_long_slide,
    },
    ScenarioEntry {
        key: "bridger",
        name: "The Bridger",
        description: "Two polarized communities share one connecting agent.",
        question: "Can one person genuinely bridge two worlds?",
        build: build_bridger,
    },
    ScenarioEntry {
        key: "evidence",
        name: "The Evidence",
        description: "Ground truth enters an echo chamber through peripheral agents.",
        question: "How does evidence propagate (or fail to propagate) through closed systems?",
        build: build_evidence,
    },
    ScenarioEntry {
        key: "cascade",
        name: "The Cascade",
        description: "A high-degree influencer changes their belief mid-simulation.",
        question: "How fast does a hub's belief change cascade through a scale-free network?",
        build: build_cascade,
    },
    ScenarioEntry {
        key: "reconstruction",
        name: "The Reconstruction",
        description: "An embedded agent begins questioning, then forms new connections.",
        question: "What happens to a community when one member finds new information?",
        build: build_reconstruction,
    },
];

/// Finds a scenario by key.
pub fn lookup(key: &str) -> Option<&'static ScenarioEntry> {
    SCENARIOS.iter().find(|entry| entry.key == key)
}

pub fn scenario_keys() -> Vec<&'static str> {
    SCENARIOS.iter().map(|entry| entry.key).collect()
}
