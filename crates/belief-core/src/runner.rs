//! Scenario Runner
//!
//! Drives a built scenario for its planned number of steps: installs
//! external evidence and planned rewiring between steps, and records the
//! belief vector and metrics after every step.

use belief_events::{NetworkSnapshot, RunSummary, Trajectory};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::components::agent::Anchor;
use crate::components::network::Network;
use crate::config::Config;
use crate::error::{NetworkError, RunError};
use crate::output::stats::{summarize, TrajectoryRecorder};
use crate::setup::scenarios::{ExternalEvidence, Rewiring, RunPlan, Scenario};
use crate::systems::dynamics;
use crate::systems::metrics::DEFAULT_POLARIZATION_THRESHOLD;

/// Mixed into the seed so noise draws do not replay the setup sequence
const NOISE_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// Noise generator for a run, independent of the setup generator.
pub fn noise_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed ^ NOISE_STREAM)
}

/// Knobs that affect recording rather than dynamics
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub polarization_threshold: f64,
    pub record_beliefs: bool,
    /// Overrides the plan's step count
    pub steps: Option<u64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            polarization_threshold: DEFAULT_POLARIZATION_THRESHOLD,
            record_beliefs: true,
            steps: None,
        }
    }
}

impl RunOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            polarization_threshold: config.metrics.polarization_threshold,
            record_beliefs: config.simulation.record_beliefs,
            steps: None,
        }
    }

    pub fn with_steps(mut self, steps: Option<u64>) -> Self {
        self.steps = steps;
        self
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub trajectory: Trajectory,
    pub summary: RunSummary,
    pub initial: NetworkSnapshot,
    pub final_state: NetworkSnapshot,
    /// Network after the last step
    pub network: Network,
}

fn install_evidence(network: &mut Network, evidence: &ExternalEvidence) -> Result<(), NetworkError> {
    let anchor = Anchor::pull(evidence.value, evidence.strength)?;
    for &target in &evidence.targets {
        network.set_anchor(target, Some(anchor))?;
    }
    tracing::info!(
        step = network.step_count(),
        targets = evidence.targets.len(),
        value = evidence.value,
        "external evidence introduced"
    );
    Ok(())
}

fn apply_rewiring(network: &mut Network, rewiring: &Rewiring) -> Result<(), NetworkError> {
    for &(a, b, trust) in &rewiring.edges {
        network.add_edge(a, b, trust)?;
    }
    tracing::info!(
        step = network.step_count(),
        edges = rewiring.edges.len(),
        "new connections formed"
    );
    Ok(())
}

/// Apply whatever the plan schedules before the step after `completed` steps.
fn apply_scheduled(network: &mut Network, plan: &RunPlan, completed: u64) -> Result<(), NetworkError> {
    if let Some(evidence) = plan.evidence.as_ref().filter(|e| e.start_step == completed) {
        install_evidence(network, evidence)?;
    }
    if let Some(rewiring) = plan.rewiring.as_ref().filter(|r| r.at_step == completed) {
        apply_rewiring(network, rewiring)?;
    }
    Ok(())
}

/// Run a scenario to completion.
///
/// Record 0 of the trajectory is the initial state; record `n` is the
/// state after step `n`. The same scenario and seed always produce the
/// same trajectory.
pub fn run_scenario(scenario: Scenario, seed: u64, options: &RunOptions) -> Result<RunReport, RunError> {
    let Scenario {
        key,
        name,
        mut network,
        plan,
    } = scenario;
    plan.dynamics.validate()?;
    let steps = options.steps.unwrap_or(plan.steps);

    tracing::info!(
        scenario = key,
        seed,
        steps,
        agents = network.len(),
        edges = network.edge_count(),
        "starting scenario"
    );

    let initial = network.snapshot();
    let mut recorder = TrajectoryRecorder::new(
        key,
        seed,
        &network,
        options.polarization_threshold,
        options.record_beliefs,
    );
    recorder.record(&network, 0);

    let mut rng = noise_rng(seed);
    if steps > 0 {
        apply_scheduled(&mut network, &plan, 0)?;
    }
    dynamics::run(&mut network, steps, &plan.dynamics, &mut rng, |net, outcome| {
        recorder.record(net, outcome.uninfluenced.len());
        if outcome.step < steps {
            apply_scheduled(net, &plan, outcome.step)?;
        }
        Ok(())
    })?;

    let summary = summarize(&network, key, name, seed, options.polarization_threshold);
    tracing::info!(
        scenario = key,
        mean = summary.overall_mean,
        polarization = summary.polarization.index,
        echo_chamber = summary.echo_chamber_score,
        peak_polarization = recorder.peak_polarization(),
        uninfluenced = recorder.total_uninfluenced(),
        "scenario finished"
    );

    Ok(RunReport {
        trajectory: recorder.into_trajectory(),
        summary,
        initial,
        final_state: network.snapshot(),
        network,
    })
}
