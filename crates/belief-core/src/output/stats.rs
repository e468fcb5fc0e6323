//! Run Statistics
//!
//! Collects per-step metrics while a scenario runs and condenses the final
//! network into a summary.

use belief_events::{RunSummary, StepRecord, Trajectory};

use crate::components::network::Network;
use crate::systems::metrics;

/// Width of the text bars in the summary table
const BAR_WIDTH: usize = 20;

/// Accumulates the trajectory of one run
#[derive(Debug, Clone)]
pub struct TrajectoryRecorder {
    trajectory: Trajectory,
    threshold: f64,
    record_beliefs: bool,
    peak_polarization: f64,
    total_uninfluenced: usize,
}

impl TrajectoryRecorder {
    pub fn new(
        scenario: &str,
        seed: u64,
        network: &Network,
        threshold: f64,
        record_beliefs: bool,
    ) -> Self {
        let communities = network.agents().iter().map(|a| a.community.clone()).collect();
        Self {
            trajectory: Trajectory::new(scenario, seed, communities),
            threshold,
            record_beliefs,
            peak_polarization: 0.0,
            total_uninfluenced: 0,
        }
    }

    /// Record the network's current state
    pub fn record(&mut self, network: &Network, uninfluenced: usize) {
        let metrics = metrics::measure(network, self.threshold, uninfluenced);
        self.peak_polarization = self.peak_polarization.max(metrics.polarization.index);
        self.total_uninfluenced += uninfluenced;

        let beliefs = if self.record_beliefs {
            network.beliefs()
        } else {
            Vec::new()
        };
        self.trajectory.push(StepRecord {
            step: network.step_count(),
            beliefs,
            metrics,
        });
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Highest polarization index seen so far
    pub fn peak_polarization(&self) -> f64 {
        self.peak_polarization
    }

    /// Noise-only updates summed over all recorded steps
    pub fn total_uninfluenced(&self) -> usize {
        self.total_uninfluenced
    }

    pub fn into_trajectory(self) -> Trajectory {
        self.trajectory
    }
}

/// Summarize the network's current state
pub fn summarize(network: &Network, scenario: &str, name: &str, seed: u64, threshold: f64) -> RunSummary {
    let beliefs = network.beliefs();
    RunSummary {
        scenario: scenario.to_string(),
        name: name.to_string(),
        seed,
        steps: network.step_count(),
        agents: network.len(),
        edges: network.edge_count(),
        overall_mean: metrics::mean_belief(&beliefs),
        polarization: metrics::polarization(&beliefs, threshold).into(),
        echo_chamber_score: metrics::echo_chamber_score(network),
        community_means: metrics::community_means(network),
    }
}

/// Render a value in [0, 1] as a fixed-width bar
pub fn bar(value: f64) -> String {
    let filled = ((value.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

/// Format a summary as the table printed after each run
pub fn render_summary(summary: &RunSummary) -> String {
    let mut lines = vec![
        format!("=== {} - Final State ===", summary.name),
        format!("  {:<28}{}", "Steps simulated", summary.steps),
        format!("  {:<28}{}", "Agents", summary.agents),
        format!("  {:<28}{}", "Connections", summary.edges),
        format!("  {:<28}{:.4}", "Overall mean belief", summary.overall_mean),
        format!(
            "  {:<28}{:.4}  {}",
            "Polarization",
            summary.polarization.index,
            bar(summary.polarization.index)
        ),
        format!(
            "  {:<28}{:.4}  {}",
            "Echo chamber score",
            summary.echo_chamber_score,
            bar(summary.echo_chamber_score)
        ),
    ];
    for (community, mean) in &summary.community_means {
        lines.push(format!(
            "  {:<28}{:.4}  {}",
            format!("[{}] mean belief", community),
            mean,
            bar(*mean)
        ));
    }
    lines.join("\n")
}
