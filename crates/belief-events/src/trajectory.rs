//! Trajectory Types
//!
//! A trajectory is the ordered sequence of per-step records produced by one
//! scenario run. Record 0 is the initial state; record `n` is the state after
//! the `n`th synchronous update.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Polarization breakdown for one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PolarizationRecord {
    pub variance: f64,
    pub extremity: f64,
    pub bimodal_fraction: f64,
    pub index: f64,
}

/// Network-wide metrics for one step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub mean_belief: f64,
    pub echo_chamber: f64,
    pub polarization: PolarizationRecord,
    /// Agents whose update had no neighbor influence this step
    #[serde(default)]
    pub uninfluenced: usize,
}

/// State of the run after one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: u64,
    /// Belief vector indexed by agent id; empty when belief recording is off
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub beliefs: Vec<f64>,
    pub metrics: MetricsRecord,
}

/// Full record of a scenario run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub scenario: String,
    pub seed: u64,
    /// Community label per agent id
    pub communities: Vec<String>,
    pub records: Vec<StepRecord>,
}

impl Trajectory {
    /// Creates an empty trajectory for a run.
    pub fn new(scenario: impl Into<String>, seed: u64, communities: Vec<String>) -> Self {
        Self {
            scenario: scenario.into(),
            seed,
            communities,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: StepRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of update steps covered (the initial record is not a step).
    pub fn steps(&self) -> u64 {
        self.records.last().map(|r| r.step).unwrap_or(0)
    }

    pub fn first(&self) -> Option<&StepRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&StepRecord> {
        self.records.last()
    }

    /// Belief vector recorded at `step`, if beliefs were recorded.
    pub fn beliefs_at(&self, step: u64) -> Option<&[f64]> {
        self.records
            .iter()
            .find(|r| r.step == step)
            .filter(|r| !r.beliefs.is_empty())
            .map(|r| r.beliefs.as_slice())
    }

    /// Belief of one agent over time.
    pub fn agent_history(&self, agent_id: usize) -> Vec<f64> {
        self.records
            .iter()
            .filter_map(|r| r.beliefs.get(agent_id).copied())
            .collect()
    }

    /// Network mean belief at each recorded step.
    pub fn mean_history(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.metrics.mean_belief).collect()
    }

    /// Per-community mean belief at each recorded step.
    pub fn community_history(&self) -> BTreeMap<String, Vec<f64>> {
        let mut history: BTreeMap<String, Vec<f64>> = BTreeMap::new();

        for record in self.records.iter().filter(|r| !r.beliefs.is_empty()) {
            let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
            for (belief, community) in record.beliefs.iter().zip(&self.communities) {
                let entry = sums.entry(community.as_str()).or_insert((0.0, 0));
                entry.0 += belief;
                entry.1 += 1;
            }
            for (community, (sum, count)) in sums {
                history
                    .entry(community.to_string())
                    .or_default()
                    .push(sum / count as f64);
            }
        }

        history
    }

    /// Serializes the trajectory to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes a trajectory from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// End-of-run summary, the same figures the CLI prints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub scenario: String,
    pub name: String,
    pub seed: u64,
    pub steps: u64,
    pub agents: usize,
    pub edges: usize,
    pub overall_mean: f64,
    pub polarization: PolarizationRecord,
    pub echo_chamber_score: f64,
    pub community_means: BTreeMap<String, f64>,
}

impl RunSummary {
    /// Serializes the summary to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(step: u64, beliefs: Vec<f64>) -> StepRecord {
        let mean = beliefs.iter().sum::<f64>() / beliefs.len().max(1) as f64;
        StepRecord {
            step,
            beliefs,
            metrics: MetricsRecord {
                mean_belief: mean,
                ..MetricsRecord::default()
            },
        }
    }

    fn sample() -> Trajectory {
        let communities = vec!["a".to_string(), "a".to_string(), "b".to_string()];
        let mut trajectory = Trajectory::new("bridger", 42, communities);
        trajectory.push(record(0, vec![0.8, 0.6, 0.2]));
        trajectory.push(record(1, vec![0.7, 0.5, 0.3]));
        trajectory
    }

    #[test]
    fn test_steps_and_lookup() {
        let trajectory = sample();
        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory.steps(), 1);
        assert_eq!(trajectory.beliefs_at(1), Some(&[0.7, 0.5, 0.3][..]));
        assert!(trajectory.beliefs_at(5).is_none());
        assert_eq!(trajectory.agent_history(2), vec![0.2, 0.3]);
    }

    #[test]
    fn test_community_history() {
        let history = sample().community_history();
        let a = &history["a"];
        assert!((a[0] - 0.7).abs() < 1e-12);
        assert!((a[1] - 0.6).abs() < 1e-12);
        assert_eq!(history["b"], vec![0.2, 0.3]);
    }

    #[test]
    fn test_metrics_only_records() {
        let mut trajectory = Trajectory::new("cascade", 1, vec!["n".to_string()]);
        trajectory.push(record(0, Vec::new()));
        assert!(trajectory.beliefs_at(0).is_none());
        assert!(trajectory.community_history().is_empty());

        let json = trajectory.to_json().unwrap();
        assert!(!json.contains("beliefs"));
    }

    #[test]
    fn test_trajectory_json_roundtrip() {
        let trajectory = sample();
        let parsed = Trajectory::from_json(&trajectory.to_json().unwrap()).unwrap();
        assert_eq!(parsed, trajectory);
    }
}
