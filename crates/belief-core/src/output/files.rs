//! Run Files
//!
//! Writes trajectories, summaries and network snapshots as JSON.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RunError;
use crate::runner::RunReport;

/// Paths written for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunFiles {
    pub trajectory: PathBuf,
    pub summary: PathBuf,
    pub initial_network: PathBuf,
    pub final_network: PathBuf,
}

impl RunFiles {
    pub fn for_scenario(dir: impl AsRef<Path>, key: &str) -> Self {
        let dir = dir.as_ref();
        Self {
            trajectory: dir.join(format!("{}_trajectory.json", key)),
            summary: dir.join(format!("{}_summary.json", key)),
            initial_network: dir.join(format!("{}_network_initial.json", key)),
            final_network: dir.join(format!("{}_network_final.json", key)),
        }
    }

    pub fn all(&self) -> [&Path; 4] {
        [
            self.trajectory.as_path(),
            self.summary.as_path(),
            self.initial_network.as_path(),
            self.final_network.as_path(),
        ]
    }
}

/// Write a value to file as pretty JSON
pub fn write_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<(), RunError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Write every output file for a finished run into `dir`
pub fn write_run(dir: impl AsRef<Path>, report: &RunReport) -> Result<RunFiles, RunError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let files = RunFiles::for_scenario(dir, &report.summary.scenario);
    fs::write(&files.trajectory, report.trajectory.to_json()?)?;
    fs::write(&files.summary, report.summary.to_json_pretty()?)?;
    write_json(&report.initial, &files.initial_network)?;
    write_json(&report.final_state, &files.final_network)?;

    tracing::info!(
        scenario = %report.summary.scenario,
        dir = %dir.display(),
        "wrote run output"
    );
    Ok(files)
}
