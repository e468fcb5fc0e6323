//! Epistemic Propagation Engine
//!
//! Runs the preset belief-propagation scenarios from the command line and
//! writes their trajectories as JSON.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use belief_core::config::Config;
use belief_core::error::RunError;
use belief_core::output::{render_summary, write_run};
use belief_core::runner::{run_scenario, RunOptions};
use belief_core::setup::scenarios::{lookup, ScenarioEntry, SCENARIOS};

/// Command line arguments for the engine
#[derive(Parser, Debug)]
#[command(name = "epistemic_engine")]
#[command(about = "A simulation of how beliefs spread and change")]
struct Args {
    /// Scenario to run (see --list)
    #[arg(long, conflicts_with = "all")]
    scenario: Option<String>,

    /// Run every scenario in turn
    #[arg(long)]
    all: bool,

    /// List the available scenarios and exit
    #[arg(long)]
    list: bool,

    /// Random seed for reproducibility (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of steps to simulate (overrides the scenario default)
    #[arg(long)]
    steps: Option<u64>,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for run output (overrides the config file)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print summaries only, write no files
    #[arg(long)]
    no_output: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_target(false))
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), RunError> {
    println!("Epistemic Propagation Engine");
    println!("============================");

    if args.list || (args.scenario.is_none() && !args.all) {
        print_menu();
        if !args.list {
            println!("Choose one with --scenario <key>, or run them all with --all.");
        }
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(),
    };
    let seed = args.seed.unwrap_or(config.simulation.seed);
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.simulation.output_dir.clone());
    let options = RunOptions::from_config(&config).with_steps(args.steps);

    println!("Seed: {}", seed);
    if let Some(steps) = args.steps {
        println!("Steps: {}", steps);
    }
    println!();

    let entries: Vec<&ScenarioEntry> = match &args.scenario {
        Some(key) => vec![lookup(key).ok_or_else(|| RunError::UnknownScenario(key.clone()))?],
        None => SCENARIOS.iter().collect(),
    };

    for entry in entries {
        println!("{}", entry.name);
        println!("  {}", entry.description);
        println!("  Question: {}", entry.question);
        println!();

        let scenario = (entry.build)(&config.scenarios, seed)?;
        let report = run_scenario(scenario, seed, &options)?;

        println!("{}", render_summary(&report.summary));
        println!();

        if !args.no_output {
            let files = write_run(&output_dir, &report)?;
            println!("Saved:");
            for path in files.all() {
                println!("  {}", path.display());
            }
            println!();
        }
    }

    if args.all {
        println!("All scenarios complete.");
    }
    Ok(())
}

fn print_menu() {
    println!();
    println!("  {:<16}{:<22}{}", "Key", "Scenario", "Question");
    for entry in SCENARIOS {
        println!("  {:<16}{:<22}{}", entry.key, entry.name, entry.question);
    }
    println!();
}
