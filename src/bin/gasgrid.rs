//! Command-line driver over the JSON file store.
//!
//! ```text
//! gasgrid grid
//! gasgrid simulate --ticks 10
//! gasgrid reset
//! ```
//!
//! Settings come from `gasgrid.toml` / `gasgrid.ron` / `GASGRID__*` (or `--config`).
//! Output is JSON on stdout; logs go to stderr (`RUST_LOG` controls the level).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use gasgrid::config::{load_config, try_load_config};
use gasgrid::core::{GridSnapshot, PlacedCell};
use gasgrid::store::JsonFileStore;
use gasgrid::{GasRegistry, Simulator, TickOutcome};

#[derive(Parser, Debug)]
#[command(name = "gasgrid", version, about = "Vertical density-ordering gas grid")]
struct Cli {
    /// Explicit configuration file (TOML or RON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the snapshot file from the configuration
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the current grid as a snapshot
    Grid,
    /// Advance the grid and print what changed
    Simulate {
        /// Number of ticks to run; only the last tick's output is printed
        #[arg(long, default_value = "1")]
        ticks: usize,
    },
    /// Clear the persisted grid
    Reset,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Output {
    Changes { cells: Vec<PlacedCell> },
    Grid { grid: GridSnapshot },
    Reset { message: &'static str },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => try_load_config(Some(path.as_path()))
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => load_config(),
    };
    if let Some(path) = cli.store {
        config.store.path = path;
    }
    // Each invocation is one request; keep the snapshot between them.
    config.store.clear_on_start = false;

    let registry = GasRegistry::default();
    let store = JsonFileStore::new(&config.store.path);
    let mut sim = Simulator::open(&config, registry, store)
        .with_context(|| format!("Failed to open store {}", config.store.path.display()))?;

    let output = match cli.command {
        Commands::Grid => {
            let grid = sim.current_grid().context("Error fetching grid")?;
            Output::Grid {
                grid: grid.to_snapshot(sim.registry())?,
            }
        }
        Commands::Simulate { ticks } => {
            anyhow::ensure!(ticks > 0, "--ticks must be at least 1");
            let mut outcome = sim.advance().context("Error during simulation")?;
            for _ in 1..ticks {
                outcome = sim.advance().context("Error during simulation")?;
            }
            match outcome {
                TickOutcome::Changes(changes) => Output::Changes {
                    cells: changes
                        .iter()
                        .map(|c| c.to_placed(sim.registry()))
                        .collect::<gasgrid::error::Result<_>>()?,
                },
                TickOutcome::FullGrid(grid) => Output::Grid {
                    grid: grid.to_snapshot(sim.registry())?,
                },
            }
        }
        Commands::Reset => {
            sim.reset().context("Failed to clear grid store")?;
            Output::Reset {
                message: "grid store cleared",
            }
        }
    };

    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}
