use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::time::Duration;

use traffic_agents::config::NetworkConfig;
use traffic_agents::render::ConsolePanel;
use traffic_agents::simulation::{SimWorld, SimulationLoop, SnapshotObserver, StdRandom};

#[derive(Parser)]
#[command(name = "traffic_agents")]
#[command(about = "Agent-based simulation of road congestion and adaptive traffic lights")]
struct Cli {
    /// Network configuration (TOML). Defaults to the built-in Yogyakarta network
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the random source; overrides the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many ticks instead of running until terminated
    #[arg(long)]
    ticks: Option<u64>,

    /// Milliseconds between ticks; overrides the config file
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Do not draw the console panel
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => NetworkConfig::load(path)
            .with_context(|| format!("Failed to load network config {}", path.display()))?,
        None => NetworkConfig::yogyakarta(),
    };
    if let Some(interval_ms) = cli.interval_ms {
        config.simulation.tick_interval_ms = interval_ms;
    }

    let rng = match cli.seed.or(config.simulation.seed) {
        Some(seed) => StdRandom::seeded(seed),
        None => StdRandom::from_entropy(),
    };
    info!("Random seed: {}", rng.seed());

    let world = config
        .build_world(rng)
        .context("Invalid network configuration")?;
    info!(
        "Loaded network: {} segments, {} lights",
        world.segments.len(),
        world.lights.len()
    );

    let interval = config.simulation.tick_interval();
    if cli.quiet {
        run(world, (), interval, cli.ticks);
    } else {
        run(world, ConsolePanel::stdout(), interval, cli.ticks);
    }

    Ok(())
}

fn run<O: SnapshotObserver>(
    world: SimWorld<StdRandom>,
    observer: O,
    interval: Duration,
    ticks: Option<u64>,
) {
    let mut sim = SimulationLoop::new(world, observer).with_interval(interval);
    sim.run(ticks);
}
