#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Tower Conquest match.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use tower_conquest_core::{Event, GameMode, Phase};
use tower_conquest_simulation::{Simulation, SimulationConfig};
use tower_conquest_world::query;

/// Runs a Tower Conquest match without a renderer and prints its progress.
#[derive(Debug, Parser)]
#[command(name = "tower-conquest", version)]
struct Cli {
    /// Game mode: `2player` or `4player`.
    #[arg(long)]
    mode: Option<GameMode>,
    /// Seed for the AI random source.
    #[arg(long)]
    seed: Option<u64>,
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Let the AI play the local seat as well.
    #[arg(long)]
    autopilot: bool,
    /// Stop after this many battle ticks even without a result.
    #[arg(long, default_value_t = 100_000)]
    max_ticks: u64,
    /// Print the final snapshot as JSON.
    #[arg(long)]
    json: bool,
}

/// Entry point for the Tower Conquest command-line interface.
fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if cli.autopilot {
        config.ai_players[0] = true;
    }

    let mode = config.mode;
    let mut simulation = Simulation::new(config).context("invalid configuration")?;
    println!("{}", query::welcome_banner(simulation.world()));
    simulation.start_match(mode);

    let frame = simulation.config().frame_interval();
    while simulation.phase() != Phase::Result
        && query::tick_index(simulation.world()) < cli.max_ticks
    {
        simulation.advance(frame);
        for event in simulation.take_events() {
            report(&event);
        }
    }

    if cli.json {
        let snapshot = serde_json::to_string_pretty(&simulation.snapshot())
            .context("serializing the final snapshot")?;
        println!("{snapshot}");
    }

    match simulation.acknowledge_result() {
        Some(outcome) => println!("winner: {} (wager {})", outcome.winner, outcome.wager),
        None => warn!(
            "stopped after {} battle ticks without a result",
            query::tick_index(simulation.world())
        ),
    }
    Ok(())
}

fn report(event: &Event) {
    match event {
        Event::PhaseChanged { phase, countdown } => {
            println!("phase {phase:?} ({countdown}s)");
        }
        Event::PlayerEliminated { player, conqueror } => {
            println!("{player} eliminated by {conqueror}");
        }
        Event::TerritoryConquered {
            conqueror, tiles, ..
        } => {
            println!("{conqueror} conquered {tiles} tiles");
        }
        _ => {}
    }
}
