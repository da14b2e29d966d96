//! Local set arena host.
//!
//! Starts one game with simulated players and optional stdin-driven humans,
//! logs every table event as JSON and shuts down on Ctrl+C or game over.

mod config;
mod input;
mod sink;

use std::sync::Arc;

use anyhow::Error;
use log::info;
use pico_args::Arguments;
use set_arena::{
    ClassicRules, GameManager, PlayerId,
    table::{EventBus, Scoreboard},
};

use config::{Overrides, ServerConfig};

const HELP: &str = "\
Run a local set arena game

USAGE:
  sa_server [OPTIONS]

OPTIONS:
  --players    N           Total number of players     [default: env SA_PLAYERS or 2]
  --humans     N           Players driven from stdin   [default: env SA_HUMAN_PLAYERS or 0]
  --seed       N           Seed for shuffling and bots [default: env SA_SEED or random]

FLAGS:
  -h, --help               Print help information

STDIN (human players):
  <slot>                   Press a slot for player 0
  <player> <slot>          Press a slot for a human player
  scores | reshuffle | quit

ENVIRONMENT:
  RUST_LOG                 Log filter (e.g., debug to see every token)
  SA_TABLE_SIZE            Number of board slots
  SA_RESHUFFLE_INTERVAL_MS Time between reshuffles, or 'off'
  SA_CLAIM_ORDERING        fifo or shuffled
  (See .env.example for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = Overrides {
        players: pargs.opt_value_from_str("--players")?,
        humans: pargs.opt_value_from_str("--humans")?,
        seed: pargs.opt_value_from_str("--seed")?,
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let config = ServerConfig::from_env(overrides)?;
    config.validate()?;
    info!(
        "Starting set arena: {} players ({} human), {} slots, {} ordering",
        config.game.players,
        config.game.human_players,
        config.game.table_size,
        config.game.claim_ordering
    );

    // Subscribe before launching so the initial deal is logged
    let events = EventBus::new();
    let receiver = events.subscribe(config.event_buffer);
    let rules = Arc::new(ClassicRules::new(config.game.feature_count));
    let manager = GameManager::launch(config.game.clone(), rules, None, events)?;

    let sink = tokio::spawn(sink::run_event_log(receiver, manager.shutdown_token()));

    let humans: Vec<_> = manager
        .players()
        .iter()
        .filter(|handle| handle.is_human())
        .cloned()
        .collect();
    if !humans.is_empty() {
        info!("Reading presses for {} human player(s) from stdin", humans.len());
        tokio::spawn(input::run_stdin(
            humans,
            manager.dealer().clone(),
            manager.shutdown_token(),
        ));
    }

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Received Ctrl+C");
        }
        _ = manager.wait_finished() => {}
    }

    let scores = manager.shutdown(config.shutdown_grace()).await?;
    let written = sink.await?;
    log::debug!("Event log wrote {} events", written);

    let winners = winners(&scores);
    info!("Final scores: {:?}", scores);
    info!("Winner(s): {:?}", winners);

    Ok(())
}

/// Players sharing the highest score
fn winners(scores: &Scoreboard) -> Vec<PlayerId> {
    let best = scores.values().copied().max().unwrap_or(0);
    scores
        .iter()
        .filter(|(_, score)| **score == best)
        .map(|(player, _)| *player)
        .collect()
}
