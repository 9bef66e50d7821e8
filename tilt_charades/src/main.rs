//! tilt_charades — interactive entry point.

use std::path::PathBuf;

use anyhow::Context;
use charades_core::{GameConfig, RoundSummary};
use charades_deck::{curated, CuratedSupplier, DeckSupplier, FileSupplier, Shuffle};
use clap::Parser;
use tilt_charades::app::{run, AppConfig, SensorMode};
use tracing_subscriber::EnvFilter;

/// Forehead charades: tilt forward for correct, back to pass.
#[derive(Parser, Debug)]
#[command(name = "tilt_charades")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Built-in deck to play (see --list-decks)
    #[arg(short, long, default_value = "animals")]
    deck: String,

    /// Play a deck from a JSON file instead: {"title", "icon", "cards": [...]}
    #[arg(long, conflicts_with = "deck")]
    deck_file: Option<PathBuf>,

    /// Config file path (default ~/.tilt_charades/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for card order and simulated sensor noise
    #[arg(long)]
    seed: Option<u64>,

    /// Deal cards in stored order
    #[arg(long)]
    no_shuffle: bool,

    /// Play with keys only
    #[arg(long, conflicts_with = "replay")]
    no_sensor: bool,

    /// Feed recorded sensor readings (JSON lines) instead of the simulator
    #[arg(long)]
    replay: Option<PathBuf>,

    /// List the built-in decks and exit
    #[arg(long)]
    list_decks: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if cli.list_decks {
        for deck in curated::curated_decks() {
            let short = deck.id().strip_prefix("deck_").unwrap_or(deck.id());
            println!("  {:<10} {} {} ({} cards)", short, deck.icon(), deck.title(), deck.len());
        }
        return Ok(());
    }

    let game = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::load_default().context("loading default config")?,
    };

    let shuffle = match (cli.no_shuffle, cli.seed) {
        (true, _)        => Shuffle::Off,
        (false, Some(s)) => Shuffle::Seeded(s),
        (false, None)    => Shuffle::Random,
    };
    let supplier: Box<dyn DeckSupplier> = match &cli.deck_file {
        Some(path) => Box::new(FileSupplier::new(path, shuffle)),
        None       => Box::new(CuratedSupplier::new(cli.deck.as_str(), shuffle)),
    };

    let sensor = match (&cli.replay, cli.no_sensor) {
        (_, true)          => SensorMode::Off,
        (Some(path), _)    => SensorMode::Replay(path.clone()),
        (None, false)      => SensorMode::Simulated,
    };

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Tilt Charades — tilt forward: correct, back: pass     ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let cfg = AppConfig { game, sensor, seed: cli.seed.unwrap_or(0) };
    if let Some(summary) = run(cfg, supplier)? {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(s: &RoundSummary) {
    println!("  {} — {} out of {} cards ({}%) {}", s.deck_title, s.score, s.total, s.percentage, s.rating.glyph());
    println!();
    println!("  Correct ({}):", s.correct.len());
    for card in &s.correct {
        println!("    ✓ {card}");
    }
    println!("  Passed ({}):", s.passed.len());
    for card in &s.passed {
        println!("    → {card}");
    }
    println!();
}
