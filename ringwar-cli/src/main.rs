//! RINGWAR CLI - Command-line interface
//!
//! Commands:
//! - play: Play a single match between computer players
//! - benchmark: Time the search strategies on a standard position

mod benchmark;
mod play_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ringwar")]
#[command(about = "RINGWAR ring-board strategy engine")]
struct Cli {
    /// Random seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single match
    Play(play_cmd::PlayArgs),
    /// Benchmark alpha-beta against MCTS
    Benchmark(benchmark::BenchmarkArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play_cmd::run(args, cli.seed),
        Commands::Benchmark(args) => benchmark::run(args, cli.seed),
    }
}
