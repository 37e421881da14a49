//! BRACKET CLI - Command-line interface
//!
//! Commands:
//! - run: Reduce a candidate file to a champion
//! - round: Run a single round and print the winners
//! - serve: Start the HTTP API
//! - init: Write a default config file

mod config;
mod oracle;
mod round_cmd;
mod run;
mod serve;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bracket")]
#[command(about = "BRACKET oracle-judged elimination tournaments")]
#[command(version)]
struct Cli {
    /// Random seed for shuffling and fallback picks
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Config file (defaults to ~/.config/bracket/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a whole tournament
    Run(run::RunArgs),
    /// Run a single round
    Round(round_cmd::SingleRoundArgs),
    /// Start the HTTP API
    Serve(serve::ServeArgs),
    /// Write a default config file
    Init,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => config::config_path()?,
    };

    if let Commands::Init = cli.command {
        config::create_default_config(&config_path)?;
        println!("Created config at {}", config_path.display());
        return Ok(());
    }

    let file = config::load_config(&config_path)?;

    match cli.command {
        Commands::Run(args) => run::run(args, cli.seed, &file),
        Commands::Round(args) => round_cmd::run(args, cli.seed, &file),
        Commands::Serve(args) => serve::run(args, cli.seed, &file),
        Commands::Init => Ok(()),
    }
}
