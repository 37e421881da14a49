//! Serve command - start the HTTP API
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: configure_server(), start_server()
//! - Level 3: (delegated to bracket-server crate)
//! - Level 4: configuration validation

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use bracket_server::{run_server, ServerConfig};
use bracket_tournament::Oracle;

use crate::config::FileConfig;
use crate::oracle::{build_oracle, round_config, OracleArgs, RoundArgs};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct ServeArgs {
    /// Port number to listen on
    #[arg(long, default_value = "3000")]
    pub port: u16,

    /// JSON file served by the candidates endpoints
    #[arg(long, value_name = "FILE", default_value = "candidates.json")]
    pub candidates: PathBuf,

    /// Defaults for requests that omit them
    #[command(flatten)]
    pub round: RoundArgs,

    #[command(flatten)]
    pub oracle: OracleArgs,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run server command
///
/// This function reads like a table of contents:
/// 1. Configure server
/// 2. Start server (blocking)
pub fn run(args: ServeArgs, seed: Option<u64>, file: &FileConfig) -> Result<()> {
    let config = configure_server(&args, seed, file)?;
    let oracle: Arc<dyn Oracle> = Arc::new(build_oracle(&args.oracle, file));

    tracing::info!("Starting BRACKET server on port {}", config.port);

    start_server(config, oracle)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Configure server from command arguments
fn configure_server(args: &ServeArgs, seed: Option<u64>, file: &FileConfig) -> Result<ServerConfig> {
    check_candidates_file(&args.candidates)?;

    let round = round_config(&args.round, file);
    round.validate().context("invalid round defaults")?;

    Ok(ServerConfig::default()
        .with_port(args.port)
        .with_candidates_path(&args.candidates)
        .with_round(round)
        .with_seed(seed))
}

/// Start the server (blocking)
fn start_server(config: ServerConfig, oracle: Arc<dyn Oracle>) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async { run_server(config, oracle).await })
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Warn about a missing candidate file; reject a directory
fn check_candidates_file(path: &Path) -> Result<()> {
    if !path.exists() {
        tracing::warn!(
            "Candidates file does not exist: {}. The candidates endpoints will return 404.",
            path.display()
        );
    } else if path.is_dir() {
        anyhow::bail!("Candidates path is a directory: {}", path.display());
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
