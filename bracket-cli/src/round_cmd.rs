//! Round command - run one round and print the winners
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: (delegated to bracket_tournament::run_round)
//! - Level 3: print_matches()

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use bracket_core::{load_candidates, Item, Match};
use bracket_tournament::{run_round, RoundOutcome};

use crate::config::FileConfig;
use crate::oracle::{build_oracle, round_config, OracleArgs, RoundArgs};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SingleRoundArgs {
    /// JSON file of candidates, paired in file order
    #[arg(long, value_name = "FILE")]
    pub candidates: PathBuf,

    #[command(flatten)]
    pub round: RoundArgs,

    #[command(flatten)]
    pub oracle: OracleArgs,

    /// Print the round as JSON
    #[arg(long)]
    pub json: bool,
}

/// Same shape as the HTTP round endpoint
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoundReport<'a> {
    winners: &'a [Item],
    matches: &'a [Match],
    total_batches: usize,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run a single round over the candidate file
pub fn run(args: SingleRoundArgs, seed: Option<u64>, file: &FileConfig) -> Result<()> {
    let items = load_candidates(&args.candidates)
        .with_context(|| format!("failed to load candidates from {}", args.candidates.display()))?;
    let config = round_config(&args.round, file);
    let oracle = build_oracle(&args.oracle, file);
    let mut rng = create_rng(seed);

    let outcome = run_round(&items, 1, &config, &oracle, &mut rng).context("round failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report(&outcome))?);
    } else {
        print_matches(&outcome);
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn report(outcome: &RoundOutcome) -> RoundReport<'_> {
    RoundReport {
        winners: &outcome.winners,
        matches: &outcome.round.matches,
        total_batches: outcome.round.total_batches,
    }
}

fn print_matches(outcome: &RoundOutcome) {
    println!("\n=== ROUND RESULTS ({} batches) ===", outcome.round.total_batches);
    for m in &outcome.round.matches {
        let marker = if m.is_fallback() { " (random)" } else { "" };
        println!(
            "  batch {}: {} vs {} -> {}{}",
            m.batch, m.first.name, m.second.name, m.winner.name, marker
        );
    }
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}
