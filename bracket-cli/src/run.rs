//! Run command - reduce a candidate file to a champion
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: setup_tournament(), run_rounds(), save_results()
//! - Level 3: expected_rounds(), print_summary()
//! - Level 4: file I/O, formatting utilities

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use bracket_core::{load_candidates, Item};
use bracket_tournament::{Oracle, StepOutcome, Tournament, TournamentConfig, TournamentResult};

use crate::config::FileConfig;
use crate::oracle::{build_oracle, round_config, OracleArgs, RoundArgs};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct RunArgs {
    /// JSON file of candidates
    #[arg(long, value_name = "FILE")]
    pub candidates: PathBuf,

    #[command(flatten)]
    pub round: RoundArgs,

    #[command(flatten)]
    pub oracle: OracleArgs,

    /// Keep the file order instead of shuffling before round 1
    #[arg(long)]
    pub no_shuffle: bool,

    /// Write the champion and elimination tree to this file
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the result as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run tournament command
///
/// This function reads like a table of contents:
/// 1. Load candidates and set up the tournament
/// 2. Step rounds until a champion remains
/// 3. Save and print results
pub fn run(args: RunArgs, seed: Option<u64>, file: &FileConfig) -> Result<()> {
    let items = load_candidates(&args.candidates)
        .with_context(|| format!("failed to load candidates from {}", args.candidates.display()))?;
    let config = TournamentConfig {
        round: round_config(&args.round, file),
        shuffle: !args.no_shuffle,
        seed,
    };
    let oracle = build_oracle(&args.oracle, file);

    let mut tournament = setup_tournament(items, config)?;
    let result = run_rounds(&mut tournament, &oracle)?;

    save_results(&result, args.output.as_deref())?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Validate the configuration and start the state machine
pub fn setup_tournament(items: Vec<Item>, config: TournamentConfig) -> Result<Tournament> {
    let mut tournament = Tournament::new(config).context("invalid tournament configuration")?;
    let count = items.len();
    tournament
        .start(items)
        .with_context(|| format!("cannot start a tournament with {count} candidates"))?;
    Ok(tournament)
}

/// Step every round, showing progress
pub fn run_rounds<O>(tournament: &mut Tournament, oracle: &O) -> Result<TournamentResult>
where
    O: Oracle + ?Sized,
{
    let progress = ProgressBar::new(expected_rounds(tournament.state().survivors.len()) as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:30}] round {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    loop {
        let round = tournament.state().current_round;
        let step = tournament
            .step(oracle)
            .with_context(|| format!("round {round} failed"))?;
        progress.inc(1);

        match step {
            StepOutcome::Advanced { survivors, .. } => {
                progress.set_message(format!("{survivors} remaining"));
            }
            StepOutcome::Complete { champion } => {
                progress.finish_with_message(format!("champion: {}", champion.name));
                break;
            }
            StepOutcome::Paused => anyhow::bail!("tournament paused unexpectedly"),
        }
    }

    tournament
        .result()
        .context("tournament finished without a champion")
}

/// Write the result as JSON when an output path is given
fn save_results(result: &TournamentResult, output: Option<&Path>) -> Result<()> {
    let Some(path) = output else {
        return Ok(());
    };

    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!("Results saved to {}", path.display());
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Rounds needed while the field keeps halving evenly
pub fn expected_rounds(mut count: usize) -> usize {
    let mut rounds = 0;
    while count > 1 && count % 2 == 0 {
        count /= 2;
        rounds += 1;
    }
    rounds
}

fn print_summary(result: &TournamentResult) {
    println!("\n=== TOURNAMENT COMPLETE ===");
    println!("Champion: {}", result.champion.name);
    if !result.champion.description.is_empty() {
        println!("  {}", result.champion.description);
    }

    println!("\nRounds:");
    for round in result.elimination_tree.rounds() {
        println!(
            "  Round {}: {} matches in {} batches ({} random fallbacks)",
            round.round,
            round.matches.len(),
            round.total_batches,
            round.fallback_count()
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bracket_tournament::{BatchRequest, OracleError, RoundConfig};

    fn second_wins(request: &BatchRequest) -> std::result::Result<String, OracleError> {
        Ok(format!("[{}]", vec!["2"; request.pairs.len()].join(",")))
    }

    fn items(n: usize) -> Vec<Item> {
        (0..n).map(|i| Item::new(format!("c{i}"), "")).collect()
    }

    #[test]
    fn test_expected_rounds() {
        assert_eq!(expected_rounds(1), 0);
        assert_eq!(expected_rounds(2), 1);
        assert_eq!(expected_rounds(8), 3);
        assert_eq!(expected_rounds(6), 1);
    }

    #[test]
    fn test_run_rounds_to_champion() {
        let config = TournamentConfig::new(RoundConfig::default()).with_shuffle(false);
        let mut tournament = setup_tournament(items(8), config).unwrap();

        let result = run_rounds(&mut tournament, &second_wins).unwrap();
        assert_eq!(result.champion.name, "c7");
        assert_eq!(result.elimination_tree.len(), 3);
    }

    #[test]
    fn test_setup_rejects_odd_count() {
        let err = setup_tournament(items(3), TournamentConfig::default()).unwrap_err();
        assert!(err.to_string().contains("3 candidates"));
    }

    #[test]
    fn test_save_results_writes_json() {
        let config = TournamentConfig::new(RoundConfig::default().with_batch_size(2)).with_shuffle(false);
        let mut tournament = setup_tournament(items(4), config).unwrap();
        let result = run_rounds(&mut tournament, &second_wins).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.json");
        save_results(&result, Some(&path)).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["champion"]["name"], "c3");
        assert_eq!(saved["elimination_tree"].as_array().unwrap().len(), 2);
    }
}
