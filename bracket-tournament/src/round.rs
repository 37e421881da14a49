//! Round execution
//!
//! Level 2 - Phase-level implementation

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use bracket_core::{make_batches, make_pairs, Batch, BracketError, Item, Match, Result, Round};

use crate::config::RoundConfig;
use crate::judge::{judge_batch, BatchJudgement};
use crate::oracle::Oracle;

/// A finished round plus its winners in pair order
#[derive(Clone, Debug)]
pub struct RoundOutcome {
    pub round: Round,
    /// Survivors for the next round (derivable from `round.matches`)
    pub winners: Vec<Item>,
}

/// Run one round over `survivors` (Level 2 phase)
///
/// Survivors are paired positionally and batched; every batch is judged once.
/// Each batch draws its fallback RNG seed from `rng` in batch order before
/// anything is dispatched, so a seeded round gives the same result at any
/// concurrency level.
///
/// # Errors
/// `OddInputCount` for an odd survivor count and `InvalidConfiguration` for a
/// bad batch size or concurrency. Both are raised before the oracle is
/// called.
pub fn run_round<O, R>(
    survivors: &[Item],
    round_number: usize,
    config: &RoundConfig,
    oracle: &O,
    rng: &mut R,
) -> Result<RoundOutcome>
where
    O: Oracle + ?Sized,
    R: Rng,
{
    let pairs = make_pairs(survivors)?;
    config.validate()?;
    let batches = make_batches(pairs, config.batch_size)?;
    let seeds: Vec<u64> = batches.iter().map(|_| rng.gen()).collect();

    tracing::info!(
        "Round {}: {} survivors, {} batches of up to {} pairs",
        round_number,
        survivors.len(),
        batches.len(),
        config.batch_size
    );

    let judgements = if config.max_concurrency > 1 && batches.len() > 1 {
        judge_parallel(&batches, &seeds, config, oracle)?
    } else {
        judge_sequential(&batches, &seeds, config, oracle)?
    };

    let outcome = assemble_round(round_number, &batches, judgements)?;

    if outcome.winners.len() * 2 != survivors.len() {
        return Err(BracketError::InternalInconsistency(format!(
            "{} winners from {} survivors",
            outcome.winners.len(),
            survivors.len()
        )));
    }

    tracing::info!(
        "Round {} complete: {} winners ({} decided by fallback)",
        round_number,
        outcome.winners.len(),
        outcome.round.fallback_count()
    );

    Ok(outcome)
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

/// Judge batches one after another, pausing between them
fn judge_sequential<O>(
    batches: &[Batch],
    seeds: &[u64],
    config: &RoundConfig,
    oracle: &O,
) -> Result<Vec<BatchJudgement>>
where
    O: Oracle + ?Sized,
{
    batches
        .iter()
        .zip(seeds)
        .map(|(batch, &seed)| {
            if batch.index > 1 && !config.batch_delay.is_zero() {
                std::thread::sleep(config.batch_delay);
            }
            judge_seeded(batch, seed, config, oracle, batches.len())
        })
        .collect()
}

/// Judge batches on a bounded pool; results come back in batch order
fn judge_parallel<O>(
    batches: &[Batch],
    seeds: &[u64],
    config: &RoundConfig,
    oracle: &O,
) -> Result<Vec<BatchJudgement>>
where
    O: Oracle + ?Sized,
{
    let threads = config.max_concurrency.min(batches.len());
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("bracket-judge-{i}"))
        .build()
        .map_err(|e| {
            BracketError::InvalidConfiguration(format!("cannot start {threads} judge threads: {e}"))
        })?;

    pool.install(|| {
        batches
            .par_iter()
            .zip(seeds.par_iter())
            .map(|(batch, &seed)| judge_seeded(batch, seed, config, oracle, batches.len()))
            .collect()
    })
}

fn judge_seeded<O>(
    batch: &Batch,
    seed: u64,
    config: &RoundConfig,
    oracle: &O,
    total_batches: usize,
) -> Result<BatchJudgement>
where
    O: Oracle + ?Sized,
{
    tracing::info!(
        "Processing batch {}/{} ({} pairs)",
        batch.index,
        total_batches,
        batch.len()
    );
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    judge_batch(batch, &config.role, oracle, &mut rng)
}

/// Fold batch judgements into match records and the winner list
fn assemble_round(
    round_number: usize,
    batches: &[Batch],
    judgements: Vec<BatchJudgement>,
) -> Result<RoundOutcome> {
    let pair_count: usize = batches.iter().map(Batch::len).sum();
    let mut matches = Vec::with_capacity(pair_count);
    let mut winners = Vec::with_capacity(pair_count);

    for (batch, judgement) in batches.iter().zip(judgements) {
        if judgement.winners.len() != batch.len() {
            return Err(BracketError::InternalInconsistency(format!(
                "batch {} has {} pairs but {} winners",
                batch.index,
                batch.len(),
                judgement.winners.len()
            )));
        }

        for (pair, winner) in batch.pairs.iter().zip(judgement.winners) {
            if !pair.contains(&winner) {
                return Err(BracketError::InternalInconsistency(format!(
                    "winner {} is not part of pair {} vs {}",
                    winner.name, pair.first.name, pair.second.name
                )));
            }
            winners.push(winner.clone());
            matches.push(Match {
                first: pair.first.clone(),
                second: pair.second.clone(),
                winner,
                batch: batch.index,
                source: judgement.source,
            });
        }
    }

    Ok(RoundOutcome {
        round: Round {
            round: round_number,
            matches,
            total_batches: batches.len(),
        },
        winners,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{BatchRequest, OracleError};
    use bracket_core::VerdictSource;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn items(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| Item::new(format!("c{i}"), format!("candidate {i}")))
            .collect()
    }

    /// Always picks the first candidate of every pair
    fn first_wins(request: &BatchRequest) -> std::result::Result<String, OracleError> {
        Ok(format!("[{}]", vec!["1"; request.pairs.len()].join(",")))
    }

    fn garbage(_: &BatchRequest) -> std::result::Result<String, OracleError> {
        Ok("the oracle rambles without an answer".to_string())
    }

    #[test]
    fn test_run_round_first_wins() {
        let survivors = items(8);
        let config = RoundConfig::default().with_batch_size(4);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let outcome = run_round(&survivors, 1, &config, &first_wins, &mut rng).unwrap();

        let names: Vec<&str> = outcome.winners.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["c0", "c2", "c4", "c6"]);
        assert_eq!(outcome.round.round, 1);
        assert_eq!(outcome.round.total_batches, 1);
        assert_eq!(outcome.round.matches.len(), 4);
        assert_eq!(outcome.round.winners(), outcome.winners);
        assert!(outcome
            .round
            .matches
            .iter()
            .all(|m| m.source == VerdictSource::Oracle));
    }

    #[test]
    fn test_run_round_batch_indexes() {
        let survivors = items(10);
        let config = RoundConfig::default().with_batch_size(2);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let outcome = run_round(&survivors, 3, &config, &first_wins, &mut rng).unwrap();

        assert_eq!(outcome.round.total_batches, 3);
        let batches: Vec<usize> = outcome.round.matches.iter().map(|m| m.batch).collect();
        assert_eq!(batches, vec![1, 1, 2, 2, 3]);
        assert_eq!(outcome.round.round, 3);
    }

    #[test]
    fn test_run_round_odd_count_makes_no_calls() {
        let calls = AtomicUsize::new(0);
        let oracle = |request: &BatchRequest| -> std::result::Result<String, OracleError> {
            calls.fetch_add(1, Ordering::SeqCst);
            first_wins(request)
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        for n in [1, 3, 5, 7, 9] {
            let result = run_round(&items(n), 1, &RoundConfig::default(), &oracle, &mut rng);
            assert_eq!(result.unwrap_err(), BracketError::OddInputCount(n));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_run_round_odd_batch_size_makes_no_calls() {
        let calls = AtomicUsize::new(0);
        let oracle = |request: &BatchRequest| -> std::result::Result<String, OracleError> {
            calls.fetch_add(1, Ordering::SeqCst);
            first_wins(request)
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let config = RoundConfig::default().with_batch_size(3);

        let result = run_round(&items(8), 1, &config, &oracle, &mut rng);
        assert!(matches!(result, Err(BracketError::InvalidConfiguration(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_run_round_fallback_completes() {
        let survivors = items(4);
        let config = RoundConfig::default().with_batch_size(2);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let outcome = run_round(&survivors, 1, &config, &garbage, &mut rng).unwrap();

        assert_eq!(outcome.winners.len(), 2);
        assert_eq!(outcome.round.fallback_count(), 2);
        for m in &outcome.round.matches {
            assert!(m.winner == m.first || m.winner == m.second);
        }
    }

    #[test]
    fn test_run_round_mixed_sources() {
        // Batch 1 gets a good answer, batch 2 a malformed one
        let oracle = |request: &BatchRequest| -> std::result::Result<String, OracleError> {
            if request.batch_index == 1 {
                Ok("[2,2]".to_string())
            } else {
                Ok("[2]".to_string())
            }
        };
        let config = RoundConfig::default().with_batch_size(2);
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        let outcome = run_round(&items(8), 1, &config, &oracle, &mut rng).unwrap();
        let sources: Vec<VerdictSource> = outcome.round.matches.iter().map(|m| m.source).collect();

        assert_eq!(
            sources,
            vec![
                VerdictSource::Oracle,
                VerdictSource::Oracle,
                VerdictSource::RandomFallback,
                VerdictSource::RandomFallback
            ]
        );
        assert_eq!(outcome.winners[0].name, "c1");
        assert_eq!(outcome.winners[1].name, "c3");
    }

    #[test]
    fn test_run_round_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let outcome = run_round(&[], 1, &RoundConfig::default(), &first_wins, &mut rng).unwrap();
        assert!(outcome.winners.is_empty());
        assert_eq!(outcome.round.total_batches, 0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let survivors = items(32);
        let sequential = RoundConfig::default().with_batch_size(2);
        let parallel = sequential.clone().with_concurrency(4);

        let mut rng_a = ChaCha8Rng::seed_from_u64(2024);
        let mut rng_b = ChaCha8Rng::seed_from_u64(2024);
        let a = run_round(&survivors, 1, &sequential, &garbage, &mut rng_a).unwrap();
        let b = run_round(&survivors, 1, &parallel, &garbage, &mut rng_b).unwrap();

        assert_eq!(a.round, b.round);
        assert_eq!(a.winners, b.winners);
    }

    #[test]
    fn test_parallel_preserves_pair_order() {
        // Later batches answer first: order must still follow the pairs
        let oracle = |request: &BatchRequest| -> std::result::Result<String, OracleError> {
            let delay = 40u64.saturating_sub(request.batch_index as u64 * 10);
            std::thread::sleep(std::time::Duration::from_millis(delay));
            first_wins(request)
        };
        let config = RoundConfig::default().with_batch_size(2).with_concurrency(4);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let outcome = run_round(&items(16), 1, &config, &oracle, &mut rng).unwrap();

        let names: Vec<&str> = outcome.winners.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["c0", "c2", "c4", "c6", "c8", "c10", "c12", "c14"]);
        let batches: Vec<usize> = outcome.round.matches.iter().map(|m| m.batch).collect();
        assert_eq!(batches, vec![1, 1, 2, 2, 3, 3, 4, 4]);
    }

    #[test]
    fn test_assemble_round_rejects_foreign_winner() {
        let batches = make_batches(make_pairs(&items(2)).unwrap(), 2).unwrap();
        let judgements = vec![BatchJudgement {
            winners: vec![Item::new("stranger", "")],
            source: VerdictSource::Oracle,
            fallback_reason: None,
        }];

        assert!(matches!(
            assemble_round(1, &batches, judgements),
            Err(BracketError::InternalInconsistency(_))
        ));
    }

    #[test]
    fn test_assemble_round_rejects_short_judgement() {
        let batches = make_batches(make_pairs(&items(4)).unwrap(), 2).unwrap();
        let judgements = vec![BatchJudgement {
            winners: vec![Item::new("c0", "candidate 0")],
            source: VerdictSource::Oracle,
            fallback_reason: None,
        }];

        assert!(matches!(
            assemble_round(1, &batches, judgements),
            Err(BracketError::InternalInconsistency(_))
        ));
    }
}
