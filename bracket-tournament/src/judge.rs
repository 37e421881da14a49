//! Batch judging
//!
//! Level 3 - One oracle call per batch.
//!
//! Oracle failures and malformed replies never reach the caller: the whole
//! batch is decided by independent fair coin flips instead, and the result is
//! marked [`VerdictSource::RandomFallback`]. Only a winner count that does
//! not match the pair count is an error, since that means a logic defect
//! rather than a bad oracle.

use rand::Rng;

use bracket_core::{
    parse_verdicts, Batch, BracketError, Item, Pair, Result, Verdict, VerdictError,
    VerdictSource,
};

use crate::oracle::{BatchRequest, Oracle, OracleError};

/// Why a batch fell back to random winners
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JudgeFailure {
    #[error("oracle call failed: {0}")]
    OracleUnavailable(#[from] OracleError),

    #[error("malformed verdict: {0}")]
    MalformedVerdict(#[from] VerdictError),
}

/// Winners for one batch
#[derive(Clone, Debug)]
pub struct BatchJudgement {
    /// One winner per pair, in batch order
    pub winners: Vec<Item>,
    pub source: VerdictSource,
    /// Set when `source` is the random fallback
    pub fallback_reason: Option<JudgeFailure>,
}

/// Judge one batch, falling back to random winners on any oracle problem
pub fn judge_batch<O, R>(batch: &Batch, role: &str, oracle: &O, rng: &mut R) -> Result<BatchJudgement>
where
    O: Oracle + ?Sized,
    R: Rng,
{
    let request = BatchRequest::new(batch, role);
    tracing::debug!(batch = batch.index, pairs = batch.len(), "judging batch");

    match consult_oracle(&request, oracle) {
        Ok(verdicts) => {
            let winners = map_verdicts(&batch.pairs, &verdicts)?;
            Ok(BatchJudgement {
                winners,
                source: VerdictSource::Oracle,
                fallback_reason: None,
            })
        }
        Err(failure) => {
            tracing::warn!(
                batch = batch.index,
                pairs = batch.len(),
                "{failure}; falling back to random winners"
            );
            Ok(BatchJudgement {
                winners: random_winners(&batch.pairs, rng),
                source: VerdictSource::RandomFallback,
                fallback_reason: Some(failure),
            })
        }
    }
}

/// Pick an independent, uniformly random winner for every pair
pub fn random_winners<R: Rng>(pairs: &[Pair], rng: &mut R) -> Vec<Item> {
    pairs
        .iter()
        .map(|pair| {
            if rng.gen_bool(0.5) {
                pair.first.clone()
            } else {
                pair.second.clone()
            }
        })
        .collect()
}

fn consult_oracle<O>(request: &BatchRequest, oracle: &O) -> std::result::Result<Vec<Verdict>, JudgeFailure>
where
    O: Oracle + ?Sized,
{
    let reply = oracle.judge(request)?;
    tracing::debug!(batch = request.batch_index, reply = %reply, "oracle replied");
    Ok(parse_verdicts(&reply, request.pairs.len())?)
}

fn map_verdicts(pairs: &[Pair], verdicts: &[Verdict]) -> Result<Vec<Item>> {
    if pairs.len() != verdicts.len() {
        return Err(BracketError::InternalInconsistency(format!(
            "{} verdicts for {} pairs",
            verdicts.len(),
            pairs.len()
        )));
    }

    Ok(pairs
        .iter()
        .zip(verdicts)
        .map(|(pair, &verdict)| pair.pick(verdict).clone())
        .collect())
}
