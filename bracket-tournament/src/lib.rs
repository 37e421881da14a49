//! BRACKET Tournament - Oracle-judged binary reduction
//!
//! This crate provides the parts of the engine that consult an oracle:
//! - Oracle capability and request shape
//! - Batch judging with random fallback
//! - Round execution (sequential or bounded-parallel)
//! - The tournament state machine
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run_tournament, Tournament (orchestration)
//! - Level 2: run_round (phases)
//! - Level 3: judge_batch, build_prompt (steps)
//! - Level 4: configuration, oracle trait

mod config;
mod judge;
mod oracle;
mod prompt;
mod round;
mod tournament;

pub use config::{RoundConfig, TournamentConfig, DEFAULT_BATCH_SIZE, DEFAULT_ROLE};
pub use judge::{judge_batch, random_winners, BatchJudgement, JudgeFailure};
pub use oracle::{BatchRequest, Oracle, OracleError};
pub use prompt::build_prompt;
pub use round::{run_round, RoundOutcome};
pub use tournament::{
    run_tournament, PendingRound, Phase, StepOutcome, Tournament, TournamentResult,
    TournamentState,
};
