//! BRACKET Core - Data model and pure building blocks
//!
//! This crate provides the pieces of the reduction engine that never talk to
//! an oracle:
//! - Items, pairs and adjacent pairing
//! - Batch partitioning
//! - Verdict parsing of raw oracle replies
//! - Match / round / elimination tree records
//! - Candidate file loading

pub mod batch;
pub mod candidates;
pub mod error;
pub mod item;
pub mod record;
pub mod verdict;

// Re-exports for convenient access
pub use batch::{batch_count, make_batches, validate_batch_size, Batch};
pub use candidates::{load_candidates, parse_candidates};
pub use error::{BracketError, Result};
pub use item::{find_duplicate_name, make_pairs, Item, Pair};
pub use record::{EliminationTree, Match, Round, VerdictSource};
pub use verdict::{parse_verdicts, Verdict, VerdictError};
