//! Batch partitioning
//!
//! A batch is the unit of work handed to the oracle in one call.

use crate::error::{BracketError, Result};
use crate::item::Pair;

/// A contiguous group of pairs judged in one oracle call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Batch {
    /// 1-based position within the round
    pub index: usize,
    /// Non-empty, at most the configured batch size
    pub pairs: Vec<Pair>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Batch size must be even and positive
pub fn validate_batch_size(batch_size: usize) -> Result<()> {
    if batch_size == 0 || batch_size % 2 != 0 {
        return Err(BracketError::InvalidConfiguration(format!(
            "batch size must be a positive even number, got {batch_size}"
        )));
    }
    Ok(())
}

/// Number of batches `pair_count` pairs split into
pub fn batch_count(pair_count: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    pair_count.div_ceil(batch_size)
}

/// Partition pairs into batches of exactly `batch_size`, the last one holding
/// the remainder. Order is preserved.
pub fn make_batches(pairs: Vec<Pair>, batch_size: usize) -> Result<Vec<Batch>> {
    validate_batch_size(batch_size)?;

    let mut batches = Vec::with_capacity(batch_count(pairs.len(), batch_size));
    let mut remaining = pairs.into_iter().peekable();

    while remaining.peek().is_some() {
        let chunk: Vec<Pair> = remaining.by_ref().take(batch_size).collect();
        batches.push(Batch {
            index: batches.len() + 1,
            pairs: chunk,
        });
    }

    Ok(batches)
}
