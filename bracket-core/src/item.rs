//! Items and pairs
//!
//! Pairing is positional: positions 2i and 2i+1 form pair i. Any shuffling
//! happens once, when a tournament starts, never here.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{BracketError, Result};
use crate::verdict::Verdict;

/// An entity being ranked
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    /// Unique within a round
    pub name: String,
    /// Free text shown to the oracle (`intro` in older candidate files)
    #[serde(alias = "intro", default)]
    pub description: String,
}

impl Item {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Two items compared head-to-head
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pair {
    pub first: Item,
    pub second: Item,
}

impl Pair {
    pub fn new(first: Item, second: Item) -> Self {
        Self { first, second }
    }

    /// The item a verdict points at
    pub fn pick(&self, verdict: Verdict) -> &Item {
        match verdict {
            Verdict::First => &self.first,
            Verdict::Second => &self.second,
        }
    }

    /// Whether `item` is one of the two sides
    pub fn contains(&self, item: &Item) -> bool {
        self.first == *item || self.second == *item
    }
}

/// Group items into adjacent pairs.
///
/// Fails with `OddInputCount` when the count is odd.
pub fn make_pairs(items: &[Item]) -> Result<Vec<Pair>> {
    if items.len() % 2 != 0 {
        return Err(BracketError::OddInputCount(items.len()));
    }

    Ok(items
        .chunks_exact(2)
        .map(|chunk| Pair::new(chunk[0].clone(), chunk[1].clone()))
        .collect())
}

/// First name that occurs more than once, if any
pub fn find_duplicate_name(items: &[Item]) -> Option<&str> {
    let mut seen = FxHashSet::default();
    items
        .iter()
        .map(|item| item.name.as_str())
        .find(|name| !seen.insert(*name))
}
