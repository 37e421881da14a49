//! Audit trail: matches, rounds, and the elimination tree
//!
//! Field names on the wire follow the shape the tournament UI consumes
//! (`candidate1`, `candidate2`, `total_batches`).

use serde::{Deserialize, Serialize};

use crate::item::Item;

/// Where a match winner came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
    /// Parsed from the oracle's reply
    Oracle,
    /// Picked at random because the oracle call or its reply was unusable
    RandomFallback,
}

/// Result of judging one pair
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    #[serde(rename = "candidate1")]
    pub first: Item,
    #[serde(rename = "candidate2")]
    pub second: Item,
    /// Always equal to `first` or `second`
    pub winner: Item,
    /// 1-based batch index within the round
    pub batch: usize,
    pub source: VerdictSource,
}

impl Match {
    /// The side that did not win
    pub fn loser(&self) -> &Item {
        if self.winner == self.first {
            &self.second
        } else {
            &self.first
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == VerdictSource::RandomFallback
    }
}

/// One full pass halving the survivor set
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// 1-based round number
    pub round: usize,
    /// One match per input pair, in pair order
    pub matches: Vec<Match>,
    pub total_batches: usize,
}

impl Round {
    /// Winners in match order
    pub fn winners(&self) -> Vec<Item> {
        self.matches.iter().map(|m| m.winner.clone()).collect()
    }

    /// Matches decided by the random fallback
    pub fn fallback_count(&self) -> usize {
        self.matches.iter().filter(|m| m.is_fallback()).count()
    }
}

/// History of completed rounds. Append-only.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EliminationTree {
    rounds: Vec<Round>,
}

impl EliminationTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed round
    pub fn push(&mut self, round: Round) {
        self.rounds.push(round);
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn last(&self) -> Option<&Round> {
        self.rounds.last()
    }

    /// Total matches across all rounds
    pub fn match_count(&self) -> usize {
        self.rounds.iter().map(|r| r.matches.len()).sum()
    }

    /// Round in which `name` was eliminated, if it lost at all
    pub fn eliminated_in(&self, name: &str) -> Option<usize> {
        self.rounds
            .iter()
            .find(|r| r.matches.iter().any(|m| m.loser().name == name))
            .map(|r| r.round)
    }
}
