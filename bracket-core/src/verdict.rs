//! Verdict parsing
//!
//! Oracles tend to wrap their answer in prose, so the parser is lenient about
//! the surrounding text: it takes everything from the first `[` to the last
//! `]` and decodes that as a JSON list of integers. The payload itself is
//! checked strictly for length and domain.

use serde::{Deserialize, Serialize};

/// Which side of a pair won
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Index 1
    First,
    /// Index 2
    Second,
}

impl Verdict {
    /// Map a 1-based oracle index onto a side
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            1 => Some(Verdict::First),
            2 => Some(Verdict::Second),
            _ => None,
        }
    }

    /// 1-based index as the oracle writes it
    pub fn index(self) -> u8 {
        match self {
            Verdict::First => 1,
            Verdict::Second => 2,
        }
    }
}

/// Why a reply could not be turned into verdicts
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerdictError {
    #[error("no bracketed array found in reply")]
    MissingArray,

    #[error("verdict array is not a list of integers: {0}")]
    Decode(String),

    #[error("expected {expected} verdicts, got {got}")]
    WrongLength { expected: usize, got: usize },

    #[error("invalid verdict {value} at position {position}, expected 1 or 2")]
    OutOfDomain { position: usize, value: i64 },
}

/// Extract `expected` verdicts from a raw oracle reply
pub fn parse_verdicts(raw: &str, expected: usize) -> Result<Vec<Verdict>, VerdictError> {
    let payload = extract_array(raw).ok_or(VerdictError::MissingArray)?;

    let indices: Vec<i64> =
        serde_json::from_str(payload).map_err(|e| VerdictError::Decode(e.to_string()))?;

    if indices.len() != expected {
        return Err(VerdictError::WrongLength {
            expected,
            got: indices.len(),
        });
    }

    indices
        .into_iter()
        .enumerate()
        .map(|(position, value)| {
            Verdict::from_index(value).ok_or(VerdictError::OutOfDomain { position, value })
        })
        .collect()
}

/// Slice from the first `[` to the last `]`, inclusive
fn extract_array(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}
