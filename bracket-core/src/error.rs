//! Error taxonomy shared by every BRACKET crate
//!
//! Oracle and verdict failures are not listed here: they never leave the
//! batch judge, which answers them with the random fallback.

/// Errors surfaced to callers of the reduction engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BracketError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("number of items must be even, got {0}")]
    OddInputCount(usize),

    #[error("at least two items are required to start a tournament")]
    EmptyInput,

    #[error("duplicate item name: {0}")]
    DuplicateItem(String),

    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),

    #[error("cannot {action} while tournament is {phase}")]
    InvalidTransition {
        phase: &'static str,
        action: &'static str,
    },

    #[error("candidate file not found: {0}")]
    CandidatesNotFound(String),

    #[error("failed to load candidates: {0}")]
    Candidates(String),
}

impl BracketError {
    /// True for errors caused by bad caller input rather than engine defects
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BracketError::InvalidConfiguration(_)
                | BracketError::OddInputCount(_)
                | BracketError::EmptyInput
                | BracketError::DuplicateItem(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BracketError>;
