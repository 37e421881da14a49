//! Oracle capability
//!
//! Level 4 - The one seam between the engine and whatever decides matches.
//! Backends (an LLM endpoint, a scripted mock) implement [`Oracle`]; plain
//! closures with the same signature do too.

use std::time::Duration;

use bracket_core::{Batch, Pair};

use crate::prompt::build_prompt;

/// Everything an oracle needs to judge one batch
#[derive(Clone, Debug)]
pub struct BatchRequest {
    /// 1-based batch index within the round
    pub batch_index: usize,
    /// Role the candidates are judged for
    pub role: String,
    /// Pairs in batch order
    pub pairs: Vec<Pair>,
    /// Rendered instruction text for text-based oracles
    pub prompt: String,
}

impl BatchRequest {
    /// Build the request for a batch
    pub fn new(batch: &Batch, role: &str) -> Self {
        Self {
            batch_index: batch.index,
            role: role.to_string(),
            pairs: batch.pairs.clone(),
            prompt: build_prompt(role, &batch.pairs),
        }
    }
}

/// Failure to obtain a reply. The engine does not tell these apart: every
/// variant sends the batch to the random fallback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    #[error("oracle timed out after {0:?}")]
    Timeout(Duration),

    #[error("oracle returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("oracle returned an empty reply")]
    EmptyReply,

    #[error("oracle reply could not be decoded: {0}")]
    Decode(String),
}

impl OracleError {
    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            OracleError::Unavailable(_) | OracleError::Timeout(_) => true,
            OracleError::Status { status, .. } => *status == 429 || *status >= 500,
            OracleError::EmptyReply | OracleError::Decode(_) => false,
        }
    }
}

/// External judgment capability: given a batch, return raw text from which a
/// verdict array can be parsed.
pub trait Oracle: Send + Sync {
    fn judge(&self, request: &BatchRequest) -> Result<String, OracleError>;
}

impl<F> Oracle for F
where
    F: Fn(&BatchRequest) -> Result<String, OracleError> + Send + Sync,
{
    fn judge(&self, request: &BatchRequest) -> Result<String, OracleError> {
        self(request)
    }
}
