//! HTTP route handlers

pub mod candidates;
pub mod session;
pub mod status;
pub mod tournament;

use serde::Deserialize;

use bracket_core::Item;
use bracket_tournament::RoundConfig;

use crate::error::ApiError;

/// Body shared by the round, tournament and session-start endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentRequest {
    #[serde(alias = "items")]
    pub candidates: Option<Vec<Item>>,
    pub batch_size: Option<usize>,
    #[serde(alias = "roleContext")]
    pub role: Option<String>,
    pub seed: Option<u64>,
    pub shuffle: Option<bool>,
}

impl TournamentRequest {
    /// Take the candidate list, which every endpoint requires
    pub fn take_candidates(&mut self) -> Result<Vec<Item>, ApiError> {
        self.candidates
            .take()
            .ok_or_else(|| ApiError::bad_request("Candidates array is required"))
    }

    /// Server defaults overridden by whatever the request sets
    pub fn round_config(&self, defaults: &RoundConfig) -> RoundConfig {
        let mut config = defaults.clone();
        if let Some(batch_size) = self.batch_size {
            config = config.with_batch_size(batch_size);
        }
        if let Some(ref role) = self.role {
            config = config.with_role(role.clone());
        }
        config
    }
}

/// Run blocking engine work off the async executor
pub async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> bracket_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(e) => Err(ApiError::internal(format!("round task failed: {e}"))),
    }
}
