//! Candidate source endpoints

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use bracket_core::{load_candidates, Item};

use crate::error::ApiError;
use crate::state::ServerState;

/// Candidates returned by the sample endpoint
const SAMPLE_SIZE: usize = 4;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatesResponse {
    pub candidates: Vec<Item>,
    pub total_count: usize,
}

pub async fn get_candidates(State(state): State<Arc<ServerState>>) -> Result<Json<CandidatesResponse>, ApiError> {
    let candidates = load_candidates(&state.candidates_path)?;
    Ok(Json(CandidatesResponse {
        total_count: candidates.len(),
        candidates,
    }))
}

/// First few candidates, for trying the API out
pub async fn get_sample_candidates(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<CandidatesResponse>, ApiError> {
    let mut candidates = load_candidates(&state.candidates_path)?;
    let total_count = candidates.len();
    candidates.truncate(SAMPLE_SIZE);
    Ok(Json(CandidatesResponse {
        candidates,
        total_count,
    }))
}
