//! Round and whole-tournament endpoints

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use serde_json::{json, Value};

use bracket_core::{Item, Match};
use bracket_tournament::{run_round, run_tournament, TournamentConfig, TournamentResult};

use super::{run_blocking, TournamentRequest};
use crate::error::ApiError;
use crate::state::ServerState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResponse {
    pub success: bool,
    pub winners: Vec<Item>,
    pub matches: Vec<Match>,
    pub total_batches: usize,
}

/// Describe the round endpoint
pub async fn tournament_info() -> Json<Value> {
    Json(json!({
        "message": "Tournament API is running - stateless round processor",
        "description": "POST candidates to /api/tournament to run a single round, \
                        or to /api/tournament/run for a whole tournament",
    }))
}

/// Run a single round over the posted candidates
pub async fn process_round(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<TournamentRequest>, JsonRejection>,
) -> Result<Json<RoundResponse>, ApiError> {
    let Json(mut request) = payload?;
    let candidates = request.take_candidates()?;
    let config = request.round_config(&state.defaults);
    let mut rng = create_rng(request.seed.or(state.seed));
    let oracle = Arc::clone(&state.oracle);

    tracing::info!("Processing round with {} candidates", candidates.len());

    let outcome = run_blocking(move || {
        run_round(&candidates, 1, &config, oracle.as_ref(), &mut rng)
    })
    .await?;

    Ok(Json(RoundResponse {
        success: true,
        winners: outcome.winners,
        total_batches: outcome.round.total_batches,
        matches: outcome.round.matches,
    }))
}

/// Run a whole tournament over the posted candidates
pub async fn run_full_tournament(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<TournamentRequest>, JsonRejection>,
) -> Result<Json<TournamentResult>, ApiError> {
    let Json(mut request) = payload?;
    let candidates = request.take_candidates()?;
    let config = TournamentConfig {
        round: request.round_config(&state.defaults),
        shuffle: request.shuffle.unwrap_or(true),
        seed: request.seed.or(state.seed),
    };
    let oracle = Arc::clone(&state.oracle);

    let result = run_blocking(move || run_tournament(candidates, &config, oracle.as_ref())).await?;
    Ok(Json(result))
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}
