//! Stepwise tournament session
//!
//! One shared `Tournament` driven a round per request. The session lock is
//! held only to hand out and commit a round; the round itself runs on the
//! blocking pool with the lock released, so status and pause requests stay
//! responsive while the oracle works. A handed-out round is always committed
//! or aborted, even if the requesting client goes away.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;

use bracket_tournament::{PendingRound, StepOutcome, TournamentConfig, TournamentState};

use super::TournamentRequest;
use crate::error::ApiError;
use crate::state::ServerState;

#[derive(Serialize)]
pub struct StepResponse {
    pub step: StepOutcome,
    pub state: TournamentState,
}

pub async fn get_session(State(state): State<Arc<ServerState>>) -> Result<Json<TournamentState>, ApiError> {
    Ok(Json(state.session()?.state().clone()))
}

/// Idle -> InProgress with the posted candidates and settings
pub async fn start_session(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<TournamentRequest>, JsonRejection>,
) -> Result<Json<TournamentState>, ApiError> {
    let Json(mut request) = payload?;
    let candidates = request.take_candidates()?;
    let config = TournamentConfig {
        round: request.round_config(&state.defaults),
        shuffle: request.shuffle.unwrap_or(true),
        seed: request.seed.or(state.seed),
    };

    let mut session = state.session()?;
    session.reconfigure(config)?;
    session.start(candidates)?;
    Ok(Json(session.state().clone()))
}

/// Run the next round
///
/// The round runs on its own task, so a client that disconnects mid-round
/// does not leave the session stuck with a round in flight.
pub async fn step_session(State(state): State<Arc<ServerState>>) -> Result<Json<StepResponse>, ApiError> {
    let pending = state.session()?.begin_round()?;

    let Some(pending) = pending else {
        let session = state.session()?;
        return Ok(Json(StepResponse {
            step: StepOutcome::Paused,
            state: session.state().clone(),
        }));
    };

    tokio::spawn(finish_round(state, pending))
        .await
        .map_err(|e| ApiError::internal(format!("round task failed: {e}")))?
}

/// Judge a handed-out round, then commit it or release it
async fn finish_round(state: Arc<ServerState>, pending: PendingRound) -> Result<Json<StepResponse>, ApiError> {
    let oracle = Arc::clone(&state.oracle);
    let task = pending.clone();
    let joined = tokio::task::spawn_blocking(move || task.run(oracle.as_ref())).await;

    let mut session = state.session()?;
    let outcome = match joined {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            session.abort_round(&pending);
            return Err(e.into());
        }
        Err(e) => {
            session.abort_round(&pending);
            return Err(ApiError::internal(format!("round task failed: {e}")));
        }
    };

    let step = session.commit_round(&pending, outcome)?;
    Ok(Json(StepResponse {
        step,
        state: session.state().clone(),
    }))
}

pub async fn pause_session(State(state): State<Arc<ServerState>>) -> Result<Json<TournamentState>, ApiError> {
    let mut session = state.session()?;
    session.pause()?;
    Ok(Json(session.state().clone()))
}

pub async fn resume_session(State(state): State<Arc<ServerState>>) -> Result<Json<TournamentState>, ApiError> {
    let mut session = state.session()?;
    session.resume()?;
    Ok(Json(session.state().clone()))
}

pub async fn reset_session(State(state): State<Arc<ServerState>>) -> Result<Json<TournamentState>, ApiError> {
    let mut session = state.session()?;
    session.reset();
    Ok(Json(session.state().clone()))
}
