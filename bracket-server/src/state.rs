//! Server state management
//!
//! Shared oracle, candidate source, request defaults, and the one stepwise
//! tournament session.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use bracket_core::Result;
use bracket_tournament::{Oracle, RoundConfig, Tournament, TournamentConfig};

use crate::error::ApiError;
use crate::ServerConfig;

/// Server-wide shared state
pub struct ServerState {
    pub oracle: Arc<dyn Oracle>,
    pub candidates_path: PathBuf,
    /// Round settings used where a request leaves them out
    pub defaults: RoundConfig,
    /// Seed used where a request leaves it out
    pub seed: Option<u64>,
    session: Mutex<Tournament>,
}

impl ServerState {
    pub fn new(config: &ServerConfig, oracle: Arc<dyn Oracle>) -> Result<Self> {
        let session = Tournament::new(TournamentConfig {
            round: config.round.clone(),
            shuffle: true,
            seed: config.seed,
        })?;

        Ok(Self {
            oracle,
            candidates_path: config.candidates_path.clone(),
            defaults: config.round.clone(),
            seed: config.seed,
            session: Mutex::new(session),
        })
    }

    /// Lock the session. Rounds never run while this guard is held.
    pub fn session(&self) -> std::result::Result<MutexGuard<'_, Tournament>, ApiError> {
        self.session
            .lock()
            .map_err(|_| ApiError::internal("tournament session lock poisoned"))
    }
}
