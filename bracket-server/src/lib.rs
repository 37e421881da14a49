//! BRACKET Server - HTTP API for the tournament engine
//!
//! This crate provides the web backend:
//! - Stateless single-round endpoint
//! - Whole-tournament endpoint
//! - Stepwise tournament session (start, step, pause, resume, reset)
//! - Candidate source

mod error;
mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use bracket_tournament::{Oracle, RoundConfig};

pub use error::ApiError;
pub use state::ServerState;

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    /// JSON file served by the candidates endpoints
    pub candidates_path: PathBuf,
    /// Defaults for requests that omit batch size or role
    pub round: RoundConfig,
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            candidates_path: PathBuf::from("candidates.json"),
            round: RoundConfig::default(),
            seed: None,
        }
    }
}

impl ServerConfig {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_candidates_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.candidates_path = path.into();
        self
    }

    pub fn with_round(mut self, round: RoundConfig) -> Self {
        self.round = round;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

/// Create the router with all routes
pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        // Status endpoint
        .route("/api/status", get(routes::status::status_handler))
        // Stateless rounds and whole tournaments
        .route(
            "/api/tournament",
            get(routes::tournament::tournament_info).post(routes::tournament::process_round),
        )
        .route("/api/tournament/run", post(routes::tournament::run_full_tournament))
        // Stepwise session
        .route("/api/session", get(routes::session::get_session))
        .route("/api/session/start", post(routes::session::start_session))
        .route("/api/session/step", post(routes::session::step_session))
        .route("/api/session/pause", post(routes::session::pause_session))
        .route("/api/session/resume", post(routes::session::resume_session))
        .route("/api/session/reset", post(routes::session::reset_session))
        // Candidate source
        .route("/api/candidates", get(routes::candidates::get_candidates))
        .route(
            "/api/candidates/sample",
            get(routes::candidates::get_sample_candidates),
        )
        // Shared state
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server
pub async fn run_server(config: ServerConfig, oracle: Arc<dyn Oracle>) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = Arc::new(ServerState::new(&config, oracle).context("invalid server round defaults")?);
    let router = create_router(state);

    tracing::info!("BRACKET Server starting on http://0.0.0.0:{}", config.port);
    tracing::info!("Candidates served from: {}", config.candidates_path.display());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    axum::serve(listener, router).await?;

    Ok(())
}
