//! HTTP JSON API over a lab session.
//!
//! A thin rendering collaborator: every route reads the session snapshot or
//! forwards one user action to the session.

use crate::session::{GuessRejected, LabSession, LabSnapshot};
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use prime_lock_core::LockMode;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tracing::{debug, info, instrument};

/// Request body for starting a round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRoundRequest {
    /// Lock mode for the new round.
    pub mode: LockMode,
}

/// Request body for a guess.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuessRequest {
    /// Guessed value.
    pub value: u32,
}

/// Response body for a guess.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuessResponse {
    /// Whether the guess opened the lock.
    pub hit: bool,
    /// Session state after the guess.
    pub snapshot: LabSnapshot,
}

/// Response body for code notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeNotesResponse {
    /// Markdown notes; empty when the teacher is unavailable.
    pub notes: String,
}

/// Error body for rejected actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable reason.
    pub error: String,
}

impl IntoResponse for GuessRejected {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (StatusCode::CONFLICT, Json(body)).into_response()
    }
}

/// Builds the API router.
#[instrument(skip(session))]
pub fn router(session: LabSession) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/round", get(current_round).post(start_round))
        .route("/api/round/restart", post(restart_round))
        .route("/api/guess", post(guess))
        .route("/api/code-notes", get(code_notes))
        .layer(ServiceBuilder::new().map_request(|req: Request<axum::body::Body>| {
            debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(session)
}

/// Serves the API on `host:port` until the process is stopped.
#[instrument(skip(session))]
pub async fn serve(session: LabSession, host: &str, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!("Server ready at http://{}:{}/", host, port);
    axum::serve(listener, router(session)).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn current_round(State(session): State<LabSession>) -> Json<LabSnapshot> {
    Json(session.snapshot())
}

#[instrument(skip_all, fields(mode = %req.mode))]
async fn start_round(
    State(session): State<LabSession>,
    Json(req): Json<StartRoundRequest>,
) -> Json<LabSnapshot> {
    session.start_round(req.mode);
    Json(session.snapshot())
}

#[instrument(skip_all)]
async fn restart_round(State(session): State<LabSession>) -> Json<LabSnapshot> {
    session.restart();
    Json(session.snapshot())
}

#[instrument(skip_all, fields(value = req.value))]
async fn guess(
    State(session): State<LabSession>,
    Json(req): Json<GuessRequest>,
) -> Result<Json<GuessResponse>, GuessRejected> {
    let outcome = session.guess(req.value)?;
    Ok(Json(GuessResponse {
        hit: outcome.is_hit(),
        snapshot: session.snapshot(),
    }))
}

async fn code_notes(State(session): State<LabSession>) -> Json<CodeNotesResponse> {
    Json(CodeNotesResponse {
        notes: session.code_notes().await,
    })
}
