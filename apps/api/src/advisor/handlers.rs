//! Axum route handlers for the advisor features.
//!
//! Every feature runs the same turn: validate → prompt → generate → append → echo history.

use std::time::Duration;

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;
use tracing::info;

use crate::advisor::queries::{
    AdvisorQuery, AssessmentQuery, ChatQuery, LearningQuery, MarketQuery, ResumeQuery,
    SkillsQuery,
};
use crate::errors::AppError;
use crate::llm_client::generate_with_timeout;
use crate::session::handlers::{header_str, SESSION_ID_HEADER};
use crate::session::{resolve_session_id, Turn};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub response: String,
    /// The whole transcript after this turn, oldest first.
    pub history: Vec<Turn>,
    pub updated_history: bool,
}

/// Shared pipeline for all advisor endpoints.
///
/// The generation call runs with no store guard held; the append only happens once it succeeded.
async fn run_turn<Q: AdvisorQuery>(
    state: &AppState,
    headers: &HeaderMap,
    query: Q,
) -> Result<Json<TurnResponse>, AppError> {
    let session_id = resolve_session_id(header_str(headers, SESSION_ID_HEADER));
    query.validate()?;

    let prompt = query.prompt();
    let timeout = Duration::from_secs(state.config.generation_timeout_secs);
    let response = generate_with_timeout(state.generator.as_ref(), &prompt, timeout)
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;

    let history = state
        .sessions
        .append_turn(&session_id, query.transcript_input(), response.clone());
    info!("Session {session_id} advanced to {} turns", history.len());

    Ok(Json(TurnResponse {
        response,
        history,
        updated_history: true,
    }))
}

/// POST /chat
pub async fn handle_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(query): Json<ChatQuery>,
) -> Result<Json<TurnResponse>, AppError> {
    run_turn(&state, &headers, query).await
}

/// POST /assess
pub async fn handle_assess(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(query): Json<AssessmentQuery>,
) -> Result<Json<TurnResponse>, AppError> {
    run_turn(&state, &headers, query).await
}

/// POST /skills
pub async fn handle_skills(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(query): Json<SkillsQuery>,
) -> Result<Json<TurnResponse>, AppError> {
    run_turn(&state, &headers, query).await
}

/// POST /resume
pub async fn handle_resume(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(query): Json<ResumeQuery>,
) -> Result<Json<TurnResponse>, AppError> {
    run_turn(&state, &headers, query).await
}

/// POST /market
pub async fn handle_market(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(query): Json<MarketQuery>,
) -> Result<Json<TurnResponse>, AppError> {
    run_turn(&state, &headers, query).await
}

/// POST /learning
pub async fn handle_learning(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(query): Json<LearningQuery>,
) -> Result<Json<TurnResponse>, AppError> {
    run_turn(&state, &headers, query).await
}
