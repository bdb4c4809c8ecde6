//! Axum route handlers for transcript management: clear, save, list and load.

use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::session::{resolve_session_id, LoadError, SessionState, Turn};
use crate::state::AppState;

pub const SESSION_ID_HEADER: &str = "session-id";
pub const USERNAME_HEADER: &str = "username";

/// Header value as a string, `None` when absent or not valid UTF-8.
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub history: Vec<Turn>,
    pub saved: bool,
    pub state: SessionState,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub message: String,
    pub history: Vec<Turn>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatListResponse {
    pub chat_history: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoadChatRequest {
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct LoadChatResponse {
    pub message: String,
    pub history: Vec<Turn>,
}

/// GET /history
///
/// Returns the caller's live transcript, creating an empty session on first reference.
pub async fn handle_history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<HistoryResponse> {
    let session_id = resolve_session_id(header_str(&headers, SESSION_ID_HEADER));
    let record = state.sessions.ensure(&session_id);
    let session_state = record.state();
    Json(HistoryResponse {
        session_id: record.session_id,
        history: record.transcript,
        saved: record.saved,
        state: session_state,
    })
}

/// GET|POST /clear-chat
pub async fn handle_clear(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<ClearResponse> {
    let session_id = resolve_session_id(header_str(&headers, SESSION_ID_HEADER));
    let history = state.sessions.clear(&session_id);
    Json(ClearResponse {
        message: "Chat cleared!".to_string(),
        history,
    })
}

/// POST /save-chat
///
/// Both headers are required here; there is no guest fallback for saving.
/// "Chat already saved" is a success response, not an error.
pub async fn handle_save(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SaveResponse>, AppError> {
    let session_id = header_str(&headers, SESSION_ID_HEADER).unwrap_or_default();
    let username = header_str(&headers, USERNAME_HEADER).unwrap_or_default();

    let outcome = state.sessions.save(session_id, username, &state.users)?;
    Ok(Json(SaveResponse {
        message: outcome.message().to_string(),
    }))
}

/// GET /chats
pub async fn handle_list_chats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ChatListResponse>, AppError> {
    let username = header_str(&headers, USERNAME_HEADER).unwrap_or_default();
    let chat_history = state
        .users
        .titles(username)
        .ok_or(LoadError::NotAuthenticated)?;
    Ok(Json(ChatListResponse { chat_history }))
}

/// POST /load-chat
pub async fn handle_load_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoadChatRequest>,
) -> Result<Json<LoadChatResponse>, AppError> {
    let session_id = resolve_session_id(header_str(&headers, SESSION_ID_HEADER));
    let username = header_str(&headers, USERNAME_HEADER).unwrap_or_default();

    let history = state
        .sessions
        .load_saved(&session_id, username, &req.label, &state.users)?;
    Ok(Json(LoadChatResponse {
        message: "Chat loaded successfully!".to_string(),
        history,
    }))
}
