//! Axum route handlers for account endpoints.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::session::mint_session_id;
use crate::state::AppState;
use crate::users::SignupForm;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub session_id: String,
    pub full_name: String,
    /// Labels of the user's saved chats, oldest first.
    pub chat_history: Vec<String>,
}

/// POST /signup
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(form): Json<SignupForm>,
) -> Result<Json<MessageResponse>, AppError> {
    state.users.signup(form)?;
    Ok(Json(MessageResponse {
        message: "Account created successfully! Please login.".to_string(),
    }))
}

/// POST /login
///
/// Starts a fresh session for the user and returns its id alongside the saved chat labels.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let profile = state.users.authenticate(&req.username, &req.password)?;

    let session_id = mint_session_id(&req.username, Utc::now());
    state.sessions.start_session(&session_id);
    info!("User {} logged in with session {session_id}", req.username);

    Ok(Json(LoginResponse {
        message: format!("Welcome back, {}!", req.username),
        session_id,
        full_name: profile.full_name,
        chat_history: profile.chat_history,
    }))
}

/// POST /forgot-password
///
/// Only confirms the email is registered; no message is actually sent.
pub async fn handle_forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.users.find_by_email(&req.email)?;
    Ok(Json(MessageResponse {
        message: "Password reset instructions sent to your email!".to_string(),
    }))
}
