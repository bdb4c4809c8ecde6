//! Session Store — process-lifetime transcripts keyed by session identifier.
//!
//! Every operation on a session id runs under that key's `DashMap` shard guard, so
//! ensure + append, ensure + clear and the multi-step save are atomic per session.
//! Guards are never held across an `.await`.
//!
//! Lock order when both maps are touched: session first, then user.
//! Records are never evicted.

use chrono::{DateTime, Utc};
use dashmap::mapref::one::RefMut;
use dashmap::DashMap;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::session::models::{SavedChat, SessionRecord, Turn};
use crate::users::UserDirectory;

/// Shared bucket for callers that do not identify a session.
pub const GUEST_SESSION_ID: &str = "guest";

/// Result of a save that did not fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveOutcome {
    Saved,
    AlreadySaved,
}

impl SaveOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            SaveOutcome::Saved => "Chat saved successfully!",
            SaveOutcome::AlreadySaved => "Chat already saved",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SaveError {
    #[error("Please login to save chats")]
    NotAuthenticated,

    #[error("No chat to save")]
    NoSessionOrEmpty,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("Please login to load chats")]
    NotAuthenticated,

    #[error("Please select a chat to load")]
    NoSelection,

    #[error("Chat not found")]
    ChatNotFound,
}

/// Uses a caller-supplied id verbatim, falling back to the shared guest bucket.
pub fn resolve_session_id(provided: Option<&str>) -> String {
    match provided {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => GUEST_SESSION_ID.to_string(),
    }
}

/// Session id handed out at login: `"{username}_{seconds}.{micros}"`.
pub fn mint_session_id(username: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}_{}.{:06}",
        username,
        now.timestamp(),
        now.timestamp_subsec_micros()
    )
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, SessionRecord>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write guard on the record for `session_id`, creating an empty one first if needed.
    fn ensure_mut(&self, session_id: &str) -> RefMut<'_, String, SessionRecord> {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionRecord::new(session_id))
    }

    /// Returns a copy of the record for `session_id`, creating an empty one first if needed.
    pub fn ensure(&self, session_id: &str) -> SessionRecord {
        self.ensure_mut(session_id).clone()
    }

    /// Appends a turn and returns the full transcript as it stands right after the append.
    ///
    /// Callers must only invoke this once the generation call has succeeded.
    pub fn append_turn(
        &self,
        session_id: &str,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Vec<Turn> {
        let mut record = self.ensure_mut(session_id);
        record.append(Turn::new(input, output));

        debug!(
            "Appended turn to session {session_id} (turns={}, state={:?})",
            record.transcript.len(),
            record.state()
        );
        record.transcript.clone()
    }

    /// Resets an existing session. Unknown sessions are left absent.
    pub fn clear(&self, session_id: &str) -> Vec<Turn> {
        if let Some(mut record) = self.sessions.get_mut(session_id) {
            record.reset();
            debug!("Cleared session {session_id}");
        }
        Vec::new()
    }

    /// Installs a fresh, empty record under `session_id`, replacing any previous one.
    pub fn start_session(&self, session_id: &str) {
        self.sessions
            .insert(session_id.to_string(), SessionRecord::new(session_id));
        debug!("Started session {session_id}");
    }

    /// Copies the live transcript into a new saved chat owned by `username`.
    pub fn save(
        &self,
        session_id: &str,
        username: &str,
        users: &UserDirectory,
    ) -> Result<SaveOutcome, SaveError> {
        self.save_at(session_id, username, users, Utc::now())
    }

    fn save_at(
        &self,
        session_id: &str,
        username: &str,
        users: &UserDirectory,
        now: DateTime<Utc>,
    ) -> Result<SaveOutcome, SaveError> {
        if session_id.is_empty() || username.is_empty() || !users.contains(username) {
            return Err(SaveError::NotAuthenticated);
        }

        let mut record = self
            .sessions
            .get_mut(session_id)
            .ok_or(SaveError::NoSessionOrEmpty)?;

        if record.transcript.is_empty() {
            return Err(SaveError::NoSessionOrEmpty);
        }

        if record.saved {
            return Ok(SaveOutcome::AlreadySaved);
        }

        let chat = SavedChat::snapshot(&record.transcript, now);
        let title = chat.title.clone();

        // Users are never removed, but a miss here still must not flip `saved`.
        if !users.push_saved_chat(username, chat) {
            return Err(SaveError::NotAuthenticated);
        }
        record.saved = true;

        debug!("Saved session {session_id} for {username} as \"{title}\"");
        Ok(SaveOutcome::Saved)
    }

    /// Replaces the live transcript with a copy of one of the user's saved chats.
    ///
    /// The restored transcript counts as saved: its content already lives in the user's history.
    pub fn load_saved(
        &self,
        session_id: &str,
        username: &str,
        label: &str,
        users: &UserDirectory,
    ) -> Result<Vec<Turn>, LoadError> {
        if username.is_empty() || !users.contains(username) {
            return Err(LoadError::NotAuthenticated);
        }
        if label.is_empty() {
            return Err(LoadError::NoSelection);
        }

        let messages = users
            .find_saved(username, label)
            .ok_or(LoadError::ChatNotFound)?;

        let mut record = self.ensure_mut(session_id);
        record.transcript = messages;
        record.saved = true;

        debug!("Loaded \"{label}\" into session {session_id}");
        Ok(record.transcript.clone())
    }

    /// Number of live session records.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
impl SessionStore {
    pub fn get(&self, session_id: &str) -> Option<SessionRecord> {
        self.sessions.get(session_id).map(|r| r.clone())
    }

    pub fn transcript(&self, session_id: &str) -> Vec<Turn> {
        self.sessions
            .get(session_id)
            .map(|r| r.transcript.clone())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
