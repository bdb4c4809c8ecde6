//! User Directory — credentials plus each user's saved chats.
//!
//! Credentials are compared by plain equality. Nothing here is durable.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::session::{SavedChat, Turn};

const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Please fill all fields")]
    MissingSignupFields,

    #[error("Passwords don't match")]
    PasswordMismatch,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Please enter username and password")]
    MissingCredentials,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Please enter your email")]
    MissingEmail,

    #[error("Email not found")]
    EmailNotFound,
}

#[derive(Debug, Clone)]
pub struct User {
    pub email: String,
    pub password: String,
    pub full_name: String,
    /// Appended in save order; entries are never edited or removed.
    pub saved_chats: Vec<SavedChat>,
}

/// What a successful login hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginProfile {
    pub full_name: String,
    /// Saved chat labels, oldest first.
    pub chat_history: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Default)]
pub struct UserDirectory {
    users: DashMap<String, User>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signup(&self, form: SignupForm) -> Result<(), AuthError> {
        if form.username.is_empty() || form.email.is_empty() || form.password.is_empty() {
            return Err(AuthError::MissingSignupFields);
        }
        if form.password != form.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        if form.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AuthError::PasswordTooShort);
        }

        match self.users.entry(form.username.clone()) {
            Entry::Occupied(_) => Err(AuthError::UsernameTaken),
            Entry::Vacant(slot) => {
                let full_name = form
                    .full_name
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| form.username.clone());
                slot.insert(User {
                    email: form.email,
                    password: form.password,
                    full_name,
                    saved_chats: Vec::new(),
                });
                info!("Registered user {}", form.username);
                Ok(())
            }
        }
    }

    /// Checks credentials and returns the user's display name and saved chat labels.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<LoginProfile, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let user = self
            .users
            .get(username)
            .filter(|user| user.password == password)
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(LoginProfile {
            full_name: user.full_name.clone(),
            chat_history: user.saved_chats.iter().map(SavedChat::label).collect(),
        })
    }

    pub fn find_by_email(&self, email: &str) -> Result<String, AuthError> {
        if email.is_empty() {
            return Err(AuthError::MissingEmail);
        }
        self.users
            .iter()
            .find(|entry| entry.email == email)
            .map(|entry| entry.key().clone())
            .ok_or(AuthError::EmailNotFound)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    /// Appends a saved chat to the user's history. Returns `false` for unknown users.
    pub fn push_saved_chat(&self, username: &str, chat: SavedChat) -> bool {
        match self.users.get_mut(username) {
            Some(mut user) => {
                user.saved_chats.push(chat);
                true
            }
            None => false,
        }
    }

    /// `"{timestamp} - {title}"` for each saved chat, in save order.
    pub fn titles(&self, username: &str) -> Option<Vec<String>> {
        self.users
            .get(username)
            .map(|user| user.saved_chats.iter().map(SavedChat::label).collect())
    }

    /// Copy of the messages of the first saved chat whose label equals `label`.
    pub fn find_saved(&self, username: &str, label: &str) -> Option<Vec<Turn>> {
        let user = self.users.get(username)?;
        user.saved_chats
            .iter()
            .find(|chat| chat.label() == label)
            .map(|chat| chat.messages.clone())
    }
}

#[cfg(test)]
impl UserDirectory {
    pub fn saved_chats(&self, username: &str) -> Option<Vec<SavedChat>> {
        self.users.get(username).map(|user| user.saved_chats.clone())
    }
}
