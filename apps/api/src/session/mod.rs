// Live chat sessions: transcripts, save/clear semantics, and the routes that drive them.

pub mod handlers;
pub mod models;
pub mod store;

pub use models::{SavedChat, SessionState, Turn};
pub use store::{mint_session_id, resolve_session_id, LoadError, SaveError, SessionStore};
