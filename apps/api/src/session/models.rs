use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of characters of the first input kept in a saved chat title.
pub const TITLE_MAX_CHARS: usize = 30;
const TITLE_ELLIPSIS: &str = "...";
/// Display format for saved chat timestamps. Also used to build chat labels.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One (input, output) exchange. Serialized as a two-element `[input, output]` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Turn {
    pub input: String,
    pub output: String,
}

impl Turn {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

impl From<(String, String)> for Turn {
    fn from((input, output): (String, String)) -> Self {
        Self { input, output }
    }
}

impl From<Turn> for (String, String) {
    fn from(turn: Turn) -> Self {
        (turn.input, turn.output)
    }
}

/// Where a session sits in its save lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    EmptyAndSaved,
    HasUnsavedTurns,
    AllSaved,
}

/// Live conversation for one session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub transcript: Vec<Turn>,
    /// `false` while the transcript holds turns not yet copied into a saved chat.
    pub saved: bool,
}

impl SessionRecord {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            transcript: Vec::new(),
            saved: true,
        }
    }

    /// Every append marks the record unsaved.
    pub fn append(&mut self, turn: Turn) {
        self.transcript.push(turn);
        self.saved = false;
    }

    pub fn reset(&mut self) {
        self.transcript.clear();
        self.saved = true;
    }

    pub fn state(&self) -> SessionState {
        match (self.transcript.is_empty(), self.saved) {
            (true, _) => SessionState::EmptyAndSaved,
            (false, false) => SessionState::HasUnsavedTurns,
            (false, true) => SessionState::AllSaved,
        }
    }
}

/// Immutable snapshot of a transcript, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedChat {
    pub title: String,
    pub timestamp: DateTime<Utc>,
    pub messages: Vec<Turn>,
}

impl SavedChat {
    /// Copies `transcript` so later appends to the live session never reach the snapshot.
    pub fn snapshot(transcript: &[Turn], timestamp: DateTime<Utc>) -> Self {
        let title = transcript
            .first()
            .map(|turn| chat_title(&turn.input))
            .unwrap_or_else(|| "New Chat".to_string());

        Self {
            title,
            timestamp,
            messages: transcript.to_vec(),
        }
    }

    /// `"{timestamp} - {title}"`, the label shown in chat pickers and used to load a chat back.
    pub fn label(&self) -> String {
        format!("{} - {}", self.timestamp.format(TIMESTAMP_FORMAT), self.title)
    }
}

/// First `TITLE_MAX_CHARS` characters of `input`, with an ellipsis when anything was cut.
pub fn chat_title(input: &str) -> String {
    if input.chars().count() > TITLE_MAX_CHARS {
        let head: String = input.chars().take(TITLE_MAX_CHARS).collect();
        format!("{head}{TITLE_ELLIPSIS}")
    } else {
        input.to_string()
    }
}
