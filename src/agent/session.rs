//! Conversation sessions and the store that owns them.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::types::ModelMessage;

/// Who sent a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One exchanged message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn to_model_message(&self) -> ModelMessage {
        match self.role {
            ChatRole::User => ModelMessage::user(self.text.clone()),
            ChatRole::Assistant => ModelMessage::assistant(self.text.clone()),
        }
    }
}

/// A conversation thread: an append-only, ordered message list.
#[derive(Debug, Clone, Default)]
pub struct Session {
    id: String,
    messages: Vec<ChatMessage>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            messages: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn append_user(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::user(text));
    }

    pub fn append_assistant(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(text));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Prior turns as model context, or nothing when replay is off.
    pub fn history_for_model(&self, replay: bool) -> Vec<ModelMessage> {
        if !replay {
            return Vec::new();
        }
        self.messages.iter().map(ChatMessage::to_model_message).collect()
    }
}

/// Shared handle to one session. The lock is held for a whole turn.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Maps session ids to sessions. Sessions are created on first use and
/// live as long as the store.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the session for `session_id`, inserting an empty one if needed.
    pub fn get_or_create(&self, session_id: &str) -> SessionHandle {
        if let Some(handle) = self.get(session_id) {
            return handle;
        }
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            sessions
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(Session::new(session_id)))),
        )
    }

    /// Get an existing session.
    pub fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .cloned()
    }

    /// Session IDs, sorted.
    pub fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
