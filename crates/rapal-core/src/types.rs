//! Core types for RAPal — conversation turns shared by the session store and
//! the model providers.

use serde::{Deserialize, Serialize};

/// Session id used when a caller does not supply one.
pub const DEFAULT_SESSION_ID: &str = "default";

// ─────────────────────────────────────────────
// Conversation turns
// ─────────────────────────────────────────────

/// Author of a conversation turn.
///
/// Serialized with the lowercase names the Gemini API expects
/// (`"user"` / `"model"`).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One turn of a multi-turn conversation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

impl ChatTurn {
    /// Create a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        ChatTurn {
            role: Role::User,
            text: text.into(),
        }
    }

    /// Create a model (assistant) turn.
    pub fn model(text: impl Into<String>) -> Self {
        ChatTurn {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Resolve the session id a request should use.
///
/// Only a missing id falls back to [`DEFAULT_SESSION_ID`]; a supplied id is
/// used exactly as sent, including `""` and whitespace-only ids.
pub fn resolve_session_id(id: Option<&str>) -> String {
    id.unwrap_or(DEFAULT_SESSION_ID).to_string()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
