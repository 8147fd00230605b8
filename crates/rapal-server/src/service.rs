//! Chat service — the request flow shared by every entry point.
//!
//! validate → get-or-create and touch (one store step) → rate-limit check →
//! per-session serialized model call → classify failure.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use rapal_core::config::SessionsConfig;
use rapal_core::session::SessionStore;
use rapal_core::utils::{timestamp, truncate_string};
use rapal_core::{resolve_session_id, validate_message, ChatError};
use rapal_providers::{ChatModel, Conversation};

/// Session store holding live model conversations.
pub type ConversationStore = SessionStore<Box<dyn Conversation>>;

/// Successful chat turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub reply: String,
    pub session_id: String,
}

/// Liveness report.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    /// ISO 8601 with milliseconds, UTC.
    pub timestamp: String,
    pub sessions: usize,
}

pub struct ChatService {
    store: Arc<ConversationStore>,
    model_name: String,
    max_messages: u64,
    max_message_chars: usize,
}

impl ChatService {
    /// Build a service whose sessions start conversations on `model`.
    pub fn new(model: Arc<dyn ChatModel>, sessions: &SessionsConfig) -> Self {
        let model_name = model.model_name().to_string();
        let store = Arc::new(SessionStore::new(move || model.start_chat()));
        Self {
            store,
            model_name,
            max_messages: sessions.max_messages,
            max_message_chars: sessions.max_message_chars,
        }
    }

    /// The underlying store, for the sweeper and shutdown.
    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Handle one inbound message.
    ///
    /// `message` is the raw JSON field so that non-string payloads can be
    /// told apart from empty ones. Validation failures never touch the store.
    pub async fn chat(
        &self,
        message: Option<&Value>,
        session_id: Option<&str>,
    ) -> Result<ChatReply, ChatError> {
        let text = validate_message(message, self.max_message_chars)?;
        let session_id = resolve_session_id(session_id);

        let (session, count) = self
            .store
            .get_or_create_touched(&session_id, Utc::now())
            .await;

        if count > self.max_messages {
            warn!(session_id = %session_id, count, limit = self.max_messages, "message limit exceeded");
            return Err(ChatError::RateLimited {
                session_id,
                limit: self.max_messages,
            });
        }

        info!(
            session_id = %session_id,
            count,
            preview = %truncate_string(text, 50),
            "message received"
        );

        // Turns on the same session queue here in arrival order
        let mut conversation = session.conversation().await;
        match conversation.send_message(text).await {
            Ok(reply) => Ok(ChatReply { reply, session_id }),
            Err(e) => {
                error!(session_id = %session_id, kind = ?e.kind, error = %e, "model call failed");
                Err(e.into())
            }
        }
    }

    /// Drop the session for `session_id`. Returns whether it existed.
    pub async fn reset(&self, session_id: Option<&str>) -> bool {
        let session_id = resolve_session_id(session_id);
        self.store.remove(&session_id).await
    }

    pub async fn health(&self) -> HealthReport {
        HealthReport {
            status: "OK",
            timestamp: timestamp(),
            sessions: self.store.len().await,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
