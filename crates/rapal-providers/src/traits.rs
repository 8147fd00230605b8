//! Model traits — the seam between the chat service and a concrete backend.
//!
//! A [`ChatModel`] starts conversations; each [`Conversation`] owns its own
//! history and is driven one turn at a time.

use async_trait::async_trait;
use rapal_core::types::ChatTurn;

use crate::error::ProviderError;

/// One stateful multi-turn conversation.
///
/// History grows by exactly one user turn and one model turn for each
/// successful [`send_message`](Conversation::send_message); a failed turn
/// leaves it unchanged.
#[async_trait]
pub trait Conversation: Send {
    /// Submit one user turn and wait for the model's reply.
    async fn send_message(&mut self, text: &str) -> Result<String, ProviderError>;

    /// Turns exchanged so far, oldest first.
    fn history(&self) -> &[ChatTurn];
}

/// Factory for fresh conversations against one configured model.
pub trait ChatModel: Send + Sync {
    /// Start a conversation with an empty history.
    fn start_chat(&self) -> Box<dyn Conversation>;

    /// Model identifier for logging.
    fn model_name(&self) -> &str;
}
