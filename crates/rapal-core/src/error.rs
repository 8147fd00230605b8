//! Error taxonomy for one chat request.

use thiserror::Error;

/// Why a chat request did not produce a reply.
///
/// Validation variants are raised before any session is touched; the others
/// are raised after the session's counter has been incremented.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChatError {
    /// `message` missing, not a string, or `""`.
    #[error("message is missing, empty, or not a string")]
    InvalidMessage,

    /// `message` is whitespace only.
    #[error("message is empty")]
    EmptyMessage,

    /// `message` is longer than the configured maximum.
    #[error("message too long: {len} UTF-16 units (max {max})")]
    MessageTooLong { len: usize, max: usize },

    /// The session has exceeded its message ceiling.
    #[error("session '{session_id}' exceeded {limit} messages")]
    RateLimited { session_id: String, limit: u64 },

    /// The upstream model reported quota or capacity exhaustion.
    #[error("upstream quota exhausted: {0}")]
    QuotaExhausted(String),

    /// The upstream model refused the content on safety grounds.
    #[error("blocked by upstream safety filter: {0}")]
    SafetyBlocked(String),

    /// Anything else that went wrong during generation.
    #[error("generation failed: {0}")]
    Upstream(String),
}

impl ChatError {
    /// Whether this error was detected locally, before any external call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ChatError::InvalidMessage | ChatError::EmptyMessage | ChatError::MessageTooLong { .. }
        )
    }

    /// Classify a free-form upstream error description.
    ///
    /// Used when the provider could not attach a structured kind. Matching is
    /// case-insensitive: `quota` wins over `safety`.
    pub fn from_upstream_description(description: impl Into<String>) -> Self {
        let description = description.into();
        let lower = description.to_lowercase();
        if lower.contains("quota") {
            ChatError::QuotaExhausted(description)
        } else if lower.contains("safety") {
            ChatError::SafetyBlocked(description)
        } else {
            ChatError::Upstream(description)
        }
    }
}
