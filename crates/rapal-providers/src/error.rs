//! Provider errors with a structured kind.

use rapal_core::ChatError;
use thiserror::Error;

/// What went wrong talking to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Quota or capacity exhausted (HTTP 429, `RESOURCE_EXHAUSTED`).
    Quota,
    /// Prompt or reply blocked by the content-safety filter.
    Safety,
    /// Non-success HTTP status not covered above.
    Http,
    /// Transport failure (connect, timeout, TLS).
    Network,
    /// Response body could not be decoded.
    Parse,
    /// Response decoded but carried no candidate text.
    Empty,
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    /// HTTP status, when one was received.
    pub status: Option<u16>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl From<ProviderError> for ChatError {
    /// Structured kinds map directly; everything else is classified from the
    /// message text.
    fn from(err: ProviderError) -> Self {
        match err.kind {
            ProviderErrorKind::Quota => ChatError::QuotaExhausted(err.message),
            ProviderErrorKind::Safety => ChatError::SafetyBlocked(err.message),
            _ => ChatError::from_upstream_description(err.message),
        }
    }
}
