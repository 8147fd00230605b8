//! Inbound message validation.

use serde_json::Value;

use crate::error::ChatError;

/// Default maximum message length, in UTF-16 code units.
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 5000;

/// Validate the raw `message` field of a chat request.
///
/// Checks run in order and stop at the first failure:
/// 1. present and a non-empty JSON string
/// 2. non-empty after trimming
/// 3. at most `max_chars` UTF-16 code units, the unit browsers count in
///
/// Returns the message untrimmed; the model receives exactly what was sent.
pub fn validate_message(message: Option<&Value>, max_chars: usize) -> Result<&str, ChatError> {
    let text = match message {
        Some(Value::String(text)) if !text.is_empty() => text.as_str(),
        _ => return Err(ChatError::InvalidMessage),
    };

    if text.trim().is_empty() {
        return Err(ChatError::EmptyMessage);
    }

    let len = text.encode_utf16().count();
    if len > max_chars {
        return Err(ChatError::MessageTooLong {
            len,
            max: max_chars,
        });
    }

    Ok(text)
}
