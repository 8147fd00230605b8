//! JSON error responses for the HTTP API.
//!
//! Every body carries a user-facing Indonesian `reply`. Unclassified failures
//! also carry the underlying `error` text when running in development.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use rapal_core::ChatError;

pub const REPLY_INVALID: &str = "Pesan tidak valid. Silakan kirim pesan yang benar.";
pub const REPLY_EMPTY: &str = "Pesan tidak boleh kosong.";
pub const REPLY_RATE_LIMITED: &str = "Terlalu banyak pesan. Silakan tunggu beberapa saat.";
pub const REPLY_BUSY: &str = "Maaf, sistem sedang sibuk. Silakan coba lagi dalam beberapa saat.";
pub const REPLY_CONTENT_POLICY: &str =
    "Maaf, pesan Anda tidak dapat diproses karena melanggar kebijakan konten.";
pub const REPLY_INTERNAL: &str = "Maaf, terjadi kesalahan pada sistem. Silakan coba lagi.";

/// Status code for each error kind.
pub fn status_for(err: &ChatError) -> StatusCode {
    match err {
        ChatError::InvalidMessage | ChatError::EmptyMessage | ChatError::MessageTooLong { .. } => {
            StatusCode::BAD_REQUEST
        }
        ChatError::SafetyBlocked(_) => StatusCode::BAD_REQUEST,
        ChatError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        ChatError::QuotaExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
        ChatError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// User-facing reply for each error kind.
pub fn reply_for(err: &ChatError) -> String {
    match err {
        ChatError::InvalidMessage => REPLY_INVALID.to_string(),
        ChatError::EmptyMessage => REPLY_EMPTY.to_string(),
        ChatError::MessageTooLong { max, .. } => {
            format!("Pesan terlalu panjang. Maksimal {} karakter.", max)
        }
        ChatError::RateLimited { .. } => REPLY_RATE_LIMITED.to_string(),
        ChatError::QuotaExhausted(_) => REPLY_BUSY.to_string(),
        ChatError::SafetyBlocked(_) => REPLY_CONTENT_POLICY.to_string(),
        ChatError::Upstream(_) => REPLY_INTERNAL.to_string(),
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// A [`ChatError`] rendered for HTTP.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub reply: String,
    /// Detail exposed to the client; only set for unclassified failures in
    /// development.
    pub detail: Option<String>,
}

impl ApiError {
    pub fn from_chat(err: ChatError, development: bool) -> Self {
        let detail = match &err {
            ChatError::Upstream(description) if development => Some(description.clone()),
            _ => None,
        };
        Self {
            status: status_for(&err),
            reply: reply_for(&err),
            detail,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            reply: self.reply,
            error: self.detail,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        ApiError::from_chat(err, false)
    }
}
