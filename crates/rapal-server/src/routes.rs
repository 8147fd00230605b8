//! Route handlers for the standalone and `/api` entry shapes.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use rapal_core::ChatError;

use crate::error::ApiError;
use crate::state::AppState;

// ─────────────────────────────────────────────
// Request bodies
// ─────────────────────────────────────────────

/// `POST /chat` body. Fields stay raw JSON so validation can tell a missing
/// or non-string message apart from an empty one.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub session_id: Option<Value>,
}

/// `POST /reset-session` body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    #[serde(default)]
    pub session_id: Option<Value>,
}

/// Session id as text. Strings are used as-is, `null` counts as absent, and
/// any other JSON value is used in its serialized form.
fn session_id_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(id) => Some(id.clone()),
        other => Some(other.to_string()),
    }
}

// ─────────────────────────────────────────────
// Routers
// ─────────────────────────────────────────────

/// Standalone routes: `/chat`, `/reset-session`, `/health`.
pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat).fallback(not_found))
        .route("/reset-session", post(reset_session).fallback(not_found))
        .route("/health", get(health).fallback(not_found))
}

/// Serverless-shaped routes under `/api`, backed by the same service.
pub fn serverless_routes() -> Router<AppState> {
    Router::new()
        .route("/api", get(health).post(chat).fallback(not_found))
        .route("/api/health", get(health).fallback(not_found))
        .route("/api/chat", post(chat).fallback(not_found))
        .route("/api/reset-session", post(reset_session).fallback(not_found))
}

// ─────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(error = %rejection, "unreadable chat body");
            return ApiError::from_chat(ChatError::InvalidMessage, state.development)
                .into_response();
        }
    };

    let session_id = session_id_text(request.session_id.as_ref());
    match state
        .service
        .chat(request.message.as_ref(), session_id.as_deref())
        .await
    {
        Ok(reply) => Json(reply).into_response(),
        Err(err) => {
            if err.is_validation() {
                debug!(error = %err, "chat request rejected");
            }
            ApiError::from_chat(err, state.development).into_response()
        }
    }
}

pub async fn reset_session(
    State(state): State<AppState>,
    payload: Result<Json<ResetRequest>, JsonRejection>,
) -> Response {
    // An absent or unreadable body resets the default session
    let request = payload.map(|Json(request)| request).unwrap_or_default();
    let session_id = session_id_text(request.session_id.as_ref());

    if state.service.reset(session_id.as_deref()).await {
        Json(json!({ "message": "Session berhasil direset" })).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Session tidak ditemukan" })),
        )
            .into_response()
    }
}

pub async fn health(State(state): State<AppState>) -> Response {
    Json(state.service.health().await).into_response()
}

/// JSON 404 for any unmatched path or method.
pub async fn not_found(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Endpoint tidak ditemukan",
            "path": uri.path(),
        })),
    )
        .into_response()
}
