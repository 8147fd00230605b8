//! RAPal HTTP API server (Axum).
//!
//! Serves the chat relay under two entry shapes sharing one session store:
//! the standalone routes (`/chat`, `/reset-session`, `/health`) and the
//! serverless-style routes under `/api`. Optionally serves the static chat
//! front-end.

pub mod error;
pub mod routes;
pub mod service;
pub mod state;

#[cfg(test)]
mod testing;

use std::future::Future;
use std::path::Path;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::handler::HandlerWithoutStateExt;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use rapal_core::config::ServerConfig;

pub use service::{ChatReply, ChatService, ConversationStore, HealthReport};
pub use state::AppState;

/// All API routes, without fallback or middleware.
fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(routes::chat_routes())
        .merge(routes::serverless_routes())
}

/// Build the bare application router: API routes plus the JSON 404.
pub fn app(state: AppState) -> Router {
    api_routes().fallback(routes::not_found).with_state(state)
}

/// Build the full router with static files and middleware.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let router = api_routes().with_state(state);

    let router = match config.static_dir.as_deref().filter(|dir| Path::new(dir).is_dir()) {
        Some(dir) => {
            info!(dir = %dir, "serving static files");
            let files = ServeDir::new(dir).not_found_service(routes::not_found.into_service());
            router.fallback_service(files)
        }
        None => router.fallback(routes::not_found),
    };

    router
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
}

/// CORS: the configured origin with credentials, otherwise any origin.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origin = config
        .cors_origin
        .as_deref()
        .and_then(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "invalid CORS origin, allowing any origin");
                None
            }
        });

    match origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    }
}

/// Bind `host:port` and serve `router` until `shutdown` resolves.
pub async fn start_server<F>(router: Router, config: &ServerConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Starting RAPal server on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")?;

    Ok(())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use rapal_core::config::SessionsConfig;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn make_state(model: &ScriptedModel, development: bool) -> AppState {
        let sessions = SessionsConfig::default();
        let service = Arc::new(ChatService::new(Arc::new(model.clone()), &sessions));
        AppState::new(service, development)
    }

    fn test_app(model: &ScriptedModel) -> Router {
        app(make_state(model, false))
    }

    async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn request(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        read_json(app.clone().oneshot(request).await.unwrap()).await
    }

    async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        request(app, Method::POST, uri, Some(body)).await
    }

    async fn sessions(app: &Router) -> u64 {
        let (_, body) = request(app, Method::GET, "/health", None).await;
        body["sessions"].as_u64().unwrap()
    }

    // ── Health ──

    #[tokio::test]
    async fn test_health() {
        let app = test_app(&ScriptedModel::new());
        let (status, body) = request(&app, Method::GET, "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
        assert_eq!(body["sessions"], 0);
        let ts = body["timestamp"].as_str().unwrap();
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), "2025-01-01T00:00:00.000Z".len());
    }

    // ── Chat ──

    #[tokio::test]
    async fn test_chat_default_session() {
        let app = test_app(&ScriptedModel::new());

        let (status, body) = post(&app, "/chat", json!({ "message": "Apa itu RPL?" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sessionId"], "default");
        assert!(!body["reply"].as_str().unwrap().is_empty());

        let (status, _) = post(&app, "/chat", json!({ "message": "Belajar apa?" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sessions(&app).await, 1);
    }

    #[tokio::test]
    async fn test_chat_echoes_session_id() {
        let app = test_app(&ScriptedModel::new());
        let (status, body) = post(
            &app,
            "/chat",
            json!({ "message": "halo", "sessionId": "siswa-42" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sessionId"], "siswa-42");
        assert_eq!(body["reply"], "RAPal: halo");
    }

    #[tokio::test]
    async fn test_chat_invalid_messages() {
        let app = test_app(&ScriptedModel::new());

        let (status, body) = post(&app, "/chat", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["reply"], error::REPLY_INVALID);

        let (status, body) = post(&app, "/chat", json!({ "message": 123 })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["reply"], error::REPLY_INVALID);

        let (status, body) = post(&app, "/chat", json!({ "message": "" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["reply"], error::REPLY_INVALID);

        let (status, body) = post(&app, "/chat", json!({ "message": "   \n" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["reply"], error::REPLY_EMPTY);

        assert_eq!(sessions(&app).await, 0);
    }

    #[tokio::test]
    async fn test_chat_length_boundary() {
        let app = test_app(&ScriptedModel::new());

        let (status, body) = post(&app, "/chat", json!({ "message": "a".repeat(5001) })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["reply"], "Pesan terlalu panjang. Maksimal 5000 karakter.");
        assert_eq!(sessions(&app).await, 0);

        let (status, _) = post(&app, "/chat", json!({ "message": "a".repeat(5000) })).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_chat_malformed_json_is_invalid_message() {
        let app = test_app(&ScriptedModel::new());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = read_json(app.clone().oneshot(request).await.unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["reply"], error::REPLY_INVALID);

        // Missing content type
        let request = Request::builder()
            .method(Method::POST)
            .uri("/chat")
            .body(Body::from(r#"{"message":"halo"}"#))
            .unwrap();
        let (status, _) = read_json(app.clone().oneshot(request).await.unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_rate_limit() {
        let app = test_app(&ScriptedModel::new());
        let body = json!({ "message": "halo", "sessionId": "spam" });

        for _ in 0..100 {
            let (status, _) = post(&app, "/chat", body.clone()).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, reply) = post(&app, "/chat", body).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(reply["reply"], error::REPLY_RATE_LIMITED);
        assert_eq!(sessions(&app).await, 1);
    }

    #[tokio::test]
    async fn test_chat_upstream_errors() {
        let app = test_app(&ScriptedModel::new());

        let (status, body) = post(&app, "/chat", json!({ "message": "[quota]" })).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["reply"], error::REPLY_BUSY);

        let (status, body) = post(&app, "/chat", json!({ "message": "[safety]" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["reply"], error::REPLY_CONTENT_POLICY);

        let (status, body) = post(&app, "/chat", json!({ "message": "[boom]" })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["reply"], error::REPLY_INTERNAL);
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_chat_error_detail_in_development() {
        let app = app(make_state(&ScriptedModel::new(), true));

        let (status, body) = post(&app, "/chat", json!({ "message": "[boom]" })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "connection reset by peer");
    }

    // ── Reset ──

    #[tokio::test]
    async fn test_reset_existing_session() {
        let app = test_app(&ScriptedModel::new());
        post(&app, "/chat", json!({ "message": "halo", "sessionId": "u1" })).await;

        let (status, body) = post(&app, "/reset-session", json!({ "sessionId": "u1" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Session berhasil direset");
        assert_eq!(sessions(&app).await, 0);
    }

    #[tokio::test]
    async fn test_reset_missing_session() {
        let app = test_app(&ScriptedModel::new());
        post(&app, "/chat", json!({ "message": "halo", "sessionId": "u1" })).await;

        let (status, body) = post(&app, "/reset-session", json!({ "sessionId": "nobody" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Session tidak ditemukan");
        assert_eq!(sessions(&app).await, 1);
    }

    #[tokio::test]
    async fn test_reset_empty_session_id_leaves_default() {
        let app = test_app(&ScriptedModel::new());
        post(&app, "/chat", json!({ "message": "halo" })).await;

        let (status, body) = post(&app, "/reset-session", json!({ "sessionId": "" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Session tidak ditemukan");
        assert_eq!(sessions(&app).await, 1);

        let (status, _) = post(&app, "/reset-session", json!({ "sessionId": "default" })).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reset_without_body_targets_default() {
        let app = test_app(&ScriptedModel::new());
        post(&app, "/chat", json!({ "message": "halo" })).await;

        let (status, _) = request(&app, Method::POST, "/reset-session", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sessions(&app).await, 0);
    }

    // ── Serverless shape ──

    #[tokio::test]
    async fn test_api_routes_share_store() {
        let app = test_app(&ScriptedModel::new());

        let (status, body) = post(&app, "/api", json!({ "message": "halo", "sessionId": "x" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sessionId"], "x");

        let (status, _) = post(&app, "/api/chat", json!({ "message": "lagi", "sessionId": "y" })).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = request(&app, Method::GET, "/api", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sessions"], 2);

        let (_, body) = request(&app, Method::GET, "/api/health", None).await;
        assert_eq!(body["status"], "OK");
        assert_eq!(sessions(&app).await, 2);

        let (status, _) = post(&app, "/api/reset-session", json!({ "sessionId": "x" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sessions(&app).await, 1);
    }

    // ── Not found ──

    #[tokio::test]
    async fn test_unknown_path() {
        let app = test_app(&ScriptedModel::new());
        let (status, body) = request(&app, Method::GET, "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Endpoint tidak ditemukan");
        assert_eq!(body["path"], "/nope");
    }

    #[tokio::test]
    async fn test_wrong_method_is_json_404() {
        let app = test_app(&ScriptedModel::new());

        let (status, body) = request(&app, Method::GET, "/chat", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["path"], "/chat");

        let (status, _) = request(&app, Method::POST, "/health", Some(json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    // ── Full router ──

    #[tokio::test]
    async fn test_build_router_serves_static_and_json_404() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>RAPal</h1>").unwrap();

        let config = ServerConfig {
            static_dir: Some(dir.path().to_string_lossy().into_owned()),
            ..Default::default()
        };
        let app = build_router(make_state(&ScriptedModel::new(), false), &config);

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"<h1>RAPal</h1>");

        let (status, body) = request(&app, Method::GET, "/missing.js", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Endpoint tidak ditemukan");

        let (status, _) = post(&app, "/chat", json!({ "message": "halo" })).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_build_router_without_static_dir() {
        let config = ServerConfig {
            static_dir: Some("/definitely/not/here".to_string()),
            ..Default::default()
        };
        let app = build_router(make_state(&ScriptedModel::new(), false), &config);

        let (status, body) = request(&app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["path"], "/");
    }

    #[tokio::test]
    async fn test_cors_configured_origin() {
        let config = ServerConfig {
            cors_origin: Some("https://rpl.example.sch.id".to_string()),
            static_dir: None,
            ..Default::default()
        };
        let app = build_router(make_state(&ScriptedModel::new(), false), &config);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/chat")
                    .header(header::ORIGIN, "https://rpl.example.sch.id")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://rpl.example.sch.id"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn test_cors_any_origin_by_default() {
        let config = ServerConfig {
            static_dir: None,
            ..Default::default()
        };
        let app = build_router(make_state(&ScriptedModel::new(), false), &config);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "https://anywhere.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }
}
