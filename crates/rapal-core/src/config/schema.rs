//! Configuration schema.
//!
//! Hierarchy: `Config` → `ModelConfig`, `GenerationConfig`, `SessionsConfig`,
//! `ServerConfig`, `LoggingConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::validation::DEFAULT_MAX_MESSAGE_CHARS;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.rapal/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub model: ModelConfig,
    pub generation: GenerationConfig,
    pub sessions: SessionsConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Check the settings the server cannot run without.
    pub fn validate(&self) -> Result<(), String> {
        if !self.model.is_configured() {
            return Err(
                "Gemini API key not found. Set GEMINI_API_KEY or model.apiKey in the config file."
                    .to_string(),
            );
        }
        if self.model.name.trim().is_empty() {
            return Err("model.name must not be empty".to_string());
        }
        if self.sessions.max_message_chars == 0 {
            return Err("sessions.maxMessageChars must be greater than 0".to_string());
        }
        if self.sessions.sweep_interval_secs == 0 {
            return Err("sessions.sweepIntervalSecs must be greater than 0".to_string());
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Model
// ─────────────────────────────────────────────

/// Generative model connection settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelConfig {
    /// Model identifier (e.g. `"gemini-2.5-flash"`).
    pub name: String,
    /// API key for authentication.
    #[serde(default)]
    pub api_key: String,
    /// Custom API base URL (overrides the public endpoint).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Replaces the built-in persona prompt when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
    /// HTTP timeout for one generation call, in seconds.
    pub request_timeout_secs: u64,
}

impl ModelConfig {
    /// Whether an API key is configured.
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "gemini-2.5-flash".to_string(),
            api_key: String::new(),
            api_base: None,
            system_instruction: None,
            request_timeout_secs: 120,
        }
    }
}

/// Sampling parameters for every new conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationConfig {
    /// Sampling temperature.
    pub temperature: f64,
    /// Nucleus-sampling probability mass.
    pub top_p: f64,
    /// Top-k sampling cutoff.
    pub top_k: u32,
    /// Maximum tokens to generate per reply.
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 2048,
        }
    }
}

// ─────────────────────────────────────────────
// Sessions
// ─────────────────────────────────────────────

/// Session lifecycle and per-request limits.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionsConfig {
    /// Sessions idle for longer than this are evicted.
    pub idle_timeout_secs: u64,
    /// How often the eviction sweep runs.
    pub sweep_interval_secs: u64,
    /// Accepted messages per session before further ones are refused.
    pub max_messages: u64,
    /// Maximum inbound message length, in UTF-16 code units.
    pub max_message_chars: usize,
}

impl SessionsConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 30 * 60,
            sweep_interval_secs: 30 * 60,
            max_messages: 100,
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
        }
    }
}

// ─────────────────────────────────────────────
// Server
// ─────────────────────────────────────────────

/// HTTP server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origin. `None` allows any origin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cors_origin: Option<String>,
    /// `"production"` or `"development"`. Development responses carry
    /// upstream error details.
    pub environment: String,
    /// Directory of static front-end files, served when it exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<String>,
    /// Maximum request body size in bytes.
    pub body_limit_bytes: usize,
}

impl ServerConfig {
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            cors_origin: None,
            environment: "production".to_string(),
            static_dir: Some("public".to_string()),
            body_limit_bytes: 10 * 1024 * 1024,
        }
    }
}

// ─────────────────────────────────────────────
// Logging
// ─────────────────────────────────────────────

/// Log output settings. `RUST_LOG` overrides `level` when set.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    /// Base level directive (e.g. `"info"`, `"rapal=debug,info"`).
    pub level: String,
    /// `"compact"` or `"json"`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
