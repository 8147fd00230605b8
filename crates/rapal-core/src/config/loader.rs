//! Config loader — reads `~/.rapal/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.rapal/config.json` (or an explicit path)
//! 3. Environment variables `RAPAL_<SECTION>__<FIELD>` (override JSON)
//! 4. Conventional variables `GEMINI_API_KEY`, `PORT`, `FRONTEND_URL`,
//!    `RAPAL_ENV`, `NODE_ENV`, used only when the matching `RAPAL_*` variable is unset

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    apply_env_overrides(read_config_file(path).unwrap_or_default())
}

/// Read and deserialize a config file, logging why it was skipped if not.
fn read_config_file(path: &Path) -> Option<Config> {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return None;
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    // Ensure parent directory exists
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Read the first set, non-empty variable among `names`.
fn env_first(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|val| !val.trim().is_empty())
}

/// Read and parse the first set variable among `names`, warning on bad values.
fn env_parse<T: std::str::FromStr>(names: &[&str]) -> Option<T> {
    let val = env_first(names)?;
    match val.trim().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(value = %val, vars = ?names, "ignoring unparsable env override");
            None
        }
    }
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `RAPAL_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `RAPAL_MODEL__NAME` → `model.name`
/// - `RAPAL_MODEL__API_KEY` / `GEMINI_API_KEY` → `model.api_key`
/// - `RAPAL_MODEL__API_BASE` → `model.api_base`
/// - `RAPAL_MODEL__REQUEST_TIMEOUT_SECS` → `model.request_timeout_secs`
/// - `RAPAL_GENERATION__TEMPERATURE` / `__TOP_P` / `__TOP_K` / `__MAX_OUTPUT_TOKENS`
/// - `RAPAL_SESSIONS__IDLE_TIMEOUT_SECS` / `__SWEEP_INTERVAL_SECS` /
///   `__MAX_MESSAGES` / `__MAX_MESSAGE_CHARS`
/// - `RAPAL_SERVER__HOST` → `server.host`
/// - `RAPAL_SERVER__PORT` / `PORT` → `server.port`
/// - `RAPAL_SERVER__CORS_ORIGIN` / `FRONTEND_URL` → `server.cors_origin`
/// - `RAPAL_SERVER__ENVIRONMENT` / `RAPAL_ENV` / `NODE_ENV` → `server.environment`
/// - `RAPAL_SERVER__STATIC_DIR` → `server.static_dir`
/// - `RAPAL_LOGGING__LEVEL` / `RAPAL_LOGGING__FORMAT`
fn apply_env_overrides(mut config: Config) -> Config {
    // Model
    if let Some(val) = env_first(&["RAPAL_MODEL__NAME"]) {
        config.model.name = val;
    }
    if let Some(val) = env_first(&["RAPAL_MODEL__API_KEY", "GEMINI_API_KEY"]) {
        config.model.api_key = val;
    }
    if let Some(val) = env_first(&["RAPAL_MODEL__API_BASE"]) {
        config.model.api_base = Some(val);
    }
    if let Some(n) = env_parse(&["RAPAL_MODEL__REQUEST_TIMEOUT_SECS"]) {
        config.model.request_timeout_secs = n;
    }

    // Generation
    if let Some(t) = env_parse(&["RAPAL_GENERATION__TEMPERATURE"]) {
        config.generation.temperature = t;
    }
    if let Some(p) = env_parse(&["RAPAL_GENERATION__TOP_P"]) {
        config.generation.top_p = p;
    }
    if let Some(k) = env_parse(&["RAPAL_GENERATION__TOP_K"]) {
        config.generation.top_k = k;
    }
    if let Some(n) = env_parse(&["RAPAL_GENERATION__MAX_OUTPUT_TOKENS"]) {
        config.generation.max_output_tokens = n;
    }

    // Sessions
    if let Some(n) = env_parse(&["RAPAL_SESSIONS__IDLE_TIMEOUT_SECS"]) {
        config.sessions.idle_timeout_secs = n;
    }
    if let Some(n) = env_parse(&["RAPAL_SESSIONS__SWEEP_INTERVAL_SECS"]) {
        config.sessions.sweep_interval_secs = n;
    }
    if let Some(n) = env_parse(&["RAPAL_SESSIONS__MAX_MESSAGES"]) {
        config.sessions.max_messages = n;
    }
    if let Some(n) = env_parse(&["RAPAL_SESSIONS__MAX_MESSAGE_CHARS"]) {
        config.sessions.max_message_chars = n;
    }

    // Server
    if let Some(val) = env_first(&["RAPAL_SERVER__HOST"]) {
        config.server.host = val;
    }
    if let Some(p) = env_parse(&["RAPAL_SERVER__PORT", "PORT"]) {
        config.server.port = p;
    }
    if let Some(val) = env_first(&["RAPAL_SERVER__CORS_ORIGIN", "FRONTEND_URL"]) {
        config.server.cors_origin = Some(val);
    }
    if let Some(val) = env_first(&["RAPAL_SERVER__ENVIRONMENT", "RAPAL_ENV", "NODE_ENV"]) {
        config.server.environment = val;
    }
    if let Some(val) = env_first(&["RAPAL_SERVER__STATIC_DIR"]) {
        config.server.static_dir = Some(val);
    }

    // Logging
    if let Some(val) = env_first(&["RAPAL_LOGGING__LEVEL"]) {
        config.logging.level = val;
    }
    if let Some(val) = env_first(&["RAPAL_LOGGING__FORMAT"]) {
        config.logging.format = val;
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
