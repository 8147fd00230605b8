//! RAPal Core — shared types, configuration, and the session store.
//!
//! This crate contains:
//! - **config**: Config schema, JSON loader, and env var overrides
//! - **session**: In-memory session store and the idle-session sweeper
//! - **validation**: Inbound message checks
//! - **error**: The `ChatError` taxonomy shared by every entry point

pub mod config;
pub mod error;
pub mod session;
pub mod types;
pub mod utils;
pub mod validation;

pub use config::Config;
pub use error::ChatError;
pub use session::{Session, SessionStore, SessionSweeper};
pub use types::{resolve_session_id, ChatTurn, Role, DEFAULT_SESSION_ID};
pub use validation::validate_message;
