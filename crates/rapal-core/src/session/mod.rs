//! Session store — in-memory conversations keyed by session id.
//!
//! Nothing is persisted: sessions live until they are reset, evicted by the
//! [`SessionSweeper`] after a period of inactivity, or dropped when the
//! store shuts down.

pub mod store;
pub mod sweeper;

pub use store::{ConversationFactory, Session, SessionStore};
pub use sweeper::{SessionSweeper, DEFAULT_SWEEP_INTERVAL};
