//! Generative model layer for RAPal.
//!
//! # Architecture
//!
//! - [`traits::ChatModel`] / [`traits::Conversation`] — the seam the chat
//!   service depends on
//! - [`gemini::GeminiModel`] — Google Gemini over `generateContent`
//! - [`persona`] — the default RAPal AI system instruction
//! - [`error::ProviderError`] — failures with a structured kind, convertible
//!   into `ChatError`

pub mod error;
pub mod gemini;
pub mod persona;
pub mod traits;

pub use error::{ProviderError, ProviderErrorKind};
pub use gemini::GeminiModel;
pub use traits::{ChatModel, Conversation};
