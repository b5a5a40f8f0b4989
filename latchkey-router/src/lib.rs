#![deny(missing_docs)]
//! Model routing and the local inference backend contract for latchkey.
//!
//! [`backend::InferenceBackend`] is the trait every model server (or
//! mock) implements. [`backend::OllamaBackend`] talks to a local
//! Ollama-compatible server over HTTP. [`router::ModelRouter`] asks a
//! small, always-warm router model which worker should handle a given
//! message, falling back to a deterministic choice when that model is
//! unavailable or its answer can't be parsed.

pub mod backend;
pub mod error;
pub mod router;

pub use backend::{ChatMessage, ChatResponse, InferenceBackend, MockBackend, OllamaBackend, TokenUsage};
pub use error::RouterError;
pub use router::{ModelRouter, WorkerModel};
