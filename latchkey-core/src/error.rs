//! Error taxonomy shared across the orchestration loop.

use thiserror::Error;

/// Storage-layer errors from a [`crate::state::StateStore`] implementation.
///
/// These are programmer-error conditions (corrupt persisted JSON, an I/O
/// failure writing the entity store) — not domain failures. Domain
/// failures (missing file, permission denied) are reported through
/// [`DomainError`] and carried inside a `ToolResult`, never raised here.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StateError {
    /// Key not found in the given scope.
    #[error("not found: {scope}/{key}")]
    NotFound {
        /// The scope that was searched.
        scope: String,
        /// The key that was not found.
        key: String,
    },

    /// A write operation failed.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A pending action was already set for this conversation; it must be
    /// confirmed, cancelled, or resolved before a new one can be set.
    #[error("a pending action is already set for this conversation")]
    PendingActionExists,

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// The domain error taxonomy from the orchestration loop's error handling
/// design. Tools never throw these to callers — they are carried inside a
/// `ToolResult.error` or surfaced by the orchestrator as a short
/// user-visible sentence. Only this enum's presence is part of the public
/// contract; any component may add context-specific detail in its message.
#[non_exhaustive]
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DomainError {
    /// Path or model missing. Surfaced to the user, never retried.
    #[error("not found: {0}")]
    NotFound(String),

    /// The OS refused access. Surfaced with actionable guidance.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Wrong or missing tool parameter, or a path outside the allow-list.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The tool call reported success but the post-condition on disk is
    /// false. Never silently recovered — always surfaced as a failure.
    #[error("verification failed: {0}")]
    VerificationFailed(String),

    /// The named tool is registered but disabled.
    #[error("tool disabled: {0}")]
    ToolDisabled(String),

    /// No worker model is available, or the router's response could not
    /// be parsed. Never fatal — the caller falls back to the best
    /// general-purpose worker or the router itself.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// The shell tool exceeded its configured timeout.
    #[error("timed out: {0}")]
    Timeout(String),

    /// The action guard detected and blocked a hallucinated claim.
    #[error("hallucination blocked")]
    HallucinationBlocked,
}
