//! The storage substrate backing the entity store and pending-action slot.

use crate::error::StateError;
use crate::id::ConversationId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Isolation boundary for a stored value.
///
/// Every conversation's entities, pointers, and pending action live under
/// their own `Conversation` scope so that cross-conversation reads can
/// never leak into each other.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Scope {
    /// Data scoped to one conversation.
    Conversation(ConversationId),
    /// Data shared across all conversations (e.g. the model registry).
    Global,
}

/// Generic key-value storage substrate. Deliberately minimal — CRUD + list
/// — with the conversation-scoped domain layer (entity upsert/lookup,
/// pointers, turn index) built on top of it in `latchkey-context`.
///
/// Implementations: an in-memory `HashMap` for tests and ephemeral use, a
/// filesystem store for durability across restarts.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read a value by key within a scope. `None` if the key doesn't exist.
    async fn read(
        &self,
        scope: &Scope,
        key: &str,
    ) -> Result<Option<serde_json::Value>, StateError>;

    /// Write a value. Creates or overwrites.
    async fn write(
        &self,
        scope: &Scope,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), StateError>;

    /// Delete a value. No-op if the key doesn't exist.
    async fn delete(&self, scope: &Scope, key: &str) -> Result<(), StateError>;

    /// List keys under a prefix within a scope.
    async fn list(&self, scope: &Scope, prefix: &str) -> Result<Vec<String>, StateError>;

    /// Delete every key within a scope. Used when a conversation is cleared.
    async fn clear_scope(&self, scope: &Scope) -> Result<(), StateError>;
}
