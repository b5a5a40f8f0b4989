#![deny(missing_docs)]
//! In-memory implementation of `latchkey_core`'s `StateStore` trait.
//!
//! Keeps one inner map per scope rather than flattening everything into a
//! single namespace, so isolation falls out of the data structure instead
//! of a key-prefix convention. Ephemeral — nothing here survives a process
//! restart, so the CLI defaults to [`MemoryStore`] only for one-shot or
//! test runs.

use async_trait::async_trait;
use latchkey_core::error::StateError;
use latchkey_core::state::{Scope, StateStore};
use std::collections::HashMap;
use tokio::sync::RwLock;

type ScopeTable = HashMap<String, serde_json::Value>;

/// In-memory state store. Each [`Scope`] owns its own table, so clearing
/// or listing a scope never has to scan keys belonging to another one.
pub struct MemoryStore {
    scopes: RwLock<HashMap<Scope, ScopeTable>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            scopes: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn read(
        &self,
        scope: &Scope,
        key: &str,
    ) -> Result<Option<serde_json::Value>, StateError> {
        let scopes = self.scopes.read().await;
        Ok(scopes.get(scope).and_then(|table| table.get(key)).cloned())
    }

    async fn write(
        &self,
        scope: &Scope,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), StateError> {
        let mut scopes = self.scopes.write().await;
        scopes.entry(scope.clone()).or_default().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, scope: &Scope, key: &str) -> Result<(), StateError> {
        let mut scopes = self.scopes.write().await;
        if let Some(table) = scopes.get_mut(scope) {
            table.remove(key);
        }
        Ok(())
    }

    async fn list(&self, scope: &Scope, prefix: &str) -> Result<Vec<String>, StateError> {
        let scopes = self.scopes.read().await;
        let keys = scopes
            .get(scope)
            .map(|table| table.keys().filter(|k| k.starts_with(prefix)).cloned().collect())
            .unwrap_or_default();
        Ok(keys)
    }

    async fn clear_scope(&self, scope: &Scope) -> Result<(), StateError> {
        let mut scopes = self.scopes.write().await;
        scopes.remove(scope);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_core::id::ConversationId;
    use serde_json::json;

    fn convo(id: &str) -> Scope {
        Scope::Conversation(ConversationId::new(id))
    }

    #[tokio::test]
    async fn write_then_read() {
        let store = MemoryStore::new();
        let scope = convo("c1");
        store.write(&scope, "foo", json!({"a": 1})).await.unwrap();
        let got = store.read(&scope, "foo").await.unwrap();
        assert_eq!(got, Some(json!({"a": 1})));
    }

    #[tokio::test]
    async fn scopes_are_isolated() {
        let store = MemoryStore::new();
        store.write(&convo("c1"), "foo", json!(1)).await.unwrap();
        let got = store.read(&convo("c2"), "foo").await.unwrap();
        assert_eq!(got, None);
    }

    #[tokio::test]
    async fn read_from_unknown_scope_returns_none() {
        let store = MemoryStore::new();
        let got = store.read(&convo("never-written"), "foo").await.unwrap();
        assert_eq!(got, None);
    }

    #[tokio::test]
    async fn delete_removes_key() {
        let store = MemoryStore::new();
        let scope = convo("c1");
        store.write(&scope, "foo", json!(1)).await.unwrap();
        store.delete(&scope, "foo").await.unwrap();
        assert_eq!(store.read(&scope, "foo").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_from_unknown_scope_is_ok() {
        let store = MemoryStore::new();
        assert!(store.delete(&convo("never-written"), "foo").await.is_ok());
    }

    #[tokio::test]
    async fn list_filters_by_prefix_and_scope() {
        let store = MemoryStore::new();
        let scope = convo("c1");
        store.write(&scope, "entity/1", json!(1)).await.unwrap();
        store.write(&scope, "entity/2", json!(1)).await.unwrap();
        store.write(&scope, "pointer", json!(1)).await.unwrap();
        store.write(&convo("c2"), "entity/3", json!(1)).await.unwrap();

        let mut keys = store.list(&scope, "entity/").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["entity/1".to_string(), "entity/2".to_string()]);
    }

    #[tokio::test]
    async fn clear_scope_wipes_only_that_scope() {
        let store = MemoryStore::new();
        store.write(&convo("c1"), "foo", json!(1)).await.unwrap();
        store.write(&convo("c2"), "foo", json!(1)).await.unwrap();

        store.clear_scope(&convo("c1")).await.unwrap();

        assert_eq!(store.read(&convo("c1"), "foo").await.unwrap(), None);
        assert_eq!(store.read(&convo("c2"), "foo").await.unwrap(), Some(json!(1)));
    }

    #[test]
    fn memory_store_implements_state_store() {
        fn _assert_state_store<T: StateStore>() {}
        _assert_state_store::<MemoryStore>();
    }
}
