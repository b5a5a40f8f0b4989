//! The conversation-scoped entity store: a thin domain layer over
//! [`latchkey_core::state::StateStore`] that knows about entities,
//! pointers, turn counters, and the single pending-action slot.

use latchkey_core::entity::{ConversationState, Entity};
use latchkey_core::error::StateError;
use latchkey_core::id::{ConversationId, EntityId};
use latchkey_core::pending::PendingAction;
use latchkey_core::state::{Scope, StateStore};
use std::sync::Arc;

const CONVERSATION_KEY: &str = "conversation";
const PENDING_KEY: &str = "pending";
const ENTITY_PREFIX: &str = "entity/";

fn entity_key(id: &EntityId) -> String {
    format!("{ENTITY_PREFIX}{}", id.as_str())
}

/// Entity store for one conversation.
///
/// Every method is scoped to the conversation id given at construction —
/// there is no way to read or write another conversation's data through
/// this handle, which is what gives scenario isolation its guarantee.
pub struct EntityStore {
    backend: Arc<dyn StateStore>,
    scope: Scope,
}

impl EntityStore {
    /// Open the entity store for `conversation`.
    pub fn new(backend: Arc<dyn StateStore>, conversation: ConversationId) -> Self {
        Self {
            backend,
            scope: Scope::Conversation(conversation),
        }
    }

    /// Insert or overwrite an entity by id.
    pub async fn upsert(&self, entity: &Entity) -> Result<(), StateError> {
        let value = serde_json::to_value(entity).map_err(|e| StateError::Serialization(e.to_string()))?;
        self.backend.write(&self.scope, &entity_key(&entity.id), value).await
    }

    /// Look up an entity by id.
    pub async fn get(&self, id: &EntityId) -> Result<Option<Entity>, StateError> {
        match self.backend.read(&self.scope, &entity_key(id)).await? {
            Some(value) => {
                let entity = serde_json::from_value(value).map_err(|e| StateError::Serialization(e.to_string()))?;
                Ok(Some(entity))
            }
            None => Ok(None),
        }
    }

    /// Look up an entity by its absolute path. `O(n)` in the number of
    /// tracked entities — acceptable at conversation scale.
    pub async fn get_by_path(&self, path: &str) -> Result<Option<Entity>, StateError> {
        let all = self.list_all().await?;
        Ok(all.into_iter().find(|e| e.absolute_path == path))
    }

    /// All entities currently tracked in this conversation.
    pub async fn list_all(&self) -> Result<Vec<Entity>, StateError> {
        let keys = self.backend.list(&self.scope, ENTITY_PREFIX).await?;
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.backend.read(&self.scope, &key).await? {
                out.push(serde_json::from_value(value).map_err(|e| StateError::Serialization(e.to_string()))?);
            }
        }
        Ok(out)
    }

    /// Read the conversation's pointer/turn state.
    pub async fn conversation_state(&self) -> Result<ConversationState, StateError> {
        match self.backend.read(&self.scope, CONVERSATION_KEY).await? {
            Some(value) => serde_json::from_value(value).map_err(|e| StateError::Serialization(e.to_string())),
            None => Ok(ConversationState::default()),
        }
    }

    /// Write the conversation's pointer/turn state.
    pub async fn set_conversation_state(&self, state: &ConversationState) -> Result<(), StateError> {
        let value = serde_json::to_value(state).map_err(|e| StateError::Serialization(e.to_string()))?;
        self.backend.write(&self.scope, CONVERSATION_KEY, value).await
    }

    /// Advance the turn counter by one and persist it, returning the new value.
    pub async fn advance_turn(&self) -> Result<u64, StateError> {
        let mut state = self.conversation_state().await?;
        state.turn_index += 1;
        let turn = state.turn_index;
        self.set_conversation_state(&state).await?;
        Ok(turn)
    }

    /// Read the single outstanding confirmation, if any.
    pub async fn pending_action(&self) -> Result<Option<PendingAction>, StateError> {
        match self.backend.read(&self.scope, PENDING_KEY).await? {
            Some(value) => Ok(Some(
                serde_json::from_value(value).map_err(|e| StateError::Serialization(e.to_string()))?,
            )),
            None => Ok(None),
        }
    }

    /// Set the pending confirmation. A conversation may only have one
    /// outstanding `PendingAction` at a time — setting a new one while
    /// another is still unresolved is a hard error, not a silent
    /// overwrite, so the caller must clear or resolve the existing slot
    /// first.
    pub async fn set_pending_action(&self, action: &PendingAction) -> Result<(), StateError> {
        if self.pending_action().await?.is_some() {
            return Err(StateError::PendingActionExists);
        }
        let value = serde_json::to_value(action).map_err(|e| StateError::Serialization(e.to_string()))?;
        self.backend.write(&self.scope, PENDING_KEY, value).await
    }

    /// Clear the pending confirmation, e.g. after it's been answered.
    pub async fn clear_pending_action(&self) -> Result<(), StateError> {
        self.backend.delete(&self.scope, PENDING_KEY).await
    }

    /// Remove a tracked entity entirely, e.g. after a successful delete.
    pub async fn remove(&self, id: &EntityId) -> Result<(), StateError> {
        self.backend.delete(&self.scope, &entity_key(id)).await
    }

    /// Wipe every entity, pointer, and pending action for this conversation.
    pub async fn clear(&self) -> Result<(), StateError> {
        self.backend.clear_scope(&self.scope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use latchkey_core::entity::{EntityKind, EntityMetadata, Provenance, VerifiedExists};
    use latchkey_state_memory::MemoryStore;

    fn store() -> EntityStore {
        EntityStore::new(Arc::new(MemoryStore::new()), ConversationId::new("c1"))
    }

    fn sample(id: &str) -> Entity {
        Entity {
            id: EntityId::new(id),
            display_name: "foo.txt".to_string(),
            absolute_path: "/tmp/leo/foo.txt".to_string(),
            kind: EntityKind::File,
            provenance: Provenance::UserExplicit,
            timestamp: Utc::now(),
            turn_index: 0,
            metadata: EntityMetadata::default(),
            selection_ids: vec![],
            verified_exists: VerifiedExists::Unchecked,
        }
    }

    #[tokio::test]
    async fn upsert_then_get_by_id_and_path() {
        let store = store();
        let e = sample("e1");
        store.upsert(&e).await.unwrap();

        let got = store.get(&e.id).await.unwrap().unwrap();
        assert_eq!(got.id, e.id);

        let got = store.get_by_path("/tmp/leo/foo.txt").await.unwrap().unwrap();
        assert_eq!(got.id, e.id);
    }

    #[tokio::test]
    async fn turn_counter_advances() {
        let store = store();
        assert_eq!(store.advance_turn().await.unwrap(), 1);
        assert_eq!(store.advance_turn().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn pending_action_roundtrips_and_clears() {
        let store = store();
        let action = PendingAction {
            tool_name: "delete_file".to_string(),
            params: serde_json::Map::new(),
            entity: None,
            reason: "destructive".to_string(),
            timestamp: Utc::now(),
        };
        store.set_pending_action(&action).await.unwrap();
        assert!(store.pending_action().await.unwrap().is_some());

        store.clear_pending_action().await.unwrap();
        assert!(store.pending_action().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_pending_action_rejects_overlap() {
        let store = store();
        let action = PendingAction {
            tool_name: "delete_file".to_string(),
            params: serde_json::Map::new(),
            entity: None,
            reason: "destructive".to_string(),
            timestamp: Utc::now(),
        };
        store.set_pending_action(&action).await.unwrap();

        let second = PendingAction { reason: "another one".to_string(), ..action.clone() };
        let err = store.set_pending_action(&second).await.unwrap_err();
        assert!(matches!(err, StateError::PendingActionExists));

        // the original is untouched
        let still_pending = store.pending_action().await.unwrap().unwrap();
        assert_eq!(still_pending.reason, "destructive");

        store.clear_pending_action().await.unwrap();
        store.set_pending_action(&second).await.unwrap();
    }

    #[tokio::test]
    async fn remove_deletes_a_single_entity() {
        let store = store();
        store.upsert(&sample("e1")).await.unwrap();
        store.remove(&EntityId::new("e1")).await.unwrap();
        assert!(store.get(&EntityId::new("e1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_wipes_entities_and_pending() {
        let store = store();
        store.upsert(&sample("e1")).await.unwrap();
        store
            .set_pending_action(&PendingAction {
                tool_name: "delete_file".to_string(),
                params: serde_json::Map::new(),
                entity: None,
                reason: "x".to_string(),
                timestamp: Utc::now(),
            })
            .await
            .unwrap();

        store.clear().await.unwrap();

        assert!(store.list_all().await.unwrap().is_empty());
        assert!(store.pending_action().await.unwrap().is_none());
    }
}
