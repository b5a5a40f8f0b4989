#![deny(missing_docs)]
//! The turn orchestrator: the one place that decides whether a message
//! becomes a tool call, a confirmation prompt, or a routed model
//! completion.
//!
//! [`TurnOrchestrator::handle_turn`] implements the full pipeline for one
//! user message: pending-action resolution, pattern-based intent
//! planning, tool execution with entity tracking, and — only when no
//! tool ran — routing to a worker model with its reply guarded against
//! hallucinated action claims.

use latchkey_context::{confirm, EntityStore, ReferenceResolver};
use latchkey_core::entity::{ConversationState, Entity, EntityKind, EntityMetadata, Provenance, VerifiedExists};
use latchkey_core::id::{ConversationId, EntityId};
use latchkey_core::pending::PendingAction;
use latchkey_core::state::StateStore;
use latchkey_core::tool_result::{Outcome, ToolAction, ToolResult};
use latchkey_core::DomainError;
use latchkey_format::{validate_model_response, ResponseFormatter, CLARIFICATION_PROMPT};
use latchkey_planner::intent::{self, DirectoryContext, PlannedAction};
use latchkey_router::{ChatMessage, InferenceBackend, ModelRouter};
use latchkey_tool::ToolRegistry;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

const SYSTEM_PROMPT: &str = "You are a local filesystem assistant. You never claim to have moved, \
deleted, renamed, copied, or created a file yourself — only the tool layer does that, and it has \
already run (or not) before your reply is shown to the user.";

/// Ties the entity store, reference resolver, intent planner, tool
/// registry, model router, and response formatter together into a
/// single per-turn entry point.
pub struct TurnOrchestrator {
    state: Arc<dyn StateStore>,
    tools: ToolRegistry,
    backend: Arc<dyn InferenceBackend>,
    router: ModelRouter,
    resolver: ReferenceResolver,
    home: String,
    directory_contexts: Mutex<HashMap<String, DirectoryContext>>,
}

impl TurnOrchestrator {
    /// Build an orchestrator over a shared state backend, a tool
    /// registry, an inference backend (used both for routing and for the
    /// chosen worker's completions), and the user's home directory (used
    /// by the planner to resolve well-known folder aliases).
    pub fn new(
        state: Arc<dyn StateStore>,
        tools: ToolRegistry,
        backend: Arc<dyn InferenceBackend>,
        router: ModelRouter,
        home: impl Into<String>,
    ) -> Self {
        Self {
            state,
            tools,
            backend,
            router,
            resolver: ReferenceResolver,
            home: home.into(),
            directory_contexts: Mutex::new(HashMap::new()),
        }
    }

    /// Handle one user message in `conversation`, returning the reply
    /// shown to the user.
    pub async fn handle_turn(&self, conversation: &ConversationId, message: &str) -> String {
        let store = EntityStore::new(Arc::clone(&self.state), conversation.clone());
        let _ = store.advance_turn().await;

        if let Some(response) = self.handle_pending_action(&store, conversation, message).await {
            return response;
        }

        let dir_ctx = self.directory_contexts.lock().await.get(conversation.as_str()).cloned();

        if let Some(planned) = intent::detect_tool_action(message, &self.home, dir_ctx.as_ref()) {
            return self.run_planned_action(&store, conversation, &planned).await;
        }

        if intent::looks_like_filesystem_intent(message) {
            return self.handle_reference_resolution(&store, conversation, message).await;
        }

        self.handle_no_action(message).await
    }

    /// Resolve confirmation, cancellation, or an ordinal reply against an
    /// outstanding [`PendingAction`]. Returns `None` when no pending
    /// action is set, or the message matches none of the three — in
    /// which case the turn falls through to normal intent planning with
    /// the pending action left untouched. An ordinal reply narrows the
    /// pending action down to one entity but does not run it directly —
    /// it re-enters the usual confirmation check, so picking "2" out of a
    /// disambiguation still needs a following "yes" for a destructive tool.
    async fn handle_pending_action(
        &self,
        store: &EntityStore,
        conversation: &ConversationId,
        message: &str,
    ) -> Option<String> {
        let pending = store.pending_action().await.ok()??;

        if confirm::is_affirmative(message) {
            let _ = store.clear_pending_action().await;
            return Some(self.execute_and_format(store, conversation, &pending.tool_name, pending.params).await);
        }

        if confirm::is_negative(message) {
            let _ = store.clear_pending_action().await;
            return Some("Action cancelled.".to_string());
        }

        let ordinal = intent::parse_ordinal_selection(message)?;
        let conversation_state = store.conversation_state().await.ok()?;
        let selection_id = conversation_state.current_selection_id.as_ref()?;
        let entities = store.list_all().await.ok()?;
        let selection = entities.iter().find(|e| &e.id == selection_id && e.kind == EntityKind::Selection)?;
        let items: Vec<&Entity> =
            selection.selection_ids.iter().filter_map(|id| entities.iter().find(|e| &e.id == id)).collect();

        let index = if ordinal < 0 { items.len() as i64 + ordinal } else { ordinal };
        if index < 0 || index as usize >= items.len() {
            return None;
        }
        let selected = items[index as usize];

        let mut params = pending.params.clone();
        if params.contains_key("path") {
            params.insert("path".to_string(), Value::String(selected.absolute_path.clone()));
        } else if params.contains_key("source") {
            params.insert("source".to_string(), Value::String(selected.absolute_path.clone()));
        }

        if pending.tool_name == "move_file"
            && params.get("destination").and_then(|v| v.as_str()).unwrap_or("").is_empty()
        {
            return Some(
                "I need the destination path or new name to move/rename it. Please provide the destination."
                    .to_string(),
            );
        }

        let _ = store.clear_pending_action().await;
        let planned = PlannedAction {
            tool_name: pending.tool_name.clone(),
            params,
            explicit_path: false,
            selection_resolved: false,
            destination_path: None,
        };
        Some(self.run_planned_action(store, conversation, &planned).await)
    }

    async fn run_planned_action(
        &self,
        store: &EntityStore,
        conversation: &ConversationId,
        planned: &PlannedAction,
    ) -> String {
        match self.tools.get(&planned.tool_name) {
            Ok(None) => format!("The '{}' tool isn't available right now.", planned.tool_name),
            Err(DomainError::ToolDisabled(name)) => format!("The '{name}' tool is currently disabled."),
            Err(e) => format!("I couldn't complete that: {e}."),
            Ok(Some(_)) if intent::needs_confirmation(planned) => self.request_confirmation(store, planned).await,
            Ok(Some(_)) => self.execute_and_format(store, conversation, &planned.tool_name, planned.params.clone()).await,
        }
    }

    async fn request_confirmation(&self, store: &EntityStore, planned: &PlannedAction) -> String {
        let pending = PendingAction {
            tool_name: planned.tool_name.clone(),
            params: planned.params.clone(),
            entity: None,
            reason: "destructive action requires confirmation".to_string(),
            timestamp: chrono::Utc::now(),
        };
        if let Err(e) = store.set_pending_action(&pending).await {
            tracing::warn!(error = %e, "refused to overwrite an outstanding pending action");
            return ResponseFormatter::format_pending_action_conflict();
        }

        match (
            planned.params.get("source").and_then(|v| v.as_str()),
            planned.params.get("destination").and_then(|v| v.as_str()),
        ) {
            (Some(source), Some(destination)) => {
                ResponseFormatter::format_confirmation_request_for_path(&planned.tool_name, source, destination)
            }
            _ => {
                let path = planned.params.get("path").and_then(|v| v.as_str()).unwrap_or("");
                ResponseFormatter::format_confirmation_request(&planned.tool_name, path)
            }
        }
    }

    /// The path taken when the planner's regex cascade didn't match but
    /// the message still reads as a filesystem request: resolve "it",
    /// "the second one", or a bare name against tracked entities instead.
    async fn handle_reference_resolution(
        &self,
        store: &EntityStore,
        conversation: &ConversationId,
        message: &str,
    ) -> String {
        let entities = store.list_all().await.unwrap_or_default();
        let conversation_state = store.conversation_state().await.unwrap_or_default();
        let action = intent::extract_action_verb(message);
        let is_destructive = action == "delete" || action == "move";
        let kind_hint = intent::infer_entity_kind_hint(message);

        let resolution = self.resolver.resolve(message, kind_hint, &entities, &conversation_state, is_destructive);

        if resolution.is_ambiguous() {
            let tool_name = intent::map_action_to_tool(action);
            let mut params = Map::new();
            if tool_name == "move_file" {
                params.insert("source".to_string(), Value::String(String::new()));
                params.insert("destination".to_string(), Value::String(String::new()));
            } else {
                params.insert("path".to_string(), Value::String(String::new()));
            }
            let pending = PendingAction {
                tool_name: tool_name.to_string(),
                params,
                entity: None,
                reason: resolution.reason.clone(),
                timestamp: chrono::Utc::now(),
            };
            if let Err(e) = store.set_pending_action(&pending).await {
                tracing::warn!(error = %e, "refused to overwrite an outstanding pending action");
                return ResponseFormatter::format_pending_action_conflict();
            }
            return ResponseFormatter::format_disambiguation(&resolution.alternatives, action);
        }

        if let Some(entity) = resolution.entity {
            // Only a literal path typed in the message skips confirmation. An
            // ordinal ("the second one") still names a file unambiguously, but
            // the user never typed it — destructive actions confirm it anyway.
            let explicit = resolution.reason == "explicit_path";
            let (tool_name, params) = match action {
                "delete" => ("delete_file", single_path_params(&entity.absolute_path)),
                "read" => ("read_file", single_path_params(&entity.absolute_path)),
                "move" | "rename" => match extract_destination(message) {
                    Some(dest) => ("move_file", move_params(&entity.absolute_path, &dest)),
                    None => {
                        return "I need the destination path or new name to move/rename it. \
                                 Please provide the destination."
                            .to_string();
                    }
                },
                _ => return ResponseFormatter::format_no_match(),
            };

            let planned = PlannedAction {
                tool_name: tool_name.to_string(),
                params,
                explicit_path: explicit,
                selection_resolved: explicit,
                destination_path: None,
            };
            return self.run_planned_action(store, conversation, &planned).await;
        }

        "I need the exact source and destination (or new name) to rename/move files, \
         or a concrete path to run the action. Please provide the full paths."
            .to_string()
    }

    /// No tool matched this turn at all: route to a worker model and
    /// guard its reply against claiming an action that never ran.
    async fn handle_no_action(&self, message: &str) -> String {
        let decision = self.router.route(message).await;
        let messages = [ChatMessage::system(SYSTEM_PROMPT.to_string()), ChatMessage::user(message.to_string())];
        let raw = match self.backend.chat(&decision.model_id, &messages).await {
            Ok(resp) => resp.content,
            Err(_) => return CLARIFICATION_PROMPT.to_string(),
        };
        let (response, was_blocked) = validate_model_response(&raw, false);
        if was_blocked {
            tracing::warn!("blocked hallucinated action claim from model reply");
        }
        response
    }

    async fn execute_and_format(
        &self,
        store: &EntityStore,
        conversation: &ConversationId,
        tool_name: &str,
        params: Map<String, Value>,
    ) -> String {
        let tool = match self.tools.get(tool_name) {
            Ok(Some(t)) => Arc::clone(t),
            Ok(None) => return format!("The '{tool_name}' tool isn't available right now."),
            Err(e) => return format!("I couldn't complete that: {e}."),
        };

        let value = match tool.call(Value::Object(params)).await {
            Ok(v) => v,
            Err(e) => return format!("I couldn't complete that: {e}."),
        };

        let result: ToolResult = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => return format!("I couldn't complete that: malformed tool result ({e})."),
        };

        if result.is_success() {
            self.track_from_tool_result(store, conversation, &result).await;
        }

        ResponseFormatter::format_tool_result(&result)
    }

    /// Apply the post-execution entity-tracking rules for a successful
    /// tool result: which entities get inserted, updated in place, or
    /// removed, and which pointers move.
    async fn track_from_tool_result(&self, store: &EntityStore, conversation: &ConversationId, result: &ToolResult) {
        let mut state = store.conversation_state().await.unwrap_or_default();
        let turn = state.turn_index;

        match &result.output {
            Outcome::List { path, items } => {
                let mut child_ids = Vec::with_capacity(items.len());
                for item in items {
                    let kind = if item.is_dir { EntityKind::Folder } else { EntityKind::File };
                    let entity =
                        self.build_or_reuse(store, &item.path, &item.name, kind, Provenance::ListResult, turn).await;
                    child_ids.push(entity.id.clone());
                    let _ = store.upsert(&entity).await;
                }

                let dir_entity = self
                    .build_or_reuse(store, path, basename(path), EntityKind::Folder, Provenance::ListResult, turn)
                    .await;
                state.last_active_folder_id = Some(dir_entity.id.clone());
                let _ = store.upsert(&dir_entity).await;

                let selection = Entity {
                    id: EntityId::new(format!("selection-{}", fnv_hash(path))),
                    display_name: format!("selection of {}", basename(path)),
                    absolute_path: path.clone(),
                    kind: EntityKind::Selection,
                    provenance: Provenance::ListResult,
                    timestamp: chrono::Utc::now(),
                    turn_index: turn,
                    metadata: EntityMetadata { item_count: Some(child_ids.len()), ..Default::default() },
                    selection_ids: child_ids,
                    verified_exists: VerifiedExists::KnownTrue,
                };
                state.current_selection_id = Some(selection.id.clone());
                let _ = store.upsert(&selection).await;

                self.directory_contexts.lock().await.insert(
                    conversation.as_str().to_string(),
                    DirectoryContext { path: path.clone(), items: items.iter().map(|i| i.name.clone()).collect() },
                );
            }
            Outcome::Read { path, .. } => {
                let entity =
                    self.build_or_reuse(store, path, basename(path), EntityKind::File, Provenance::ToolRead, turn).await;
                state.last_active_file_id = Some(entity.id.clone());
                let _ = store.upsert(&entity).await;
            }
            Outcome::Mutation { before_paths, after_paths, .. } => {
                self.track_mutation(store, &mut state, result.action, before_paths, after_paths, turn).await;
            }
            Outcome::Search { matches, .. } => {
                let mut child_ids = Vec::with_capacity(matches.len());
                for item in matches {
                    let kind = if item.is_dir { EntityKind::Folder } else { EntityKind::File };
                    let entity =
                        self.build_or_reuse(store, &item.path, &item.name, kind, Provenance::SearchResult, turn).await;
                    child_ids.push(entity.id.clone());
                    let _ = store.upsert(&entity).await;
                }
                let selection = Entity {
                    id: EntityId::new(format!("selection-search-{turn}")),
                    display_name: "search results".to_string(),
                    absolute_path: String::new(),
                    kind: EntityKind::Selection,
                    provenance: Provenance::SearchResult,
                    timestamp: chrono::Utc::now(),
                    turn_index: turn,
                    metadata: EntityMetadata { item_count: Some(child_ids.len()), ..Default::default() },
                    selection_ids: child_ids,
                    verified_exists: VerifiedExists::Unchecked,
                };
                state.current_selection_id = Some(selection.id.clone());
                let _ = store.upsert(&selection).await;
            }
            Outcome::Organize { .. } | Outcome::SystemInfo { .. } | Outcome::Shell { .. } | Outcome::None => {}
        }

        let _ = store.set_conversation_state(&state).await;
    }

    async fn track_mutation(
        &self,
        store: &EntityStore,
        state: &mut ConversationState,
        action: ToolAction,
        before_paths: &[String],
        after_paths: &[String],
        turn: u64,
    ) {
        match action {
            ToolAction::Write | ToolAction::Append | ToolAction::Create => {
                if let Some(path) = after_paths.first() {
                    let entity = self
                        .build_or_reuse(store, path, basename(path), EntityKind::File, Provenance::ToolOutput, turn)
                        .await;
                    state.last_active_file_id = Some(entity.id.clone());
                    let _ = store.upsert(&entity).await;
                }
            }
            ToolAction::Move => {
                if let (Some(before), Some(after)) = (before_paths.first(), after_paths.first()) {
                    if let Ok(Some(mut entity)) = store.get_by_path(before).await {
                        entity.absolute_path = after.clone();
                        entity.display_name = basename(after).to_string();
                        entity.provenance = Provenance::ToolMove;
                        entity.timestamp = chrono::Utc::now();
                        entity.turn_index = turn;
                        state.last_active_file_id = Some(entity.id.clone());
                        let _ = store.upsert(&entity).await;
                    } else {
                        let entity = self
                            .build_or_reuse(store, after, basename(after), EntityKind::File, Provenance::ToolMove, turn)
                            .await;
                        state.last_active_file_id = Some(entity.id.clone());
                        let _ = store.upsert(&entity).await;
                    }
                }
            }
            ToolAction::Copy => {
                if let Some(path) = after_paths.first() {
                    let entity = self
                        .build_or_reuse(store, path, basename(path), EntityKind::File, Provenance::ToolCopy, turn)
                        .await;
                    state.last_active_file_id = Some(entity.id.clone());
                    let _ = store.upsert(&entity).await;
                }
            }
            ToolAction::Delete | ToolAction::DeleteByPattern => {
                for path in before_paths {
                    if let Ok(Some(entity)) = store.get_by_path(path).await {
                        if state.last_active_file_id.as_ref() == Some(&entity.id) {
                            state.last_active_file_id = None;
                        }
                        if state.last_active_folder_id.as_ref() == Some(&entity.id) {
                            state.last_active_folder_id = None;
                        }
                        let _ = store.remove(&entity.id).await;
                    }
                }
            }
            _ => {}
        }
    }

    async fn build_or_reuse(
        &self,
        store: &EntityStore,
        path: &str,
        display_name: &str,
        kind: EntityKind,
        provenance: Provenance,
        turn: u64,
    ) -> Entity {
        if let Ok(Some(mut existing)) = store.get_by_path(path).await {
            existing.display_name = display_name.to_string();
            existing.provenance = provenance;
            existing.timestamp = chrono::Utc::now();
            existing.turn_index = turn;
            existing.verified_exists = VerifiedExists::KnownTrue;
            return existing;
        }
        Entity {
            id: EntityId::new(format!("ent-{}", fnv_hash(path))),
            display_name: display_name.to_string(),
            absolute_path: path.to_string(),
            kind,
            provenance,
            timestamp: chrono::Utc::now(),
            turn_index: turn,
            metadata: EntityMetadata::default(),
            selection_ids: vec![],
            verified_exists: VerifiedExists::KnownTrue,
        }
    }
}

fn single_path_params(path: &str) -> Map<String, Value> {
    let mut p = Map::new();
    p.insert("path".to_string(), Value::String(path.to_string()));
    p
}

fn move_params(source: &str, destination: &str) -> Map<String, Value> {
    let mut p = Map::new();
    p.insert("source".to_string(), Value::String(source.to_string()));
    p.insert("destination".to_string(), Value::String(destination.to_string()));
    p
}

fn extract_destination(message: &str) -> Option<String> {
    let lower = message.to_lowercase();
    let idx = lower.find(" to ").or_else(|| lower.find(" as "))?;
    let rest = message[idx + 4..].trim();
    let token = rest.split_whitespace().next()?;
    Some(token.trim_matches(|c| c == '\'' || c == '"').to_string())
}

fn basename(path: &str) -> &str {
    std::path::Path::new(path).file_name().and_then(|n| n.to_str()).unwrap_or(path)
}

fn fnv_hash(s: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in s.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_router::MockBackend;
    use latchkey_state_memory::MemoryStore;
    use latchkey_tool::guard::PathGuard;
    use latchkey_tool::ops::{DeleteByPatternTool, DeleteFileTool, ListDirectoryTool, MoveFileTool, WriteFileTool};
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn orchestrator(root: PathBuf) -> TurnOrchestrator {
        let guard = Arc::new(PathGuard::new(vec![root]));
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(WriteFileTool { guard: Arc::clone(&guard) }));
        tools.register(Arc::new(ListDirectoryTool { guard: Arc::clone(&guard) }));
        tools.register(Arc::new(MoveFileTool { guard: Arc::clone(&guard) }));
        tools.register(Arc::new(DeleteFileTool { guard: Arc::clone(&guard) }));
        tools.register(Arc::new(DeleteByPatternTool { guard }));

        let backend = Arc::new(MockBackend::with_default("hi there"));
        let router = ModelRouter::new(Arc::clone(&backend) as Arc<dyn InferenceBackend>, vec![]);
        TurnOrchestrator::new(Arc::new(MemoryStore::new()), tools, backend, router, "/home/leo")
    }

    #[tokio::test]
    async fn write_then_rename_then_delete_round_trip() {
        let dir = tempdir().unwrap();
        let orch = orchestrator(dir.path().to_path_buf());
        let conv = ConversationId::new("c1");

        let write_msg = format!("create a new file called foo.txt with content 'hello'");
        let reply = orch.handle_turn(&conv, &write_msg).await;
        assert!(reply.contains("Wrote 'foo.txt'"), "unexpected: {reply}");

        let foo = dir.path().join("foo.txt");
        assert!(foo.exists());

        // Explicit absolute source and destination paths skip confirmation entirely.
        let rename_msg = format!("rename {} to {}", foo.display(), dir.path().join("bar.txt").display());
        let reply = orch.handle_turn(&conv, &rename_msg).await;
        assert!(reply.contains("Renamed 'foo.txt' \u{2192} 'bar.txt'"), "unexpected: {reply}");

        let bar = dir.path().join("bar.txt");
        assert!(bar.exists());
        assert!(!foo.exists());

        let delete_msg = format!("delete {}", bar.display());
        let reply = orch.handle_turn(&conv, &delete_msg).await;
        assert!(reply.contains("Deleted 'bar.txt'"), "unexpected: {reply}");
        assert!(!bar.exists());
    }

    #[tokio::test]
    async fn negative_reply_cancels_pending_action() {
        let dir = tempdir().unwrap();
        let orch = orchestrator(dir.path().to_path_buf());
        let conv = ConversationId::new("c1");

        std::fs::write(dir.path().join("x.txt"), b"x").unwrap();
        let reply = orch.handle_turn(&conv, "delete all screenshots").await;
        assert!(reply.contains("(yes/no)"), "unexpected: {reply}");

        let reply = orch.handle_turn(&conv, "no").await;
        assert_eq!(reply, "Action cancelled.");
        assert!(dir.path().join("x.txt").exists());
    }

    #[tokio::test]
    async fn path_guard_rejects_paths_outside_the_allow_list() {
        let dir = tempdir().unwrap();
        let orch = orchestrator(dir.path().to_path_buf());
        let conv = ConversationId::new("c1");

        let reply = orch.handle_turn(&conv, "delete /etc/shadow.bak").await;
        assert!(reply.contains("couldn't complete"), "unexpected: {reply}");
    }

    #[tokio::test]
    async fn conversations_do_not_share_entity_state() {
        let dir = tempdir().unwrap();
        let orch = orchestrator(dir.path().to_path_buf());

        std::fs::write(dir.path().join("c1.txt"), b"a").unwrap();
        std::fs::write(dir.path().join("c2.txt"), b"b").unwrap();

        let c1 = ConversationId::new("c1");
        let c2 = ConversationId::new("c2");

        orch.handle_turn(&c1, &format!("read {}", dir.path().join("c1.txt").display())).await;
        orch.handle_turn(&c2, &format!("read {}", dir.path().join("c2.txt").display())).await;

        let reply1 = orch.handle_turn(&c1, "delete it").await;
        assert!(reply1.contains("c1.txt") || reply1.contains("(yes/no)"), "unexpected: {reply1}");

        let reply2 = orch.handle_turn(&c2, "delete it").await;
        assert!(reply2.contains("c2.txt") || reply2.contains("(yes/no)"), "unexpected: {reply2}");
    }

    #[tokio::test]
    async fn no_tool_call_routes_to_model_and_trusts_safe_reply() {
        let dir = tempdir().unwrap();
        let orch = orchestrator(dir.path().to_path_buf());
        let conv = ConversationId::new("c1");
        let reply = orch.handle_turn(&conv, "what's the weather like today?").await;
        assert_eq!(reply, "hi there");
    }

    #[tokio::test]
    async fn hallucinated_claim_without_a_tool_call_is_blocked() {
        let dir = tempdir().unwrap();
        let backend = Arc::new(MockBackend::with_default("I've deleted old_file.txt."));
        let guard = Arc::new(PathGuard::new(vec![dir.path().to_path_buf()]));
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(ListDirectoryTool { guard }));
        let router = ModelRouter::new(Arc::clone(&backend) as Arc<dyn InferenceBackend>, vec![]);
        let orch = TurnOrchestrator::new(Arc::new(MemoryStore::new()), tools, backend, router, "/home/leo");

        let reply = orch.handle_turn(&ConversationId::new("c1"), "can you clean up for me?").await;
        assert_eq!(reply, CLARIFICATION_PROMPT);
        assert!(!reply.to_lowercase().contains("deleted"));
    }
}
