//! Entities: stable, conversation-scoped handles for files, folders, and
//! the selections a list/search produces.

use crate::id::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What an [`Entity`] represents.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A single file.
    File,
    /// A directory.
    Folder,
    /// An ordered group of entities produced by a list/search result.
    Selection,
    /// A reference into the document index (out of scope for execution,
    /// tracked only so "it" can resolve to an indexed document).
    Index,
    /// The output of a tool call that isn't itself a filesystem path
    /// (e.g. a system-info snapshot).
    ToolResult,
}

/// How an entity entered the conversation.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// The user typed the path explicitly.
    UserExplicit,
    /// A search tool produced this as a match.
    SearchResult,
    /// A list tool produced this as a child.
    ListResult,
    /// A write/append/create tool produced this.
    ToolOutput,
    /// A read tool opened this.
    ToolRead,
    /// A move tool produced this as the destination.
    ToolMove,
    /// A copy tool produced this as the destination.
    ToolCopy,
    /// Inferred by the planner without a concrete tool result (e.g. a
    /// well-known-folder alias resolution).
    Inferred,
}

/// Tri-state existence check, since a filesystem state check is not always
/// performed eagerly.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifiedExists {
    /// Confirmed present on disk as of the last verification.
    KnownTrue,
    /// Confirmed absent on disk as of the last verification.
    KnownFalse,
    /// Never verified against disk.
    Unchecked,
}

/// Optional filesystem metadata captured opportunistically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Size in bytes, for files.
    pub size_bytes: Option<u64>,
    /// Last-modified time, if known.
    pub mtime: Option<DateTime<Utc>>,
    /// Content hash, if computed.
    pub hash: Option<String>,
    /// MIME type, if inferred.
    pub mime: Option<String>,
    /// Child count, for folders/selections.
    pub item_count: Option<usize>,
}

/// A tracked file/folder/selection within one conversation.
///
/// `id` never changes once assigned — it is the sole handle for referring
/// to this entity across turns. `absolute_path` is rewritten in place on
/// rename/move; `display_name` follows it. A rename never issues a new id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Stable, conversation-scoped handle.
    pub id: EntityId,
    /// Human-readable label, usually the basename.
    pub display_name: String,
    /// Canonical resolved path (symlinks followed, `~` expanded).
    pub absolute_path: String,
    /// What kind of thing this entity is.
    pub kind: EntityKind,
    /// How this entity entered the conversation.
    pub provenance: Provenance,
    /// When this entity was introduced or last updated.
    pub timestamp: DateTime<Utc>,
    /// The turn on which it was introduced.
    pub turn_index: u64,
    /// Opportunistic filesystem metadata.
    pub metadata: EntityMetadata,
    /// For `kind == Selection`: ordered member entity ids.
    pub selection_ids: Vec<EntityId>,
    /// Whether the path is known to currently exist.
    pub verified_exists: VerifiedExists,
}

impl Entity {
    /// Does `query` plausibly refer to this entity by name? Cheap
    /// pre-filter used before scoring in the reference resolver — any
    /// case-insensitive containment on either side counts as a candidate.
    pub fn matches_name(&self, query: &str) -> bool {
        let name = self.display_name.to_lowercase();
        let query = query.to_lowercase();
        name == query || name.contains(&query) || query.contains(&name)
    }

    /// The basename-without-extension, lowercased.
    pub fn stem(&self) -> String {
        let name = self.display_name.to_lowercase();
        match name.rsplit_once('.') {
            Some((stem, _)) => stem.to_string(),
            None => name,
        }
    }
}

/// Per-conversation pointer state: one row per conversation id.
///
/// `turn_index` is monotonically non-decreasing; pointer ids, when set,
/// must reference entities belonging to the same conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationState {
    /// The most recently active file.
    pub last_active_file_id: Option<EntityId>,
    /// The most recently active folder.
    pub last_active_folder_id: Option<EntityId>,
    /// The current selection (from the last list/search result).
    pub current_selection_id: Option<EntityId>,
    /// Number of user turns processed so far.
    pub turn_index: u64,
}
