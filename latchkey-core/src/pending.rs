//! The single outstanding confirmation slot held per conversation.

use crate::entity::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Map;

/// A tool call awaiting the user's yes/no before it runs.
///
/// At most one of these exists per conversation at a time. Setting a new
/// one while another is still unresolved is a hard error — the caller
/// must wait for the outstanding confirmation, cancellation, or ordinal
/// reply before a fresh destructive request can set its own. Confirmation
/// has no deadline: it survives until the user answers it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingAction {
    /// The tool that will run if confirmed.
    pub tool_name: String,
    /// The parameters that will be passed to it.
    pub params: Map<String, serde_json::Value>,
    /// The entity the action targets, if one was resolved.
    pub entity: Option<Entity>,
    /// Why confirmation was required (shown nowhere directly, but logged).
    pub reason: String,
    /// When this confirmation was requested.
    pub timestamp: DateTime<Utc>,
}
