#![deny(missing_docs)]
//! Pattern-based intent detection: the orchestrator's only source of
//! tool decisions.
//!
//! The worker model never sees tool syntax and never decides whether to
//! call a tool — [`intent::detect_tool_action`] runs an ordered cascade
//! of regexes over the raw message and returns a [`intent::PlannedAction`],
//! or `None` when the message isn't a filesystem request at all.

pub mod intent;

pub use intent::{
    detect_tool_action, extract_action_verb, looks_like_filesystem_intent, map_action_to_tool,
    message_has_explicit_path, needs_confirmation, parse_ordinal_selection, DirectoryContext, PlannedAction,
    FOLDER_MAP,
};
